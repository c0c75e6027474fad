// Frameworks: configuration, runtime bootstrap and process entry points.

pub mod config;
pub mod console;
pub mod peer;
pub mod server;
