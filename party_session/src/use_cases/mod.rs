// Use cases layer: session roles, round flow and relay rules.

pub mod client;
pub mod host;
pub mod peer;
pub mod ports;
pub mod relay;
pub mod session;
pub mod types;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
pub(crate) mod test_support;

pub use client::ClientSession;
pub use host::{HostSession, generate_party_box};
pub use peer::Peer;
pub use ports::{Frontend, LobbyView, Transport};
pub use relay::Fanout;
pub use session::SessionSettings;
pub use types::{LocalIntent, SessionMessage, SessionStatus};
