// Interface adapters: wire protocol, network handling and the headless frontend.

pub mod headless;
pub mod http;
pub mod ids;
pub mod net;
pub mod protocol;
pub mod state;
