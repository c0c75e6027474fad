// Network adapter: the session driver plus the two ends of a peer link.

pub mod driver;
pub mod host;
pub mod join;
pub mod transport;

pub use driver::session_task;
pub use host::peer_ws_handler;
pub use join::{HostLink, connect, run_host_link};
pub use transport::{ChannelTransport, SessionEvent};

#[derive(Debug)]
pub enum NetError {
    // Categorizes link failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Link(tokio_tungstenite::tungstenite::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    SessionClosed,
    HandshakeTimeout,
    IdentityRequired,
    ClosedBeforeIdentity,
}
