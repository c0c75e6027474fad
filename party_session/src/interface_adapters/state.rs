use crate::interface_adapters::net::SessionEvent;
use crate::use_cases::SessionStatus;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Identity announced to every joiner in the IDENTITY frame.
    pub host_id: Arc<str>,
    // Socket events flowing into the session driver.
    pub events_tx: mpsc::Sender<SessionEvent>,
    // Latest status published by the session driver.
    pub status_rx: watch::Receiver<SessionStatus>,
}
