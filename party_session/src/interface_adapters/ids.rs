// Identifiers handed out by the network adapter.

use crate::domain::PeerId;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id for correlating one socket's log lines.
pub fn next_conn_id() -> u64 {
    NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed)
}

/// Fresh opaque identity for an accepted socket.
pub fn new_peer_id() -> PeerId {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_ids_are_minted_then_they_never_repeat() {
        let a = next_conn_id();
        let b = next_conn_id();
        assert!(b > a);
        assert_ne!(new_peer_id(), new_peer_id());
    }
}
