// Channel-backed transport: the session driver owns one bounded outbound queue per peer.

use crate::domain::PeerId;
use crate::interface_adapters::protocol::Envelope;
use crate::use_cases::{LocalIntent, SessionMessage, Transport};
use axum::extract::ws::Utf8Bytes;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, warn};

pub(crate) const LOG_THROTTLE: Duration = Duration::from_secs(2);

/// Everything the session driver reacts to, in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    // A channel to `peer_id` is live; frames for it go to `outbound`.
    Opened {
        peer_id: PeerId,
        outbound: mpsc::Sender<Utf8Bytes>,
    },
    Closed {
        peer_id: PeerId,
    },
    Message {
        from: PeerId,
        message: SessionMessage,
    },
    Local(LocalIntent),
}

pub(crate) fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Serializes a session message into one text frame.
pub fn encode(message: &SessionMessage) -> Result<Utf8Bytes, serde_json::Error> {
    let txt = serde_json::to_string(&Envelope::from(message))?;
    Ok(Utf8Bytes::from(txt))
}

pub struct ChannelTransport {
    // Open order, so fan-out visits peers in the order they connected.
    channels: Vec<(PeerId, mpsc::Sender<Utf8Bytes>)>,
    dropped: u64,
    last_full_log: Instant,
}

impl Default for ChannelTransport {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            dropped: 0,
            last_full_log: Instant::now() - LOG_THROTTLE,
        }
    }
}

impl ChannelTransport {
    pub fn open(&mut self, peer_id: PeerId, outbound: mpsc::Sender<Utf8Bytes>) {
        self.close(&peer_id);
        self.channels.push((peer_id, outbound));
    }

    pub fn close(&mut self, peer_id: &str) -> bool {
        let before = self.channels.len();
        self.channels.retain(|(id, _)| id != peer_id);
        self.channels.len() != before
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Snapshot frames dropped because a peer's queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    // Snapshots are superseded by the next tick, so a full queue may skip them.
    // Any other fact is part of the session state; a peer that cannot take it is evicted.
    fn push(&mut self, index: usize, bytes: Utf8Bytes, lossy: bool) -> bool {
        let (peer_id, outbound) = &self.channels[index];
        match outbound.try_send(bytes) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) if lossy => {
                self.dropped += 1;
                if should_log(&mut self.last_full_log) {
                    warn!(
                        peer_id = %peer_id,
                        dropped = self.dropped,
                        "outbound queue full; dropping snapshot"
                    );
                }
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(peer_id = %peer_id, "outbound queue full; evicting peer");
                false
            }
            // The socket task is gone; its Closed event is already queued.
            Err(TrySendError::Closed(_)) => true,
        }
    }

    // Dropping the sender ends the socket task's queue, which closes the link and
    // reports Closed back to the driver.
    fn evict(&mut self, mut indices: Vec<usize>) {
        indices.sort_unstable();
        for index in indices.into_iter().rev() {
            self.channels.remove(index);
        }
    }
}

fn is_lossy(message: &SessionMessage) -> bool {
    matches!(message, SessionMessage::Snapshot(_))
}

impl Transport for ChannelTransport {
    fn send(&mut self, peer: &str, message: &SessionMessage) {
        let Some(index) = self.channels.iter().position(|(id, _)| id == peer) else {
            return;
        };
        match encode(message) {
            Ok(bytes) => {
                if !self.push(index, bytes, is_lossy(message)) {
                    self.evict(vec![index]);
                }
            }
            Err(e) => error!(error = ?e, kind = message.kind(), "failed to serialize message"),
        }
    }

    fn peers(&self) -> Vec<PeerId> {
        self.channels.iter().map(|(id, _)| id.clone()).collect()
    }

    // Serialize once and share the bytes across every selected channel.
    fn broadcast(&mut self, message: &SessionMessage, recipients: &[PeerId]) -> usize {
        let targets: Vec<usize> = (0..self.channels.len())
            .filter(|&i| recipients.contains(&self.channels[i].0))
            .collect();
        if targets.is_empty() {
            return 0;
        }
        let bytes = match encode(message) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = ?e, kind = message.kind(), "failed to serialize message");
                return 0;
            }
        };
        let lossy = is_lossy(message);
        let stalled: Vec<usize> = targets
            .iter()
            .copied()
            .filter(|&index| !self.push(index, bytes.clone(), lossy))
            .collect();
        let sent = targets.len() - stalled.len();
        if !stalled.is_empty() {
            self.evict(stalled);
        }
        sent
    }
}
