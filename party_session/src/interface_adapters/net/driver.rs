// Session driver: the single task that owns a peer and applies events to it in order.

use super::transport::{ChannelTransport, SessionEvent};
use crate::use_cases::{Frontend, Peer, SessionStatus};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

enum Flow {
    Continue,
    Stop,
}

fn apply_event<F: Frontend>(peer: &mut Peer<ChannelTransport, F>, event: SessionEvent) -> Flow {
    match event {
        SessionEvent::Opened { peer_id, outbound } => {
            peer.transport_mut().open(peer_id.clone(), outbound);
            peer.peer_opened(&peer_id);
        }
        SessionEvent::Closed { peer_id } => {
            peer.transport_mut().close(&peer_id);
            if !peer.peer_closed(&peer_id) {
                return Flow::Stop;
            }
        }
        SessionEvent::Message { from, message } => {
            debug!(from = %from, kind = message.kind(), "message received");
            peer.handle_message(&from, message);
        }
        SessionEvent::Local(intent) => peer.apply_intent(intent),
    }
    Flow::Continue
}

fn publish(status_tx: &watch::Sender<SessionStatus>, status: SessionStatus) {
    status_tx.send_if_modified(|current| {
        if *current == status {
            return false;
        }
        *current = status;
        true
    });
}

/// Runs until every event sender is gone or the peer can no longer continue.
pub async fn session_task<F: Frontend>(
    mut peer: Peer<ChannelTransport, F>,
    mut events_rx: mpsc::Receiver<SessionEvent>,
    status_tx: watch::Sender<SessionStatus>,
    tick_interval: Duration,
) {
    // Fixed-step tick drives countdowns and pose streaming.
    let mut interval = tokio::time::interval(tick_interval);
    let dt = tick_interval.as_secs_f32();

    loop {
        let flow = tokio::select! {
            event = events_rx.recv() => match event {
                Some(event) => apply_event(&mut peer, event),
                None => Flow::Stop,
            },
            _ = interval.tick() => {
                peer.tick(dt);
                Flow::Continue
            }
        };

        publish(&status_tx, peer.status());
        if let Flow::Stop = flow {
            break;
        }
    }

    let status = peer.status();
    info!(
        local_id = %status.local_id,
        phase = status.phase.as_str(),
        round = status.round,
        "session driver stopped"
    );
}
