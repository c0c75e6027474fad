// Client side of a peer link: one outgoing WebSocket to the host.

use super::NetError;
use super::transport::{LOG_THROTTLE, SessionEvent, should_log};
use crate::domain::PeerId;
use crate::interface_adapters::protocol::{Envelope, IdentityDto};
use crate::use_cases::SessionMessage;

use axum::extract::ws::Utf8Bytes;
use futures_util::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

type HostStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open link to the host, after the identity handshake.
pub struct HostLink {
    pub local_id: PeerId,
    pub host_id: PeerId,
    stream: HostStream,
}

/// Connects to the host and waits for the IDENTITY frame naming both ends.
pub async fn connect(url: &str, handshake_timeout: Duration) -> Result<HostLink, NetError> {
    let (mut stream, _response) = connect_async(url).await.map_err(NetError::Link)?;

    let identity = match timeout(handshake_timeout, read_identity(&mut stream)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = stream.close(None).await;
            return Err(NetError::HandshakeTimeout);
        }
    };
    info!(local_id = %identity.peer_id, host_id = %identity.host_id, "linked to host");

    Ok(HostLink {
        local_id: identity.peer_id,
        host_id: identity.host_id,
        stream,
    })
}

async fn read_identity(stream: &mut HostStream) -> Result<IdentityDto, NetError> {
    while let Some(frame) = stream.next().await {
        match frame.map_err(NetError::Link)? {
            Message::Text(text) => {
                return match serde_json::from_str::<Envelope>(text.as_str()) {
                    Ok(Envelope::Identity(identity)) => Ok(identity),
                    _ => Err(NetError::IdentityRequired),
                };
            }
            Message::Binary(_) => return Err(NetError::IdentityRequired),
            Message::Close(_) => return Err(NetError::ClosedBeforeIdentity),
            _ => {}
        }
    }
    Err(NetError::ClosedBeforeIdentity)
}

/// Pumps frames both ways until either side closes, then reports the host as gone.
pub async fn run_host_link(
    link: HostLink,
    events_tx: mpsc::Sender<SessionEvent>,
    mut outbound_rx: mpsc::Receiver<Utf8Bytes>,
) -> Result<(), NetError> {
    let HostLink {
        host_id,
        mut stream,
        ..
    } = link;
    let mut invalid_frames: u32 = 0;
    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;

    let result = loop {
        tokio::select! {
            incoming = stream.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        info!("host closed the link");
                        break Ok(());
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => break Err(NetError::Link(e)),
                };

                let parsed = serde_json::from_str::<Envelope>(text.as_str())
                    .ok()
                    .and_then(|envelope| SessionMessage::try_from(envelope).ok());
                let Some(message) = parsed else {
                    invalid_frames += 1;
                    if should_log(&mut last_invalid_log) {
                        warn!(bytes = text.len(), invalid = invalid_frames, "invalid frame from host");
                    }
                    continue;
                };

                let event = SessionEvent::Message {
                    from: host_id.clone(),
                    message,
                };
                if events_tx.send(event).await.is_err() {
                    break Err(NetError::SessionClosed);
                }
            }

            outbound = outbound_rx.recv() => {
                let Some(frame) = outbound else {
                    debug!("session dropped the outbound queue");
                    break Ok(());
                };
                if let Err(e) = stream.send(Message::text(frame.as_str().to_owned())).await {
                    break Err(NetError::Link(e));
                }
            }
        }
    };

    let _ = stream.close(None).await;
    let _ = events_tx.send(SessionEvent::Closed { peer_id: host_id }).await;
    result
}
