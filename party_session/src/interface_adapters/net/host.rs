// Host side of a peer link: one WebSocket per joined client.

use super::NetError;
use super::transport::{LOG_THROTTLE, SessionEvent, should_log};
use crate::domain::PeerId;
use crate::frameworks::config;
use crate::interface_adapters::protocol::{Envelope, IdentityDto};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::ids::{new_peer_id, next_conn_id};
use crate::use_cases::SessionMessage;

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};

const MAX_INVALID_FRAMES: u32 = 10;

enum LoopControl {
    Continue,
    Disconnect,
}

pub async fn peer_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        // Separate connection id for correlating logs across reconnects of one client.
        let conn_id = next_conn_id();
        let peer_id = new_peer_id();
        let span = info_span!("conn", conn_id, peer_id = %peer_id);
        handle_socket(socket, state, peer_id).instrument(span)
    })
}

struct ConnCtx {
    peer_id: PeerId,
    events_tx: mpsc::Sender<SessionEvent>,
    outbound_rx: mpsc::Receiver<Utf8Bytes>,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_frames: u32,
    last_invalid_log: Instant,

    close_frame: Option<CloseFrame>,
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, peer_id: PeerId) {
    let identity = Envelope::Identity(IdentityDto {
        peer_id: peer_id.clone(),
        host_id: state.host_id.to_string(),
    });
    let identity_bytes = match send_envelope(&mut socket, &identity).await {
        Ok(bytes) => bytes as u64,
        Err(e) => {
            warn!(error = ?e, "failed to send identity");
            return;
        }
    };

    // Register the outbound queue before reading, so replies to JOIN have somewhere to go.
    let (outbound_tx, outbound_rx) = mpsc::channel(config::OUTBOUND_CHANNEL_CAPACITY);
    let opened = SessionEvent::Opened {
        peer_id: peer_id.clone(),
        outbound: outbound_tx,
    };
    if state.events_tx.send(opened).await.is_err() {
        let _ = send_close_with_reason(&mut socket, close_code::AWAY, "session ended").await;
        return;
    }
    info!("peer connected");

    let mut ctx = ConnCtx {
        peer_id,
        events_tx: state.events_tx.clone(),
        outbound_rx,
        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out: identity_bytes,
        invalid_frames: 0,
        last_invalid_log: Instant::now() - LOG_THROTTLE,
        close_frame: None,
    };

    if let Err(e) = run_peer_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "peer loop exited with error");
    }

    let _ = ctx
        .events_tx
        .send(SessionEvent::Closed {
            peer_id: ctx.peer_id.clone(),
        })
        .await;
    info!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_frames = ctx.invalid_frames,
        "peer disconnected"
    );
}

async fn send_envelope(socket: &mut WebSocket, envelope: &Envelope) -> Result<usize, NetError> {
    let txt = serde_json::to_string(envelope).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

async fn run_peer_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            outbound = ctx.outbound_rx.recv() => {
                match outbound {
                    Some(frame) => {
                        let len = frame.len() as u64;
                        match socket.send(Message::Text(frame)).await {
                            Ok(()) => {
                                ctx.msgs_out += 1;
                                ctx.bytes_out += len;
                                false
                            }
                            Err(e) => {
                                warn!(error = %e, "failed to send frame");
                                true
                            }
                        }
                    }
                    None => {
                        // The driver dropped our queue: either it stopped or it replaced us.
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::AWAY,
                            reason: "session ended".into(),
                        });
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn reject_frame(ctx: &mut ConnCtx, bytes: usize, reason: &str) -> LoopControl {
    ctx.invalid_frames += 1;
    if should_log(&mut ctx.last_invalid_log) {
        warn!(bytes, reason, invalid = ctx.invalid_frames, "invalid frame");
    }

    if ctx.invalid_frames > MAX_INVALID_FRAMES {
        ctx.close_frame = Some(CloseFrame {
            code: close_code::POLICY,
            reason: "too many invalid messages".into(),
        });
        return LoopControl::Disconnect;
    }
    LoopControl::Continue
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, axum::Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                let envelope = match serde_json::from_str::<Envelope>(&text) {
                    Ok(envelope) => envelope,
                    Err(_) => return Ok(reject_frame(ctx, text.len(), "unparseable")),
                };
                let message = match SessionMessage::try_from(envelope) {
                    Ok(message) => message,
                    Err(e) => {
                        debug!(error = ?e, "rejected envelope");
                        return Ok(reject_frame(ctx, text.len(), "not a session message"));
                    }
                };

                // Session facts must not be dropped, so wait for room in the queue.
                ctx.events_tx
                    .send(SessionEvent::Message {
                        from: ctx.peer_id.clone(),
                        message,
                    })
                    .await
                    .map_err(|_| NetError::SessionClosed)?;
                Ok(LoopControl::Continue)
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}
