// Framework bootstrap for a hosting peer.

use crate::frameworks::console::spawn_console;
use crate::frameworks::{config, peer};
use crate::interface_adapters::headless::HeadlessFrontend;
use crate::interface_adapters::http::session_status_handler;
use crate::interface_adapters::ids::new_peer_id;
use crate::interface_adapters::net::{ChannelTransport, peer_ws_handler, session_task};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{HostSession, Peer, SessionSettings};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Hosts a session on `listener` without a console.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    host(listener, false).await
}

async fn host(listener: tokio::net::TcpListener, with_console: bool) -> Result<()> {
    let address = listener.local_addr()?;
    let host_id = new_peer_id();
    let display_name = config::display_name();

    let session = HostSession::new(
        host_id.as_str(),
        &display_name,
        SessionSettings::default(),
        ChannelTransport::default(),
        HeadlessFrontend::new(),
    );
    let peer = Peer::Host(session);

    let (events_tx, events_rx) = mpsc::channel(config::EVENT_CHANNEL_CAPACITY);
    let (status_tx, status_rx) = watch::channel(peer.status());
    // The driver is the only owner of the session; everything else talks to it through events.
    tokio::spawn(session_task(
        peer,
        events_rx,
        status_tx,
        config::TICK_INTERVAL,
    ));
    if with_console {
        spawn_console(events_tx.clone(), status_rx.clone());
    }

    let state = Arc::new(AppState {
        host_id: Arc::from(host_id.as_str()),
        events_tx,
        status_rx,
    });
    let app = Router::new()
        .route("/peer", get(peer_ws_handler))
        .route("/session", get(session_status_handler))
        .with_state(state);

    tracing::info!(%address, %host_id, display_name = %display_name, "hosting session");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

/// Hosts or joins depending on `PARTY_HOST_URL`.
pub async fn run_with_config() -> Result<()> {
    init_runtime();

    if let Some(url) = config::host_url() {
        return peer::join(&url).await;
    }

    let address = SocketAddr::from(([127, 0, 0, 1], config::party_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    host(listener, true).await
}
