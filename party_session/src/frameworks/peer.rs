// Framework bootstrap for a joining peer.

use crate::frameworks::config;
use crate::frameworks::console::spawn_console;
use crate::interface_adapters::headless::HeadlessFrontend;
use crate::interface_adapters::net::{ChannelTransport, connect, run_host_link, session_task};
use crate::use_cases::{ClientSession, Peer, SessionSettings};

use std::io::Result;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Joins the host at `url` and plays until the host goes away or stdin closes.
pub async fn join(url: &str) -> Result<()> {
    let link = connect(url, config::handshake_timeout())
        .await
        .map_err(|e| std::io::Error::other(format!("failed to join {url}: {e:?}")))?;

    let (events_tx, events_rx) = mpsc::channel(config::EVENT_CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel(config::OUTBOUND_CHANNEL_CAPACITY);

    let mut transport = ChannelTransport::default();
    transport.open(link.host_id.clone(), outbound_tx);

    let mut client = ClientSession::new(
        link.local_id.as_str(),
        link.host_id.as_str(),
        &config::display_name(),
        SessionSettings::default(),
        transport,
        HeadlessFrontend::new(),
    );
    // Queued until the link task starts draining the outbound channel.
    client.request_join();
    let peer = Peer::Client(client);

    let (status_tx, status_rx) = watch::channel(peer.status());
    spawn_console(events_tx.clone(), status_rx);

    let link_task = tokio::spawn(run_host_link(link, events_tx, outbound_rx));
    session_task(peer, events_rx, status_tx, config::TICK_INTERVAL).await;

    match link_task.await {
        Ok(Ok(())) => info!("left session"),
        Ok(Err(e)) => warn!(error = ?e, "host link failed"),
        Err(e) => warn!(error = %e, "host link task aborted"),
    }
    Ok(())
}
