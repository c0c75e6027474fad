use std::{env, time::Duration};

// Runtime/peer constants (not gameplay tuning, which lives in `domain::tuning`).

pub fn party_port() -> u16 {
    env::var("PARTY_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Host to join; hosting is the default when unset.
pub fn host_url() -> Option<String> {
    env::var("PARTY_HOST_URL")
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

pub fn display_name() -> String {
    env::var("PARTY_DISPLAY_NAME").unwrap_or_else(|_| "Player".to_string())
}

pub fn handshake_timeout() -> Duration {
    let millis = env::var("PARTY_HANDSHAKE_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(5000);
    Duration::from_millis(millis)
}

pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
