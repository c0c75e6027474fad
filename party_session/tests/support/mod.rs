// Boots one hosting peer per test binary and hands out its address.
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

static HOST_ADDR: OnceLock<String> = OnceLock::new();

/// Starts the host on an ephemeral port (once) and returns its `host:port`.
pub fn ensure_host() -> &'static str {
    HOST_ADDR.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);

        // A dedicated OS thread keeps the host alive across per-test tokio runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                party_session::run(listener).await.expect("host failed");
            });
        });

        wait_until_accepting(&published)
    })
}

pub fn peer_url() -> String {
    format!("ws://{}/peer", ensure_host())
}

pub fn status_url() -> String {
    format!("http://{}/session", ensure_host())
}

fn wait_until_accepting(published: &OnceLock<String>) -> String {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return addr;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("host did not become ready in time");
}
