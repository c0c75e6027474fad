#[tokio::main]
async fn main() -> std::io::Result<()> {
    party_session::run_with_config().await
}
