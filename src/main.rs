#[tokio::main]
async fn main() {
    if let Err(err) = sourcesync_mcp::mcp::server::run_stdio().await {
        eprintln!("sourcesync-mcp: {}", err);
        std::process::exit(1);
    }
}
