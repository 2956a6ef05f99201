use vpsie_provider::{init_logging, serve, VpsieProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting vpsie provider");
    serve(VpsieProvider::new()).await
}
