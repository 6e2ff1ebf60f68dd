use mock_pix::{MockConfig, MockPix};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = MockConfig::from_env();
    let port = config.listen_port;
    info!(
        client_id = %config.client_id,
        keys = ?config.keys,
        ttl = config.token_ttl_secs,
        "mock PIX provider starting"
    );

    let app = MockPix::new(config).router();

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind listener");
    info!("listening on http://localhost:{port}");
    axum::serve(listener, app).await.expect("server error");
}
