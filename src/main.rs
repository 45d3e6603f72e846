use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port = std::env::var("PROCGATE_HTTP_PORT").unwrap_or_else(|_| "7878".to_string());
    let db_host = std::env::var("PROCGATE_DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let db_port = std::env::var("PROCGATE_DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = std::env::var("PROCGATE_DB_NAME").unwrap_or_else(|_| "cyber_management".to_string());
    info!(
        target: "procgate",
        "procgate starting: RUST_LOG='{}', http_port={}, db_host='{}', db_port={}, db_name='{}'",
        rust_log, http_port, db_host, db_port, db_name
    );

    procgate::server::run().await
}
