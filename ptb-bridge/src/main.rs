//! ptb-bridge service entry point

use anyhow::Context;
use ptb_bridge::api::{build_router, AppState};
use ptb_bridge::ptsl::client::PtslClient;
use ptb_bridge::ptsl::schema::FileSchemaSource;
use ptb_bridge::ptsl::transport::TcpDialer;
use ptb_common::config::BridgeConfig;
use tracing::{info, warn};

const APPLICATION_NAME: &str = "ptb-bridge";
const COMPANY_NAME: &str = "ptbridge";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ptb_bridge=info,ptb_common=info,tower_http=info".into()),
        )
        .init();

    let config = BridgeConfig::load().context("configuration error")?;
    info!(
        server = %config.server_address,
        schema = %config.schema_path.display(),
        write_permission = %config.write_permission,
        "Starting automation bridge"
    );
    if !config.write_permission.allows_writes() {
        info!("Running read-only; set PTB_ALLOW_WRITES to enable mutating commands");
    }

    let mut client = PtslClient::new(
        Box::new(FileSchemaSource::new(&config.schema_path)),
        Box::new(TcpDialer),
        config.server_address.clone(),
    );

    // Connect eagerly so a misconfigured address is visible at startup, but
    // keep serving if the workstation is simply not running yet
    match client.connect().await {
        Ok(()) => match client.register_connection(APPLICATION_NAME, COMPANY_NAME).await {
            Ok(session_id) => info!(session_id = %session_id, "Workstation session ready"),
            Err(e) => warn!(error = %e, "Registration failed; serving without a session"),
        },
        Err(e) => warn!(error = %e, "Workstation unreachable at startup"),
    }

    let state = AppState::new(client);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
