use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use matrona::state::AppState;
use matrona::{api, auth, config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let state = Arc::new(AppState::new());

    // Open once at startup: runs migrations and seeds the first account
    // on a fresh install.
    {
        let conn = state.open_db()?;
        auth::ensure_default_admin(&conn, chrono::Local::now().naive_local())?;
    }

    api::run_server(state, config::bind_addr()).await?;
    Ok(())
}
