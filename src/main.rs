use guess_store::GuessStore;
use guess_store::config::Config;
use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_tracing(loglevel: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logging comes up first so a config error is visible even though the
    // configured level is unknown.
    let cfg = Config::load();
    init_tracing(cfg.as_ref().map_or("info", |c| c.loglevel.as_str()));
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "invalid configuration; refusing to start");
            return Err(e.into());
        }
    };

    info!(
        db_filename = %cfg.db_filename,
        loglevel = %cfg.loglevel,
        hash_timeout_secs = cfg.hash_timeout_secs,
        max_connections = cfg.max_connections,
        "configuration loaded"
    );

    // Schema creation and the incomplete-game sweep both happen inside open.
    let store = match GuessStore::open(&cfg.db_filename, cfg.store_options()).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "cannot open game store; refusing to start");
            return Err(e.into());
        }
    };

    let completed = store.completed_game_count().await?;
    info!(completed_games = completed, "game store initialized");

    store.close().await;
    Ok(())
}
