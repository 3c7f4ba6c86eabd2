mod broadcaster;
mod play_session;
mod routes;
mod server_config;
mod store;
mod watch_task;
mod web_server;
mod ws_handler;

use std::path::PathBuf;

use clap::Parser;
use snake_common::config::ConfigManager;
use snake_common::games::SessionRng;
use snake_common::{log, log_error, logger};

use broadcaster::WatchBroadcaster;
use server_config::{DEFAULT_CONFIG_PATH, ServerConfig};
use store::Store;
use watch_task::WatchTask;
use web_server::{WebServerState, run_web_server};

#[derive(Parser)]
#[command(name = "snake_server")]
struct Args {
    /// Path to the YAML config file; defaults are used when it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[arg(long)]
    use_log_prefix: bool,

    /// Overrides the seed from the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Writes the default config to --config and exits
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_manager: ConfigManager<_, ServerConfig> = ConfigManager::from_yaml_file(args.config.clone());

    if args.write_default_config {
        config_manager.set_config(&ServerConfig::default())?;
        println!("Default config written to {}", args.config.display());
        return Ok(());
    }

    let mut config = config_manager.get_config()?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix, config.log_level);

    let addr = config.socket_addr()?;
    let mut rng = SessionRng::from_optional_seed(config.seed);
    log!("Server seed: {}", rng.seed());

    let store = Store::with_demo_data(
        config.simulated_players,
        config.grid_size,
        SessionRng::new(rng.random()),
    );
    let broadcaster = WatchBroadcaster::new();

    let watch_task = WatchTask::new(
        store.clone(),
        broadcaster.clone(),
        config.watch_tick_interval(),
        config.grid_size,
        SessionRng::new(rng.random()),
    );
    let watch_handle = tokio::spawn(watch_task.run());

    let state = WebServerState::new(store, broadcaster, config.snake_settings(), rng.random());

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error!("Failed to listen for Ctrl+C: {}", e);
        }
        log!("Shutdown signal received, closing connections...");
    };

    let result = run_web_server(addr, state, config.static_dir.map(PathBuf::from), shutdown_signal).await;
    watch_handle.abort();
    result?;

    log!("Server shut down gracefully");

    Ok(())
}
