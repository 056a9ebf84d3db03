use pooltrivia_server::app::build_router;
use pooltrivia_server::config::ServerConfig;
use pooltrivia_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use pooltrivia_server::groups::load_groups;
use pooltrivia_server::ws::AppState;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid server configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let web_root = config.web_root.clone();
    let groups = load_groups(config.groups_path.clone(), config.allow_local_fallback);

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(64);

    let app_state = AppState {
        game_tx,
        broadcast_tx: broadcast_tx.clone(),
        connection_semaphore: Arc::new(Semaphore::new(config.max_connections)),
        max_inputs_per_sec: config.max_inputs_per_sec,
    };

    // Spawn game loop; the group manifest loads inside it
    tokio::spawn(async move {
        run_game_loop(game_rx, broadcast_tx, config, groups).await;
    });

    let app = build_router(app_state, &web_root);

    tracing::info!(
        "Starting pool trivia server on {} (web root {})",
        listen_addr,
        web_root.display()
    );

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
