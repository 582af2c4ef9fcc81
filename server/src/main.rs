use clap::Parser;
use sphere_sim_server::config::ServerConfig;
use sphere_sim_server::http::{router, AppState};
use sphere_sim_server::sim_loop::{run_sim_loop, SimBroadcast, SimCommand};
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

/// Bounded sphere simulation served over HTTP and WebSocket
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5000")]
    listen: String,

    /// Simulation steps per second
    #[arg(long, default_value_t = 33)]
    tick_rate: u32,

    /// Seed for the random part of the initial configuration
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Serve renderer assets from this directory
    #[arg(long)]
    static_dir: Option<String>,

    /// Logging filter (e.g. info, debug, sphere_sim_server=debug)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .init();

    let config = ServerConfig {
        listen_addr: args.listen,
        tick_rate_hz: args.tick_rate,
        rng_seed: args.seed,
        static_dir: args.static_dir,
        ..Default::default()
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        tracing::error!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let static_dir = config.static_dir.clone();

    let (sim_tx, sim_rx) = mpsc::channel::<SimCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<SimBroadcast>(64);
    let app_state = AppState::new(sim_tx, broadcast_tx.clone(), &config);

    // Spawn simulation loop
    tokio::spawn(async move {
        run_sim_loop(sim_rx, broadcast_tx, config).await;
    });

    let app = router(app_state, static_dir.as_deref());

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Sphere simulation server listening on {}", listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
