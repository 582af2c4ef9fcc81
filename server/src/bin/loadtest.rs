//! Load test for the sphere simulation server.
//!
//! Spawns multiple WebSocket clients that:
//! - Connect to the state stream
//! - Periodically add a sphere and delete the oldest one they own
//! - Receive and count state broadcasts
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sphere_sim_shared::protocol::{ClientMsg, ServerMsg};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Each client keeps at most this many of its own spheres alive.
const MAX_OWNED_SPHERES: usize = 3;
/// Broadcast rate the server runs with by default.
const EXPECTED_STATE_HZ: f64 = 15.0;

#[derive(Parser, Debug)]
#[command(about = "Load test for the sphere simulation server")]
struct Args {
    /// Number of clients to spawn
    #[arg(long, default_value_t = 50)]
    clients: u32,

    /// Test duration in seconds
    #[arg(long, default_value_t = 30)]
    duration: u64,

    /// Sphere additions per second per client
    #[arg(long, default_value_t = 0.5)]
    add_rate: f64,

    /// Server WebSocket URL
    #[arg(long, default_value = "ws://127.0.0.1:5000/ws")]
    url: String,
}

// === Metrics ===

struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    states_received: AtomicU64,
    spheres_added: AtomicU64,
    deletes_sent: AtomicU64,
    errors: AtomicU64,
    total_spheres_seen: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

impl Metrics {
    fn new() -> Self {
        Self {
            connected: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            states_received: AtomicU64::new(0),
            spheres_added: AtomicU64::new(0),
            deletes_sent: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_spheres_seen: AtomicU64::new(0),
            latency_sum_ms: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
        }
    }
}

fn random_add(rng: &mut ChaCha8Rng) -> ClientMsg {
    ClientMsg::AddSphere {
        position: [
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-6.0..6.0),
            rng.gen_range(-10.0..10.0),
        ],
        velocity: [
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        ],
        radius: rng.gen_range(0.2..0.6),
    }
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    add_rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    let connect_latency = connect_start.elapsed();
    metrics
        .latency_sum_ms
        .fetch_add(connect_latency.as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    let add_interval = if add_rate > 0.0 {
        Duration::from_secs_f64(1.0 / add_rate)
    } else {
        Duration::from_secs(3600) // Effectively never
    };

    let mut add_timer = tokio::time::interval(add_interval);
    add_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = Instant::now() + duration;
    let mut rng = ChaCha8Rng::seed_from_u64(client_id as u64);
    let mut owned: VecDeque<u32> = VecDeque::new();

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = add_timer.tick() => {
                let mut outgoing = vec![random_add(&mut rng)];
                if owned.len() >= MAX_OWNED_SPHERES {
                    if let Some(id) = owned.pop_front() {
                        outgoing.push(ClientMsg::DeleteSphere { id });
                        metrics.deletes_sent.fetch_add(1, Ordering::Relaxed);
                    }
                }

                for msg in outgoing {
                    let json = match serde_json::to_string(&msg) {
                        Ok(json) => json,
                        Err(_) => continue,
                    };
                    if ws.send(Message::Text(json.into())).await.is_err() {
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::State(state)) => {
                                metrics.states_received.fetch_add(1, Ordering::Relaxed);
                                metrics.total_spheres_seen.fetch_add(state.spheres.len() as u64, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::SphereAdded { id }) => {
                                owned.push_back(id);
                                metrics.spheres_added.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Welcome(_)) => {}
                            Err(e) => {
                                if client_id < 3 {
                                    eprintln!("Client {} got unparseable message: {}", client_id, e);
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // Leave the scene as we found it
    for id in owned {
        if let Ok(json) = serde_json::to_string(&ClientMsg::DeleteSphere { id }) {
            let _ = ws.send(Message::Text(json.into())).await;
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let duration_secs = args.duration;

    println!("=== Sphere Simulation Load Test ===");
    println!("Clients: {}", args.clients);
    println!("Duration: {}s", duration_secs);
    println!("Add rate: {}/s per client", args.add_rate);
    println!("URL: {}", args.url);
    println!();

    let metrics = Arc::new(Metrics::new());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(args.clients as usize);
    let spawn_start = Instant::now();

    for client_id in 0..args.clients {
        let url = args.url.clone();
        let metrics = Arc::clone(&metrics);
        let add_rate = args.add_rate;

        handles.push(tokio::spawn(async move {
            run_client(client_id, url, add_rate, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());
    println!();

    // Print stats periodically
    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            if elapsed >= duration_secs + 5 {
                break;
            }

            let connected = metrics_clone.connected.load(Ordering::Relaxed);
            let msgs = metrics_clone.messages_received.load(Ordering::Relaxed);
            let states = metrics_clone.states_received.load(Ordering::Relaxed);
            let added = metrics_clone.spheres_added.load(Ordering::Relaxed);
            let errors = metrics_clone.errors.load(Ordering::Relaxed);
            let spheres = metrics_clone.total_spheres_seen.load(Ordering::Relaxed);
            let avg_spheres = if states > 0 { spheres / states } else { 0 };

            println!(
                "[{:3}s] connected={}, msgs={}, states={}, added={}, errors={}, avg_spheres={}",
                elapsed, connected, msgs, states, added, errors, avg_spheres
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }

    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let states = metrics.states_received.load(Ordering::Relaxed);
    let added = metrics.spheres_added.load(Ordering::Relaxed);
    let deletes = metrics.deletes_sent.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);
    let spheres = metrics.total_spheres_seen.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total state messages: {}", states);
    println!("Total spheres added: {}", added);
    println!("Total deletes sent: {}", deletes);
    println!("Total errors: {}", errors);
    println!(
        "Average spheres per state: {}",
        if states > 0 { spheres / states } else { 0 }
    );

    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    let states_per_client = states as f64 / args.clients.max(1) as f64;
    let expected = duration_secs as f64 * EXPECTED_STATE_HZ;

    println!();
    println!("Messages/sec (total): {:.0}", msgs as f64 / duration_secs.max(1) as f64);
    println!("States per client: {:.1}", states_per_client);
    println!("Expected states per client: {:.1}", expected);
    if expected > 0.0 {
        println!("Delivery rate: {:.1}%", states_per_client / expected * 100.0);
    }
}
