use crate::config::ServerConfig;
use crate::protocol::state_msg;
use crate::scenario::Scenario;
use crate::simulation::{Simulation, Snapshot};
use crate::vec3::Vec3;
use sphere_sim_shared::protocol::StateMsg;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Requests from HTTP and WebSocket handlers to the simulation loop
#[derive(Debug)]
pub enum SimCommand {
    Snapshot {
        response: oneshot::Sender<Snapshot>,
    },
    AddSphere {
        position: Vec3,
        velocity: Vec3,
        radius: f64,
        response: oneshot::Sender<u32>,
    },
    RemoveSphere {
        id: u32,
        response: oneshot::Sender<bool>,
    },
    Reset {
        response: oneshot::Sender<()>,
    },
}

/// Broadcasts from the simulation loop to all WebSocket clients
#[derive(Debug, Clone)]
pub enum SimBroadcast {
    State(StateMsg),
}

/// Send a command built around a fresh reply channel and wait for the reply.
/// Returns None when the simulation loop is gone.
pub async fn request<T>(
    sim_tx: &mpsc::Sender<SimCommand>,
    make: impl FnOnce(oneshot::Sender<T>) -> SimCommand,
) -> Option<T> {
    let (resp_tx, resp_rx) = oneshot::channel();
    if sim_tx.send(make(resp_tx)).await.is_err() {
        tracing::error!("Simulation loop is not accepting commands");
        return None;
    }
    resp_rx.await.ok()
}

/// Build the simulation described by `config`.
pub fn build_simulation(config: &ServerConfig) -> Simulation {
    Simulation::new(
        config.bounds_min,
        config.bounds_max,
        config.physics,
        Scenario::standard(config.random_spheres, config.rng_seed),
    )
}

/// Run the simulation loop. Owns the simulation; every command and every
/// step runs to completion before the next one starts.
pub async fn run_sim_loop(
    mut cmd_rx: mpsc::Receiver<SimCommand>,
    broadcast_tx: broadcast::Sender<SimBroadcast>,
    config: ServerConfig,
) {
    let mut sim = build_simulation(&config);
    tracing::info!(
        "Simulation ready: {} spheres, kinetic energy {:.3}",
        sim.len(),
        sim.kinetic_energy()
    );

    let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate_hz as f64);
    let broadcast_every_n = config.broadcast_every_n();
    let mut tick_count: u64 = 0;

    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                sim.step(Instant::now());

                // Broadcast state at lower rate, only when someone listens
                tick_count += 1;
                if tick_count % broadcast_every_n == 0 && broadcast_tx.receiver_count() > 0 {
                    let msg = state_msg(&sim.snapshot());
                    let _ = broadcast_tx.send(SimBroadcast::State(msg));
                }
            }

            Some(cmd) = cmd_rx.recv() => {
                handle_command(&mut sim, cmd);
            }

            else => break,
        }
    }

    tracing::info!("Simulation loop ended");
}

fn handle_command(sim: &mut Simulation, cmd: SimCommand) {
    match cmd {
        SimCommand::Snapshot { response } => {
            let _ = response.send(sim.snapshot());
        }
        SimCommand::AddSphere {
            position,
            velocity,
            radius,
            response,
        } => {
            let id = sim.add_sphere(position, velocity, radius);
            tracing::info!("Added sphere {} (total {})", id, sim.len());
            let _ = response.send(id);
        }
        SimCommand::RemoveSphere { id, response } => {
            let removed = sim.remove_sphere_by_id(id);
            if removed {
                tracing::info!("Removed sphere {} (total {})", id, sim.len());
            } else {
                tracing::debug!("Sphere {} not found for removal", id);
            }
            let _ = response.send(removed);
        }
        SimCommand::Reset { response } => {
            sim.reset();
            tracing::info!("Simulation reset: {} spheres", sim.len());
            let _ = response.send(());
        }
    }
}
