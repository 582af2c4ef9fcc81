use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use sphere_sim_shared::config::PhysicsConfig;
use sphere_sim_shared::protocol::{BoundsWire, StateMsg};
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::protocol::{
    state_msg, AddSphereRequest, AddSphereResponse, DeleteSphereRequest, ErrorResponse,
    MessageResponse,
};
use crate::sim_loop::{request, SimBroadcast, SimCommand};
use crate::vec3::Vec3;
use crate::ws::ws_handler;

/// Shared app state passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub sim_tx: mpsc::Sender<SimCommand>,
    pub broadcast_tx: broadcast::Sender<SimBroadcast>,
    pub physics: PhysicsConfig,
    /// Box every added sphere must fit inside
    pub bounds: BoundsWire,
}

impl AppState {
    pub fn new(
        sim_tx: mpsc::Sender<SimCommand>,
        broadcast_tx: broadcast::Sender<SimBroadcast>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            sim_tx,
            broadcast_tx,
            physics: config.physics,
            bounds: BoundsWire {
                min: config.bounds_min.to_array(),
                max: config.bounds_max.to_array(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Sphere with ID {0} not found.")]
    NotFound(u32),
    #[error("Simulation is not running")]
    Unavailable,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// All routes. `static_dir`, when given, is served for every other path.
pub fn router(app_state: AppState, static_dir: Option<&str>) -> Router {
    let mut router = Router::new()
        .route("/api/state", get(get_state))
        .route("/api/reset", post(reset))
        .route("/api/add_sphere", post(add_sphere))
        .route("/api/delete_sphere", post(delete_sphere))
        .route("/ws", get(ws_handler));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(CorsLayer::permissive()).with_state(app_state)
}

pub async fn get_state(State(app_state): State<AppState>) -> Result<Json<StateMsg>, ApiError> {
    let snapshot = request(&app_state.sim_tx, |response| SimCommand::Snapshot { response })
        .await
        .ok_or(ApiError::Unavailable)?;
    Ok(Json(state_msg(&snapshot)))
}

pub async fn reset(State(app_state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    request(&app_state.sim_tx, |response| SimCommand::Reset { response })
        .await
        .ok_or(ApiError::Unavailable)?;
    Ok(Json(MessageResponse {
        message: "Simulation reset successfully.".to_string(),
    }))
}

pub async fn add_sphere(
    State(app_state): State<AppState>,
    Json(req): Json<AddSphereRequest>,
) -> Result<Json<AddSphereResponse>, ApiError> {
    if let Err(reason) = req.validate_within(&app_state.bounds) {
        tracing::warn!("Rejected add_sphere: {}", reason);
        return Err(ApiError::BadRequest(reason));
    }

    let id = request(&app_state.sim_tx, |response| SimCommand::AddSphere {
        position: Vec3::from_array(req.position),
        velocity: Vec3::from_array(req.velocity),
        radius: req.radius,
        response,
    })
    .await
    .ok_or(ApiError::Unavailable)?;

    Ok(Json(AddSphereResponse {
        message: "Sphere added successfully".to_string(),
        id,
    }))
}

pub async fn delete_sphere(
    State(app_state): State<AppState>,
    Json(req): Json<DeleteSphereRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = request(&app_state.sim_tx, |response| SimCommand::RemoveSphere {
        id: req.id,
        response,
    })
    .await
    .ok_or(ApiError::Unavailable)?;

    if !removed {
        return Err(ApiError::NotFound(req.id));
    }
    Ok(Json(MessageResponse {
        message: format!("Sphere {} deleted successfully.", req.id),
    }))
}
