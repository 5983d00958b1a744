pub mod config;
pub mod distance;
pub mod elevation;
pub mod error;
pub mod gpx_export;
pub mod pipeline;
pub mod profile;
pub mod resolver;
pub mod route;
pub mod sampling;
pub mod session;
pub mod simulation;
pub mod source;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use shared::{
    ApiError, LoadState, PointOfInterest, ProfileResponse, ReloadRequest, ReloadResponse,
    ResolvedPosition, RouteResponse, StatusResponse,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::elevation::ElevationService;
use crate::error::RouteError;
use crate::gpx_export::encode_route_as_gpx;
use crate::session::{LoadedRoute, RouteSession, SessionState, run_load};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RouteSession>,
    pub config: Arc<AppConfig>,
    pub client: reqwest::Client,
    pub elevation: ElevationService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = reqwest::Client::new();
        let elevation = ElevationService::new(client.clone(), &config.elevation);
        Self {
            session: Arc::new(RouteSession::new()),
            config: Arc::new(config),
            client,
            elevation,
        }
    }

    /// Start loading `source` (or the configured route) in the background.
    pub fn spawn_load(&self, source: Option<String>) -> u64 {
        let version = self.session.begin_load();
        let source = source.unwrap_or_else(|| self.config.route_source.clone());
        let state = self.clone();
        tokio::spawn(async move {
            run_load(
                &state.session,
                version,
                &source,
                &state.config,
                &state.client,
                &state.elevation,
            )
            .await;
        });
        version
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/route", get(route_handler).delete(clear_handler))
        .route("/api/route/reload", post(reload_handler))
        .route("/api/profile", get(profile_handler))
        .route("/api/position", get(position_handler))
        .route("/api/pois", get(pois_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let response = match state.session.current() {
        SessionState::Empty => StatusResponse {
            state: LoadState::Empty,
            version: None,
            message: None,
        },
        SessionState::Loading { version } => StatusResponse {
            state: LoadState::Loading,
            version: Some(version),
            message: None,
        },
        SessionState::Ready(loaded) => StatusResponse {
            state: LoadState::Ready,
            version: Some(loaded.version),
            message: None,
        },
        SessionState::Failed { version, message } => StatusResponse {
            state: LoadState::Failed,
            version: Some(version),
            message: Some(message),
        },
    };
    Json(response)
}

async fn route_handler(State(state): State<AppState>) -> ApiResult<Json<RouteResponse>> {
    let loaded = ready(&state.session)?;
    let gpx_base64 =
        encode_route_as_gpx(&loaded.name, &loaded.route, &loaded.profile).map_err(internal_error)?;

    Ok(Json(RouteResponse {
        name: loaded.name.clone(),
        version: loaded.version,
        path: loaded.route.coordinates().to_vec(),
        distance_km: loaded.route.total_distance_km(),
        gpx_base64,
    }))
}

async fn profile_handler(State(state): State<AppState>) -> ApiResult<Json<ProfileResponse>> {
    let loaded = ready(&state.session)?;
    Ok(Json(ProfileResponse {
        name: loaded.name.clone(),
        version: loaded.version,
        source: loaded.profile.source,
        distance_km: loaded.route.total_distance_km(),
        points: loaded.profile.chart_points(),
        summary: loaded.profile.summary(),
    }))
}

#[derive(Debug, Deserialize)]
struct PositionQuery {
    distance: f64,
}

async fn position_handler(
    State(state): State<AppState>,
    Query(query): Query<PositionQuery>,
) -> ApiResult<Json<ResolvedPosition>> {
    let loaded = ready(&state.session)?;
    loaded.resolve(query.distance).map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("no position at {} km", query.distance),
        )
    })
}

async fn pois_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<PointOfInterest>>> {
    let loaded = ready(&state.session)?;
    Ok(Json(loaded.pois.clone()))
}

async fn reload_handler(
    State(state): State<AppState>,
    body: Option<Json<ReloadRequest>>,
) -> (StatusCode, Json<ReloadResponse>) {
    let source = body.and_then(|Json(req)| req.source);
    let version = state.spawn_load(source);
    tracing::info!("Scheduled route reload v{}", version);
    (StatusCode::ACCEPTED, Json(ReloadResponse { version }))
}

async fn clear_handler(State(state): State<AppState>) -> StatusCode {
    state.session.clear();
    tracing::info!("Route cleared");
    StatusCode::NO_CONTENT
}

fn ready(session: &RouteSession) -> ApiResult<Arc<LoadedRoute>> {
    match session.current() {
        SessionState::Ready(loaded) => Ok(loaded),
        SessionState::Loading { .. } => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "route is still loading",
        )),
        SessionState::Failed { message, .. } => {
            Err(api_error(StatusCode::SERVICE_UNAVAILABLE, message))
        }
        SessionState::Empty => Err(api_error(StatusCode::NOT_FOUND, "no route loaded")),
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            message: message.into(),
        }),
    )
}

fn internal_error(err: RouteError) -> (StatusCode, Json<ApiError>) {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
