use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shared::{ElevationProfile, PointOfInterest, ResolvedPosition};

use crate::config::AppConfig;
use crate::elevation::ElevationService;
use crate::pipeline::build_profile;
use crate::resolver::resolve;
use crate::route::IndexedRoute;
use crate::source::{
    SourceError, SourceLocation, load_feature_collection, points_of_interest,
    route_from_collection,
};

/// Everything derived from one successfully loaded route.
#[derive(Debug, Clone)]
pub struct LoadedRoute {
    pub version: u64,
    pub name: String,
    pub route: IndexedRoute,
    pub profile: ElevationProfile,
    pub pois: Vec<PointOfInterest>,
}

impl LoadedRoute {
    pub fn resolve(&self, distance_km: f64) -> Option<ResolvedPosition> {
        resolve(
            distance_km,
            self.route.coordinates(),
            self.route.distances(),
            &self.profile,
        )
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Empty,
    Loading { version: u64 },
    Ready(Arc<LoadedRoute>),
    Failed { version: u64, message: String },
}

impl SessionState {
    fn version(&self) -> Option<u64> {
        match self {
            SessionState::Empty => None,
            SessionState::Loading { version } | SessionState::Failed { version, .. } => {
                Some(*version)
            }
            SessionState::Ready(loaded) => Some(loaded.version),
        }
    }
}

/// Holds the single active route. Each load gets a fresh version; results of
/// a load are only installed while that version is still the latest one.
#[derive(Debug, Default)]
pub struct RouteSession {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    latest: u64,
    state: SessionState,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            latest: 0,
            state: SessionState::Empty,
        }
    }
}

impl RouteSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> SessionState {
        self.read().state.clone()
    }

    /// The ready route, if any.
    pub fn loaded(&self) -> Option<Arc<LoadedRoute>> {
        match &self.read().state {
            SessionState::Ready(loaded) => Some(Arc::clone(loaded)),
            _ => None,
        }
    }

    pub fn begin_load(&self) -> u64 {
        let mut inner = self.write();
        inner.latest += 1;
        let version = inner.latest;
        inner.state = SessionState::Loading { version };
        version
    }

    pub fn complete(&self, loaded: LoadedRoute) -> bool {
        let version = loaded.version;
        self.install(version, SessionState::Ready(Arc::new(loaded)))
    }

    pub fn fail(&self, version: u64, message: impl Into<String>) -> bool {
        self.install(
            version,
            SessionState::Failed {
                version,
                message: message.into(),
            },
        )
    }

    /// Drop the current route. Loads still in flight are invalidated.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.latest += 1;
        inner.state = SessionState::Empty;
    }

    fn install(&self, version: u64, next: SessionState) -> bool {
        let mut inner = self.write();
        if inner.latest != version {
            tracing::debug!(
                "Discarding result of superseded load v{} (current {:?})",
                version,
                inner.state.version()
            );
            return false;
        }
        inner.state = next;
        true
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read the route (and POI) documents and build the elevation profile.
pub async fn load_route(
    version: u64,
    route_source: &str,
    config: &AppConfig,
    client: &reqwest::Client,
    elevation: &ElevationService,
) -> Result<LoadedRoute, SourceError> {
    let location = SourceLocation::parse(route_source);
    tracing::info!("Loading route v{} from {}", version, location);

    let collection = load_feature_collection(&location, client).await?;
    let coordinates = route_from_collection(&collection)?;
    let route = IndexedRoute::new(coordinates).map_err(|_| SourceError::EmptyRoute)?;
    tracing::info!(
        "Route has {} points over {:.2} km",
        route.len(),
        route.total_distance_km()
    );

    let pois = match &config.pois_source {
        Some(raw) => {
            let location = SourceLocation::parse(raw);
            match load_feature_collection(&location, client).await {
                Ok(doc) => points_of_interest(&doc),
                Err(err) => {
                    tracing::warn!("Points of interest unavailable from {}: {}", location, err);
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    let profile = build_profile(&route, &config.profile, elevation).await;

    Ok(LoadedRoute {
        version,
        name: config.route_name.clone(),
        route,
        profile,
        pois,
    })
}

/// Run a full load for `version` and record the outcome in `session`.
pub async fn run_load(
    session: &RouteSession,
    version: u64,
    route_source: &str,
    config: &AppConfig,
    client: &reqwest::Client,
    elevation: &ElevationService,
) {
    match load_route(version, route_source, config, client, elevation).await {
        Ok(loaded) => {
            if session.complete(loaded) {
                tracing::info!("Route v{} is ready", version);
            }
        }
        Err(err) => {
            tracing::error!("Failed to load route v{}: {}", version, err);
            session.fail(version, format!("Error loading route data: {err}"));
        }
    }
}
