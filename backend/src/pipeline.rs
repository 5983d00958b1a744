use std::future::Future;

use shared::{Coordinate, ElevationProfile};

use crate::config::ProfileSettings;
use crate::elevation::{ElevationError, ElevationService};
use crate::profile::{SparseElevations, reconstruct};
use crate::route::IndexedRoute;
use crate::sampling::sample;
use crate::simulation::simulate;

/// Build the chart profile for `route` from the elevation service, falling
/// back to a simulated profile if the lookup fails. Never fails itself.
pub async fn build_profile(
    route: &IndexedRoute,
    settings: &ProfileSettings,
    service: &ElevationService,
) -> ElevationProfile {
    build_profile_with_fetch(route, settings, |points| async move {
        service.fetch_elevations(&points).await
    })
    .await
}

pub async fn build_profile_with_fetch<F, Fut>(
    route: &IndexedRoute,
    settings: &ProfileSettings,
    fetch: F,
) -> ElevationProfile
where
    F: FnOnce(Vec<Coordinate>) -> Fut,
    Fut: Future<Output = Result<Vec<f64>, ElevationError>>,
{
    let sampled = sample(
        route.coordinates(),
        route.distances(),
        settings.max_api_points,
    );
    tracing::info!(
        "Requesting elevations for {} of {} route points ({:.2} km)",
        sampled.len(),
        route.len(),
        route.total_distance_km()
    );

    let sparse = match fetch(sampled.coordinates).await {
        Ok(elevations) if !elevations.is_empty() => {
            SparseElevations::from_pairs(&sampled.distances, &elevations)
                .inspect_err(|err| tracing::warn!("Unusable elevation samples: {}", err))
                .ok()
        }
        Ok(_) => {
            tracing::warn!("Elevation service returned no data");
            None
        }
        Err(err) => {
            tracing::warn!("Elevation lookup failed: {}", err);
            None
        }
    };

    let profile = match sparse {
        Some(sparse) => reconstruct(
            route.coordinates(),
            route.distances(),
            &sparse,
            settings.chart_points,
        ),
        None => {
            tracing::warn!(
                "Falling back to simulated elevations (base {} m)",
                settings.base_elevation
            );
            simulate(
                route.coordinates(),
                route.distances(),
                settings.base_elevation,
            )
        }
    };

    tracing::info!(
        "Elevation profile ready: {} points, {:?}, ends at {:.2} km",
        profile.len(),
        profile.source,
        profile.last().map_or(0.0, |s| s.distance)
    );
    profile
}
