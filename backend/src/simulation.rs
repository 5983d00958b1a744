use rand::Rng;
use shared::{Coordinate, ElevationProfile, ElevationSample, ProfileSource};

use crate::profile::{round_distance, round_elevation};
use crate::sampling::sample_indices;

pub const SIMULATED_MAX_POINTS: usize = 100;
const NOISE_AMPLITUDE: f64 = 7.5;

/// Base level for synthesized profiles of the known routes, in metres.
pub fn default_base_elevation(route_name: &str) -> f64 {
    match route_name {
        "Ruta Pla" => 100.0,
        _ => 75.0,
    }
}

/// Synthesize a plausible profile when no real elevation data is available.
pub fn simulate(route: &[Coordinate], distances: &[f64], base_elevation: f64) -> ElevationProfile {
    simulate_with_rng(route, distances, base_elevation, &mut rand::thread_rng())
}

pub fn simulate_with_rng<R: Rng + ?Sized>(
    route: &[Coordinate],
    distances: &[f64],
    base_elevation: f64,
    rng: &mut R,
) -> ElevationProfile {
    let len = route.len().min(distances.len());
    let samples = sample_indices(len, SIMULATED_MAX_POINTS)
        .into_iter()
        .map(|i| {
            let distance = distances[i];
            let variation = (distance * 0.1).sin() * 30.0
                + (distance * 0.05).cos() * 20.0
                + rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
            ElevationSample {
                distance: round_distance(distance),
                elevation: round_elevation((base_elevation + variation).max(0.0)),
            }
        })
        .collect();

    ElevationProfile {
        samples,
        source: ProfileSource::Simulated,
    }
}
