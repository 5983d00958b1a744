use shared::{Coordinate, ElevationProfile, ElevationSample, ProfileSource};
use thiserror::Error;

use crate::sampling::sample_step;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("sample at {distance} km comes after {previous} km")]
    OutOfOrder { previous: f64, distance: f64 },
    #[error("{distances} sample distances for {elevations} elevations")]
    LengthMismatch { distances: usize, elevations: usize },
}

pub fn round_distance(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

pub fn round_elevation(m: f64) -> f64 {
    m.round()
}

/// Elevations known at a handful of route distances.
///
/// Keys are strictly increasing. Re-inserting the last key replaces its
/// value; anything lower is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseElevations {
    samples: Vec<ElevationSample>,
}

impl SparseElevations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair sampled distances with the elevations fetched for them.
    pub fn from_pairs(distances: &[f64], elevations: &[f64]) -> Result<Self, ProfileError> {
        if distances.len() != elevations.len() {
            return Err(ProfileError::LengthMismatch {
                distances: distances.len(),
                elevations: elevations.len(),
            });
        }
        let mut sparse = Self::new();
        for (&distance, &elevation) in distances.iter().zip(elevations) {
            sparse.insert(distance, elevation)?;
        }
        Ok(sparse)
    }

    pub fn insert(&mut self, distance: f64, elevation: f64) -> Result<(), ProfileError> {
        match self.samples.last_mut() {
            Some(last) if last.distance == distance => last.elevation = elevation,
            Some(last) if last.distance > distance => {
                return Err(ProfileError::OutOfOrder {
                    previous: last.distance,
                    distance,
                });
            }
            _ => self.samples.push(ElevationSample {
                distance,
                elevation,
            }),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, distance: f64) -> Option<f64> {
        let idx = self.samples.partition_point(|s| s.distance < distance);
        self.samples
            .get(idx)
            .filter(|s| s.distance == distance)
            .map(|s| s.elevation)
    }

    /// Closest sample strictly below `distance`.
    pub fn below(&self, distance: f64) -> Option<ElevationSample> {
        let idx = self.samples.partition_point(|s| s.distance < distance);
        idx.checked_sub(1).map(|i| self.samples[i])
    }

    /// Closest sample strictly above `distance`.
    pub fn above(&self, distance: f64) -> Option<ElevationSample> {
        let idx = self.samples.partition_point(|s| s.distance <= distance);
        self.samples.get(idx).copied()
    }

    /// Elevation at `distance`: exact hit, linear blend of the two
    /// neighbours, or the single neighbour that exists.
    pub fn elevation_at(&self, distance: f64) -> Option<f64> {
        if let Some(elevation) = self.get(distance) {
            return Some(elevation);
        }
        match (self.below(distance), self.above(distance)) {
            (Some(prev), Some(next)) => {
                let ratio = (distance - prev.distance) / (next.distance - prev.distance);
                Some(prev.elevation + ratio * (next.elevation - prev.elevation))
            }
            (Some(only), None) | (None, Some(only)) => Some(only.elevation),
            (None, None) => None,
        }
    }

    /// Elevation used for the closing point of a profile: the exact key,
    /// else the nearest key below, else the last key.
    fn tail_elevation(&self, distance: f64) -> Option<f64> {
        self.get(distance)
            .or_else(|| self.below(distance).map(|s| s.elevation))
            .or_else(|| self.samples.last().map(|s| s.elevation))
    }
}

/// Expand sparse elevations into an evenly strided chart profile.
///
/// Emits roughly `target_points` samples taken at route vertices, then always
/// closes with a sample at the route's total distance. Returns an empty
/// profile when `sparse` holds no data.
pub fn reconstruct(
    route: &[Coordinate],
    distances: &[f64],
    sparse: &SparseElevations,
    target_points: usize,
) -> ElevationProfile {
    let len = route.len().min(distances.len());
    let mut samples = Vec::with_capacity(target_points.saturating_add(1));

    if sparse.is_empty() || len == 0 {
        return ElevationProfile {
            samples,
            source: ProfileSource::Measured,
        };
    }

    let stride = sample_step(len, target_points);
    for &distance in distances[..len].iter().step_by(stride) {
        if let Some(elevation) = sparse.elevation_at(distance) {
            samples.push(ElevationSample {
                distance: round_distance(distance),
                elevation: round_elevation(elevation),
            });
        }
    }

    let total = distances[len - 1];
    if let Some(elevation) = sparse.tail_elevation(total) {
        samples.push(ElevationSample {
            distance: round_distance(total),
            elevation: round_elevation(elevation),
        });
    }

    ElevationProfile {
        samples,
        source: ProfileSource::Measured,
    }
}
