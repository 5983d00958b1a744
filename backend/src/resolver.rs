use shared::{Coordinate, ElevationProfile, ResolvedPosition};

/// Elevation reported when no profile sample lies at or after the target.
pub const DEFAULT_ELEVATION: f64 = 100.0;

/// Map a distance along the route (km) back to a point on the map.
///
/// Position is interpolated inside the bracketing segment; elevation is read
/// from the first profile sample at or beyond `target`. Targets past the end
/// clamp to the final vertex, negative targets to the start. Returns `None`
/// for an empty route or profile, or a non-finite target.
pub fn resolve(
    target: f64,
    route: &[Coordinate],
    distances: &[f64],
    profile: &ElevationProfile,
) -> Option<ResolvedPosition> {
    let len = route.len().min(distances.len());
    if len == 0 || profile.is_empty() || !target.is_finite() {
        return None;
    }
    let target = target.max(0.0);
    let distances = &distances[..len];

    let Some(i) = bracketing_segment(distances, target) else {
        let last = route[len - 1];
        return Some(ResolvedPosition {
            coordinates: Coordinate::new(last.lon, last.lat),
            elevation: profile.last().map_or(0.0, |s| s.elevation),
            distance: distances[len - 1],
        });
    };

    let start_distance = distances[i];
    let segment_length = distances[i + 1] - start_distance;
    let fraction = if segment_length > 0.0 {
        (target - start_distance) / segment_length
    } else {
        0.0
    };

    Some(ResolvedPosition {
        coordinates: route[i].interpolate(route[i + 1], fraction),
        elevation: elevation_at_or_after(profile, target),
        distance: target,
    })
}

/// First `i` with `distances[i] <= target <= distances[i + 1]`.
fn bracketing_segment(distances: &[f64], target: f64) -> Option<usize> {
    if distances.len() < 2 || target < distances[0] {
        return None;
    }
    let next = 1 + distances[1..].partition_point(|&d| d < target);
    (next < distances.len()).then(|| next - 1)
}

fn elevation_at_or_after(profile: &ElevationProfile, target: f64) -> f64 {
    let idx = profile.samples.partition_point(|s| s.distance < target);
    profile
        .samples
        .get(idx)
        .map_or(DEFAULT_ELEVATION, |s| s.elevation)
}
