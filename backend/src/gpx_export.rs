use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use shared::{Coordinate, ElevationProfile};

use crate::error::RouteError;
use crate::route::IndexedRoute;

/// GPX 1.1 track for the route, base64 encoded for JSON transport.
///
/// Vertices keep their own elevation when the source had one; otherwise the
/// chart profile value at that distance is used.
pub fn encode_route_as_gpx(
    name: &str,
    route: &IndexedRoute,
    profile: &ElevationProfile,
) -> Result<String, RouteError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("trail_backend".into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some(name.to_string()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    for (coord, &distance) in route.coordinates().iter().zip(route.distances()) {
        let elevation = coord.elevation.or_else(|| profile_elevation(profile, distance));
        segment.points.push(to_waypoint(coord, elevation));
    }
    track.segments.push(segment);
    gpx.tracks.push(track);

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn profile_elevation(profile: &ElevationProfile, distance: f64) -> Option<f64> {
    let idx = profile.samples.partition_point(|s| s.distance < distance);
    profile
        .samples
        .get(idx)
        .or_else(|| profile.last())
        .map(|s| s.elevation)
}

fn to_waypoint(coord: &Coordinate, elevation: Option<f64>) -> Waypoint {
    let mut waypoint = Waypoint::new(Point::new(coord.lon, coord.lat));
    waypoint.elevation = elevation;
    waypoint
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ElevationSample, ProfileSource};

    #[test]
    fn encodes_track_with_elevations() {
        let mut coords = vec![Coordinate::new(2.95, 39.6), Coordinate::new(2.96, 39.61)];
        coords[0].elevation = Some(87.0);
        let route = IndexedRoute::new(coords).unwrap();
        let profile = ElevationProfile {
            samples: vec![
                ElevationSample {
                    distance: 0.0,
                    elevation: 90.0,
                },
                ElevationSample {
                    distance: 1.4,
                    elevation: 131.0,
                },
            ],
            source: ProfileSource::Measured,
        };

        let encoded = encode_route_as_gpx("Ruta Pla", &route, &profile).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();
        let parsed = gpx::read(bytes.as_slice()).unwrap();

        let track = &parsed.tracks[0];
        assert_eq!(track.name.as_deref(), Some("Ruta Pla"));
        let elevations: Vec<Option<f64>> = track.segments[0]
            .points
            .iter()
            .map(|p| p.elevation)
            .collect();
        assert_eq!(elevations, vec![Some(87.0), Some(131.0)]);
    }

    #[test]
    fn profile_elevation_prefers_next_sample() {
        let profile = ElevationProfile {
            samples: vec![
                ElevationSample {
                    distance: 0.0,
                    elevation: 10.0,
                },
                ElevationSample {
                    distance: 2.0,
                    elevation: 20.0,
                },
            ],
            source: ProfileSource::Simulated,
        };
        assert_eq!(profile_elevation(&profile, 1.0), Some(20.0));
        assert_eq!(profile_elevation(&profile, 3.0), Some(20.0));
    }
}
