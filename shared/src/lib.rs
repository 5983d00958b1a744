use serde::{Deserialize, Serialize};

/// A route vertex. GeoJSON order is `[lon, lat, ele?]`; the optional third
/// component is carried through but never used for distance math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            elevation: None,
        }
    }

    /// Linear interpolation on lon/lat. The result has no elevation.
    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lon: self.lon + (other.lon - self.lon) * t,
            lat: self.lat + (other.lat - self.lat) * t,
            elevation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    /// Kilometres from the start of the route.
    pub distance: f64,
    /// Metres.
    pub elevation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    Measured,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationProfile {
    pub samples: Vec<ElevationSample>,
    pub source: ProfileSource,
}

impl ElevationProfile {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn last(&self) -> Option<&ElevationSample> {
        self.samples.last()
    }

    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.samples
            .iter()
            .map(|s| ChartPoint {
                x: s.distance,
                y: s.elevation,
            })
            .collect()
    }

    /// Min/max and cumulative climb over the emitted samples.
    pub fn summary(&self) -> ProfileSummary {
        let min_elevation = self
            .samples
            .iter()
            .map(|s| s.elevation)
            .fold(f64::INFINITY, f64::min);
        let max_elevation = self
            .samples
            .iter()
            .map(|s| s.elevation)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut total_ascent = 0.0;
        let mut total_descent = 0.0;
        for window in self.samples.windows(2) {
            let diff = window[1].elevation - window[0].elevation;
            if diff > 0.0 {
                total_ascent += diff;
            } else {
                total_descent += diff.abs();
            }
        }

        ProfileSummary {
            min_elevation: min_elevation.is_finite().then_some(min_elevation),
            max_elevation: max_elevation.is_finite().then_some(max_elevation),
            total_ascent,
            total_descent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub min_elevation: Option<f64>,
    pub max_elevation: Option<f64>,
    pub total_ascent: f64,
    pub total_descent: f64,
}

/// Chart-ready pair: `x` is distance in km, `y` elevation in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPosition {
    pub coordinates: Coordinate,
    pub elevation: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageSource {
    Text { label: String },
    Link { label: String, url: String },
}

impl ImageSource {
    /// Attribution strings are either plain text or `"label|url"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once('|') {
            Some((label, url)) => Some(ImageSource::Link {
                label: label.trim().to_string(),
                url: url.trim().to_string(),
            }),
            None => Some(ImageSource::Text {
                label: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_source: Option<ImageSource>,
    pub coordinates: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub name: String,
    pub version: u64,
    pub path: Vec<Coordinate>,
    pub distance_km: f64,
    pub gpx_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub name: String,
    pub version: u64,
    pub source: ProfileSource,
    pub distance_km: f64,
    pub points: Vec<ChartPoint>,
    pub summary: ProfileSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Empty,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub state: LoadState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReloadRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(elevations: &[f64]) -> ElevationProfile {
        ElevationProfile {
            samples: elevations
                .iter()
                .enumerate()
                .map(|(i, &elevation)| ElevationSample {
                    distance: i as f64,
                    elevation,
                })
                .collect(),
            source: ProfileSource::Measured,
        }
    }

    #[test]
    fn interpolate_midpoint() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(2.0, 4.0);
        let mid = a.interpolate(b, 0.5);
        assert_eq!(mid, Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn summary_counts_ascent_and_descent() {
        let summary = profile(&[100.0, 120.0, 110.0, 130.0]).summary();
        assert_eq!(summary.min_elevation, Some(100.0));
        assert_eq!(summary.max_elevation, Some(130.0));
        assert_eq!(summary.total_ascent, 40.0);
        assert_eq!(summary.total_descent, 10.0);
    }

    #[test]
    fn summary_of_empty_profile() {
        let summary = profile(&[]).summary();
        assert_eq!(summary.min_elevation, None);
        assert_eq!(summary.max_elevation, None);
        assert_eq!(summary.total_ascent, 0.0);
    }

    #[test]
    fn chart_points_map_distance_to_x() {
        let points = profile(&[10.0, 20.0]).chart_points();
        assert_eq!(points[1], ChartPoint { x: 1.0, y: 20.0 });
    }

    #[test]
    fn image_source_with_link() {
        assert_eq!(
            ImageSource::parse("Wikimedia|https://commons.wikimedia.org/x.jpg"),
            Some(ImageSource::Link {
                label: "Wikimedia".into(),
                url: "https://commons.wikimedia.org/x.jpg".into(),
            })
        );
    }

    #[test]
    fn image_source_plain_text_and_blank() {
        assert_eq!(
            ImageSource::parse("Foto propia"),
            Some(ImageSource::Text {
                label: "Foto propia".into()
            })
        );
        assert_eq!(ImageSource::parse("  "), None);
    }

    #[test]
    fn coordinate_without_elevation_omits_field() {
        let json = serde_json::to_string(&Coordinate::new(2.9, 39.6)).unwrap();
        assert_eq!(json, r#"{"lon":2.9,"lat":39.6}"#);
    }
}
