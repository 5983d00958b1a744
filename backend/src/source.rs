use std::path::PathBuf;

use serde::Deserialize;
use shared::{Coordinate, ImageSource, PointOfInterest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to fetch {url}: {source}")]
    Http {
        source: reqwest::Error,
        url: String,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid GeoJSON document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed source: {0}")]
    MalformedSource(String),
    #[error("route has no coordinates")]
    EmptyRoute,
}

/// Where a feature document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Path(PathBuf),
    Url(String),
}

impl SourceLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SourceLocation::Url(raw.to_string())
        } else {
            SourceLocation::Path(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::Path(path) => write!(f, "{}", path.display()),
            SourceLocation::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
}

/// GeoJSON geometries this service understands. Positions stay raw until a
/// consumer converts them, so one bad position only fails the feature that
/// is actually used.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Default, Deserialize)]
struct PoiProperties {
    #[serde(default, alias = "nombre")]
    name: Option<String>,
    #[serde(default, alias = "descripcion")]
    description: Option<String>,
    #[serde(default, alias = "imagenUrl", alias = "imageUrl")]
    image_url: Option<String>,
    #[serde(default, alias = "fuenteImagen", alias = "imageSource")]
    image_source: Option<String>,
}

pub async fn load_feature_collection(
    location: &SourceLocation,
    client: &reqwest::Client,
) -> Result<FeatureCollection, SourceError> {
    let bytes = match location {
        SourceLocation::Path(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| SourceError::Io {
                    source,
                    path: path.clone(),
                })?
        }
        SourceLocation::Url(url) => {
            let http_err = |source| SourceError::Http {
                source,
                url: url.clone(),
            };
            let response = client.get(url).send().await.map_err(http_err)?;
            if !response.status().is_success() {
                return Err(SourceError::Status {
                    url: url.clone(),
                    status: response.status().as_u16(),
                });
            }
            response.bytes().await.map_err(http_err)?.to_vec()
        }
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// The first line feature of the document, in trail order.
pub fn route_from_collection(
    collection: &FeatureCollection,
) -> Result<Vec<Coordinate>, SourceError> {
    let lines: Vec<&Vec<Vec<f64>>> = collection
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .find_map(|g| match g {
            Geometry::LineString { coordinates } => Some(vec![coordinates]),
            Geometry::MultiLineString { coordinates } => Some(coordinates.iter().collect()),
            _ => None,
        })
        .ok_or_else(|| SourceError::MalformedSource("no LineString feature found".into()))?;

    let coordinates = lines
        .into_iter()
        .flatten()
        .map(|p| position(p.as_slice()))
        .collect::<Result<Vec<_>, _>>()?;

    if coordinates.is_empty() {
        return Err(SourceError::EmptyRoute);
    }
    Ok(coordinates)
}

/// Point features, converted for the map's popups.
pub fn points_of_interest(collection: &FeatureCollection) -> Vec<PointOfInterest> {
    collection
        .features
        .iter()
        .filter_map(|feature| {
            let Some(Geometry::Point { coordinates }) = &feature.geometry else {
                return None;
            };
            let coordinates = match position(coordinates) {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!("Skipping point of interest: {}", err);
                    return None;
                }
            };
            let props: PoiProperties = feature
                .properties
                .clone()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default();

            Some(PointOfInterest {
                name: props.name.unwrap_or_default(),
                description: props.description,
                image_url: props.image_url,
                image_source: props.image_source.as_deref().and_then(ImageSource::parse),
                coordinates,
            })
        })
        .collect()
}

fn position(raw: &[f64]) -> Result<Coordinate, SourceError> {
    match raw {
        [lon, lat] => Ok(Coordinate::new(*lon, *lat)),
        [lon, lat, elevation, ..] => Ok(Coordinate {
            lon: *lon,
            lat: *lat,
            elevation: Some(*elevation),
        }),
        _ => Err(SourceError::MalformedSource(format!(
            "position needs at least 2 numbers, got {}",
            raw.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn collection(json: &str) -> FeatureCollection {
        serde_json::from_str(json).unwrap()
    }

    const ROUTE_DOC: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [3.1, 39.7] } },
            { "type": "Feature", "properties": { "name": "Ruta Pla" },
              "geometry": { "type": "LineString", "coordinates": [[2.95, 39.6, 120.0], [2.96, 39.61], [2.97, 39.62]] } }
        ]
    }"#;

    #[test]
    fn parses_location_kind() {
        assert_eq!(
            SourceLocation::parse("https://example.org/r.geojson"),
            SourceLocation::Url("https://example.org/r.geojson".into())
        );
        assert_eq!(
            SourceLocation::parse("data/ruta_pla.geojson"),
            SourceLocation::Path(PathBuf::from("data/ruta_pla.geojson"))
        );
    }

    #[test]
    fn first_line_feature_is_the_route() {
        let route = route_from_collection(&collection(ROUTE_DOC)).unwrap();
        assert_eq!(route.len(), 3);
        assert_eq!(route[0].lon, 2.95);
        assert_eq!(route[0].elevation, Some(120.0));
        assert_eq!(route[1].elevation, None);
    }

    #[test]
    fn multi_line_is_concatenated_in_order() {
        let doc = collection(
            r#"{"features": [{"geometry": {"type": "MultiLineString",
                "coordinates": [[[0, 0], [0, 1]], [[0, 2], [0, 3]]]}}]}"#,
        );
        let route = route_from_collection(&doc).unwrap();
        let lats: Vec<f64> = route.iter().map(|c| c.lat).collect();
        assert_eq!(lats, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_line_geometry_is_malformed() {
        let doc = collection(
            r#"{"features": [{"geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[0,1],[0,0]]]}}]}"#,
        );
        assert!(matches!(
            route_from_collection(&doc),
            Err(SourceError::MalformedSource(_))
        ));
    }

    #[test]
    fn empty_line_is_empty_route() {
        let doc = collection(r#"{"features": [{"geometry": {"type": "LineString", "coordinates": []}}]}"#);
        assert!(matches!(route_from_collection(&doc), Err(SourceError::EmptyRoute)));
    }

    #[test]
    fn short_position_is_malformed() {
        let doc = collection(r#"{"features": [{"geometry": {"type": "LineString", "coordinates": [[1.0]]}}]}"#);
        assert!(matches!(
            route_from_collection(&doc),
            Err(SourceError::MalformedSource(_))
        ));
    }

    #[test]
    fn points_of_interest_read_spanish_properties() {
        let doc = collection(
            r#"{"features": [
                {"geometry": {"type": "Point", "coordinates": [3.05, 39.65]},
                 "properties": {"nombre": "Talaiot de Son Fornés", "descripcion": "Poblat talaiòtic",
                                "imagenUrl": "https://img.example/fornes.jpg",
                                "fuenteImagen": "Wikimedia|https://commons.wikimedia.org/fornes"}},
                {"geometry": {"type": "Point", "coordinates": [3.1, 39.7]},
                 "properties": {"name": "Ses Païsses", "image_source": "Foto propia"}},
                {"geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
            ]}"#,
        );
        let pois = points_of_interest(&doc);
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].name, "Talaiot de Son Fornés");
        assert_eq!(pois[0].description.as_deref(), Some("Poblat talaiòtic"));
        assert_eq!(
            pois[0].image_source,
            Some(ImageSource::Link {
                label: "Wikimedia".into(),
                url: "https://commons.wikimedia.org/fornes".into()
            })
        );
        assert_eq!(
            pois[1].image_source,
            Some(ImageSource::Text {
                label: "Foto propia".into()
            })
        );
        assert_eq!(pois[1].coordinates, Coordinate::new(3.1, 39.7));
    }

    #[tokio::test]
    async fn loads_document_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ROUTE_DOC.as_bytes()).unwrap();
        let location = SourceLocation::Path(file.path().to_path_buf());

        let doc = load_feature_collection(&location, &reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(doc.features.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let location = SourceLocation::parse("/definitely/not/here.geojson");
        let err = load_feature_collection(&location, &reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not geojson").unwrap();
        let location = SourceLocation::Path(file.path().to_path_buf());
        let err = load_feature_collection(&location, &reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
