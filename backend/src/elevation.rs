use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::Coordinate;
use thiserror::Error;

use crate::config::ElevationConfig;

/// Hard limit of the public lookup service per request.
pub const MAX_BATCH_SIZE: usize = 100;
pub const DEFAULT_PACING: Duration = Duration::from_millis(200);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("elevation service returned status {status}")]
    Service { status: u16 },
    #[error("elevation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("elevation service returned {actual} results for {expected} locations")]
    ResultCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Coordinate> for Location {
    fn from(coord: &Coordinate) -> Self {
        Self {
            latitude: coord.lat,
            longitude: coord.lon,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupRequest {
    pub locations: Vec<Location>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub results: Vec<LookupResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResult {
    pub elevation: f64,
}

/// Client for an open-elevation compatible lookup endpoint.
#[derive(Debug, Clone)]
pub struct ElevationService {
    client: reqwest::Client,
    base_url: String,
    batch_size: usize,
    pacing: Duration,
    timeout: Duration,
}

impl ElevationService {
    pub fn new(client: reqwest::Client, config: &ElevationConfig) -> Self {
        Self {
            client,
            base_url: config.api_url.clone(),
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
            pacing: config.pacing,
            timeout: config.timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up elevations for `points`, in order.
    ///
    /// Any failing batch aborts the whole lookup; nothing fetched so far is
    /// returned.
    pub async fn fetch_elevations(
        &self,
        points: &[Coordinate],
    ) -> Result<Vec<f64>, ElevationError> {
        fetch_in_batches(points, self.batch_size, self.pacing, |batch| {
            self.fetch_batch(batch)
        })
        .await
    }

    async fn fetch_batch(&self, locations: Vec<Location>) -> Result<Vec<f64>, ElevationError> {
        let response = self
            .client
            .post(&self.base_url)
            .timeout(self.timeout)
            .json(&LookupRequest { locations })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ElevationError::Service {
                status: status.as_u16(),
            });
        }

        let body: LookupResponse = response.json().await?;
        Ok(body.results.into_iter().map(|r| r.elevation).collect())
    }
}

/// Split `points` into batches of at most `batch_size`, fetch them one after
/// another and wait `pacing` between consecutive requests.
pub async fn fetch_in_batches<F, Fut>(
    points: &[Coordinate],
    batch_size: usize,
    pacing: Duration,
    mut fetch_batch: F,
) -> Result<Vec<f64>, ElevationError>
where
    F: FnMut(Vec<Location>) -> Fut,
    Fut: Future<Output = Result<Vec<f64>, ElevationError>>,
{
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let batch_size = batch_size.max(1);
    let batch_count = points.len().div_ceil(batch_size);
    let mut elevations = Vec::with_capacity(points.len());

    for (batch_no, chunk) in points.chunks(batch_size).enumerate() {
        if batch_no > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }

        let locations: Vec<Location> = chunk.iter().map(Location::from).collect();
        let values = fetch_batch(locations).await.inspect_err(|err| {
            tracing::warn!(
                "Elevation batch {}/{} failed, discarding {} fetched value(s): {}",
                batch_no + 1,
                batch_count,
                elevations.len(),
                err
            );
        })?;
        if values.len() != chunk.len() {
            return Err(ElevationError::ResultCount {
                expected: chunk.len(),
                actual: values.len(),
            });
        }

        tracing::debug!(
            "Fetched elevation batch {}/{} ({} points)",
            batch_no + 1,
            batch_count,
            chunk.len()
        );
        elevations.extend(values);
    }

    Ok(elevations)
}
