use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route has no coordinates")]
    EmptyRoute,
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}
