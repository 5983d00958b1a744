use shared::Coordinate;

use crate::distance::build_distance_index;
use crate::error::RouteError;

/// A route together with its cumulative distance index.
///
/// Both arrays are derived once and never reordered, so `distances[i]` is
/// always the distance at `coordinates[i]`.
#[derive(Debug, Clone)]
pub struct IndexedRoute {
    coordinates: Vec<Coordinate>,
    distances: Vec<f64>,
}

impl IndexedRoute {
    pub fn new(coordinates: Vec<Coordinate>) -> Result<Self, RouteError> {
        if coordinates.is_empty() {
            return Err(RouteError::EmptyRoute);
        }
        let distances = build_distance_index(&coordinates);
        Ok(Self {
            coordinates,
            distances,
        })
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_route() {
        assert!(matches!(
            IndexedRoute::new(Vec::new()),
            Err(RouteError::EmptyRoute)
        ));
    }

    #[test]
    fn single_point_route_has_zero_length() {
        let route = IndexedRoute::new(vec![Coordinate::new(2.95, 39.6)]).unwrap();
        assert_eq!(route.len(), 1);
        assert_eq!(route.distances(), &[0.0]);
        assert_eq!(route.total_distance_km(), 0.0);
    }

    #[test]
    fn total_distance_is_last_index_entry() {
        let route = IndexedRoute::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 2.0),
        ])
        .unwrap();
        assert_eq!(route.total_distance_km(), route.distances()[2]);
        assert!((route.total_distance_km() - 222.39).abs() < 0.01);
    }
}
