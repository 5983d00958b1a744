use shared::Coordinate;

/// Stride used to keep roughly `max_points` out of `len`.
pub fn sample_step(len: usize, max_points: usize) -> usize {
    (len / max_points.max(1)).max(1)
}

/// Every `step`-th index from 0, with the final index always present.
pub fn sample_indices(len: usize, max_points: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let step = sample_step(len, max_points);
    let mut indices: Vec<usize> = (0..len).step_by(step).collect();
    let last = len - 1;
    if last % step != 0 {
        indices.push(last);
    }
    indices
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sampled {
    pub coordinates: Vec<Coordinate>,
    pub distances: Vec<f64>,
}

impl Sampled {
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

/// Reduce a route to a bounded subset, keeping coordinates and distances
/// paired. `route` and `distances` must have the same length.
pub fn sample(route: &[Coordinate], distances: &[f64], max_points: usize) -> Sampled {
    let len = route.len().min(distances.len());
    let indices = sample_indices(len, max_points);
    Sampled {
        coordinates: indices.iter().map(|&i| route[i]).collect(),
        distances: indices.iter().map(|&i| distances[i]).collect(),
    }
}
