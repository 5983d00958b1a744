use shared::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance on a spherical Earth.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    // rounding can push h just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Cumulative distance from `route[0]` to every vertex, in km.
///
/// The result has the same length as `route`; an empty route yields an
/// empty index.
pub fn build_distance_index(route: &[Coordinate]) -> Vec<f64> {
    let mut index = Vec::with_capacity(route.len());
    let mut total = 0.0;
    for (i, coord) in route.iter().enumerate() {
        if i > 0 {
            total += haversine_km(route[i - 1], *coord);
        }
        index.push(total);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat)
    }

    #[test]
    fn test_haversine_same_point() {
        let point = c(5.0, 45.0);
        assert_eq!(haversine_km(point, point), 0.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = c(5.0, 45.0);
        let b = c(6.0, 46.0);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn test_haversine_ignores_elevation() {
        let a = c(2.95, 39.6);
        let mut b = c(3.0, 39.65);
        let flat = haversine_km(a, b);
        b.elevation = Some(1_200.0);
        assert_eq!(haversine_km(a, b), flat);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(c(0.0, 0.0), c(0.0, 1.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_haversine_antipodes_are_finite() {
        let a = c(-178.5704, -88.7864);
        let b = c(1.4296, 88.7864);
        let d = haversine_km(a, b);
        assert!(d.is_finite(), "got {d}");
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }

    #[test]
    fn test_index_across_antipodes_stays_monotonic() {
        let route = [c(10.0, 20.0), c(-170.0, -20.0), c(-169.0, -20.0)];
        let index = build_distance_index(&route);
        assert!(index.iter().all(|d| d.is_finite()));
        assert!(index.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_index_single_point() {
        assert_eq!(build_distance_index(&[c(2.9, 39.6)]), vec![0.0]);
    }

    #[test]
    fn test_index_empty() {
        assert!(build_distance_index(&[]).is_empty());
    }

    #[test]
    fn test_index_meridian_scenario() {
        let route = [c(0.0, 0.0), c(0.0, 1.0), c(0.0, 2.0)];
        let index = build_distance_index(&route);
        assert_eq!(index.len(), 3);
        assert_eq!(index[0], 0.0);
        assert!((index[1] - 111.19).abs() < 0.01);
        assert!((index[2] - 222.39).abs() < 0.01);
    }

    #[test]
    fn test_index_duplicate_points_do_not_advance() {
        let route = [c(1.0, 1.0), c(1.0, 1.0), c(1.0, 1.1)];
        let index = build_distance_index(&route);
        assert_eq!(index[0], index[1]);
        assert!(index[2] > index[1]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate::new(lon, lat))
        }

        proptest! {
            #[test]
            fn prop_haversine_non_negative(a in valid_coord(), b in valid_coord()) {
                prop_assert!(haversine_km(a, b) >= 0.0);
            }

            #[test]
            fn prop_haversine_symmetric(a in valid_coord(), b in valid_coord()) {
                prop_assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-10);
            }

            #[test]
            fn prop_haversine_antipode_is_half_circumference(a in valid_coord()) {
                let antipode = Coordinate::new(a.lon + 180.0, -a.lat);
                let d = haversine_km(a, antipode);
                prop_assert!(d.is_finite());
                prop_assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
            }

            #[test]
            fn prop_haversine_same_point_is_zero(coord in valid_coord()) {
                prop_assert_eq!(haversine_km(coord, coord), 0.0);
            }

            #[test]
            fn prop_haversine_bounded_by_half_earth_circumference(
                a in valid_coord(),
                b in valid_coord()
            ) {
                let max_distance = std::f64::consts::PI * EARTH_RADIUS_KM;
                prop_assert!(haversine_km(a, b) <= max_distance + 0.1);
            }

            #[test]
            fn prop_haversine_triangle_inequality(
                a in valid_coord(),
                b in valid_coord(),
                c in valid_coord()
            ) {
                let dist_ab = haversine_km(a, b);
                let dist_bc = haversine_km(b, c);
                let dist_ac = haversine_km(a, c);
                prop_assert!(dist_ac <= dist_ab + dist_bc + 1e-6);
            }

            #[test]
            fn prop_index_starts_at_zero_and_never_decreases(
                route in prop::collection::vec(valid_coord(), 2..40)
            ) {
                let index = build_distance_index(&route);
                prop_assert_eq!(index.len(), route.len());
                prop_assert_eq!(index[0], 0.0);
                for pair in index.windows(2) {
                    prop_assert!(pair[1] >= pair[0]);
                }
            }

            #[test]
            fn prop_index_total_matches_path_length(
                route in prop::collection::vec(valid_coord(), 1..40)
            ) {
                let index = build_distance_index(&route);
                let total = *index.last().unwrap();
                let path: f64 = route.windows(2).map(|w| haversine_km(w[0], w[1])).sum();
                prop_assert!((total - path).abs() < 1e-6);
            }
        }
    }
}
