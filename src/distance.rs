//! Great-circle distance between coordinates.

use crate::models::Coordinate;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
pub fn haversine(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    // Rounding can push h slightly above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Sort `items` by distance from `origin`, nearest first.
///
/// Items farther than `max_km` are dropped when a radius is given. Items at
/// equal distance keep their input order.
pub fn rank_by_distance<T, F>(
    origin: Coordinate,
    items: impl IntoIterator<Item = T>,
    coord_of: F,
    max_km: Option<f64>,
) -> Vec<(T, f64)>
where
    F: Fn(&T) -> Coordinate,
{
    let mut ranked: Vec<(T, f64)> = items
        .into_iter()
        .map(|item| {
            let km = haversine(origin, coord_of(&item));
            (item, km)
        })
        .filter(|(_, km)| max_km.map_or(true, |max| *km <= max))
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}
