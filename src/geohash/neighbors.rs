//! Adjacent-cell lookup for geohashes.
//!
//! Uses the classic per-direction neighbour and border tables. The tables are
//! written for even-length hashes; odd-length hashes swap the axes (the last
//! character then encodes latitude first), so odd lookups reuse the table of
//! the rotated direction.

use serde::Serialize;

use super::codec::{self, BASE32};
use crate::error::GeoError;
use crate::models::Coordinate;

/// Compass direction of an adjacent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Bottom,
    Right,
    Left,
}

impl Direction {
    /// Neighbour table for a hash with the given length parity.
    fn neighbor_table(self, odd: bool) -> &'static [u8; 32] {
        match (self, odd) {
            (Direction::Right, false) | (Direction::Top, true) => {
                b"bc01fg45238967deuvhjyznpkmstqrwx"
            }
            (Direction::Left, false) | (Direction::Bottom, true) => {
                b"238967debc01fg45kmstqrwxuvhjyznp"
            }
            (Direction::Top, false) | (Direction::Right, true) => {
                b"p0r21436x8zb9dcf5h7kjnmqesgutwvy"
            }
            (Direction::Bottom, false) | (Direction::Left, true) => {
                b"14365h7k9dcfesgujnmqp0r2twvyx8zb"
            }
        }
    }

    /// Characters on the edge of their parent cell in this direction.
    fn border_table(self, odd: bool) -> &'static [u8] {
        match (self, odd) {
            (Direction::Right, false) | (Direction::Top, true) => b"bcfguvyz",
            (Direction::Left, false) | (Direction::Bottom, true) => b"0145hjnp",
            (Direction::Top, false) | (Direction::Right, true) => b"prxz",
            (Direction::Bottom, false) | (Direction::Left, true) => b"028b",
        }
    }
}

/// The eight cells surrounding a geohash, at the same precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub top: String,
    pub bottom: String,
    pub right: String,
    pub left: String,
    pub top_right: String,
    pub top_left: String,
    pub bottom_right: String,
    pub bottom_left: String,
}

impl Neighbors {
    /// All eight cells in field order.
    pub fn to_vec(&self) -> Vec<String> {
        vec![
            self.top.clone(),
            self.bottom.clone(),
            self.right.clone(),
            self.left.clone(),
            self.top_right.clone(),
            self.top_left.clone(),
            self.bottom_right.clone(),
            self.bottom_left.clone(),
        ]
    }
}

/// Step an already validated, non-empty hash one cell in `direction`.
fn step(hash: &[u8], direction: Direction) -> Vec<u8> {
    let (&last, parent) = match hash.split_last() {
        Some(split) => split,
        None => return Vec::new(),
    };
    let odd = hash.len() % 2 == 1;

    // Crossing the parent's edge means the parent moves too. At the top
    // level there is no parent left and the cell wraps around.
    let mut base = if direction.border_table(odd).contains(&last) && !parent.is_empty() {
        step(parent, direction)
    } else {
        parent.to_vec()
    };

    let pos = direction
        .neighbor_table(odd)
        .iter()
        .position(|&c| c == last)
        .unwrap_or_default();
    base.push(BASE32[pos]);
    base
}

fn to_string(bytes: Vec<u8>) -> String {
    // Every byte comes from BASE32, so this is always ASCII.
    bytes.into_iter().map(char::from).collect()
}

/// The cell adjacent to `hash` in a single direction.
pub fn adjacent(hash: &str, direction: Direction) -> Result<String, GeoError> {
    codec::validate(hash)?;
    Ok(to_string(step(hash.as_bytes(), direction)))
}

/// All eight cells adjacent to `hash`.
pub fn neighbors(hash: &str) -> Result<Neighbors, GeoError> {
    codec::validate(hash)?;
    let bytes = hash.as_bytes();

    let top = step(bytes, Direction::Top);
    let bottom = step(bytes, Direction::Bottom);
    let right = step(bytes, Direction::Right);
    let left = step(bytes, Direction::Left);

    Ok(Neighbors {
        top_right: to_string(step(&top, Direction::Right)),
        top_left: to_string(step(&top, Direction::Left)),
        bottom_right: to_string(step(&bottom, Direction::Right)),
        bottom_left: to_string(step(&bottom, Direction::Left)),
        top: to_string(top),
        bottom: to_string(bottom),
        right: to_string(right),
        left: to_string(left),
    })
}

/// The cell containing `coord` plus its eight neighbours, deduplicated.
///
/// Near the poles some neighbours coincide, so fewer than nine cells may be returned.
pub fn search_cells(coord: Coordinate, precision: usize) -> Result<Vec<String>, GeoError> {
    let center = codec::encode(coord, precision)?;
    let mut cells = vec![center.clone()];
    for cell in neighbors(&center)?.to_vec() {
        if !cells.contains(&cell) {
            cells.push(cell);
        }
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geohash::{decode, encode};
    use proptest::prelude::*;

    #[test]
    fn test_neighbors_of_bangalore_cell() {
        let n = neighbors("tdr1v9").unwrap();
        assert_eq!(n.top, "tdr1vd");
        assert_eq!(n.bottom, "tdr1v8");
        assert_eq!(n.right, "tdr1vc");
        assert_eq!(n.left, "tdr1v3");
        assert_eq!(n.top_right, "tdr1vf");
        assert_eq!(n.bottom_left, "tdr1v2");
    }

    #[test]
    fn test_border_crossing_moves_parent() {
        assert_eq!(adjacent("tdr1", Direction::Top).unwrap(), "tdr4");
        assert_eq!(adjacent("tdr1", Direction::Bottom).unwrap(), "tdr0");
        assert_eq!(adjacent("tdr1", Direction::Left).unwrap(), "tdqc");
        assert_eq!(adjacent("tdr1", Direction::Right).unwrap(), "tdr3");
        assert_eq!(adjacent("9q8yy", Direction::Top).unwrap(), "9q8zn");
    }

    #[test]
    fn test_antimeridian_wraps() {
        // "z" touches +180 and "b" sits directly across the meridian.
        assert_eq!(adjacent("z", Direction::Right).unwrap(), "b");
        assert_eq!(adjacent("b", Direction::Left).unwrap(), "z");
        assert_eq!(adjacent("u", Direction::Right).unwrap(), "v");
    }

    #[test]
    fn test_invalid_hash_is_rejected() {
        assert!(matches!(
            neighbors("tdra"),
            Err(GeoError::InvalidGeohash { .. })
        ));
        assert!(adjacent("", Direction::Top).is_err());
    }

    #[test]
    fn test_search_cells() {
        let cells = search_cells(Coordinate { lat: 12.9716, lng: 77.5946 }, 6).unwrap();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], "tdr1v9");
        assert!(cells.contains(&"tdr1vf".to_string()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn bottom_then_top_returns_home(lat in -80.0f64..80.0, lng in -179.0f64..179.0, p in 1usize..=10) {
            let point = Coordinate { lat, lng };
            let hash = encode(point, p).unwrap();
            let back = adjacent(&adjacent(&hash, Direction::Bottom).unwrap(), Direction::Top).unwrap();
            prop_assert_eq!(&back, &hash);
            prop_assert!(decode(&back).unwrap().bbox.contains(&point));
        }

        #[test]
        fn left_then_right_returns_home(lat in -80.0f64..80.0, lng in -179.0f64..179.0, p in 1usize..=10) {
            let hash = encode(Coordinate { lat, lng }, p).unwrap();
            let back = adjacent(&adjacent(&hash, Direction::Left).unwrap(), Direction::Right).unwrap();
            prop_assert_eq!(back, hash);
        }

        #[test]
        fn top_neighbor_sits_directly_above(lat in -80.0f64..80.0, lng in -179.0f64..179.0, p in 2usize..=10) {
            let hash = encode(Coordinate { lat, lng }, p).unwrap();
            let cell = decode(&hash).unwrap();
            let top = decode(&neighbors(&hash).unwrap().top).unwrap();
            prop_assert_eq!(top.bbox.lat_min, cell.bbox.lat_max);
            prop_assert_eq!(top.bbox.lon_min, cell.bbox.lon_min);
            prop_assert_eq!(top.lat_error, cell.lat_error);
        }
    }
}
