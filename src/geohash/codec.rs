//! Base32 geohash encoding and decoding.

use serde::Serialize;

use crate::error::GeoError;
use crate::models::{BoundingBox, Coordinate};

/// The geohash base32 alphabet (no a, i, l, o).
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest supported geohash.
pub const MAX_PRECISION: usize = 12;

/// Result of decoding a geohash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecodedGeohash {
    pub center: Coordinate,
    /// Full latitude span of the cell (`lat_max - lat_min`)
    pub lat_error: f64,
    /// Full longitude span of the cell (`lon_max - lon_min`)
    pub lng_error: f64,
    pub bbox: BoundingBox,
}

/// Index of `c` in the alphabet.
pub(crate) fn char_index(c: u8) -> Option<usize> {
    BASE32.iter().position(|&b| b == c)
}

fn check_precision(precision: usize) -> Result<(), GeoError> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(GeoError::InvalidPrecision(precision));
    }
    Ok(())
}

/// Check that `hash` is a non-empty geohash of supported length over the alphabet.
pub fn validate(hash: &str) -> Result<(), GeoError> {
    if hash.is_empty() {
        return Err(GeoError::InvalidGeohash {
            hash: hash.to_string(),
            reason: "empty geohash".to_string(),
        });
    }
    if hash.len() > MAX_PRECISION {
        return Err(GeoError::InvalidPrecision(hash.len()));
    }
    if let Some(bad) = hash.chars().find(|c| !c.is_ascii() || char_index(*c as u8).is_none()) {
        return Err(GeoError::InvalidGeohash {
            hash: hash.to_string(),
            reason: format!("character {:?} is not in the base32 alphabet", bad),
        });
    }
    Ok(())
}

/// Encode a coordinate into a geohash of `precision` characters.
pub fn encode(coord: Coordinate, precision: usize) -> Result<String, GeoError> {
    coord.validate()?;
    check_precision(precision)?;

    let mut bounds = BoundingBox::WORLD;
    let mut hash = String::with_capacity(precision);
    let mut even = true;
    let mut bit = 0;
    let mut idx = 0usize;

    while hash.len() < precision {
        if even {
            let mid = (bounds.lon_min + bounds.lon_max) / 2.0;
            if coord.lng > mid {
                idx = (idx << 1) | 1;
                bounds.lon_min = mid;
            } else {
                idx <<= 1;
                bounds.lon_max = mid;
            }
        } else {
            let mid = (bounds.lat_min + bounds.lat_max) / 2.0;
            if coord.lat > mid {
                idx = (idx << 1) | 1;
                bounds.lat_min = mid;
            } else {
                idx <<= 1;
                bounds.lat_max = mid;
            }
        }
        even = !even;

        bit += 1;
        if bit == 5 {
            hash.push(BASE32[idx] as char);
            bit = 0;
            idx = 0;
        }
    }

    Ok(hash)
}

/// Bounds of the cell named by `hash`.
pub fn bounding_box(hash: &str) -> Result<BoundingBox, GeoError> {
    validate(hash)?;

    let mut bounds = BoundingBox::WORLD;
    let mut even = true;

    for c in hash.bytes() {
        // validate() has already rejected anything outside the alphabet
        let value = char_index(c).unwrap_or_default();
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            if even {
                let mid = (bounds.lon_min + bounds.lon_max) / 2.0;
                if bit == 1 {
                    bounds.lon_min = mid;
                } else {
                    bounds.lon_max = mid;
                }
            } else {
                let mid = (bounds.lat_min + bounds.lat_max) / 2.0;
                if bit == 1 {
                    bounds.lat_min = mid;
                } else {
                    bounds.lat_max = mid;
                }
            }
            even = !even;
        }
    }

    Ok(bounds)
}

/// Decode a geohash into its center point and cell size.
pub fn decode(hash: &str) -> Result<DecodedGeohash, GeoError> {
    let bbox = bounding_box(hash)?;
    Ok(DecodedGeohash {
        center: bbox.center(),
        lat_error: bbox.lat_span(),
        lng_error: bbox.lon_span(),
        bbox,
    })
}
