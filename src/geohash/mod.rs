//! Geohash spatial index.
//!
//! Encodes coordinates into base32 cell names, decodes them back into
//! bounding boxes, and finds adjacent cells across cell borders.

mod codec;
mod neighbors;

pub use codec::{bounding_box, decode, encode, validate, DecodedGeohash, BASE32, MAX_PRECISION};
pub use neighbors::{adjacent, neighbors, search_cells, Direction, Neighbors};
