pub mod coord;
pub mod error;
pub mod identifier;

pub use coord::{LatLon, polygon_to_vertices, vertices_to_polygon};
pub use error::AutotagError;
pub use identifier::{child_quadkeys, parent_quadkey, quadkey_to_tile, tile_to_quadkey};
