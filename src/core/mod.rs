pub mod constants;
pub mod geometry;
pub mod grid;
pub mod projection;
pub mod types;

pub use constants::{
    MAX_LATITUDE, MAX_LONGITUDE, MAX_ZOOM_LEVEL, MIN_LATITUDE, MIN_LONGITUDE, MIN_ZOOM_LEVEL,
    TILE_SIZE,
};
pub use geometry::{
    axis_aligned_box_to_extent, extent_to_polygon, polygon_entirely_within_single_tile,
    polygon_to_pixels, polygon_to_tile_local_pixels,
};
pub use grid::{
    enumerate_quadkeys_in_bounding_box, enumerate_tiles_in_bounding_box, geo_to_quadkey,
    tile_range,
};
pub use projection::{
    clamp_zoom, clip, geo_to_pixel, geo_to_tile, map_size, pixel_offset_within_tile, pixel_to_geo,
    pixel_to_tile, tile_bounds, tile_to_pixel,
};
pub use types::{GeoPoint, LatLonExtent, PixelPoint, TileIndex};
