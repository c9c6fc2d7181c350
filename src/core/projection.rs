//! Spherical (Web) Mercator projection between WGS84 degrees and the global
//! pixel plane used by quadkey-addressed imagery.

use crate::core::constants::{
    MAX_LATITUDE, MAX_LONGITUDE, MAX_ZOOM_LEVEL, MIN_LATITUDE, MIN_LONGITUDE, TILE_SIZE,
};
use crate::core::types::{GeoPoint, LatLonExtent, PixelPoint, TileIndex};
use std::f64::consts::PI;

/// Clamps `value` into `[min, max]`.
pub fn clip(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Limits `zoom` to `0..=MAX_ZOOM_LEVEL`.
///
/// Every function in [`crate::core`] clamps its zoom this way, so a tile index
/// always fits in `u32` and deeper zooms behave like the deepest supported one.
pub fn clamp_zoom(zoom: u8) -> u8 {
    zoom.min(MAX_ZOOM_LEVEL)
}

/// Side length of the pixel plane at `zoom`, i.e. `256 * 2^zoom`.
pub fn map_size(zoom: u8) -> u64 {
    u64::from(TILE_SIZE) << clamp_zoom(zoom)
}

/// Projects a latitude/longitude onto the pixel plane at `zoom`.
///
/// Out-of-range input is clamped, so the result always lies inside
/// `[0, map_size - 1]` on both axes. `zoom` is clamped to `0..=23`.
pub fn geo_to_pixel(lat: f64, lon: f64, zoom: u8) -> PixelPoint {
    let lat = clip(lat, MIN_LATITUDE, MAX_LATITUDE);
    let lon = clip(lon, MIN_LONGITUDE, MAX_LONGITUDE);

    let size = map_size(zoom) as f64;

    let x = (lon + 180.0) / 360.0 * size;
    let sin_lat = (lat * PI / 180.0).sin();
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * size;

    PixelPoint::new(
        clip(x + 0.5, 0.0, size - 1.0) as u64,
        clip(y + 0.5, 0.0, size - 1.0) as u64,
    )
}

/// Inverse of [`geo_to_pixel`], up to pixel precision.
pub fn pixel_to_geo(pixel: PixelPoint, zoom: u8) -> GeoPoint {
    let size = map_size(zoom) as f64;

    let x = clip(pixel.x as f64, 0.0, size - 1.0) / size - 0.5;
    let y = 0.5 - clip(pixel.y as f64, 0.0, size - 1.0) / size;

    let lat = 90.0 - 360.0 * (-y * 2.0 * PI).exp().atan() / PI;
    let lon = 360.0 * x;

    GeoPoint::new(lat, lon)
}

/// Tile containing a pixel.
pub fn pixel_to_tile(pixel: PixelPoint) -> TileIndex {
    let size = u64::from(TILE_SIZE);
    TileIndex::new((pixel.x / size) as u32, (pixel.y / size) as u32)
}

/// North-west pixel of a tile.
pub fn tile_to_pixel(tile: TileIndex) -> PixelPoint {
    let size = u64::from(TILE_SIZE);
    PixelPoint::new(u64::from(tile.x) * size, u64::from(tile.y) * size)
}

/// Tile containing a latitude/longitude at `zoom`.
pub fn geo_to_tile(lat: f64, lon: f64, zoom: u8) -> TileIndex {
    pixel_to_tile(geo_to_pixel(lat, lon, zoom))
}

/// Offset of a global pixel inside its own tile, each axis in `0..256`.
pub fn pixel_offset_within_tile(pixel: PixelPoint) -> PixelPoint {
    let size = u64::from(TILE_SIZE);
    PixelPoint::new(pixel.x % size, pixel.y % size)
}

/// Geographic extent covered by a tile.
///
/// Computed from the north-west corners of `tile` and of its south-east
/// diagonal neighbour, without clamping, so adjacent tiles share edges exactly.
pub fn tile_bounds(tile: TileIndex, zoom: u8) -> LatLonExtent {
    let (max_lat, min_lon) = tile_corner(u64::from(tile.x), u64::from(tile.y), zoom);
    let (min_lat, max_lon) = tile_corner(u64::from(tile.x) + 1, u64::from(tile.y) + 1, zoom);
    LatLonExtent::new(min_lat, min_lon, max_lat, max_lon)
}

fn tile_corner(x: u64, y: u64, zoom: u8) -> (f64, f64) {
    let n = (1u64 << clamp_zoom(zoom)) as f64;

    let lon = x as f64 / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan();

    (lat_rad * 180.0 / PI, lon)
}
