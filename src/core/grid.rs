use crate::core::projection::geo_to_tile;
use crate::core::types::TileIndex;
use crate::util::identifier::tile_to_quadkey;

/// Quadkey of the tile containing a latitude/longitude at `zoom`.
///
/// `zoom` is clamped to `0..=MAX_ZOOM_LEVEL`, so the quadkey has at most 23 digits.
pub fn geo_to_quadkey(lat: f64, lon: f64, zoom: u8) -> String {
    tile_to_quadkey(geo_to_tile(lat, lon, zoom), zoom)
}

/// Inclusive corner tiles `(north_west, south_east)` of a geographic box.
///
/// Pixel y grows southward, so the north-west tile comes from
/// `(max_lat, min_lon)` and the south-east tile from `(min_lat, max_lon)`.
pub fn tile_range(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    zoom: u8,
) -> (TileIndex, TileIndex) {
    let min_tile = geo_to_tile(max_lat, min_lon, zoom);
    let max_tile = geo_to_tile(min_lat, max_lon, zoom);
    (min_tile, max_tile)
}

/// Every tile index overlapped by a geographic box, column-major.
///
/// A box crossing the antimeridian (`min_lon > max_lon`) is not unwrapped and
/// yields no tiles.
pub fn enumerate_tiles_in_bounding_box(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    zoom: u8,
) -> Vec<TileIndex> {
    let (min_tile, max_tile) = tile_range(min_lat, min_lon, max_lat, max_lon, zoom);

    (min_tile.x..=max_tile.x)
        .flat_map(|x| (min_tile.y..=max_tile.y).map(move |y| TileIndex::new(x, y)))
        .collect()
}

/// Quadkeys of every tile overlapped by a geographic box, sorted lexicographically.
pub fn enumerate_quadkeys_in_bounding_box(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    zoom: u8,
) -> Vec<String> {
    let mut quadkeys: Vec<String> =
        enumerate_tiles_in_bounding_box(min_lat, min_lon, max_lat, max_lon, zoom)
            .into_iter()
            .map(|tile| tile_to_quadkey(tile, zoom))
            .collect();
    quadkeys.sort();
    quadkeys
}
