use crate::core::projection::{geo_to_pixel, pixel_offset_within_tile, pixel_to_tile};
use crate::core::types::{LatLonExtent, PixelPoint};
use crate::util::coord::LatLon;
use crate::util::error::AutotagError;
use crate::util::identifier::tile_to_quadkey;
use geo_types::{Coord, LineString, Polygon};

/// Projects every vertex onto the global pixel plane at `zoom`.
///
/// The result is in global pixels; use [`polygon_to_tile_local_pixels`] to get
/// offsets that can be drawn onto a single 256x256 tile.
pub fn polygon_to_pixels<C: LatLon>(points: &[C], zoom: u8) -> Vec<PixelPoint> {
    points
        .iter()
        .map(|p| geo_to_pixel(p.lat(), p.lon(), zoom))
        .collect()
}

/// True when every vertex falls in the same tile. An empty polygon is vacuously inside.
///
/// Comparing tile indices is equivalent to comparing quadkeys at a fixed zoom.
pub fn polygon_entirely_within_single_tile<C: LatLon>(points: &[C], zoom: u8) -> bool {
    let mut tiles = points
        .iter()
        .map(|p| pixel_to_tile(geo_to_pixel(p.lat(), p.lon(), zoom)));

    match tiles.next() {
        Some(first) => tiles.all(|t| t == first),
        None => true,
    }
}

/// Quadkey and tile-local pixel vertices of a polygon contained in one tile.
///
/// Returns `None` for an empty polygon or one whose vertices span several tiles.
pub fn polygon_to_tile_local_pixels<C: LatLon>(
    points: &[C],
    zoom: u8,
) -> Option<(String, Vec<PixelPoint>)> {
    let pixels = polygon_to_pixels(points, zoom);
    let tile = pixel_to_tile(*pixels.first()?);

    if pixels.iter().any(|p| pixel_to_tile(*p) != tile) {
        return None;
    }

    let local = pixels.into_iter().map(pixel_offset_within_tile).collect();
    Some((tile_to_quadkey(tile, zoom), local))
}

/// Validates a closed, axis-aligned 5-point ring and returns its extent.
///
/// Every consecutive pair of vertices must differ in exactly one of latitude
/// or longitude. A zero-area ring (repeated vertices) therefore fails.
pub fn axis_aligned_box_to_extent<C: LatLon>(ring: &[C]) -> Result<LatLonExtent, AutotagError> {
    if ring.len() != 5 {
        return Err(AutotagError::MalformedBoundingBox(format!(
            "expected 5 coordinates but found {}",
            ring.len()
        )));
    }

    let first = ring[0].to_geo_point();
    let last = ring[4].to_geo_point();
    if first != last {
        return Err(AutotagError::MalformedBoundingBox(format!(
            "first and last coordinates differ: {:?} - {:?}",
            first, last
        )));
    }

    for pair in ring.windows(2) {
        let same_lat = pair[0].lat() == pair[1].lat();
        let same_lon = pair[0].lon() == pair[1].lon();
        if same_lat == same_lon {
            return Err(AutotagError::MalformedBoundingBox(format!(
                "edge {:?} -> {:?} is not perpendicular to the equator",
                pair[0].to_geo_point(),
                pair[1].to_geo_point()
            )));
        }
    }

    let extent = ring.iter().fold(
        LatLonExtent::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |acc, p| {
            LatLonExtent::new(
                acc.min_lat.min(p.lat()),
                acc.min_lon.min(p.lon()),
                acc.max_lat.max(p.lat()),
                acc.max_lon.max(p.lon()),
            )
        },
    );

    Ok(extent)
}

/// Builds a closed WGS84 rectangle (`x = lon, y = lat`) for an extent.
pub fn extent_to_polygon(extent: &LatLonExtent) -> Polygon<f64> {
    let coords = vec![
        Coord { x: extent.min_lon, y: extent.max_lat },
        Coord { x: extent.max_lon, y: extent.max_lat },
        Coord { x: extent.max_lon, y: extent.min_lat },
        Coord { x: extent.min_lon, y: extent.min_lat },
        Coord { x: extent.min_lon, y: extent.max_lat },
    ];

    Polygon::new(LineString::from(coords), vec![])
}
