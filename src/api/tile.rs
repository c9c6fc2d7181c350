use crate::core::geometry::extent_to_polygon;
use crate::core::projection::{geo_to_tile, tile_bounds, tile_to_pixel};
use crate::core::types::{GeoPoint, LatLonExtent, PixelPoint, TileIndex};
use crate::util::coord::LatLon;
use crate::util::error::{AutotagError, check_zoom_level};
use crate::util::identifier::{quadkey_to_tile, tile_to_quadkey};
use geo_types::Polygon;

/// A single 256x256 imagery tile addressed by its quadkey.
///
/// # Example
///
/// ```
/// use autotag_rs::Tile;
///
/// # fn main() -> Result<(), autotag_rs::AutotagError> {
/// let tile = Tile::from_wgs84(&(16.8245079588, 94.7774954283), 15)?;
/// assert_eq!(tile.quadkey, "132200332312230");
///
/// let restored = Tile::from_quadkey(&tile.quadkey)?;
/// assert_eq!(tile, restored);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Quadkey of the tile, one digit per zoom level
    pub quadkey: String,
    /// Column/row of the tile in the zoom level's grid
    pub index: TileIndex,
    /// Zoom level (1-23)
    pub zoom_level: u8,
}

impl Tile {
    pub(crate) fn new(index: TileIndex, zoom_level: u8) -> Self {
        Self {
            quadkey: tile_to_quadkey(index, zoom_level),
            index,
            zoom_level,
        }
    }

    /// Create a Tile from its column/row at a zoom level.
    ///
    /// Fails when the zoom is out of range or the index lies outside the grid.
    pub fn from_index(index: TileIndex, zoom: u8) -> Result<Self, AutotagError> {
        let zoom = check_zoom_level(zoom)?;
        let tiles = 1u64 << zoom;
        if u64::from(index.x) >= tiles || u64::from(index.y) >= tiles {
            return Err(AutotagError::TileOutOfRange(format!(
                "tile ({}, {}) outside zoom {} grid",
                index.x, index.y, zoom
            )));
        }
        Ok(Self::new(index, zoom))
    }

    /// Create a Tile from a quadkey string.
    pub fn from_quadkey(quadkey: &str) -> Result<Self, AutotagError> {
        let (index, zoom) = quadkey_to_tile(quadkey)?;
        let zoom = check_zoom_level(zoom)?;

        Ok(Self {
            quadkey: quadkey.to_string(),
            index,
            zoom_level: zoom,
        })
    }

    /// Create the Tile containing a WGS84 position.
    ///
    /// # Example
    /// ```
    /// use autotag_rs::{GeoPoint, Tile};
    /// use geo_types::Point;
    ///
    /// # fn main() -> Result<(), autotag_rs::AutotagError> {
    /// // (lat, lon) tuple
    /// let a = Tile::from_wgs84(&(51.5074, -0.1278), 10)?;
    /// // geo_types Point, x = lon
    /// let b = Tile::from_wgs84(&Point::new(-0.1278, 51.5074), 10)?;
    /// let c = Tile::from_wgs84(&GeoPoint::new(51.5074, -0.1278), 10)?;
    /// assert_eq!(a, b);
    /// assert_eq!(b, c);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_wgs84(coord: &impl LatLon, zoom: u8) -> Result<Self, AutotagError> {
        let zoom = check_zoom_level(zoom)?;
        Ok(Self::new(geo_to_tile(coord.lat(), coord.lon(), zoom), zoom))
    }

    pub fn tile_x(&self) -> u32 {
        self.index.x
    }

    pub fn tile_y(&self) -> u32 {
        self.index.y
    }

    /// North-west corner in global pixel coordinates.
    pub fn pixel_origin(&self) -> PixelPoint {
        tile_to_pixel(self.index)
    }

    /// Geographic extent of the tile.
    pub fn bounds(&self) -> LatLonExtent {
        tile_bounds(self.index, self.zoom_level)
    }

    pub fn center(&self) -> GeoPoint {
        self.bounds().center()
    }

    /// True when the tile covers `coord`, using the same rounding as [`Tile::from_wgs84`].
    pub fn contains(&self, coord: &impl LatLon) -> bool {
        geo_to_tile(coord.lat(), coord.lon(), self.zoom_level) == self.index
    }

    /// The enclosing tile one zoom level up, or `None` at the lowest zoom.
    pub fn parent(&self) -> Option<Tile> {
        if self.zoom_level <= 1 {
            return None;
        }
        Some(Self::new(
            TileIndex::new(self.index.x >> 1, self.index.y >> 1),
            self.zoom_level - 1,
        ))
    }

    /// Outline of the tile as a WGS84 polygon (`x = lon, y = lat`).
    pub fn to_polygon(&self) -> Polygon<f64> {
        extent_to_polygon(&self.bounds())
    }

    /// Outline as Well-Known Text.
    pub fn to_wkt(&self) -> String {
        use wkt::ToWkt;
        self.to_polygon().wkt_string()
    }

    /// Outline as a GeoJSON geometry string.
    pub fn to_geojson(&self) -> String {
        geojson::Geometry::from(&self.to_polygon()).to_string()
    }

    /// File name of the aerial image for this tile.
    pub fn image_file_name(&self) -> String {
        format!("a{}.jpeg", self.quadkey)
    }

    /// File name of the rasterized building mask for this tile.
    pub fn mask_file_name(&self) -> String {
        format!("a{}_truth.jpeg", self.quadkey)
    }
}
