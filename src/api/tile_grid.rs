use crate::api::tile::Tile;
use crate::core::grid::enumerate_tiles_in_bounding_box;
use crate::core::projection::geo_to_tile;
use crate::core::types::LatLonExtent;
use crate::util::coord::LatLon;
use crate::util::error::{AutotagError, check_zoom_level};
use geo_types::{Polygon, Rect};

/// Every tile overlapping a geographic box at one zoom level, sorted by quadkey.
#[derive(Debug, Clone)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    zoom_level: u8,
}

impl TileGrid {
    pub fn builder() -> TileGridBuilder {
        TileGridBuilder::new()
    }

    pub fn from_extent(
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
        zoom_level: u8,
    ) -> Result<Self, AutotagError> {
        let zoom_level = check_zoom_level(zoom_level)?;
        let mut tiles: Vec<Tile> =
            enumerate_tiles_in_bounding_box(min_lat, min_lon, max_lat, max_lon, zoom_level)
                .into_iter()
                .map(|index| Tile::new(index, zoom_level))
                .collect();
        tiles.sort_by(|a, b| a.quadkey.cmp(&b.quadkey));

        Ok(Self { tiles, zoom_level })
    }

    pub fn from_lat_lon_extent(extent: &LatLonExtent, zoom_level: u8) -> Result<Self, AutotagError> {
        Self::from_extent(
            extent.min_lat,
            extent.min_lon,
            extent.max_lat,
            extent.max_lon,
            zoom_level,
        )
    }

    /// Grid for a WGS84 rectangle (`x = lon, y = lat`).
    pub fn from_rect(rect: &Rect<f64>, zoom_level: u8) -> Result<Self, AutotagError> {
        Self::from_extent(
            rect.min().y,
            rect.min().x,
            rect.max().y,
            rect.max().x,
            zoom_level,
        )
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom_level
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn quadkeys(&self) -> Vec<&str> {
        self.tiles.iter().map(|t| t.quadkey.as_str()).collect()
    }

    pub fn get_tile_at(&self, coord: &impl LatLon) -> Option<&Tile> {
        let index = geo_to_tile(coord.lat(), coord.lon(), self.zoom_level);
        self.tiles.iter().find(|tile| tile.index == index)
    }

    pub fn get_tile_by_quadkey(&self, quadkey: &str) -> Option<&Tile> {
        self.tiles
            .binary_search_by(|t| t.quadkey.as_str().cmp(quadkey))
            .ok()
            .map(|i| &self.tiles[i])
    }

    pub fn to_polygons(&self) -> Vec<Polygon<f64>> {
        self.tiles.iter().map(|tile| tile.to_polygon()).collect()
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<&Tile>
    where
        F: Fn(&Tile) -> bool,
    {
        self.tiles.iter().filter(|tile| predicate(tile)).collect()
    }
}

#[derive(Debug, Default)]
pub struct TileGridBuilder {
    zoom_level: Option<u8>,
    extent: Option<LatLonExtent>,
}

impl TileGridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_level(mut self, zoom_level: u8) -> Self {
        self.zoom_level = Some(zoom_level);
        self
    }

    pub fn extent(mut self, min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        self.extent = Some(LatLonExtent::new(min_lat, min_lon, max_lat, max_lon));
        self
    }

    pub fn lat_lon_extent(mut self, extent: LatLonExtent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn rect(mut self, rect: &Rect<f64>) -> Self {
        self.extent = Some(LatLonExtent::new(
            rect.min().y,
            rect.min().x,
            rect.max().y,
            rect.max().x,
        ));
        self
    }

    /// Builds the grid. A missing zoom level reports `InvalidZoomLevel(0)`.
    pub fn build(self) -> Result<TileGrid, AutotagError> {
        let zoom_level = self.zoom_level.unwrap_or(0);
        let extent = self.extent.ok_or_else(|| {
            AutotagError::MalformedBoundingBox("extent must be set".to_string())
        })?;

        TileGrid::from_lat_lon_extent(&extent, zoom_level)
    }
}
