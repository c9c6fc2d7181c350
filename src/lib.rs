//! # autotag-rs
//!
//! Quadkey tile math for pairing aerial imagery tiles with rasterized
//! building masks. There are currently three main entry points.
//!
//! ### 1. `Tile` - Single Tile Operations
//!
//! ```
//! use autotag_rs::Tile;
//!
//! # fn main() -> Result<(), autotag_rs::AutotagError> {
//! let tile = Tile::from_wgs84(&(16.8245079588, 94.7774954283), 15)?;
//! println!("{}", tile.quadkey);
//! let outline = tile.to_polygon();
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `TileGrid` - Every Tile Under a Bounding Box
//!
//! ```
//! use autotag_rs::TileGrid;
//!
//! # fn main() -> Result<(), autotag_rs::AutotagError> {
//! let grid = TileGrid::builder()
//!     .zoom_level(15)
//!     .extent(16.8245079588, 94.7774954283, 16.8295079588, 94.7824954283)
//!     .build()?;
//!
//! for quadkey in grid.quadkeys() {
//!     println!("{}", quadkey);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. `TrainingSet` - Building Outlines Grouped per Tile
//!
//! ```no_run
//! use autotag_rs::{TrainingConfig, TrainingSet, read_buildings_csv};
//!
//! # fn main() -> Result<(), autotag_rs::AutotagError> {
//! let records = read_buildings_csv("3655-746-buildings.csv")?;
//! let set = TrainingSet::from_records(&records, &TrainingConfig::new(18))?;
//!
//! for (quadkey, mask) in set.masks() {
//!     println!("{} {}", quadkey, mask.filled_pixels());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The coordinate math in [`core`] is pure: latitudes and longitudes outside
//! the Web Mercator range are clamped rather than rejected. Boxes crossing the
//! antimeridian are not unwrapped.

pub mod api;
pub mod core;
pub mod util;

pub use crate::api::{
    BuildingFootprint, BuildingRecord, GeometryFormat, ROWS_PER_BATCH, SamplesToArrow,
    SamplesToGeoParquet, TaskBounds, Tile, TileGrid, TileGridBuilder, TileMask, TileSample,
    TilesToCsv, TrainingConfig, TrainingSet, TrainingSetBuilder, VALIDATED_STATUS,
    buildings_from_overpass_json, overpass_query, read_buildings_csv, read_region_file,
    read_tasks_csv, records_for_task, tasks_from_region_json, tiles_to_csv, write_buildings_csv,
    write_geoparquet, write_tasks_csv,
};
pub use crate::core::{
    GeoPoint, LatLonExtent, MAX_LATITUDE, MAX_LONGITUDE, MAX_ZOOM_LEVEL, MIN_LATITUDE,
    MIN_LONGITUDE, MIN_ZOOM_LEVEL, PixelPoint, TILE_SIZE, TileIndex, axis_aligned_box_to_extent,
    clamp_zoom, clip, enumerate_quadkeys_in_bounding_box, enumerate_tiles_in_bounding_box,
    extent_to_polygon,
    geo_to_pixel, geo_to_quadkey, geo_to_tile, map_size, pixel_offset_within_tile, pixel_to_geo,
    pixel_to_tile, polygon_entirely_within_single_tile, polygon_to_pixels,
    polygon_to_tile_local_pixels, tile_bounds, tile_range, tile_to_pixel,
};
pub use crate::util::{
    AutotagError, LatLon, child_quadkeys, parent_quadkey, polygon_to_vertices, quadkey_to_tile,
    tile_to_quadkey, vertices_to_polygon,
};

pub use geo_types;
pub use geoarrow_array;
pub use geoarrow_schema;
pub use geoparquet;

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Rect, coord};

    const REGION: &str = r#"{
        "projectId": 3655,
        "tasks": {"type": "FeatureCollection", "features": [{
            "type": "Feature",
            "geometry": {"type": "MultiPolygon", "coordinates": [[[
                [94.7774954283, 16.8245079588],
                [94.7774954283, 16.8295079588],
                [94.7824954283, 16.8295079588],
                [94.7824954283, 16.8245079588],
                [94.7774954283, 16.8245079588]
            ]]]},
            "properties": {"taskId": 746, "taskStatus": "VALIDATED"}
        }]}
    }"#;

    const OVERPASS: &str = r#"{"elements": [
        {"type": "way", "id": 100, "nodes": [1, 2, 3, 1]},
        {"type": "way", "id": 101, "nodes": [4, 5, 6, 4]},
        {"type": "node", "id": 1, "lat": 16.82455, "lon": 94.77755},
        {"type": "node", "id": 2, "lat": 16.82460, "lon": 94.77760},
        {"type": "node", "id": 3, "lat": 16.82450, "lon": 94.77765},
        {"type": "node", "id": 4, "lat": 16.8250, "lon": 94.7780},
        {"type": "node", "id": 5, "lat": 16.8250, "lon": 94.7800},
        {"type": "node", "id": 6, "lat": 16.8255, "lon": 94.7800}
    ]}"#;

    #[test]
    fn test_end_to_end_workflow() -> Result<(), AutotagError> {
        let config = TrainingConfig::new(15);

        let tasks = tasks_from_region_json(REGION, &config)?;
        assert_eq!(tasks.len(), 1);

        let task = &tasks[0];
        assert!(overpass_query(&task.extent).contains("16.8245079588"));

        let grid = TileGrid::from_lat_lon_extent(&task.extent, config.zoom_level)?;
        assert_eq!(grid.len(), 4);

        let records = records_for_task(task, buildings_from_overpass_json(OVERPASS)?);
        let set = TrainingSet::from_records(&records, &config)?;

        assert_eq!(set.len(), 1);
        assert_eq!(set.skipped(), 1);
        for sample in set.iter() {
            assert!(grid.get_tile_by_quadkey(sample.quadkey()).is_some());
            assert!(sample.to_mask().filled_pixels() > 0);
        }
        assert_eq!(set.to_record_batch()?.num_rows(), 1);
        Ok(())
    }

    #[test]
    fn test_core_pipeline_reference_values() {
        let pixel = geo_to_pixel(16.8245079588, 94.7774954283, 15);
        let tile = pixel_to_tile(pixel);
        assert_eq!(tile_to_quadkey(tile, 15), "132200332312230");
        assert_eq!(geo_to_quadkey(16.8245079588, 94.7774954283, 15), "132200332312230");
        assert_eq!(pixel_offset_within_tile(pixel), PixelPoint::new(220, 26));
    }

    #[test]
    fn test_single_tile_box_matches_point_quadkey() {
        let quadkeys = enumerate_quadkeys_in_bounding_box(51.5070, -0.1280, 51.5072, -0.1278, 14);
        assert_eq!(quadkeys.len(), 1);
        assert_eq!(quadkeys[0], geo_to_quadkey(51.5071, -0.1279, 14));
    }

    #[test]
    fn test_using_geo_types_macros() -> Result<(), AutotagError> {
        let rect = Rect::new(
            coord! { x: -10.0, y: -10.0 },
            coord! { x: 10.0, y: 10.0 },
        );
        let grid = TileGrid::from_rect(&rect, 1)?;
        assert_eq!(grid.quadkeys(), vec!["0", "1", "2", "3"]);
        Ok(())
    }

    #[test]
    fn test_tile_consistency_with_grid() -> Result<(), AutotagError> {
        let direct = Tile::from_wgs84(&(16.8295, 94.7800), 15)?;
        let grid = TileGrid::from_extent(16.8245079588, 94.7774954283, 16.8295079588, 94.7824954283, 15)?;

        let from_grid = grid.get_tile_at(&(16.8295, 94.7800));
        assert_eq!(from_grid, Some(&direct));
        Ok(())
    }

    #[test]
    fn test_quadkey_roundtrip_through_tile() -> Result<(), AutotagError> {
        let tile = Tile::from_wgs84(&GeoPoint::new(-33.8688, 151.2093), 17)?;
        let (index, zoom) = quadkey_to_tile(&tile.quadkey)?;
        assert_eq!(index, tile.index);
        assert_eq!(zoom, 17);
        Ok(())
    }
}
