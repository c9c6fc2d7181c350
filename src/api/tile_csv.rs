use crate::api::tile::Tile;
use crate::util::error::AutotagError;
use geo_types::Geometry;
use std::fs::File;
use std::path::Path;

/// Output format for tile outline geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFormat {
    /// Well-Known Text format (e.g., "POLYGON((...))")
    Wkt,
    /// GeoJSON format
    GeoJson,
}

impl GeometryFormat {
    /// Renders a WGS84 geometry as a single CSV field.
    pub fn render(self, geometry: &Geometry<f64>) -> String {
        match self {
            GeometryFormat::Wkt => {
                use wkt::ToWkt;
                geometry.wkt_string()
            }
            GeometryFormat::GeoJson => geojson::Geometry::from(geometry).to_string(),
        }
    }
}

pub trait TilesToCsv {
    fn to_csv(
        &self,
        output_path: impl AsRef<Path>,
        geometry: Option<GeometryFormat>,
    ) -> Result<(), AutotagError>;
}

impl TilesToCsv for [Tile] {
    fn to_csv(
        &self,
        output_path: impl AsRef<Path>,
        geometry: Option<GeometryFormat>,
    ) -> Result<(), AutotagError> {
        tiles_to_csv(self, output_path, geometry)
    }
}

impl TilesToCsv for Vec<Tile> {
    fn to_csv(
        &self,
        output_path: impl AsRef<Path>,
        geometry: Option<GeometryFormat>,
    ) -> Result<(), AutotagError> {
        tiles_to_csv(self, output_path, geometry)
    }
}

/// Writes `quadkey,zoom_level,tile_x,tile_y` rows, plus the tile outline when
/// a geometry format is given.
///
/// # Example
///
/// ```no_run
/// use autotag_rs::{GeometryFormat, TileGrid, tiles_to_csv};
///
/// # fn main() -> Result<(), autotag_rs::AutotagError> {
/// let grid = TileGrid::from_extent(16.8245, 94.7775, 16.8295, 94.7825, 15)?;
/// tiles_to_csv(grid.tiles(), "tiles.csv", Some(GeometryFormat::Wkt))?;
/// # Ok(())
/// # }
/// ```
pub fn tiles_to_csv(
    tiles: &[Tile],
    output_path: impl AsRef<Path>,
    geometry: Option<GeometryFormat>,
) -> Result<(), AutotagError> {
    let out_file = File::create(output_path).map_err(|e| AutotagError::IoError(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(out_file);

    let mut header_row = vec!["quadkey", "zoom_level", "tile_x", "tile_y"];
    if geometry.is_some() {
        header_row.push("geometry");
    }
    writer
        .write_record(&header_row)
        .map_err(|e| AutotagError::CsvError(e.to_string()))?;

    for tile in tiles {
        let mut row = vec![
            tile.quadkey.clone(),
            tile.zoom_level.to_string(),
            tile.tile_x().to_string(),
            tile.tile_y().to_string(),
        ];

        if let Some(format) = geometry {
            row.push(format.render(&Geometry::Polygon(tile.to_polygon())));
        }

        writer
            .write_record(&row)
            .map_err(|e| AutotagError::CsvError(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| AutotagError::CsvError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tile_grid::TileGrid;
    use tempfile::tempdir;

    #[test]
    fn test_tiles_to_csv_without_geometry() -> Result<(), AutotagError> {
        let dir = tempdir().map_err(|e| AutotagError::IoError(e.to_string()))?;
        let path = dir.path().join("tiles.csv");

        let grid = TileGrid::from_extent(-10.0, -10.0, 10.0, 10.0, 2)?;
        grid.tiles().to_csv(&path, None)?;

        let output =
            std::fs::read_to_string(&path).map_err(|e| AutotagError::IoError(e.to_string()))?;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "quadkey,zoom_level,tile_x,tile_y");
        assert_eq!(lines[1], "03,2,1,1");
        assert_eq!(lines.len(), 5);
        Ok(())
    }

    #[test]
    fn test_tiles_to_csv_with_wkt() -> Result<(), AutotagError> {
        let dir = tempdir().map_err(|e| AutotagError::IoError(e.to_string()))?;
        let path = dir.path().join("tiles.csv");

        let tiles = vec![Tile::from_quadkey("213")?];
        tiles.to_csv(&path, Some(GeometryFormat::Wkt))?;

        let output =
            std::fs::read_to_string(&path).map_err(|e| AutotagError::IoError(e.to_string()))?;
        assert!(output.contains("geometry"));
        assert!(output.contains("POLYGON"));
        Ok(())
    }

    #[test]
    fn test_tiles_to_csv_with_geojson() -> Result<(), AutotagError> {
        let dir = tempdir().map_err(|e| AutotagError::IoError(e.to_string()))?;
        let path = dir.path().join("tiles.csv");

        tiles_to_csv(&[Tile::from_quadkey("0")?], &path, Some(GeometryFormat::GeoJson))?;

        let mut reader =
            csv::Reader::from_path(&path).map_err(|e| AutotagError::CsvError(e.to_string()))?;
        let record = reader
            .records()
            .next()
            .ok_or_else(|| AutotagError::CsvError("no rows".to_string()))?
            .map_err(|e| AutotagError::CsvError(e.to_string()))?;
        assert!(record[4].contains("\"Polygon\""));
        Ok(())
    }

    #[test]
    fn test_render_matches_tile_outline() -> Result<(), AutotagError> {
        let tile = Tile::from_quadkey("213")?;
        let outline = Geometry::Polygon(tile.to_polygon());

        assert_eq!(GeometryFormat::Wkt.render(&outline), tile.to_wkt());
        assert_eq!(GeometryFormat::GeoJson.render(&outline), tile.to_geojson());
        Ok(())
    }
}
