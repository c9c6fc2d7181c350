use crate::api::building::BuildingRecord;
use crate::api::task::VALIDATED_STATUS;
use crate::api::tile::Tile;
use crate::api::tile_csv::GeometryFormat;
use crate::core::constants::TILE_SIZE;
use crate::core::geometry::polygon_to_tile_local_pixels;
use crate::core::projection::pixel_to_geo;
use crate::core::types::{GeoPoint, PixelPoint};
use crate::util::coord::vertices_to_polygon;
use crate::util::error::{AutotagError, check_zoom_level};
use geo::{BoundingRect, Intersects};
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Settings for one training-set run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub zoom_level: u8,
    pub task_status: String,
    /// Adds the building outlines of each tile to the manifest in this format.
    pub geometry: Option<GeometryFormat>,
}

impl TrainingConfig {
    /// # Example
    /// ```
    /// use autotag_rs::{GeometryFormat, TrainingConfig};
    ///
    /// let config = TrainingConfig::new(18)
    ///     .task_status("MAPPED")
    ///     .geometry(GeometryFormat::Wkt);
    /// assert_eq!(config.zoom_level, 18);
    /// ```
    pub fn new(zoom_level: u8) -> Self {
        Self {
            zoom_level,
            task_status: VALIDATED_STATUS.to_string(),
            geometry: None,
        }
    }

    /// Only tasks in this tasking-manager status are used.
    pub fn task_status(mut self, status: impl Into<String>) -> Self {
        self.task_status = status.into();
        self
    }

    pub fn geometry(mut self, format: GeometryFormat) -> Self {
        self.geometry = Some(format);
        self
    }
}

/// All building outlines that fall inside one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSample {
    pub tile: Tile,
    pub project_id: u64,
    pub task_id: u64,
    /// Tile-local pixel outlines, one per building, in input order
    pub polygons: Vec<Vec<PixelPoint>>,
}

impl TileSample {
    pub fn quadkey(&self) -> &str {
        &self.tile.quadkey
    }

    pub fn to_mask(&self) -> TileMask {
        TileMask::rasterize(&self.polygons)
    }

    /// Building outlines back in WGS84 (`x = lon, y = lat`), snapped to the
    /// pixels they were rasterized on.
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        let origin = self.tile.pixel_origin();
        let zoom = self.tile.zoom_level;

        let polygons = self
            .polygons
            .iter()
            .map(|outline| {
                let vertices: Vec<GeoPoint> = outline
                    .iter()
                    .map(|p| pixel_to_geo(PixelPoint::new(origin.x + p.x, origin.y + p.y), zoom))
                    .collect();
                vertices_to_polygon(&vertices)
            })
            .collect();

        MultiPolygon::new(polygons)
    }
}

/// Quadkey-keyed training samples for one zoom level. Immutable once built.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    zoom_level: u8,
    geometry: Option<GeometryFormat>,
    samples: BTreeMap<String, TileSample>,
    skipped: usize,
}

impl TrainingSet {
    pub fn builder(config: &TrainingConfig) -> Result<TrainingSetBuilder, AutotagError> {
        TrainingSetBuilder::new(config)
    }

    /// Builds a set from building records, projecting outlines in parallel.
    pub fn from_records(
        records: &[BuildingRecord],
        config: &TrainingConfig,
    ) -> Result<Self, AutotagError> {
        let zoom = check_zoom_level(config.zoom_level)?;

        let projected: Vec<_> = records
            .par_iter()
            .map(|r| polygon_to_tile_local_pixels(&r.footprint.vertices, zoom))
            .collect();

        let mut builder = TrainingSetBuilder::new(config)?;
        for (record, polygon) in records.iter().zip(projected) {
            builder.insert_projected(record, polygon)?;
        }

        Ok(builder.build())
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom_level
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of buildings left out because they span more than one tile.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn get(&self, quadkey: &str) -> Option<&TileSample> {
        self.samples.get(quadkey)
    }

    /// Samples in quadkey order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSample> {
        self.samples.values()
    }

    pub fn quadkeys(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    /// Rasterizes every sample, in quadkey order.
    pub fn masks(&self) -> Vec<(&str, TileMask)> {
        let samples: Vec<&TileSample> = self.samples.values().collect();
        samples
            .into_par_iter()
            .map(|s| (s.quadkey(), s.to_mask()))
            .collect()
    }

    /// Writes `quadkey,project_id,task_id,buildings,image,mask`, one row per tile.
    ///
    /// A trailing `geometry` column holds the building outlines when the
    /// config asked for a geometry format.
    pub fn write_manifest(&self, path: impl AsRef<Path>) -> Result<(), AutotagError> {
        let file = File::create(path).map_err(|e| AutotagError::IoError(e.to_string()))?;
        let mut writer = csv::Writer::from_writer(file);

        let mut header_row = vec!["quadkey", "project_id", "task_id", "buildings", "image", "mask"];
        if self.geometry.is_some() {
            header_row.push("geometry");
        }
        writer
            .write_record(&header_row)
            .map_err(|e| AutotagError::CsvError(e.to_string()))?;

        for sample in self.iter() {
            let mut row = vec![
                sample.quadkey().to_string(),
                sample.project_id.to_string(),
                sample.task_id.to_string(),
                sample.polygons.len().to_string(),
                sample.tile.image_file_name(),
                sample.tile.mask_file_name(),
            ];
            if let Some(format) = self.geometry {
                row.push(format.render(&Geometry::MultiPolygon(sample.to_multi_polygon())));
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
}

/// Accumulates building outlines per quadkey before freezing them into a [`TrainingSet`].
#[derive(Debug)]
pub struct TrainingSetBuilder {
    zoom_level: u8,
    geometry: Option<GeometryFormat>,
    samples: BTreeMap<String, TileSample>,
    skipped: usize,
}

impl TrainingSetBuilder {
    pub fn new(config: &TrainingConfig) -> Result<Self, AutotagError> {
        Ok(Self {
            zoom_level: check_zoom_level(config.zoom_level)?,
            geometry: config.geometry,
            samples: BTreeMap::new(),
            skipped: 0,
        })
    }

    /// Adds one building. Returns `false` when it spans several tiles and was left out.
    pub fn insert(&mut self, record: &BuildingRecord) -> Result<bool, AutotagError> {
        let projected = polygon_to_tile_local_pixels(&record.footprint.vertices, self.zoom_level);
        self.insert_projected(record, projected)
    }

    fn insert_projected(
        &mut self,
        record: &BuildingRecord,
        projected: Option<(String, Vec<PixelPoint>)>,
    ) -> Result<bool, AutotagError> {
        let Some((quadkey, polygon)) = projected else {
            debug!(
                way_id = record.footprint.way_id,
                "building spans more than one tile"
            );
            self.skipped += 1;
            return Ok(false);
        };

        match self.samples.get_mut(&quadkey) {
            Some(sample) => {
                // Latest record decides which task a shared tile is filed under
                sample.project_id = record.project_id;
                sample.task_id = record.task_id;
                sample.polygons.push(polygon);
            }
            None => {
                let tile = Tile::from_quadkey(&quadkey)?;
                self.samples.insert(
                    quadkey,
                    TileSample {
                        tile,
                        project_id: record.project_id,
                        task_id: record.task_id,
                        polygons: vec![polygon],
                    },
                );
            }
        }

        Ok(true)
    }

    pub fn build(self) -> TrainingSet {
        info!(
            "found {} tiles containing complete buildings, {} buildings spanned tiles",
            self.samples.len(),
            self.skipped
        );

        TrainingSet {
            zoom_level: self.zoom_level,
            geometry: self.geometry,
            samples: self.samples,
            skipped: self.skipped,
        }
    }
}

/// A 256x256 single-channel building mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMask {
    data: Vec<u8>,
}

impl TileMask {
    /// Value of pixels covered by a building.
    pub const FILL: u8 = 255;

    pub fn empty() -> Self {
        let size = TILE_SIZE as usize;
        Self {
            data: vec![0; size * size],
        }
    }

    /// Fills every pixel whose integer coordinate lies inside or on the edge of an outline.
    pub fn rasterize(polygons: &[Vec<PixelPoint>]) -> Self {
        let mut mask = Self::empty();
        for polygon in polygons {
            mask.fill_polygon(polygon);
        }
        mask
    }

    fn fill_polygon(&mut self, vertices: &[PixelPoint]) {
        let coords: Vec<Coord<f64>> = vertices
            .iter()
            .map(|p| Coord {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect();
        let polygon = Polygon::new(LineString::from(coords), vec![]);

        let Some(bounds) = polygon.bounding_rect() else {
            return;
        };

        let last = f64::from(TILE_SIZE - 1);
        let x0 = bounds.min().x.max(0.0) as usize;
        let y0 = bounds.min().y.max(0.0) as usize;
        let x1 = bounds.max().x.min(last) as usize;
        let y1 = bounds.max().y.min(last) as usize;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel = Coord {
                    x: x as f64,
                    y: y as f64,
                };
                if polygon.intersects(&pixel) {
                    self.data[y * TILE_SIZE as usize + x] = Self::FILL;
                }
            }
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= TILE_SIZE || y >= TILE_SIZE {
            return None;
        }
        Some(self.data[(y * TILE_SIZE + x) as usize])
    }

    pub fn filled_pixels(&self) -> usize {
        self.data.iter().filter(|&&v| v == Self::FILL).count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::building::BuildingFootprint;
    use crate::core::types::GeoPoint;

    fn record(task_id: u64, way_id: u64, vertices: &[(f64, f64)]) -> BuildingRecord {
        BuildingRecord {
            project_id: 3655,
            task_id,
            footprint: BuildingFootprint {
                way_id,
                vertices: vertices.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect(),
            },
        }
    }

    fn sample_records() -> Vec<BuildingRecord> {
        vec![
            record(746, 1, &[(16.82455, 94.77755), (16.82460, 94.77760), (16.82450, 94.77765)]),
            record(747, 2, &[(16.82470, 94.77740), (16.82470, 94.77750), (16.82465, 94.77750)]),
            // crosses the tile edge at lon 94.779052734375
            record(746, 3, &[(16.8250, 94.7780), (16.8250, 94.7800), (16.8255, 94.7800)]),
        ]
    }

    #[test]
    fn test_training_set_groups_by_quadkey() -> Result<(), AutotagError> {
        let set = TrainingSet::from_records(&sample_records(), &TrainingConfig::new(15))?;

        assert_eq!(set.len(), 1);
        assert_eq!(set.skipped(), 1);
        assert_eq!(set.zoom_level(), 15);

        let sample = set.get("132200332312230").unwrap();
        assert_eq!(sample.polygons.len(), 2);
        assert_eq!(sample.task_id, 747);
        assert_eq!(
            sample.polygons[0],
            vec![
                PixelPoint::new(221, 25),
                PixelPoint::new(222, 24),
                PixelPoint::new(223, 26),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_builder_matches_parallel_construction() -> Result<(), AutotagError> {
        let config = TrainingConfig::new(15);
        let records = sample_records();

        let mut builder = TrainingSet::builder(&config)?;
        let accepted: Vec<bool> = records
            .iter()
            .map(|r| builder.insert(r))
            .collect::<Result<_, _>>()?;
        assert_eq!(accepted, vec![true, true, false]);

        let sequential = builder.build();
        let parallel = TrainingSet::from_records(&records, &config)?;

        let a: Vec<_> = sequential.iter().collect();
        let b: Vec<_> = parallel.iter().collect();
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        let result = TrainingSet::from_records(&sample_records(), &TrainingConfig::new(0));
        assert!(matches!(result, Err(AutotagError::InvalidZoomLevel(0))));
    }

    #[test]
    fn test_rasterize_square() {
        let square = vec![
            PixelPoint::new(10, 10),
            PixelPoint::new(19, 10),
            PixelPoint::new(19, 19),
            PixelPoint::new(10, 19),
        ];
        let mask = TileMask::rasterize(&[square]);

        assert_eq!(mask.filled_pixels(), 100);
        assert_eq!(mask.get(10, 10), Some(TileMask::FILL));
        assert_eq!(mask.get(15, 15), Some(TileMask::FILL));
        assert_eq!(mask.get(20, 15), Some(0));
        assert_eq!(mask.get(256, 0), None);
        assert_eq!(mask.as_bytes().len(), 256 * 256);
    }

    #[test]
    fn test_masks_follow_quadkey_order() -> Result<(), AutotagError> {
        let set = TrainingSet::from_records(&sample_records(), &TrainingConfig::new(18))?;
        let masks = set.masks();

        assert_eq!(masks.len(), set.len());
        let quadkeys: Vec<&str> = set.quadkeys().collect();
        let mask_keys: Vec<&str> = masks.iter().map(|(q, _)| *q).collect();
        assert_eq!(quadkeys, mask_keys);
        assert!(masks.iter().all(|(_, m)| m.filled_pixels() > 0));
        Ok(())
    }

    #[test]
    fn test_write_manifest() -> Result<(), AutotagError> {
        let set = TrainingSet::from_records(&sample_records(), &TrainingConfig::new(15))?;

        let dir = tempfile::tempdir().map_err(|e| AutotagError::IoError(e.to_string()))?;
        let path = dir.path().join("manifest.csv");
        set.write_manifest(&path)?;

        let output =
            std::fs::read_to_string(&path).map_err(|e| AutotagError::IoError(e.to_string()))?;
        assert!(output.contains(
            "132200332312230,3655,747,2,a132200332312230.jpeg,a132200332312230_truth.jpeg"
        ));
        Ok(())
    }

    #[test]
    fn test_manifest_geometry_column_follows_config() -> Result<(), AutotagError> {
        let config = TrainingConfig::new(15).geometry(GeometryFormat::Wkt);
        let set = TrainingSet::from_records(&sample_records(), &config)?;

        let dir = tempfile::tempdir().map_err(|e| AutotagError::IoError(e.to_string()))?;
        let path = dir.path().join("manifest.csv");
        set.write_manifest(&path)?;

        let mut reader =
            csv::Reader::from_path(&path).map_err(|e| AutotagError::CsvError(e.to_string()))?;
        let headers = reader
            .headers()
            .map_err(|e| AutotagError::CsvError(e.to_string()))?
            .clone();
        assert_eq!(headers.len(), 7);
        assert_eq!(&headers[6], "geometry");

        let record = reader
            .records()
            .next()
            .ok_or_else(|| AutotagError::CsvError("no rows".to_string()))?
            .map_err(|e| AutotagError::CsvError(e.to_string()))?;
        assert!(record[6].starts_with("MULTIPOLYGON"));
        Ok(())
    }

    #[test]
    fn test_multi_polygon_snaps_back_near_source() -> Result<(), AutotagError> {
        let set = TrainingSet::from_records(&sample_records(), &TrainingConfig::new(15))?;
        let sample = set
            .get("132200332312230")
            .ok_or_else(|| AutotagError::InvalidQuadkey("132200332312230".to_string()))?;

        let outlines = sample.to_multi_polygon();
        assert_eq!(outlines.0.len(), 2);

        let first = outlines.0[0].exterior().0[0];
        assert!((first.x - 94.77755).abs() < 1e-4);
        assert!((first.y - 16.82455).abs() < 1e-4);
        assert!(sample.tile.to_polygon().intersects(&first));
        Ok(())
    }
}
