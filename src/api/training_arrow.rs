use crate::api::training::{TileSample, TrainingSet};
use crate::util::error::AutotagError;
use arrow_array::{RecordBatch, StringArray, UInt32Array, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use geoarrow_array::IntoArrow;
use geoarrow_array::array::MultiPolygonArray;
use geoarrow_array::builder::MultiPolygonBuilder;
use geoarrow_schema::{Crs, Dimension, Metadata, MultiPolygonType};
use rayon::prelude::*;
use std::sync::Arc;

fn wgs84_metadata() -> Arc<Metadata> {
    let crs = Crs::from_authority_code("EPSG:4326".to_string());
    Arc::new(Metadata::new(crs, None))
}

/// Trait for converting training samples to Arrow arrays.
///
/// Implemented for `[TileSample]` and [`TrainingSet`].
pub trait SamplesToArrow {
    /// Building outlines of each sample as one WGS84 MultiPolygon per tile.
    fn to_arrow_buildings(&self) -> MultiPolygonArray;
    /// One row per tile: quadkey, project_id, task_id, buildings,
    /// filled_pixels, image, mask and the building geometry.
    fn to_record_batch(&self) -> Result<RecordBatch, AutotagError>;
}

fn buildings_array(samples: &[&TileSample]) -> MultiPolygonArray {
    let typ = MultiPolygonType::new(Dimension::XY, wgs84_metadata());
    let outlines: Vec<_> = samples.par_iter().map(|s| s.to_multi_polygon()).collect();
    MultiPolygonBuilder::from_multi_polygons(&outlines, typ).finish()
}

pub(crate) fn samples_to_record_batch(samples: &[&TileSample]) -> Result<RecordBatch, AutotagError> {
    let buildings = buildings_array(samples);

    let filled: Vec<Option<u32>> = samples
        .par_iter()
        .map(|s| u32::try_from(s.to_mask().filled_pixels()).ok())
        .collect();

    let quadkeys: StringArray = samples.iter().map(|s| Some(s.quadkey())).collect();
    let project_ids: UInt64Array = samples.iter().map(|s| Some(s.project_id)).collect();
    let task_ids: UInt64Array = samples.iter().map(|s| Some(s.task_id)).collect();
    let building_counts: UInt32Array = samples
        .iter()
        .map(|s| u32::try_from(s.polygons.len()).ok())
        .collect();
    let images: StringArray = samples
        .iter()
        .map(|s| Some(s.tile.image_file_name()))
        .collect();
    let masks: StringArray = samples
        .iter()
        .map(|s| Some(s.tile.mask_file_name()))
        .collect();

    let geometry_field = buildings.extension_type().to_field("geometry", false);
    let schema = Schema::new(vec![
        Field::new("quadkey", DataType::Utf8, false),
        Field::new("project_id", DataType::UInt64, false),
        Field::new("task_id", DataType::UInt64, false),
        Field::new("buildings", DataType::UInt32, true),
        Field::new("filled_pixels", DataType::UInt32, true),
        Field::new("image", DataType::Utf8, false),
        Field::new("mask", DataType::Utf8, false),
        geometry_field,
    ]);

    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(quadkeys),
            Arc::new(project_ids),
            Arc::new(task_ids),
            Arc::new(building_counts),
            Arc::new(UInt32Array::from(filled)),
            Arc::new(images),
            Arc::new(masks),
            Arc::new(buildings.into_arrow()),
        ],
    )
    .map_err(|e| AutotagError::IoError(e.to_string()))
}

impl SamplesToArrow for [TileSample] {
    fn to_arrow_buildings(&self) -> MultiPolygonArray {
        let samples: Vec<&TileSample> = self.iter().collect();
        buildings_array(&samples)
    }

    fn to_record_batch(&self) -> Result<RecordBatch, AutotagError> {
        let samples: Vec<&TileSample> = self.iter().collect();
        samples_to_record_batch(&samples)
    }
}

impl SamplesToArrow for TrainingSet {
    fn to_arrow_buildings(&self) -> MultiPolygonArray {
        let samples: Vec<&TileSample> = self.iter().collect();
        buildings_array(&samples)
    }

    fn to_record_batch(&self) -> Result<RecordBatch, AutotagError> {
        let samples: Vec<&TileSample> = self.iter().collect();
        samples_to_record_batch(&samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::building::{BuildingFootprint, BuildingRecord};
    use crate::api::training::TrainingConfig;
    use crate::core::types::GeoPoint;
    use arrow_array::Array;
    use geoarrow_array::GeoArrowArray;

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

    fn two_tile_set() -> Result<TrainingSet, AutotagError> {
        let records = vec![
            record(746, 1, &[(16.82455, 94.77755), (16.82460, 94.77760), (16.82450, 94.77765)]),
            record(746, 2, &[(16.82470, 94.77740), (16.82470, 94.77750), (16.82465, 94.77750)]),
            record(750, 3, &[(16.87455, 94.77755), (16.87460, 94.77760), (16.87450, 94.77765)]),
        ];
        TrainingSet::from_records(&records, &TrainingConfig::new(15))
    }

    #[test]
    fn test_buildings_array_has_one_row_per_tile() -> Result<(), AutotagError> {
        let set = two_tile_set()?;
        assert_eq!(set.len(), 2);

        let buildings = set.to_arrow_buildings();
        assert_eq!(buildings.len(), 2);
        Ok(())
    }

    #[test]
    fn test_record_batch_columns() -> Result<(), AutotagError> {
        let set = two_tile_set()?;
        let batch = set.to_record_batch()?;

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 8);
        assert_eq!(batch.schema().field(7).name(), "geometry");

        let quadkeys = batch
            .column_by_name("quadkey")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| AutotagError::IoError("missing quadkey column".to_string()))?;
        assert_eq!(quadkeys.value(0), "132200332312012");
        assert_eq!(quadkeys.value(1), "132200332312230");

        let counts = batch
            .column_by_name("buildings")
            .and_then(|c| c.as_any().downcast_ref::<UInt32Array>())
            .ok_or_else(|| AutotagError::IoError("missing buildings column".to_string()))?;
        assert_eq!(counts.value(0), 1);
        assert_eq!(counts.value(1), 2);

        let task_ids = batch
            .column_by_name("task_id")
            .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
            .ok_or_else(|| AutotagError::IoError("missing task_id column".to_string()))?;
        assert_eq!(task_ids.value(0), 750);
        Ok(())
    }

    #[test]
    fn test_filled_pixels_match_masks() -> Result<(), AutotagError> {
        let set = two_tile_set()?;
        let batch = set.to_record_batch()?;

        let filled = batch
            .column_by_name("filled_pixels")
            .and_then(|c| c.as_any().downcast_ref::<UInt32Array>())
            .ok_or_else(|| AutotagError::IoError("missing filled_pixels column".to_string()))?;

        for (row, (_, mask)) in set.masks().iter().enumerate() {
            assert_eq!(filled.value(row) as usize, mask.filled_pixels());
        }
        Ok(())
    }

    #[test]
    fn test_slice_matches_set() -> Result<(), AutotagError> {
        let set = two_tile_set()?;
        let samples: Vec<TileSample> = set.iter().cloned().collect();

        assert_eq!(samples.to_record_batch()?, set.to_record_batch()?);
        Ok(())
    }
}
