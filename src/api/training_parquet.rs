use crate::api::training::{TileSample, TrainingSet};
use crate::api::training_arrow::{SamplesToArrow, samples_to_record_batch};
use crate::util::error::AutotagError;
use arrow_array::RecordBatch;
use geoparquet::writer::{
    GeoParquetRecordBatchEncoder, GeoParquetWriterEncoding, GeoParquetWriterOptionsBuilder,
};
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Training tiles per Arrow batch, and so per Parquet row-group write.
pub const ROWS_PER_BATCH: usize = 4096;

/// Writes batches that share one schema, with a GeoArrow geometry column,
/// as a single WKB-encoded GeoParquet file.
pub fn write_geoparquet(batches: &[RecordBatch], path: impl AsRef<Path>) -> Result<(), AutotagError> {
    let Some(first) = batches.first() else {
        return Err(AutotagError::IoError(
            "no record batches to write".to_string(),
        ));
    };

    let options = GeoParquetWriterOptionsBuilder::default()
        .set_encoding(GeoParquetWriterEncoding::WKB)
        .build();
    let mut encoder = GeoParquetRecordBatchEncoder::try_new(&first.schema(), &options)
        .map_err(|e| AutotagError::IoError(e.to_string()))?;

    let file = File::create(path).map_err(|e| AutotagError::IoError(e.to_string()))?;
    let mut writer = ArrowWriter::try_new(file, encoder.target_schema(), None)
        .map_err(|e| AutotagError::IoError(e.to_string()))?;

    for batch in batches {
        let encoded = encoder
            .encode_record_batch(batch)
            .map_err(|e| AutotagError::IoError(e.to_string()))?;
        writer
            .write(&encoded)
            .map_err(|e| AutotagError::IoError(e.to_string()))?;
    }

    // geo metadata carries the bbox of everything encoded above
    let kv_metadata = encoder
        .into_keyvalue()
        .map_err(|e| AutotagError::IoError(e.to_string()))?;
    writer.append_key_value_metadata(kv_metadata);
    writer
        .finish()
        .map_err(|e| AutotagError::IoError(e.to_string()))?;

    Ok(())
}

fn write_samples(
    samples: &[&TileSample],
    rows_per_batch: usize,
    path: impl AsRef<Path>,
) -> Result<(), AutotagError> {
    let mut batches = samples
        .chunks(rows_per_batch.max(1))
        .map(samples_to_record_batch)
        .collect::<Result<Vec<_>, _>>()?;
    if batches.is_empty() {
        batches.push(samples_to_record_batch(&[])?);
    }

    info!(
        "writing {} training tiles in {} batches",
        samples.len(),
        batches.len()
    );
    write_geoparquet(&batches, path)
}

/// Writes training samples, building outlines included, to GeoParquet.
pub trait SamplesToGeoParquet: SamplesToArrow {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), AutotagError>;
}

impl SamplesToGeoParquet for [TileSample] {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), AutotagError> {
        let samples: Vec<&TileSample> = self.iter().collect();
        write_samples(&samples, ROWS_PER_BATCH, path)
    }
}

impl SamplesToGeoParquet for TrainingSet {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), AutotagError> {
        let samples: Vec<&TileSample> = self.iter().collect();
        write_samples(&samples, ROWS_PER_BATCH, path)
    }
}
