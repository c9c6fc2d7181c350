use crate::api::training::TrainingConfig;
use crate::core::geometry::axis_aligned_box_to_extent;
use crate::core::types::LatLonExtent;
use crate::util::error::AutotagError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Task status kept by default when reading a region.
pub const VALIDATED_STATUS: &str = "VALIDATED";

/// One tasking-manager work unit, reduced to its rectangular extent.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBounds {
    pub project_id: u64,
    pub task_id: u64,
    pub extent: LatLonExtent,
}

/// Flat CSV row for a [`TaskBounds`].
#[derive(Debug, Serialize, Deserialize)]
struct TaskRow {
    task_id: u64,
    project_id: u64,
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

impl From<&TaskBounds> for TaskRow {
    fn from(t: &TaskBounds) -> Self {
        Self {
            task_id: t.task_id,
            project_id: t.project_id,
            min_lat: t.extent.min_lat,
            min_lon: t.extent.min_lon,
            max_lat: t.extent.max_lat,
            max_lon: t.extent.max_lon,
        }
    }
}

impl From<TaskRow> for TaskBounds {
    fn from(r: TaskRow) -> Self {
        Self {
            project_id: r.project_id,
            task_id: r.task_id,
            extent: LatLonExtent::new(r.min_lat, r.min_lon, r.max_lat, r.max_lon),
        }
    }
}

// Region document layout: `{"projectId": .., "tasks": FeatureCollection}` where
// each feature is a MultiPolygon of `[lon, lat]` positions.
#[derive(Debug, Deserialize)]
struct RegionDocument {
    #[serde(rename = "projectId")]
    project_id: u64,
    tasks: TaskCollection,
}

#[derive(Debug, Deserialize)]
struct TaskCollection {
    features: Vec<TaskFeature>,
}

#[derive(Debug, Deserialize)]
struct TaskFeature {
    geometry: TaskGeometry,
    properties: TaskProperties,
}

#[derive(Debug, Deserialize)]
struct TaskGeometry {
    coordinates: Vec<Vec<Vec<Vec<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct TaskProperties {
    #[serde(rename = "taskId")]
    task_id: u64,
    #[serde(rename = "taskStatus")]
    task_status: String,
}

impl TaskFeature {
    /// First ring of the first polygon as `(lat, lon)` pairs.
    fn outer_ring(&self) -> Result<Vec<(f64, f64)>, AutotagError> {
        let ring = self
            .geometry
            .coordinates
            .first()
            .and_then(|polygon| polygon.first())
            .ok_or_else(|| AutotagError::MalformedBoundingBox("task has no ring".to_string()))?;

        ring.iter()
            .map(|position| match position.as_slice() {
                [lon, lat, ..] => Ok((*lat, *lon)),
                _ => Err(AutotagError::MalformedBoundingBox(format!(
                    "position {:?} has fewer than two values",
                    position
                ))),
            })
            .collect()
    }
}

/// Extracts the extents of all tasks in the configured status from a region document.
///
/// Tasks whose boundary is not a closed axis-aligned rectangle are logged
/// and skipped so one bad record does not abort the region.
pub fn tasks_from_region_json(
    json: &str,
    config: &TrainingConfig,
) -> Result<Vec<TaskBounds>, AutotagError> {
    let status = config.task_status.as_str();
    let region: RegionDocument =
        serde_json::from_str(json).map_err(|e| AutotagError::JsonError(e.to_string()))?;

    let total = region.tasks.features.len();
    let mut tasks = Vec::new();

    for feature in &region.tasks.features {
        if feature.properties.task_status != status {
            continue;
        }

        let extent = feature
            .outer_ring()
            .and_then(|ring| axis_aligned_box_to_extent(&ring));

        match extent {
            Ok(extent) => tasks.push(TaskBounds {
                project_id: region.project_id,
                task_id: feature.properties.task_id,
                extent,
            }),
            Err(e) => warn!(
                project_id = region.project_id,
                task_id = feature.properties.task_id,
                "skipping task: {}",
                e
            ),
        }
    }

    info!(
        project_id = region.project_id,
        "kept {} {} tasks out of {} total",
        tasks.len(),
        status,
        total
    );

    Ok(tasks)
}

/// Reads a region document from disk, see [`tasks_from_region_json`].
pub fn read_region_file(
    path: impl AsRef<Path>,
    config: &TrainingConfig,
) -> Result<Vec<TaskBounds>, AutotagError> {
    let json = std::fs::read_to_string(path).map_err(|e| AutotagError::IoError(e.to_string()))?;
    tasks_from_region_json(&json, config)
}

/// Writes tasks as `task_id,project_id,min_lat,min_lon,max_lat,max_lon`.
pub fn write_tasks_csv(tasks: &[TaskBounds], path: impl AsRef<Path>) -> Result<(), AutotagError> {
    let file = File::create(path).map_err(|e| AutotagError::IoError(e.to_string()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer
        .write_record(["task_id", "project_id", "min_lat", "min_lon", "max_lat", "max_lon"])
        .map_err(|e| AutotagError::CsvError(e.to_string()))?;

    for task in tasks {
        writer
            .serialize(TaskRow::from(task))
            .map_err(|e| AutotagError::CsvError(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| AutotagError::CsvError(e.to_string()))?;

    Ok(())
}

/// Reads tasks written by [`write_tasks_csv`].
pub fn read_tasks_csv(path: impl AsRef<Path>) -> Result<Vec<TaskBounds>, AutotagError> {
    let file = File::open(path).map_err(|e| AutotagError::CsvError(e.to_string()))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    reader
        .deserialize::<TaskRow>()
        .map(|row| {
            row.map(TaskBounds::from)
                .map_err(|e| AutotagError::CsvError(e.to_string()))
        })
        .collect()
}
