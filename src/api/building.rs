use crate::api::task::TaskBounds;
use crate::core::types::{GeoPoint, LatLonExtent};
use crate::util::error::AutotagError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// An OpenStreetMap building way and its ordered vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingFootprint {
    pub way_id: u64,
    pub vertices: Vec<GeoPoint>,
}

/// A building footprint tagged with the task it was mapped in.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord {
    pub project_id: u64,
    pub task_id: u64,
    pub footprint: BuildingFootprint,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node { id: u64, lat: f64, lon: f64 },
    Way { id: u64, nodes: Vec<u64> },
    #[serde(other)]
    Other,
}

/// Overpass QL query for every `building=yes` way inside a task, with its nodes.
pub fn overpass_query(extent: &LatLonExtent) -> String {
    format!(
        "[out:json][timeout:25];\n(\n  way[building=yes]({}, {}, {}, {});\n  node(w);\n);\nout body;\n>;\n",
        extent.min_lat, extent.min_lon, extent.max_lat, extent.max_lon
    )
}

/// Resolves the ways of an Overpass JSON response into vertex lists.
///
/// Ways are returned in response order. A way referencing a node that is not
/// part of the response is logged and skipped.
pub fn buildings_from_overpass_json(json: &str) -> Result<Vec<BuildingFootprint>, AutotagError> {
    let response: OverpassResponse =
        serde_json::from_str(json).map_err(|e| AutotagError::JsonError(e.to_string()))?;

    let nodes: HashMap<u64, GeoPoint> = response
        .elements
        .iter()
        .filter_map(|e| match e {
            OverpassElement::Node { id, lat, lon } => Some((*id, GeoPoint::new(*lat, *lon))),
            _ => None,
        })
        .collect();

    let mut buildings = Vec::new();

    for element in &response.elements {
        let OverpassElement::Way { id, nodes: refs } = element else {
            continue;
        };

        let vertices: Option<Vec<GeoPoint>> = refs.iter().map(|n| nodes.get(n).copied()).collect();
        match vertices {
            Some(vertices) => buildings.push(BuildingFootprint {
                way_id: *id,
                vertices,
            }),
            None => warn!(way_id = *id, "skipping way with unresolved nodes"),
        }
    }

    debug!("resolved {} buildings from {} nodes", buildings.len(), nodes.len());
    Ok(buildings)
}

/// Tags each footprint with the task it belongs to.
pub fn records_for_task(task: &TaskBounds, footprints: Vec<BuildingFootprint>) -> Vec<BuildingRecord> {
    footprints
        .into_iter()
        .map(|footprint| BuildingRecord {
            project_id: task.project_id,
            task_id: task.task_id,
            footprint,
        })
        .collect()
}

/// Writes records as `project_id,task_id,way_id` followed by `lat,lon` pairs.
///
/// Rows have a variable number of columns; the header names the vertex list `bbox`.
pub fn write_buildings_csv(
    records: &[BuildingRecord],
    path: impl AsRef<Path>,
) -> Result<(), AutotagError> {
    let file = File::create(path).map_err(|e| AutotagError::IoError(e.to_string()))?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);

    writer
        .write_record(["project_id", "task_id", "way_id", "bbox"])
        .map_err(|e| AutotagError::CsvError(e.to_string()))?;

    for record in records {
        let mut row = vec![
            record.project_id.to_string(),
            record.task_id.to_string(),
            record.footprint.way_id.to_string(),
        ];
        for vertex in &record.footprint.vertices {
            row.push(vertex.lat.to_string());
            row.push(vertex.lon.to_string());
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

fn parse_field<T: std::str::FromStr>(record: &csv::StringRecord, idx: usize) -> Result<T, AutotagError> {
    let field = record
        .get(idx)
        .ok_or_else(|| AutotagError::CsvError(format!("Missing column at index {}", idx)))?
        .trim();

    field
        .parse()
        .map_err(|_| AutotagError::CsvError(format!("Invalid value '{}' at index {}", field, idx)))
}

/// Reads records written by [`write_buildings_csv`].
pub fn read_buildings_csv(path: impl AsRef<Path>) -> Result<Vec<BuildingRecord>, AutotagError> {
    let file = File::open(path).map_err(|e| AutotagError::CsvError(e.to_string()))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| AutotagError::CsvError(e.to_string()))?;

        if record.len() < 3 || (record.len() - 3) % 2 != 0 {
            return Err(AutotagError::CsvError(format!(
                "expected ids followed by lat/lon pairs, found {} columns",
                record.len()
            )));
        }

        let mut vertices = Vec::with_capacity((record.len() - 3) / 2);
        for idx in (3..record.len()).step_by(2) {
            vertices.push(GeoPoint::new(
                parse_field(&record, idx)?,
                parse_field(&record, idx + 1)?,
            ));
        }

        records.push(BuildingRecord {
            project_id: parse_field(&record, 0)?,
            task_id: parse_field(&record, 1)?,
            footprint: BuildingFootprint {
                way_id: parse_field(&record, 2)?,
                vertices,
            },
        });
    }

    Ok(records)
}
