pub mod building;
pub mod task;
pub mod tile;
pub mod tile_csv;
pub mod tile_grid;
pub mod training;
pub mod training_arrow;
pub mod training_parquet;

pub use building::{
    BuildingFootprint, BuildingRecord, buildings_from_overpass_json, overpass_query,
    read_buildings_csv, records_for_task, write_buildings_csv,
};
pub use task::{
    TaskBounds, VALIDATED_STATUS, read_region_file, read_tasks_csv, tasks_from_region_json,
    write_tasks_csv,
};
pub use tile::Tile;
pub use tile_csv::{GeometryFormat, TilesToCsv, tiles_to_csv};
pub use tile_grid::{TileGrid, TileGridBuilder};
pub use training::{TileMask, TileSample, TrainingConfig, TrainingSet, TrainingSetBuilder};
pub use training_arrow::SamplesToArrow;
pub use training_parquet::{ROWS_PER_BATCH, SamplesToGeoParquet, write_geoparquet};
