use autotag_rs::{AutotagError, Tile, TileGrid, geo_to_pixel, pixel_offset_within_tile};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), AutotagError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AutotagError::IoError(e.to_string()))?;

    let lat = 16.8245079588;
    let lon = 94.7774954283;
    let zoom = 15;

    let tile = Tile::from_wgs84(&(lat, lon), zoom)?;
    let offset = pixel_offset_within_tile(geo_to_pixel(lat, lon, zoom));

    info!("Quadkey: {}", tile.quadkey);
    info!("Tile: ({}, {})", tile.tile_x(), tile.tile_y());
    info!("Pixel within tile: ({}, {})", offset.x, offset.y);
    info!("Outline: {}", tile.to_wkt());

    let grid = TileGrid::from_extent(lat, lon, 16.8295079588, 94.7824954283, zoom)?;
    info!("Task covers {} tiles: {:?}", grid.len(), grid.quadkeys());

    Ok(())
}
