/// Side length of a tile in pixels
pub const TILE_SIZE: u32 = 256;

/// Web Mercator latitude limits
pub const MIN_LATITUDE: f64 = -85.05112878;
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Longitude limits
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Lowest zoom level accepted by the tile API types
pub const MIN_ZOOM_LEVEL: u8 = 1;

/// Highest zoom level served by the imagery provider
pub const MAX_ZOOM_LEVEL: u8 = 23;
