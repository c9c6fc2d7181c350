/// Error type for autotag-rs operations.
#[derive(Debug, PartialEq)]
pub enum AutotagError {
    /// A task boundary ring is not closed, not axis-aligned, or has the wrong vertex count.
    MalformedBoundingBox(String),
    /// The zoom level is outside the supported range (1-23).
    InvalidZoomLevel(u8),
    /// The quadkey contains a digit other than 0-3 or is too long.
    InvalidQuadkey(String),
    /// File I/O or serialization error.
    IoError(String),
    /// CSV parsing or reading error.
    CsvError(String),
    /// JSON document could not be parsed or has an unexpected shape.
    JsonError(String),
    /// A tile column or row lies outside the grid at its zoom level.
    TileOutOfRange(String),
}

impl std::fmt::Display for AutotagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutotagError::MalformedBoundingBox(msg) => write!(f, "Malformed bounding box: {}", msg),
            AutotagError::InvalidZoomLevel(z) => write!(f, "Invalid zoom level: {}", z),
            AutotagError::InvalidQuadkey(q) => write!(f, "Invalid quadkey: '{}'", q),
            AutotagError::IoError(msg) => write!(f, "IO error: {}", msg),
            AutotagError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            AutotagError::JsonError(msg) => write!(f, "JSON error: {}", msg),
            AutotagError::TileOutOfRange(msg) => write!(f, "Tile out of range: {}", msg),
        }
    }
}

impl std::error::Error for AutotagError {}

/// Checks a zoom level against the range the tile API types accept.
pub(crate) fn check_zoom_level(zoom: u8) -> Result<u8, AutotagError> {
    use crate::core::constants::{MAX_ZOOM_LEVEL, MIN_ZOOM_LEVEL};

    if (MIN_ZOOM_LEVEL..=MAX_ZOOM_LEVEL).contains(&zoom) {
        Ok(zoom)
    } else {
        Err(AutotagError::InvalidZoomLevel(zoom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AutotagError::InvalidZoomLevel(30).to_string(),
            "Invalid zoom level: 30"
        );
        assert_eq!(
            AutotagError::InvalidQuadkey("014".into()).to_string(),
            "Invalid quadkey: '014'"
        );
        assert_eq!(
            AutotagError::TileOutOfRange("tile (4, 0) outside zoom 2 grid".into()).to_string(),
            "Tile out of range: tile (4, 0) outside zoom 2 grid"
        );
    }

    #[test]
    fn test_check_zoom_level() {
        assert_eq!(check_zoom_level(1), Ok(1));
        assert_eq!(check_zoom_level(23), Ok(23));
        assert_eq!(check_zoom_level(0), Err(AutotagError::InvalidZoomLevel(0)));
        assert_eq!(check_zoom_level(24), Err(AutotagError::InvalidZoomLevel(24)));
    }
}
