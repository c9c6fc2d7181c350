use crate::core::constants::MAX_ZOOM_LEVEL;
use crate::core::projection::clamp_zoom;
use crate::core::types::TileIndex;
use crate::util::error::AutotagError;

/// Encodes a tile index as a quadkey of `zoom` digits.
///
/// Each digit interleaves one bit of the index, most significant first:
/// `digit = bit(x) + 2 * bit(y)`. Zoom 0 yields the empty string, and zooms
/// above `MAX_ZOOM_LEVEL` are clamped to it.
pub fn tile_to_quadkey(tile: TileIndex, zoom: u8) -> String {
    let zoom = clamp_zoom(zoom);
    let mut quadkey = String::with_capacity(zoom as usize);

    for i in (0..u32::from(zoom)).rev() {
        let mask = 1u32 << i;
        let mut digit = b'0';

        if tile.x & mask != 0 {
            digit += 1;
        }
        if tile.y & mask != 0 {
            digit += 2;
        }
        quadkey.push(digit as char);
    }

    quadkey
}

/// Decodes a quadkey back into its tile index and zoom level.
pub fn quadkey_to_tile(quadkey: &str) -> Result<(TileIndex, u8), AutotagError> {
    if quadkey.len() > MAX_ZOOM_LEVEL as usize {
        return Err(AutotagError::InvalidQuadkey(quadkey.to_string()));
    }

    let mut x = 0u32;
    let mut y = 0u32;

    for c in quadkey.chars() {
        let digit = match c {
            '0'..='3' => c as u32 - '0' as u32,
            _ => return Err(AutotagError::InvalidQuadkey(quadkey.to_string())),
        };
        x = (x << 1) | (digit & 1);
        y = (y << 1) | (digit >> 1);
    }

    Ok((TileIndex::new(x, y), quadkey.len() as u8))
}

/// The quadkey of the enclosing tile one zoom level up, or `None` at the root.
pub fn parent_quadkey(quadkey: &str) -> Option<&str> {
    if quadkey.is_empty() {
        None
    } else {
        Some(&quadkey[..quadkey.len() - 1])
    }
}

/// The four quadkeys one zoom level down, in digit order.
pub fn child_quadkeys(quadkey: &str) -> [String; 4] {
    ['0', '1', '2', '3'].map(|d| {
        let mut child = String::with_capacity(quadkey.len() + 1);
        child.push_str(quadkey);
        child.push(d);
        child
    })
}
