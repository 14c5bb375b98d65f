//! CSS-style hex color decoding.

use crate::error::CruiseError;

/// Decode `#rgb`, `#rrggbb` (leading `#` optional) into sRGB components in
/// `[0, 1]`.
pub fn parse_hex_color(value: &str) -> Result<[f32; 3], CruiseError> {
    let invalid = || CruiseError::InvalidColor(value.to_owned());
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let packed = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
    let [r, g, b] = match hex.len() {
        3 => {
            // #abc expands to #aabbcc
            let expand = |nibble: u32| ((nibble & 0xf) * 0x11) as u8;
            [expand(packed >> 8), expand(packed >> 4), expand(packed)]
        }
        6 => [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8],
        _ => return Err(invalid()),
    };
    Ok([r, g, b].map(|c| f32::from(c) / 255.0))
}

/// Pack sRGB components back into `0xRRGGBB`.
#[must_use]
pub fn pack_rgb(rgb: [f32; 3]) -> u32 {
    rgb.iter().fold(0, |acc, c| {
        (acc << 8) | (c.clamp(0.0, 1.0) * 255.0).round() as u32
    })
}
