use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Colour for the `index`-th of `count` series.
///
/// A configured `#RRGGBB` value wins; otherwise (or if it does not parse)
/// the series gets its slot from [`generate_palette`].
pub fn series_color(configured: Option<&str>, index: usize, count: usize) -> Color32 {
    if let Some(hex) = configured {
        let hex = hex.trim();
        let parsed = if hex.starts_with('#') {
            Color32::from_hex(hex)
        } else {
            Color32::from_hex(&format!("#{hex}"))
        };
        match parsed {
            Ok(c) => return c,
            Err(_) => log::warn!("Ignoring invalid series colour '{hex}'"),
        }
    }
    generate_palette(count.max(index + 1))
        .get(index)
        .copied()
        .unwrap_or(Color32::LIGHT_BLUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_hex_wins() {
        assert_eq!(
            series_color(Some("#FF6B35"), 0, 3),
            Color32::from_rgb(0xFF, 0x6B, 0x35)
        );
        assert_eq!(
            series_color(Some("4ECDC4"), 1, 3),
            Color32::from_rgb(0x4E, 0xCD, 0xC4)
        );
    }

    #[test]
    fn falls_back_to_palette() {
        let palette = generate_palette(3);
        assert_eq!(series_color(None, 2, 3), palette[2]);
        assert_eq!(series_color(Some("orange-ish"), 1, 3), palette[1]);
    }

    #[test]
    fn palette_hues_are_distinct() {
        let palette = generate_palette(4);
        assert_eq!(palette.len(), 4);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }
}
