//! Garment color catalog
//!
//! Static reference data: named garment colors with print CMYK values,
//! grouped by manufacturer plus specialty categories (hi-viz, pastels,
//! specialty inks). Read-only and shared across concurrent generations.
//! Catalog order is fixed, which makes nearest-color tie-breaking
//! deterministic (first encountered wins).

use crate::types::{parse_hex_rgb, Cmyk};

/// Specialty ink treatment for a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialty {
    Metallic,
    Glow,
    Reflective,
}

/// One catalog color
#[derive(Debug, Clone)]
pub struct ColorEntry {
    pub name: &'static str,
    pub hex: &'static str,
    pub cmyk: Cmyk,
    /// Manufacturer line, if the color belongs to one
    pub manufacturer: Option<&'static str>,
    /// Specialty category key (hi_viz, pastels, specialty_inks)
    pub category: Option<&'static str>,
    pub specialty: Option<Specialty>,
}

const fn mfr(
    manufacturer: &'static str,
    name: &'static str,
    hex: &'static str,
    c: u8,
    m: u8,
    y: u8,
    k: u8,
) -> ColorEntry {
    ColorEntry {
        name,
        hex,
        cmyk: Cmyk::new(c, m, y, k),
        manufacturer: Some(manufacturer),
        category: None,
        specialty: None,
    }
}

const fn cat(
    category: &'static str,
    name: &'static str,
    hex: &'static str,
    c: u8,
    m: u8,
    y: u8,
    k: u8,
    specialty: Option<Specialty>,
) -> ColorEntry {
    ColorEntry {
        name,
        hex,
        cmyk: Cmyk::new(c, m, y, k),
        manufacturer: None,
        category: Some(category),
        specialty,
    }
}

const GILDAN: &str = "Gildan";
const FOTL: &str = "Fruit of the Loom";

static CATALOG: &[ColorEntry] = &[
    // Gildan
    mfr(GILDAN, "Black", "#000000", 0, 0, 0, 100),
    mfr(GILDAN, "White", "#FFFFFF", 0, 0, 0, 0),
    mfr(GILDAN, "Ash", "#B8B8B8", 0, 0, 0, 28),
    mfr(GILDAN, "Sport Grey", "#8C8C8C", 0, 0, 0, 45),
    mfr(GILDAN, "Dark Heather", "#616161", 0, 0, 0, 62),
    mfr(GILDAN, "Red", "#FF0000", 0, 100, 100, 0),
    mfr(GILDAN, "Cardinal Red", "#B71234", 0, 90, 71, 28),
    mfr(GILDAN, "Cherry Red", "#C5282F", 0, 84, 76, 23),
    mfr(GILDAN, "Orange", "#FF8C00", 0, 45, 100, 0),
    mfr(GILDAN, "Gold", "#FFD700", 0, 16, 100, 0),
    mfr(GILDAN, "Yellow Haze", "#FFFF99", 0, 0, 40, 0),
    mfr(GILDAN, "Daisy", "#FFFF00", 0, 0, 100, 0),
    mfr(GILDAN, "Royal Blue", "#0047AB", 100, 58, 0, 33),
    mfr(GILDAN, "Navy", "#000080", 100, 100, 0, 50),
    mfr(GILDAN, "Irish Green", "#00FF00", 100, 0, 100, 0),
    mfr(GILDAN, "Forest Green", "#228B22", 76, 0, 76, 45),
    mfr(GILDAN, "Purple", "#800080", 0, 100, 0, 50),
    mfr(GILDAN, "Heliconia", "#FF1493", 0, 92, 42, 0),
    mfr(GILDAN, "Safety Pink", "#FF69B4", 0, 59, 29, 0),
    mfr(GILDAN, "Safety Orange", "#FF4500", 0, 73, 100, 0),
    mfr(GILDAN, "Safety Green", "#32CD32", 75, 0, 75, 20),
    mfr(GILDAN, "Maroon", "#800000", 0, 100, 100, 50),
    mfr(GILDAN, "Brown", "#A52A2A", 0, 74, 74, 35),
    mfr(GILDAN, "Tan", "#D2B48C", 0, 14, 33, 18),
    mfr(GILDAN, "Light Blue", "#ADD8E6", 24, 6, 0, 10),
    mfr(GILDAN, "Light Pink", "#FFB6C1", 0, 29, 24, 0),
    mfr(GILDAN, "Natural", "#F5F5DC", 0, 0, 10, 4),
    // Fruit of the Loom
    mfr(FOTL, "Black", "#000000", 0, 0, 0, 100),
    mfr(FOTL, "White", "#FFFFFF", 0, 0, 0, 0),
    mfr(FOTL, "Heather Grey", "#D3D3D3", 0, 0, 0, 17),
    mfr(FOTL, "Red", "#FF0000", 0, 100, 100, 0),
    mfr(FOTL, "Navy", "#000080", 100, 100, 0, 50),
    mfr(FOTL, "Royal Blue", "#4169E1", 74, 58, 0, 12),
    mfr(FOTL, "Kelly Green", "#4CBB17", 70, 0, 87, 27),
    mfr(FOTL, "Purple", "#800080", 0, 100, 0, 50),
    mfr(FOTL, "Orange", "#FFA500", 0, 35, 100, 0),
    mfr(FOTL, "Yellow", "#FFFF00", 0, 0, 100, 0),
    mfr(FOTL, "Sky Blue", "#87CEEB", 43, 16, 0, 8),
    mfr(FOTL, "Pink", "#FFC0CB", 0, 25, 20, 0),
    mfr(FOTL, "Lime Green", "#32CD32", 75, 0, 75, 20),
    mfr(FOTL, "Burgundy", "#800020", 0, 100, 75, 50),
    mfr(FOTL, "Forest Green", "#228B22", 76, 0, 76, 45),
    // Hi-viz
    cat("hi_viz", "Hi-Viz Orange", "#FF6600", 0, 60, 100, 0, None),
    cat("hi_viz", "Hi-Viz Yellow", "#FFFF00", 0, 0, 100, 0, None),
    cat("hi_viz", "Hi-Viz Green", "#00FF00", 100, 0, 100, 0, None),
    cat("hi_viz", "Hi-Viz Pink", "#FF1493", 0, 92, 42, 0, None),
    // Pastels
    cat("pastels", "Pastel Blue", "#B8E6FF", 28, 10, 0, 0, None),
    cat("pastels", "Pastel Pink", "#FFD1DC", 0, 18, 14, 0, None),
    cat("pastels", "Pastel Yellow", "#FFFF99", 0, 0, 40, 0, None),
    cat("pastels", "Pastel Green", "#90EE90", 43, 0, 43, 7, None),
    cat("pastels", "Pastel Purple", "#DDA0DD", 13, 28, 0, 13, None),
    // Specialty inks
    cat("specialty_inks", "Metallic Gold", "#FFD700", 0, 16, 100, 0, Some(Specialty::Metallic)),
    cat("specialty_inks", "Metallic Silver", "#C0C0C0", 0, 0, 0, 25, Some(Specialty::Metallic)),
    cat("specialty_inks", "Glow in Dark", "#F0F8FF", 6, 3, 0, 0, Some(Specialty::Glow)),
    cat("specialty_inks", "Reflective", "#E5E5E5", 0, 0, 0, 10, Some(Specialty::Reflective)),
];

/// All catalog colors in fixed iteration order.
pub fn all_colors() -> &'static [ColorEntry] {
    CATALOG
}

/// Exact case-insensitive hex lookup.
pub fn find_by_hex(hex: &str) -> Option<&'static ColorEntry> {
    let wanted = hex.trim_start_matches('#');
    CATALOG
        .iter()
        .find(|entry| entry.hex.trim_start_matches('#').eq_ignore_ascii_case(wanted))
}

/// Nearest catalog color by Euclidean distance in RGB space.
///
/// Returns `None` only when the target hex does not parse. Ties resolve to
/// the first catalog entry encountered.
pub fn find_closest(hex: &str) -> Option<&'static ColorEntry> {
    let (tr, tg, tb) = parse_hex_rgb(hex).ok()?;

    let mut best: Option<(&'static ColorEntry, f64)> = None;
    for entry in CATALOG {
        // Catalog hex values are static and always parse
        let (r, g, b) = match parse_hex_rgb(entry.hex) {
            Ok(rgb) => rgb,
            Err(_) => continue,
        };
        let distance = ((tr as f64 - r as f64).powi(2)
            + (tg as f64 - g as f64).powi(2)
            + (tb as f64 - b as f64).powi(2))
        .sqrt();
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((entry, distance)),
        }
    }
    best.map(|(entry, _)| entry)
}

/// Colors for one manufacturer, in catalog order.
pub fn colors_by_manufacturer(manufacturer: &str) -> Vec<&'static ColorEntry> {
    CATALOG
        .iter()
        .filter(|entry| entry.manufacturer == Some(manufacturer))
        .collect()
}

/// Format a production CMYK label, e.g. `"C:0 M:100 Y:100 K:0"`.
pub fn cmyk_label(entry: &ColorEntry) -> String {
    let Cmyk { c, m, y, k } = entry.cmyk;
    format!("C:{} M:{} Y:{} K:{}", c, m, y, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_workflow::hex_to_cmyk;

    #[test]
    fn test_find_by_hex_case_insensitive() {
        let entry = find_by_hex("#ff0000").unwrap();
        assert_eq!(entry.name, "Red");
        assert!(find_by_hex("B8E6FF").is_some());
        assert!(find_by_hex("#123456").is_none());
    }

    #[test]
    fn test_find_closest_exact_black() {
        let entry = find_closest("#000000").unwrap();
        assert_eq!(entry.hex, "#000000");
        assert_eq!(entry.name, "Black");
    }

    #[test]
    fn test_find_closest_near_black() {
        let entry = find_closest("#010101").unwrap();
        assert_eq!(entry.name, "Black");
    }

    #[test]
    fn test_find_closest_invalid_target() {
        assert!(find_closest("nope").is_none());
    }

    #[test]
    fn test_cmyk_label_format() {
        let entry = find_by_hex("#FF0000").unwrap();
        assert_eq!(cmyk_label(entry), "C:0 M:100 Y:100 K:0");
    }

    #[test]
    fn test_colors_by_manufacturer() {
        let gildan = colors_by_manufacturer("Gildan");
        assert_eq!(gildan.len(), 27);
        assert!(colors_by_manufacturer("Nonexistent").is_empty());
    }

    // Catalog CMYK values are production-tuned rather than purely computed,
    // but the neutral (grey/black/white/primary) entries must agree with the
    // analytic conversion within rounding.
    #[test]
    fn test_hex_cmyk_roundtrip_for_neutrals() {
        for hex in ["#000000", "#FFFFFF", "#FF0000", "#FFFF00", "#8C8C8C"] {
            let entry = find_by_hex(hex).unwrap();
            let computed = hex_to_cmyk(hex).unwrap();
            let close = |a: u8, b: u8| (a as i16 - b as i16).abs() <= 1;
            assert!(close(entry.cmyk.c, computed.c), "{hex} c");
            assert!(close(entry.cmyk.m, computed.m), "{hex} m");
            assert!(close(entry.cmyk.y, computed.y), "{hex} y");
            assert!(close(entry.cmyk.k, computed.k), "{hex} k");
        }
    }
}
