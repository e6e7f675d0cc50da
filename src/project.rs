//! Project, template and canvas element model
//!
//! `ProjectSnapshot` is the fully resolved input to PDF generation: the
//! persistence layer (an external collaborator) assembles it, the engine
//! never reads storage itself. `CanvasElement` carries the camelCase
//! serialization contract used by the design surface; elements are replaced
//! wholesale on every canvas save, never patched.

use serde::{Deserialize, Serialize};

use crate::color_workflow::{ColorAnalysis, FileType};

/// Physical print template. Dimensions are millimeters and never change
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub category: String,
}

/// `(template id suffixes, category)` for the known production templates.
/// Every category comes in A3 (297×420) and A4 (210×297).
const TEMPLATE_CATEGORIES: &[(&str, &str)] = &[
    ("dtf", "dtf"),
    ("uv-dtf", "uv-dtf"),
    ("sublimation", "sublimation"),
    ("vinyl", "vinyl"),
    ("vinyl-flock", "vinyl-flock"),
    ("soft-shell", "soft-shell"),
    ("reflective", "reflective"),
    ("hi-viz", "hi-viz"),
    ("glitter", "glitter"),
    ("metallic", "metallic"),
    ("holographic", "holographic"),
    ("glow-in-dark", "glow-in-dark"),
    ("puff", "puff"),
    ("foil", "foil"),
    ("photographic", "photographic"),
    ("embroidery-badges", "embroidery-badges"),
    ("applique-badges", "applique-badges"),
    ("laser-cut-badges", "laser-cut-badges"),
    ("woven-badges", "woven-badges"),
];

impl Template {
    pub fn new(id: &str, width_mm: f64, height_mm: f64, category: &str) -> Self {
        Self {
            id: id.to_string(),
            width_mm,
            height_mm,
            category: category.to_string(),
        }
    }

    /// Resolve a template identifier to its physical dimensions. Unknown
    /// identifiers default to A3 (297×420 mm).
    pub fn lookup(id: &str) -> Template {
        match id {
            "template-A3" => return Template::new(id, 297.0, 420.0, "standard"),
            "template-A4" => return Template::new(id, 210.0, 297.0, "standard"),
            "template-A5" => return Template::new(id, 148.0, 210.0, "standard"),
            "template-FOTLA3" => return Template::new(id, 297.0, 420.0, "fotl"),
            "template-FOTLA4" => return Template::new(id, 210.0, 297.0, "fotl"),
            _ => {}
        }
        for (suffix, category) in TEMPLATE_CATEGORIES {
            if id == format!("template-{}-a3", suffix) {
                return Template::new(id, 297.0, 420.0, category);
            }
            if id == format!("template-{}-a4", suffix) {
                return Template::new(id, 210.0, 297.0, category);
            }
        }
        Template::new(id, 297.0, 420.0, "standard")
    }
}

/// Project lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectState {
    Draft,
    Confirmed,
    Done,
    Cancelled,
}

impl ProjectState {
    /// The only legal lifecycle edges: confirm, cancel, done, and reset to
    /// draft. A state may always re-enter itself (idempotent action).
    pub fn can_transition(self, to: ProjectState) -> bool {
        use ProjectState::*;
        match (self, to) {
            (a, b) if a == b => true,
            (Draft, Confirmed) | (Draft, Cancelled) => true,
            (Confirmed, Done) | (Confirmed, Cancelled) | (Confirmed, Draft) => true,
            (Done, Draft) | (Cancelled, Draft) => true,
            _ => false,
        }
    }
}

/// A selected garment color: hex value plus customer-facing display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentColor {
    pub hex: String,
    pub name: Option<String>,
}

/// An uploaded logo asset, resolved to raw bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logo {
    pub id: String,
    pub filename: String,
    pub file_type: FileType,
    #[serde(default)]
    pub color: ColorAnalysis,
    /// True only for vector sources whose colors are already CMYK
    pub is_cmyk_preserved: bool,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Logo {
    pub fn is_vector(&self) -> bool {
        self.file_type.is_vector()
    }

    pub fn is_raster(&self) -> bool {
        self.file_type.is_raster()
    }
}

/// A placement of one logo on the canvas.
///
/// Coordinates are canvas millimeters: origin top-left, Y growing downward.
/// Serialization follows the design surface's persisted representation
/// (camelCase keys, `garmentColor` absent encoded as `"default"` upstream —
/// here simply `None`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasElement {
    pub logo_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, about the element center
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// 0..=1
    pub opacity: f64,
    /// Per-element override; falls back to the project garment color
    pub garment_color: Option<String>,
    pub garment_color_name: Option<String>,
    pub is_imposition: bool,
    pub imposition_rows: u32,
    pub imposition_cols: u32,
    pub imposition_spacing_x: f64,
    pub imposition_spacing_y: f64,
    // Lock flags are advisory editor metadata; generation ignores them
    pub is_locked: bool,
    pub lock_position: bool,
    pub lock_size: bool,
    pub lock_rotation: bool,
}

impl Default for CanvasElement {
    fn default() -> Self {
        Self {
            logo_id: String::new(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            garment_color: None,
            garment_color_name: None,
            is_imposition: false,
            imposition_rows: 1,
            imposition_cols: 1,
            imposition_spacing_x: 10.0,
            imposition_spacing_y: 10.0,
            is_locked: false,
            lock_position: false,
            lock_size: false,
            lock_rotation: false,
        }
    }
}

/// The fully resolved project data handed to `generate_pdf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub id: String,
    pub template: Template,
    /// Selected garment colors; the first is the project default
    pub garment_colors: Vec<GarmentColor>,
    pub ink_color: Option<String>,
    pub comments: Option<String>,
    pub state: ProjectState,
    /// Draw order is element order
    pub elements: Vec<CanvasElement>,
    pub logos: Vec<Logo>,
}

impl ProjectSnapshot {
    /// The project-level default garment color, if any was selected.
    pub fn default_garment_color(&self) -> Option<&GarmentColor> {
        self.garment_colors.first()
    }

    pub fn find_logo(&self, logo_id: &str) -> Option<&Logo> {
        self.logos.iter().find(|logo| logo.id == logo_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lookup() {
        let a4 = Template::lookup("template-A4");
        assert_eq!((a4.width_mm, a4.height_mm), (210.0, 297.0));

        let dtf = Template::lookup("template-dtf-a3");
        assert_eq!((dtf.width_mm, dtf.height_mm), (297.0, 420.0));
        assert_eq!(dtf.category, "dtf");

        // Unknown ids default to A3
        let unknown = Template::lookup("template-mystery");
        assert_eq!((unknown.width_mm, unknown.height_mm), (297.0, 420.0));
    }

    #[test]
    fn test_state_transitions() {
        use ProjectState::*;
        assert!(Draft.can_transition(Confirmed));
        assert!(Confirmed.can_transition(Done));
        assert!(Confirmed.can_transition(Cancelled));
        assert!(Done.can_transition(Draft));
        assert!(Cancelled.can_transition(Draft));
        assert!(!Draft.can_transition(Done));
        assert!(!Done.can_transition(Confirmed));
        assert!(!Cancelled.can_transition(Done));
    }

    #[test]
    fn test_element_serialization_contract() {
        let json = r##"{
            "logoId": "42",
            "x": 10.5,
            "y": 20.0,
            "width": 80.0,
            "height": 60.0,
            "rotation": 45.0,
            "scaleX": 2.0,
            "scaleY": 1.5,
            "opacity": 0.8,
            "garmentColor": "#FF0000",
            "isImposition": true,
            "impositionRows": 2,
            "impositionCols": 3,
            "impositionSpacingX": 5.0,
            "impositionSpacingY": 7.0,
            "isLocked": true
        }"##;
        let element: CanvasElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.logo_id, "42");
        assert_eq!(element.scale_x, 2.0);
        assert_eq!(element.garment_color.as_deref(), Some("#FF0000"));
        assert_eq!(element.imposition_cols, 3);
        // Omitted lock flags take their defaults
        assert!(!element.lock_rotation);

        let back = serde_json::to_value(&element).unwrap();
        assert_eq!(back["logoId"], "42");
        assert_eq!(back["impositionSpacingY"], 7.0);
    }

    #[test]
    fn test_element_defaults() {
        let element: CanvasElement = serde_json::from_str(r#"{"logoId": "1"}"#).unwrap();
        assert_eq!(element.width, 100.0);
        assert_eq!(element.opacity, 1.0);
        assert_eq!(element.imposition_rows, 1);
        assert_eq!(element.imposition_spacing_x, 10.0);
    }
}
