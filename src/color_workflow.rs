//! Color workflow rules for uploaded artwork
//!
//! Decides how each logo's color model is carried into print output:
//! vector sources keep their drawing instructions (and, when the source
//! already contains CMYK, the exact CMYK values), raster sources are always
//! treated as RGB needing a downstream conversion step.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{parse_hex_rgb, Cmyk};

/// Classified logo file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    VectorSvg,
    VectorPdf,
    VectorAi,
    VectorEps,
    RasterPng,
    RasterJpeg,
    MixedContent,
    Unknown,
}

impl FileType {
    /// Determine file type from MIME type and filename.
    ///
    /// The MIME type wins when recognized; `application/postscript` and
    /// `application/illustrator` are disambiguated by the `ai` extension,
    /// while `application/x-illustrator` is always Illustrator.
    /// Unrecognized MIME types fall back to the extension.
    pub fn classify(mime_type: &str, filename: &str) -> FileType {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match mime_type {
            "image/svg+xml" => FileType::VectorSvg,
            "application/pdf" => FileType::VectorPdf,
            "application/postscript" | "application/illustrator" => {
                if extension == "ai" {
                    FileType::VectorAi
                } else {
                    FileType::VectorEps
                }
            }
            "application/x-illustrator" => FileType::VectorAi,
            "image/png" => FileType::RasterPng,
            "image/jpeg" | "image/jpg" => FileType::RasterJpeg,
            _ => match extension.as_str() {
                "svg" => FileType::VectorSvg,
                "pdf" => FileType::VectorPdf,
                "ai" => FileType::VectorAi,
                "eps" => FileType::VectorEps,
                "png" => FileType::RasterPng,
                "jpg" | "jpeg" => FileType::RasterJpeg,
                _ => FileType::Unknown,
            },
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(
            self,
            FileType::VectorSvg | FileType::VectorPdf | FileType::VectorAi | FileType::VectorEps
        )
    }

    pub fn is_raster(self) -> bool {
        matches!(self, FileType::RasterPng | FileType::RasterJpeg)
    }
}

/// Detected color space of analyzed color data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    Cmyk,
    Spot,
    Unknown,
}

impl ColorSpace {
    /// Keyword heuristic over raw color analysis output.
    pub fn detect(color_data: &str) -> ColorSpace {
        let lower = color_data.to_ascii_lowercase();
        if lower.is_empty() {
            return ColorSpace::Unknown;
        }
        if ["cmyk", "cyan", "magenta", "yellow", "black"]
            .iter()
            .any(|k| lower.contains(k))
        {
            ColorSpace::Cmyk
        } else if ["rgb", "#", "red", "green", "blue"].iter().any(|k| lower.contains(k)) {
            ColorSpace::Rgb
        } else if ["pantone", "spot", "pms"].iter().any(|k| lower.contains(k)) {
            ColorSpace::Spot
        } else {
            ColorSpace::Unknown
        }
    }
}

/// Recommended handling for a file's color content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub preserve_cmyk: bool,
    pub convert_to_cmyk: bool,
    pub allow_raster_conversion: bool,
}

/// Color analysis summary for an uploaded file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ColorAnalysis {
    pub has_cmyk: bool,
    pub has_rgb: bool,
    pub has_pantone: bool,
    pub color_count: u32,
}

/// Workflow configuration problems found by [`validate_workflow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowIssue {
    /// Vector file configured with raster conversion allowed
    VectorRasterized,
    /// CMYK preservation requested for a file without CMYK colors
    PreserveWithoutCmyk,
    /// Preserve and convert requested simultaneously
    PreserveAndConvert,
}

/// CMYK is preserved only for vector files whose source already contains
/// CMYK colors. Raster files are always RGB source material.
pub fn should_preserve_cmyk(file_type: FileType, has_cmyk_colors: bool) -> bool {
    file_type.is_vector() && has_cmyk_colors
}

/// Recommended workflow options for a file type.
pub fn workflow_options(file_type: FileType, has_cmyk_colors: bool) -> WorkflowOptions {
    if file_type.is_vector() {
        WorkflowOptions {
            preserve_cmyk: should_preserve_cmyk(file_type, has_cmyk_colors),
            convert_to_cmyk: !has_cmyk_colors,
            // Vector content must never be rasterized
            allow_raster_conversion: false,
        }
    } else {
        WorkflowOptions {
            preserve_cmyk: false,
            convert_to_cmyk: true,
            allow_raster_conversion: true,
        }
    }
}

/// Validates a workflow configuration, returning every violated rule.
/// An empty list means the configuration is valid.
pub fn validate_workflow(
    file_type: FileType,
    color_data: &ColorAnalysis,
    options: &WorkflowOptions,
) -> Vec<WorkflowIssue> {
    let mut issues = Vec::new();

    if file_type.is_vector() && options.allow_raster_conversion {
        issues.push(WorkflowIssue::VectorRasterized);
    }
    if options.preserve_cmyk && !color_data.has_cmyk {
        issues.push(WorkflowIssue::PreserveWithoutCmyk);
    }
    if options.preserve_cmyk && options.convert_to_cmyk {
        issues.push(WorkflowIssue::PreserveAndConvert);
    }

    issues
}

/// Standard subtractive RGB→CMYK conversion, channels as integer
/// percentages. Pure black maps directly to `(0,0,0,100)`.
pub fn rgb_to_cmyk(r: u8, g: u8, b: u8) -> Cmyk {
    if r == 0 && g == 0 && b == 0 {
        return Cmyk::black();
    }

    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let c = 1.0 - r;
    let m = 1.0 - g;
    let y = 1.0 - b;
    let k = c.min(m).min(y);

    let (c, m, y) = if k >= 1.0 {
        (0.0, 0.0, 0.0)
    } else {
        ((c - k) / (1.0 - k), (m - k) / (1.0 - k), (y - k) / (1.0 - k))
    };

    Cmyk::new(
        (c * 100.0).round() as u8,
        (m * 100.0).round() as u8,
        (y * 100.0).round() as u8,
        (k * 100.0).round() as u8,
    )
}

/// Convert a hex color to CMYK. Malformed input is an `InvalidColor` error;
/// use [`hex_to_cmyk_or_black`] where the documented black fallback applies.
pub fn hex_to_cmyk(hex: &str) -> EngineResult<Cmyk> {
    let (r, g, b) = parse_hex_rgb(hex)?;
    Ok(rgb_to_cmyk(r, g, b))
}

/// The explicit fallback for malformed color input: default to black and
/// log the data loss rather than hiding it.
pub fn hex_to_cmyk_or_black(hex: &str) -> Cmyk {
    match hex_to_cmyk(hex) {
        Ok(cmyk) => cmyk,
        Err(EngineError::InvalidColor(raw)) => {
            warn!("invalid hex color {:?}, defaulting to black", raw);
            Cmyk::black()
        }
        Err(_) => Cmyk::black(),
    }
}
