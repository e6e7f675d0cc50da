//! Artwork composition and print-PDF generation engine
//!
//! Turns a resolved design project (template, garment colors, logo assets,
//! canvas placements) into a deterministic two-page production PDF. Vector
//! logos are embedded losslessly so press-ready CMYK survives; raster logos
//! embed as RGB images. See `generator::PdfGenerator` for the entry point.

mod canvas;
mod image_registry;
mod image_utils;
mod pdf_embed;

pub mod color_workflow;
pub mod converter;
pub mod error;
pub mod garment_colors;
pub mod generator;
pub mod geometry;
pub mod project;
pub mod types;

pub use converter::{CommandConverter, Converter};
pub use error::{EngineError, EngineResult};
pub use generator::{minimal_empty_pdf, PdfGenerator};
pub use project::{CanvasElement, GarmentColor, Logo, ProjectSnapshot, ProjectState, Template};
