//! Print PDF generation
//!
//! Assembles the two-page production document from a resolved
//! `ProjectSnapshot`: page one is the artwork alone on a transparent
//! background, page two
//! repeats the artwork over per-element garment color backgrounds and adds
//! the color legend. Vector PDF logos are carried through as Form XObjects
//! with their original content streams, so CMYK vector art survives
//! untouched; raster logos embed as RGB images.

use log::{debug, warn};
use pdf_writer::{Name, Pdf, Rect as PdfRect, Ref};
use tempfile::TempDir;

use crate::canvas::PdfCanvas;
use crate::color_workflow::{self, FileType};
use crate::converter::{CommandConverter, Converter};
use crate::error::{EngineError, EngineResult};
use crate::garment_colors;
use crate::geometry::{self, MM_TO_PT};
use crate::image_registry::{XObjectKind, XObjectRegistry};
use crate::pdf_embed::{self, PendingEmbed};
use crate::project::{CanvasElement, ProjectSnapshot, Template};
use crate::types::{Cmyk, Color, Rect};

const CATALOG_ID: i32 = 1;
const PAGE_TREE_ID: i32 = 2;
const FONT_ID: i32 = 3;
const FONT_NAME: &[u8] = b"F1";

const LEGEND_X: f64 = 50.0;
const LEGEND_BASELINE_Y: f64 = 20.0;
const LEGEND_LINE_PITCH: f64 = 15.0;
const LEGEND_FONT_SIZE: f64 = 10.0;

pub struct PdfGenerator {
    converter: Box<dyn Converter>,
}

/// One garment color appearing on page two, in first-appearance order
struct LegendEntry {
    label: String,
}

/// Per-element draw instruction resolved during the embed pass
struct PlacedElement<'a> {
    element: &'a CanvasElement,
    logo_key: String,
}

impl PdfGenerator {
    pub fn new(converter: Box<dyn Converter>) -> Self {
        Self { converter }
    }

    /// Generator backed by the command-line conversion tools.
    pub fn with_command_converter() -> Self {
        Self::new(Box::new(CommandConverter::default()))
    }

    /// Generate the two-page print PDF for a project.
    ///
    /// Individual elements that fail to embed (undecodable logo, broken
    /// vector file, conversion tool failure) are logged and skipped; only
    /// environment failures (temp dir, disk) abort the whole document.
    pub fn generate_pdf(&self, project: &ProjectSnapshot) -> EngineResult<Vec<u8>> {
        let template = &project.template;
        let page_width = template.width_mm * MM_TO_PT;
        let page_height = template.height_mm * MM_TO_PT;

        let work_dir = tempfile::Builder::new()
            .prefix("artwork_pdf_")
            .tempdir()?;
        debug!(
            "generating pdf for project {} in {}",
            project.id,
            work_dir.path().display()
        );

        let mut pdf = Pdf::new();
        pdf.catalog(Ref::new(CATALOG_ID)).pages(Ref::new(PAGE_TREE_ID));
        pdf.type1_font(Ref::new(FONT_ID)).base_font(Name(b"Helvetica"));
        let mut next_ref_id = FONT_ID + 1;

        let page1_id = next_ref(&mut next_ref_id);
        let content1_id = next_ref(&mut next_ref_id);
        let page2_id = next_ref(&mut next_ref_id);
        let content2_id = next_ref(&mut next_ref_id);

        // Embed pass: resolve every element's logo into an XObject
        let mut registry = XObjectRegistry::new();
        let mut pending: Vec<PendingEmbed> = Vec::new();
        let mut placed: Vec<PlacedElement> = Vec::new();
        for element in &project.elements {
            match self.embed_element(
                &mut pdf,
                project,
                element,
                &work_dir,
                &mut registry,
                &mut pending,
                &mut next_ref_id,
            ) {
                Ok(()) => placed.push(PlacedElement {
                    element,
                    logo_key: element.logo_id.clone(),
                }),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(
                        "skipping element with logo {} in project {}: {err}",
                        element.logo_id, project.id
                    );
                }
            }
        }

        // Opacity states shared by both pages, keyed by percent
        let mut gs_states: Vec<(u8, Ref, String)> = Vec::new();
        for item in &placed {
            graphics_state_for(&mut pdf, &mut gs_states, &mut next_ref_id, item.element.opacity);
        }

        // Page one: artwork only
        let mut canvas1 = PdfCanvas::new();
        for item in &placed {
            self.draw_element(&mut canvas1, item, &registry, &gs_states, template);
        }

        // Page two: garment backgrounds, artwork, legend
        let mut canvas2 = PdfCanvas::new();
        for item in &placed {
            self.draw_backgrounds(&mut canvas2, item, project);
            self.draw_element(&mut canvas2, item, &registry, &gs_states, template);
        }
        draw_legend(&mut canvas2, &build_legend(project, &placed));

        pdf.stream(content1_id, &canvas1.finish());
        pdf.stream(content2_id, &canvas2.finish());

        let mut used: Vec<String> = Vec::new();
        for item in &placed {
            if !used.contains(&item.logo_key) {
                used.push(item.logo_key.clone());
            }
        }
        for (page_id, content_id) in [(page1_id, content1_id), (page2_id, content2_id)] {
            let mut page = pdf.page(page_id);
            page.media_box(PdfRect::new(0.0, 0.0, page_width as f32, page_height as f32));
            page.parent(Ref::new(PAGE_TREE_ID));
            page.contents(content_id);
            let mut resources = page.resources();
            resources.fonts().pair(Name(FONT_NAME), Ref::new(FONT_ID));
            registry.write_resources(&mut resources, &used);
            if !gs_states.is_empty() {
                let mut dict = resources.ext_g_states();
                for (_, id, name) in &gs_states {
                    dict.pair(Name(name.as_bytes()), *id);
                }
            }
        }

        pdf.pages(Ref::new(PAGE_TREE_ID))
            .kids([page1_id, page2_id])
            .count(2);

        let bytes = pdf.finish();
        pdf_embed::merge_embedded(bytes, pending)
    }

    /// Resolve one element's logo into the XObject registry.
    #[allow(clippy::too_many_arguments)]
    fn embed_element(
        &self,
        pdf: &mut Pdf,
        project: &ProjectSnapshot,
        element: &CanvasElement,
        work_dir: &TempDir,
        registry: &mut XObjectRegistry,
        pending: &mut Vec<PendingEmbed>,
        next_ref_id: &mut i32,
    ) -> EngineResult<()> {
        if registry.get(&element.logo_id).is_some() {
            return Ok(());
        }
        let logo = project.find_logo(&element.logo_id).ok_or_else(|| {
            EngineError::ElementEmbed(format!("logo {} not found in project", element.logo_id))
        })?;

        match logo.file_type {
            FileType::RasterPng | FileType::RasterJpeg => {
                registry.register_image(pdf, &logo.id, &logo.data, next_ref_id)?;
            }
            FileType::VectorPdf | FileType::MixedContent => {
                let (source, bbox) = pdf_embed::parse_source(&logo.data)?;
                if logo.is_cmyk_preserved {
                    debug!("embedding logo {} with CMYK preservation", logo.id);
                }
                registry.register_form(&logo.id, source, bbox, next_ref_id, pending);
            }
            FileType::VectorSvg => {
                let input = work_dir.path().join(format!("logo-{}.svg", logo.id));
                std::fs::write(&input, &logo.data)?;
                let converted = self.converter.svg_to_pdf(&input, work_dir.path())?;
                let data = std::fs::read(&converted)?;
                let (source, bbox) = pdf_embed::parse_source(&data)?;
                registry.register_form(&logo.id, source, bbox, next_ref_id, pending);
            }
            FileType::VectorAi | FileType::VectorEps => {
                let ext = if logo.file_type == FileType::VectorAi { "ai" } else { "eps" };
                let input = work_dir.path().join(format!("logo-{}.{ext}", logo.id));
                std::fs::write(&input, &logo.data)?;
                let svg = self.converter.ai_eps_to_svg(&input, work_dir.path())?;
                let converted = self.converter.svg_to_pdf(&svg, work_dir.path())?;
                let data = std::fs::read(&converted)?;
                let (source, bbox) = pdf_embed::parse_source(&data)?;
                registry.register_form(&logo.id, source, bbox, next_ref_id, pending);
            }
            FileType::Unknown => {
                return Err(EngineError::ElementEmbed(format!(
                    "logo {} has unsupported file type ({})",
                    logo.id, logo.filename
                )));
            }
        }
        Ok(())
    }

    /// Draw every imposition cell of an element, rotating about each cell's
    /// center.
    fn draw_element(
        &self,
        canvas: &mut PdfCanvas,
        item: &PlacedElement,
        registry: &XObjectRegistry,
        gs_states: &[(u8, Ref, String)],
        template: &Template,
    ) {
        let entry = match registry.get(&item.logo_key) {
            Some(entry) => entry,
            None => return,
        };
        let element = item.element;
        let gs_name = opacity_state_name(gs_states, element.opacity);

        for cell in geometry::expand_imposition(element) {
            let rect = geometry::cell_to_page_space(&cell, element, template);
            canvas.save_state();
            if let Some(name) = gs_name {
                canvas.set_graphics_state(Name(name.as_bytes()));
            }
            let target = if element.rotation != 0.0 {
                let (cx, cy) = rect.center();
                canvas.translate(cx, cy);
                // Canvas rotation is clockwise on screen; page space is
                // Y-flipped, so negate
                canvas.rotate(-element.rotation);
                Rect::new(-rect.width / 2.0, -rect.height / 2.0, rect.width, rect.height)
            } else {
                rect
            };
            match entry.kind {
                XObjectKind::Image => canvas.draw_image(Name(entry.name.as_bytes()), target),
                XObjectKind::Form { bbox } => {
                    canvas.draw_form(Name(entry.name.as_bytes()), bbox, target)
                }
            }
            canvas.restore_state();
        }
    }

    /// Fill each imposition cell with the element's garment color (falling
    /// back to the project default). Transparent and unset colors draw
    /// nothing; an unparseable hex is logged and skipped.
    fn draw_backgrounds(
        &self,
        canvas: &mut PdfCanvas,
        item: &PlacedElement,
        project: &ProjectSnapshot,
    ) {
        let hex = match element_garment_hex(item.element, project) {
            Some(hex) => hex,
            None => return,
        };
        let color = match Color::from_hex(hex) {
            Ok(color) => color,
            Err(err) => {
                warn!("skipping garment background {hex}: {err}");
                return;
            }
        };
        for cell in geometry::expand_imposition(item.element) {
            let rect = geometry::cell_to_page_space(&cell, item.element, &project.template);
            canvas.save_state();
            canvas.set_fill_color(color);
            canvas.fill_rect(rect);
            canvas.restore_state();
        }
    }
}

fn next_ref(next_ref_id: &mut i32) -> Ref {
    let r = Ref::new(*next_ref_id);
    *next_ref_id += 1;
    r
}

/// Garment hex for an element: per-element override, else project default.
/// `"transparent"` means no background.
fn element_garment_hex<'a>(
    element: &'a CanvasElement,
    project: &'a ProjectSnapshot,
) -> Option<&'a str> {
    let hex = match &element.garment_color {
        Some(hex) => hex.as_str(),
        None => project.default_garment_color()?.hex.as_str(),
    };
    if hex.eq_ignore_ascii_case("transparent") {
        None
    } else {
        Some(hex)
    }
}

/// Register (or find) the ExtGState for an element opacity. Fully opaque
/// elements need no state.
fn graphics_state_for(
    pdf: &mut Pdf,
    gs_states: &mut Vec<(u8, Ref, String)>,
    next_ref_id: &mut i32,
    opacity: f64,
) {
    let percent = opacity_percent(opacity);
    if percent >= 100 || gs_states.iter().any(|(p, _, _)| *p == percent) {
        return;
    }
    let id = next_ref(next_ref_id);
    let alpha = percent as f32 / 100.0;
    pdf.ext_graphics(id)
        .non_stroking_alpha(alpha)
        .stroking_alpha(alpha);
    gs_states.push((percent, id, format!("GS{percent}")));
}

fn opacity_state_name(gs_states: &[(u8, Ref, String)], opacity: f64) -> Option<&str> {
    let percent = opacity_percent(opacity);
    gs_states
        .iter()
        .find(|(p, _, _)| *p == percent)
        .map(|(_, _, name)| name.as_str())
}

fn opacity_percent(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Legend entries for page two: one line per distinct garment color, in
/// first-appearance order across elements.
fn build_legend(project: &ProjectSnapshot, placed: &[PlacedElement]) -> Vec<LegendEntry> {
    let mut seen: Vec<String> = Vec::new();
    let mut entries = Vec::new();
    for item in placed {
        let hex = match element_garment_hex(item.element, project) {
            Some(hex) => hex,
            None => continue,
        };
        let key = hex.to_ascii_uppercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key.clone());
        entries.push(LegendEntry {
            label: legend_label(hex, item.element, project),
        });
    }
    entries
}

/// `"{name} C:{c} M:{m} Y:{y} K:{k}"`, preferring the element's display
/// name, then the project's, then the catalog's, then the raw hex.
fn legend_label(hex: &str, element: &CanvasElement, project: &ProjectSnapshot) -> String {
    let catalog = garment_colors::find_by_hex(hex);

    let name = element
        .garment_color_name
        .clone()
        .or_else(|| {
            project
                .garment_colors
                .iter()
                .find(|gc| gc.hex.eq_ignore_ascii_case(hex))
                .and_then(|gc| gc.name.clone())
        })
        .or_else(|| catalog.map(|entry| entry.name.to_string()))
        .unwrap_or_else(|| hex.to_ascii_uppercase());

    let cmyk = match catalog {
        Some(entry) => entry.cmyk,
        None => color_workflow::hex_to_cmyk_or_black(hex),
    };
    let Cmyk { c, m, y, k } = cmyk;
    format!("{name} C:{c} M:{m} Y:{y} K:{k}")
}

/// Stack legend lines upward from the bottom margin so a long legend grows
/// into the page instead of off it.
fn draw_legend(canvas: &mut PdfCanvas, entries: &[LegendEntry]) {
    if entries.is_empty() {
        return;
    }
    canvas.save_state();
    canvas.set_fill_color(Color::black());
    canvas.set_font_size(LEGEND_FONT_SIZE);
    for (i, entry) in entries.iter().enumerate() {
        let y = LEGEND_BASELINE_Y + i as f64 * LEGEND_LINE_PITCH;
        canvas.draw_string(Name(FONT_NAME), LEGEND_X, y, &entry.label);
    }
    canvas.restore_state();
}

/// A structurally valid empty two-page document for the template: the
/// fallback artifact when generation fails upstream.
pub fn minimal_empty_pdf(template: &Template) -> Vec<u8> {
    let width = (template.width_mm * MM_TO_PT) as f32;
    let height = (template.height_mm * MM_TO_PT) as f32;

    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page1_id = Ref::new(3);
    let page2_id = Ref::new(4);

    pdf.catalog(catalog_id).pages(page_tree_id);
    for page_id in [page1_id, page2_id] {
        let mut page = pdf.page(page_id);
        page.media_box(PdfRect::new(0.0, 0.0, width, height));
        page.parent(page_tree_id);
        page.resources();
    }
    pdf.pages(page_tree_id).kids([page1_id, page2_id]).count(2);
    pdf.finish()
}
