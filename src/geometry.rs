//! Canvas-space to page-space coordinate transform
//!
//! Canvas space is millimeters, origin top-left, Y growing downward (the
//! design surface convention). Page space is PDF points, origin bottom-left,
//! Y growing upward. The transform scales mm to points and flips the Y axis;
//! rotation is deferred to draw time so it happens about the element center,
//! never the page origin.

use crate::project::{CanvasElement, Template};
use crate::types::Rect;

/// Millimeters to PDF points (72 dpi)
pub const MM_TO_PT: f64 = 2.834;

/// One imposition cell in canvas space: the element's geometry at a grid
/// position. A non-imposed element is a single cell at its own position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasCell {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Expand an element into its imposition grid, row-major. Every cell
/// inherits the element's logo, scale, rotation and opacity; only position
/// varies. Spacing is edge-to-edge in canvas millimeters.
pub fn expand_imposition(element: &CanvasElement) -> Vec<CanvasCell> {
    let rows = element.imposition_rows.max(1);
    let cols = element.imposition_cols.max(1);

    let mut cells = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            cells.push(CanvasCell {
                x: element.x + col as f64 * (element.width + element.imposition_spacing_x),
                y: element.y + row as f64 * (element.height + element.imposition_spacing_y),
                width: element.width,
                height: element.height,
            });
        }
    }
    cells
}

/// Convert one canvas cell to page space, applying the element's scale and
/// the Y-axis flip (`page_y = page_height - canvas_y - height`).
pub fn cell_to_page_space(cell: &CanvasCell, element: &CanvasElement, template: &Template) -> Rect {
    let width = cell.width * element.scale_x * MM_TO_PT;
    let height = cell.height * element.scale_y * MM_TO_PT;
    let x = cell.x * MM_TO_PT;
    let page_height = template.height_mm * MM_TO_PT;
    let y = page_height - cell.y * MM_TO_PT - height;
    Rect::new(x, y, width, height)
}

/// Page-space rect of the element's base cell (no imposition applied).
pub fn to_page_space(element: &CanvasElement, template: &Template) -> Rect {
    let base = CanvasCell {
        x: element.x,
        y: element.y,
        width: element.width,
        height: element.height,
    };
    cell_to_page_space(&base, element, template)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a3() -> Template {
        Template::lookup("template-A3")
    }

    #[test]
    fn test_y_flip_at_origin() {
        let element = CanvasElement {
            logo_id: "1".into(),
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 80.0,
            ..Default::default()
        };
        let rect = to_page_space(&element, &a3());
        assert_eq!(rect.x, 0.0);
        // Top-left of canvas lands at the top of the page
        assert!((rect.y - (420.0 * MM_TO_PT - 80.0 * MM_TO_PT)).abs() < 1e-9);
        assert!((rect.width - 50.0 * MM_TO_PT).abs() < 1e-9);
    }

    #[test]
    fn test_scale_applied() {
        let element = CanvasElement {
            logo_id: "1".into(),
            width: 100.0,
            height: 100.0,
            scale_x: 2.0,
            scale_y: 0.5,
            ..Default::default()
        };
        let rect = to_page_space(&element, &a3());
        assert!((rect.width - 200.0 * MM_TO_PT).abs() < 1e-9);
        assert!((rect.height - 50.0 * MM_TO_PT).abs() < 1e-9);
    }

    #[test]
    fn test_imposition_grid_row_major() {
        let element = CanvasElement {
            logo_id: "1".into(),
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
            is_imposition: true,
            imposition_rows: 2,
            imposition_cols: 3,
            imposition_spacing_x: 5.0,
            imposition_spacing_y: 6.0,
            ..Default::default()
        };
        let cells = expand_imposition(&element);
        assert_eq!(cells.len(), 6);

        // Row-major: first row's three columns, then the second row
        for (i, cell) in cells.iter().enumerate() {
            let row = (i / 3) as f64;
            let col = (i % 3) as f64;
            assert_eq!(cell.x, 10.0 + col * (30.0 + 5.0));
            assert_eq!(cell.y, 20.0 + row * (40.0 + 6.0));
            assert_eq!(cell.width, 30.0);
        }
    }

    #[test]
    fn test_single_cell_without_imposition() {
        let element = CanvasElement {
            logo_id: "1".into(),
            x: 3.0,
            y: 4.0,
            ..Default::default()
        };
        let cells = expand_imposition(&element);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].x, 3.0);
    }

    #[test]
    fn test_zero_grid_clamped_to_one() {
        let element = CanvasElement {
            logo_id: "1".into(),
            imposition_rows: 0,
            imposition_cols: 0,
            ..Default::default()
        };
        assert_eq!(expand_imposition(&element).len(), 1);
    }
}
