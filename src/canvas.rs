//! High-level canvas wrapper over pdf-writer content streams
//!
//! Thin stateful layer so the generator can draw in terms of fill colors,
//! rects, text lines and placed XObjects instead of raw content operators.

use pdf_writer::{Content, Name, Str};

use crate::types::{Color, Rect};

/// Canvas state tracked across save/restore
#[derive(Clone)]
struct CanvasState {
    fill_color: Color,
    font_size: f64,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            fill_color: Color::black(),
            font_size: 10.0,
        }
    }
}

/// Stateful wrapper around one page's content stream
pub struct PdfCanvas {
    content: Content,
    state: CanvasState,
    state_stack: Vec<CanvasState>,
}

impl PdfCanvas {
    pub fn new() -> Self {
        Self {
            content: Content::new(),
            state: CanvasState::default(),
            state_stack: Vec::new(),
        }
    }

    /// Finalize into raw content-stream bytes.
    pub fn finish(self) -> Vec<u8> {
        self.content.finish()
    }

    pub fn save_state(&mut self) {
        self.state_stack.push(self.state.clone());
        self.content.save_state();
    }

    pub fn restore_state(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
            self.content.restore_state();
        }
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
        self.content
            .set_fill_rgb(color.r as f32, color.g as f32, color.b as f32);
    }

    /// Select a named ExtGState (registered in page resources) for opacity.
    pub fn set_graphics_state(&mut self, name: Name) {
        self.content.set_parameters(name);
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        self.content.rect(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        );
        self.content.fill_nonzero();
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.state.font_size = size;
    }

    /// Draw a single line of text at the given baseline with the named font.
    /// Legend labels are plain ASCII; text is written as a literal string.
    pub fn draw_string(&mut self, font: Name, x: f64, y: f64, text: &str) {
        self.content.begin_text();
        self.content.set_font(font, self.state.font_size as f32);
        self.content.next_line(x as f32, y as f32);
        self.content.show(Str(text.as_bytes()));
        self.content.end_text();
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.content
            .transform([1.0, 0.0, 0.0, 1.0, x as f32, y as f32]);
    }

    pub fn rotate(&mut self, angle_degrees: f64) {
        let rad = angle_degrees.to_radians();
        let (sin, cos) = (rad.sin() as f32, rad.cos() as f32);
        self.content.transform([cos, sin, -sin, cos, 0.0, 0.0]);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.content
            .transform([sx as f32, 0.0, 0.0, sy as f32, 0.0, 0.0]);
    }

    /// Draw an image XObject scaled into `rect`. PDF images are 1×1 unit,
    /// so the CTM scales to the target size and translates to the rect's
    /// bottom-left corner.
    pub fn draw_image(&mut self, name: Name, rect: Rect) {
        self.content.save_state();
        self.content.transform([
            rect.width as f32,
            0.0,
            0.0,
            rect.height as f32,
            rect.x as f32,
            rect.y as f32,
        ]);
        self.content.x_object(name);
        self.content.restore_state();
    }

    /// Place a form XObject with bounding box `bbox` (in its own coordinate
    /// space) into the page-space `rect`, scaling to fit exactly.
    pub fn draw_form(&mut self, name: Name, bbox: Rect, rect: Rect) {
        let sx = if bbox.width > 0.0 { rect.width / bbox.width } else { 1.0 };
        let sy = if bbox.height > 0.0 { rect.height / bbox.height } else { 1.0 };
        self.content.save_state();
        self.content.transform([
            sx as f32,
            0.0,
            0.0,
            sy as f32,
            (rect.x - bbox.x * sx) as f32,
            (rect.y - bbox.y * sy) as f32,
        ]);
        self.content.x_object(name);
        self.content.restore_state();
    }
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_emits_operators() {
        let mut canvas = PdfCanvas::new();
        canvas.set_fill_color(Color::rgb(1.0, 0.0, 0.0));
        canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        let bytes = canvas.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("rg"));
        assert!(text.contains("re"));
        assert!(text.contains('f'));
    }

    #[test]
    fn test_draw_string_literal() {
        let mut canvas = PdfCanvas::new();
        canvas.set_font_size(10.0);
        canvas.draw_string(Name(b"F1"), 50.0, 20.0, "Red C:0 M:100 Y:100 K:0");
        let bytes = canvas.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Red C:0 M:100 Y:100 K:0)"));
    }

    #[test]
    fn test_state_stack_balanced() {
        let mut canvas = PdfCanvas::new();
        canvas.save_state();
        canvas.set_fill_color(Color::white());
        canvas.restore_state();
        // Restoring with an empty stack is a no-op, not a panic
        canvas.restore_state();
        let bytes = canvas.finish();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("q\n").count(), text.matches("Q\n").count());
    }
}
