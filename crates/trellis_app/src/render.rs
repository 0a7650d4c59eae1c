//! Rendering boundary
//!
//! Widgets draw through the [`Renderer`] trait and never touch a window or
//! GPU directly. [`RecordingRenderer`] records [`DrawCommand`]s instead of
//! drawing, for tests and headless runs.

use trellis_layout::Rect;

/// 8-bit RGBA color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const RED: Rgba = Rgba::new(255, 0, 0, 255);
    pub const GREEN: Rgba = Rgba::new(0, 255, 0, 255);
    pub const BLUE: Rgba = Rgba::new(0, 0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Drawing surface handed to widget render callbacks
pub trait Renderer {
    // ─────────────────────────────────────────────────────────────────────────
    // Frame
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a new frame
    fn clear(&mut self);

    /// Show the finished frame
    fn present(&mut self) -> anyhow::Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Clipping
    // ─────────────────────────────────────────────────────────────────────────

    /// Restrict drawing to `rect` until the matching [`Renderer::pop_clip`]
    fn push_clip(&mut self, rect: Rect);

    fn pop_clip(&mut self);

    // ─────────────────────────────────────────────────────────────────────────
    // Drawing
    // ─────────────────────────────────────────────────────────────────────────

    /// Outline a rectangle
    fn draw_rect(&mut self, rect: Rect, color: Rgba);

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn fill_rounded_rect(&mut self, rect: Rect, radius: i32, color: Rgba);

    /// Draw `text` wrapped to the width of `rect`
    fn draw_text(&mut self, rect: Rect, text: &str, color: Rgba);

    // ─────────────────────────────────────────────────────────────────────────
    // Measurement
    // ─────────────────────────────────────────────────────────────────────────

    /// Height `text` needs when wrapped to `width`
    fn text_height(&self, width: i32, text: &str) -> i32;
}

/// A single recorded drawing operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    Clear,
    Present,
    PushClip(Rect),
    PopClip,
    DrawRect { rect: Rect, color: Rgba },
    FillRect { rect: Rect, color: Rgba },
    FillRoundedRect { rect: Rect, radius: i32, color: Rgba },
    DrawText { rect: Rect, text: String, color: Rgba },
}

/// A renderer that records commands instead of drawing.
///
/// Text is measured as fixed-size cells.
#[derive(Debug)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
    clip_depth: usize,
    frames_presented: u64,
    cell_width: i32,
    line_height: i32,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

impl RecordingRenderer {
    /// Create a recorder measuring text in `cell_width` x `line_height` cells
    pub fn new(cell_width: i32, line_height: i32) -> Self {
        Self {
            commands: Vec::new(),
            clip_depth: 0,
            frames_presented: 0,
            cell_width: cell_width.max(1),
            line_height,
        }
    }

    /// Get the recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands recorded since the most recent [`DrawCommand::Clear`]
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Clip regions pushed and not yet popped
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn present(&mut self) -> anyhow::Result<()> {
        if self.clip_depth != 0 {
            anyhow::bail!("frame presented with {} unbalanced clip(s)", self.clip_depth);
        }
        self.commands.push(DrawCommand::Present);
        self.frames_presented += 1;
        Ok(())
    }

    fn push_clip(&mut self, rect: Rect) {
        self.clip_depth += 1;
        self.commands.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            tracing::warn!("pop_clip without a matching push_clip");
            return;
        }
        self.clip_depth -= 1;
        self.commands.push(DrawCommand::PopClip);
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::DrawRect { rect, color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: i32, color: Rgba) {
        self.commands
            .push(DrawCommand::FillRoundedRect { rect, radius, color });
    }

    fn draw_text(&mut self, rect: Rect, text: &str, color: Rgba) {
        self.commands.push(DrawCommand::DrawText {
            rect,
            text: text.to_string(),
            color,
        });
    }

    fn text_height(&self, width: i32, text: &str) -> i32 {
        let per_line = (width / self.cell_width).max(1) as usize;
        let chars = text.chars().count();
        let lines = chars.div_ceil(per_line).max(1);
        lines as i32 * self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_height_wraps_by_cells() {
        let renderer = RecordingRenderer::new(10, 20);
        assert_eq!(renderer.text_height(100, ""), 20);
        assert_eq!(renderer.text_height(100, "0123456789"), 20);
        assert_eq!(renderer.text_height(100, "0123456789a"), 40);
        // Narrower than a cell still fits one character per line
        assert_eq!(renderer.text_height(0, "abc"), 60);
    }

    #[test]
    fn test_unbalanced_clip_fails_present() {
        let mut renderer = RecordingRenderer::default();
        renderer.clear();
        renderer.push_clip(Rect::new(0, 0, 10, 10));
        assert!(renderer.present().is_err());

        renderer.pop_clip();
        assert!(renderer.present().is_ok());
        assert_eq!(renderer.frames_presented(), 1);
    }

    #[test]
    fn test_last_frame() {
        let mut renderer = RecordingRenderer::default();
        renderer.clear();
        renderer.fill_rect(Rect::new(0, 0, 1, 1), Rgba::RED);
        renderer.present().unwrap();
        renderer.clear();
        renderer.fill_rect(Rect::new(0, 0, 2, 2), Rgba::BLUE);

        assert_eq!(
            renderer.last_frame(),
            &[
                DrawCommand::Clear,
                DrawCommand::FillRect {
                    rect: Rect::new(0, 0, 2, 2),
                    color: Rgba::BLUE
                }
            ]
        );
    }
}
