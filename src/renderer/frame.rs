//! Draw command recording
//!
//! Patterns never touch a surface directly. They record [`DrawCommand`]s into
//! a [`Frame`], which maps logical coordinates to physical pixels and applies
//! the current global alpha. Surfaces then replay the command list.

use glam::Vec2;

use crate::catalog::Rgb;

/// Commands with less alpha than this are dropped at record time
const MIN_VISIBLE_ALPHA: f32 = 0.004;

/// How a command is combined with the pixels underneath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    #[default]
    SourceOver,
    /// Additive (canvas "lighter")
    Lighter,
}

impl Composite {
    pub fn as_canvas_op(&self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::Lighter => "lighter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_canvas_align(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// A single recorded drawing operation, in physical pixels
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    SetComposite(Composite),
    /// One glyph centered on `pos`
    Glyph {
        ch: char,
        pos: Vec2,
        size: f32,
        color: Rgb,
        alpha: f32,
    },
    /// Outlined text anchored at `pos` (baseline middle)
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        align: TextAlign,
        fill: Rgb,
        stroke: Rgb,
        stroke_width: f32,
    },
}

/// Command recorder for one frame
#[derive(Debug, Clone)]
pub struct Frame {
    commands: Vec<DrawCommand>,
    physical: Vec2,
    scale: f32,
    global_alpha: f32,
}

impl Frame {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            commands: Vec::with_capacity(2048),
            physical: Vec2::new(width as f32, height as f32),
            scale: scale.max(f32::EPSILON),
            global_alpha: 1.0,
        }
    }

    /// Size of the logical canvas all patterns draw into
    pub fn logical_size(&self) -> Vec2 {
        self.physical / self.scale
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_composite(&mut self, composite: Composite) {
        self.commands.push(DrawCommand::SetComposite(composite));
    }

    pub fn clear(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::Clear(color));
    }

    /// Record a glyph at a logical position
    pub fn glyph(&mut self, ch: char, pos: Vec2, size: f32, color: Rgb, alpha: f32) {
        let alpha = (alpha * self.global_alpha).clamp(0.0, 1.0);
        if alpha < MIN_VISIBLE_ALPHA || size <= 0.0 || !alpha.is_finite() {
            return;
        }
        let pos = pos * self.scale;
        let margin = size * self.scale;
        if pos.x < -margin
            || pos.y < -margin
            || pos.x > self.physical.x + margin
            || pos.y > self.physical.y + margin
            || !pos.is_finite()
        {
            return;
        }
        self.commands.push(DrawCommand::Glyph {
            ch,
            pos,
            size: size * self.scale,
            color,
            alpha,
        });
    }

    /// Record outlined text at a logical position (ignores global alpha)
    pub fn text(&mut self, text: impl Into<String>, pos: Vec2, size: f32, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            pos: pos * self.scale,
            size: size * self.scale,
            align,
            fill: Rgb::new(235, 235, 235),
            stroke: Rgb::new(8, 8, 12),
            stroke_width: 3.0 * self.scale,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn glyph_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Glyph { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_to_physical() {
        let mut frame = Frame::new(600, 400, 0.6);
        let logical = frame.logical_size();
        assert!((logical.x - 1000.0).abs() < 1e-2);
        assert!((logical.y - 666.667).abs() < 1e-2);
        frame.glyph('*', Vec2::new(500.0, 100.0), 10.0, Rgb::WHITE, 1.0);
        match &frame.commands()[0] {
            DrawCommand::Glyph { pos, size, .. } => {
                assert!((pos.x - 300.0).abs() < 1e-3);
                assert!((pos.y - 60.0).abs() < 1e-3);
                assert!((size - 6.0).abs() < 1e-4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_global_alpha_and_culling() {
        let mut frame = Frame::new(100, 100, 1.0);
        frame.set_global_alpha(0.5);
        frame.glyph('*', Vec2::new(50.0, 50.0), 10.0, Rgb::WHITE, 0.8);
        frame.glyph('*', Vec2::new(500.0, 50.0), 10.0, Rgb::WHITE, 1.0);
        frame.set_global_alpha(0.0);
        frame.glyph('*', Vec2::new(50.0, 50.0), 10.0, Rgb::WHITE, 1.0);
        assert_eq!(frame.glyph_count(), 1);
        match &frame.commands()[0] {
            DrawCommand::Glyph { alpha, .. } => assert!((alpha - 0.4).abs() < 1e-6),
            other => panic!("unexpected {:?}", other),
        }
    }
}
