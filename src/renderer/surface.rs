//! Render targets
//!
//! A [`Surface`] replays recorded draw commands and exposes its RGBA pixels
//! for post-processing. The browser uses a 2D canvas context; tests and the
//! native preview use [`SoftwareSurface`].

use glam::Vec2;

use super::frame::{Composite, DrawCommand, TextAlign};
use crate::catalog::Rgb;

pub trait Surface {
    /// Physical size in pixels
    fn size(&self) -> (u32, u32);

    /// Replay a frame's command list
    fn execute(&mut self, commands: &[DrawCommand]);

    /// Run `f` over the RGBA8 pixel buffer (row-major, `width * 4` stride)
    fn with_pixels(&mut self, f: &mut dyn FnMut(&mut [u8], u32, u32));
}

/// Approximate ink coverage of a glyph, used by the software rasterizer
pub fn glyph_coverage(ch: char) -> f32 {
    match ch {
        ' ' => 0.0,
        '.' | '\'' | '`' | ',' => 0.15,
        '·' | '˚' | '°' | ':' => 0.25,
        '-' | '~' | '_' | '=' | '/' | '\\' | '|' => 0.35,
        '+' | '*' | 'o' | '∘' | '✧' => 0.5,
        '✦' | '✶' | '◦' | 'O' | '0' => 0.65,
        '#' | '%' | '&' | '8' | '◉' | '●' => 0.85,
        '@' | '█' | '▓' | '■' => 1.0,
        c if c.is_ascii_alphanumeric() => 0.55,
        _ => 0.5,
    }
}

/// CPU RGBA8 render target.
///
/// Glyphs are rasterized as soft square splats whose area follows the glyph's
/// ink coverage; text is a row of splats over a darker outline.
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    composite: Composite,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            composite: Composite::SourceOver,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Mean luma over the whole buffer
    pub fn mean_luma(&self) -> f32 {
        let count = (self.width as usize * self.height as usize).max(1);
        let sum: f32 = self
            .pixels
            .chunks_exact(4)
            .map(|p| Rgb::new(p[0], p[1], p[2]).luma())
            .sum();
        sum / count as f32
    }

    fn clear(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let src = [color.r, color.g, color.b];
        for c in 0..3 {
            let dst = self.pixels[i + c] as f32;
            let s = src[c] as f32;
            let out = match self.composite {
                Composite::SourceOver => dst + (s - dst) * alpha,
                Composite::Lighter => dst + s * alpha,
            };
            self.pixels[i + c] = out.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = 255;
    }

    fn splat(&mut self, center: Vec2, half: f32, color: Rgb, alpha: f32) {
        if half <= 0.0 {
            return;
        }
        let x0 = (center.x - half).floor() as i32;
        let x1 = (center.x + half).ceil() as i32;
        let y0 = (center.y - half).floor() as i32;
        let y1 = (center.y + half).ceil() as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                // Soften toward the edges
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                let n = (d.abs().max_element() / half).clamp(0.0, 1.0);
                let falloff = 1.0 - (n - 0.5).max(0.0) * 1.2;
                self.blend(x, y, color, alpha * falloff);
            }
        }
    }

    fn draw_glyph(&mut self, ch: char, pos: Vec2, size: f32, color: Rgb, alpha: f32) {
        let coverage = glyph_coverage(ch);
        if coverage <= 0.0 {
            return;
        }
        let half = (size * 0.5 * coverage.sqrt()).max(0.5);
        self.splat(pos, half, color, alpha);
    }

    fn draw_text(
        &mut self,
        text: &str,
        pos: Vec2,
        size: f32,
        align: TextAlign,
        fill: Rgb,
        stroke: Rgb,
        stroke_width: f32,
    ) {
        let advance = size * 0.6;
        let width = advance * text.chars().count() as f32;
        let start = match align {
            TextAlign::Left => pos.x,
            TextAlign::Center => pos.x - width / 2.0,
            TextAlign::Right => pos.x - width,
        };
        let previous = self.composite;
        self.composite = Composite::SourceOver;
        for (i, ch) in text.chars().enumerate() {
            let center = Vec2::new(start + advance * (i as f32 + 0.5), pos.y);
            let coverage = glyph_coverage(ch);
            if coverage <= 0.0 {
                continue;
            }
            let half = size * 0.35 * coverage.sqrt();
            self.splat(center, half + stroke_width * 0.5, stroke, 0.9);
            self.splat(center, half, fill, 1.0);
        }
        self.composite = previous;
    }
}

impl Surface for SoftwareSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn execute(&mut self, commands: &[DrawCommand]) {
        for command in commands {
            match command {
                DrawCommand::Clear(color) => self.clear(*color),
                DrawCommand::SetComposite(composite) => self.composite = *composite,
                DrawCommand::Glyph {
                    ch,
                    pos,
                    size,
                    color,
                    alpha,
                } => self.draw_glyph(*ch, *pos, *size, *color, *alpha),
                DrawCommand::Text {
                    text,
                    pos,
                    size,
                    align,
                    fill,
                    stroke,
                    stroke_width,
                } => self.draw_text(text, *pos, *size, *align, *fill, *stroke, *stroke_width),
            }
        }
    }

    fn with_pixels(&mut self, f: &mut dyn FnMut(&mut [u8], u32, u32)) {
        let (w, h) = (self.width, self.height);
        f(&mut self.pixels, w, h);
    }
}
