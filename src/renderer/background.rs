//! Shared layers: lattice star field and ambient particles

use glam::Vec2;

use super::frame::Frame;
use crate::catalog::{Palette, Rgb};
use crate::consts::{GLYPH_SIZE, STAR_COUNT};
use crate::scene::{ParticlePool, StyleVariant};

const STAR_GLYPHS: [char; 4] = ['.', '·', '*', '+'];
const STAR_COLOR: Rgb = Rgb::new(210, 215, 235);

/// Lattice position of background star `i` within `size`.
///
/// Fixed per index so stars do not jump between frames.
pub fn star_position(i: usize, size: Vec2) -> Vec2 {
    let f = i as f32;
    Vec2::new(
        (f * 97.31 + 13.7).rem_euclid(size.x.max(1.0)),
        (f * 57.73 + 41.1).rem_euclid(size.y.max(1.0)),
    )
}

/// Twinkle brightness of star `i` in [0.35, 1.0]
pub fn star_twinkle(i: usize, time_ms: f64, phase: f32) -> f32 {
    let t = (time_ms * 0.0015) as f32;
    0.35 + 0.65 * (t + i as f32 * 0.7 + phase).sin().abs()
}

pub fn draw_star_field(frame: &mut Frame, time_ms: f64, variant: &StyleVariant) {
    let size = frame.logical_size();
    for i in 0..STAR_COUNT {
        let pos = star_position(i, size);
        let twinkle = star_twinkle(i, time_ms, variant.phase);
        let glyph = STAR_GLYPHS[i % STAR_GLYPHS.len()];
        frame.glyph(glyph, pos, GLYPH_SIZE * 0.8, STAR_COLOR, twinkle * 0.6);
    }
}

pub fn draw_particles(frame: &mut Frame, pool: &ParticlePool, palette: &Palette) {
    for p in pool.particles() {
        let color = p.color.lerp(palette.accent, 0.1);
        frame.glyph(p.glyph, p.pos, GLYPH_SIZE, color, p.alpha());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::derive_variant;

    #[test]
    fn test_star_positions_stable_and_in_bounds() {
        let size = Vec2::new(1280.0, 720.0);
        for i in 0..STAR_COUNT {
            let a = star_position(i, size);
            assert_eq!(a, star_position(i, size));
            assert!(a.x >= 0.0 && a.x < size.x);
            assert!(a.y >= 0.0 && a.y < size.y);
        }
    }

    #[test]
    fn test_twinkle_range() {
        for i in 0..STAR_COUNT {
            let b = star_twinkle(i, i as f64 * 123.0, 1.3);
            assert!((0.35..=1.0).contains(&b));
        }
    }

    #[test]
    fn test_star_field_draws_every_star() {
        let mut frame = Frame::new(1280, 720, 1.0);
        draw_star_field(&mut frame, 0.0, &derive_variant("twinkle", "star"));
        assert_eq!(frame.glyph_count(), STAR_COUNT);
    }
}
