//! Entity glyph patterns
//!
//! One pattern per entity type, looked up through [`pattern_for`]. Patterns
//! are pure functions of the frame size, time, palette and style variant;
//! they only record commands into the [`Frame`].

mod bodies;
mod deep_sky;
mod stellar;

use glam::Vec2;

use super::frame::Frame;
use crate::catalog::{EntityKind, Palette};
use crate::consts::GLYPH_SIZE;
use crate::scene::StyleVariant;

/// A glyph pattern renderer
pub type PatternFn = fn(&mut Frame, &PatternContext);

/// Inputs shared by every pattern
#[derive(Debug, Clone, Copy)]
pub struct PatternContext<'a> {
    /// Logical canvas size
    pub size: Vec2,
    pub time_ms: f64,
    pub palette: &'a Palette,
    pub variant: &'a StyleVariant,
}

impl PatternContext<'_> {
    /// Focal point of the pattern (slightly above center, clear of the overlay)
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.size.x * 0.5, self.size.y * 0.46)
    }

    /// Animation seconds scaled by the variant speed
    pub fn secs(&self) -> f32 {
        (self.time_ms * 0.001) as f32 * self.variant.speed
    }

    /// Seconds at a staggered time for element `index`
    pub fn stagger_secs(&self, index: usize, offset: f64) -> f32 {
        (crate::stagger(self.time_ms, index, offset) * 0.001) as f32 * self.variant.speed
    }

    /// Element count scaled by density
    pub fn count(&self, base: f32) -> usize {
        (base * self.variant.density).round().max(1.0) as usize
    }

    /// Radius as a fraction of the short canvas side, scaled by intensity
    pub fn radius(&self, fraction: f32) -> f32 {
        self.size.min_element() * fraction * (0.8 + 0.2 * self.variant.intensity)
    }

    /// Glyph size scaled by intensity
    pub fn glyph_size(&self, factor: f32) -> f32 {
        GLYPH_SIZE * factor * (0.85 + 0.15 * self.variant.intensity)
    }

    /// Deterministic value in [0, 1) for element `i`
    pub fn hash01(&self, i: usize) -> f32 {
        hash01(self.variant.seed, i)
    }
}

/// Sine hash in [0, 1) keyed by seed and index
pub fn hash01(seed: u32, i: usize) -> f32 {
    let x = ((seed % 10_007) as f64 * 0.618 + i as f64 * 12.9898).sin() * 43_758.545_3;
    ((x - x.floor()) as f32).min(0.999_999)
}

/// Pick a glyph from `ramp` by brightness in [0, 1]
pub fn ramp_glyph(ramp: &[char], brightness: f32) -> char {
    if ramp.is_empty() {
        return ' ';
    }
    let i = (brightness.clamp(0.0, 1.0) * (ramp.len() - 1) as f32).round() as usize;
    ramp[i.min(ramp.len() - 1)]
}

/// Density ramp from faint to solid
pub const RAMP: [char; 8] = ['.', ':', '-', '=', '+', '*', '#', '@'];

/// Pattern for an entity type; unknown types have none
pub fn pattern_for(kind: &EntityKind) -> Option<PatternFn> {
    let f: PatternFn = match kind {
        EntityKind::BlackHole => bodies::black_hole,
        EntityKind::Sun => stellar::sun,
        EntityKind::Star => stellar::star,
        EntityKind::Pulsar => stellar::pulsar,
        EntityKind::Nebula => deep_sky::nebula,
        EntityKind::Galaxy => deep_sky::galaxy,
        EntityKind::Cluster => deep_sky::cluster,
        EntityKind::Quasar => stellar::quasar,
        EntityKind::Supernova => stellar::supernova,
        EntityKind::Exoplanet => bodies::exoplanet,
        EntityKind::Rings => bodies::rings,
        EntityKind::Meteoroid => bodies::meteoroid,
        EntityKind::Comet => bodies::comet,
        EntityKind::Other(_) => return None,
    };
    Some(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Rgb;
    use crate::renderer::frame::DrawCommand;
    use crate::scene::derive_variant;

    fn palette() -> Palette {
        Palette {
            primary: Rgb::new(255, 107, 53),
            secondary: Rgb::new(247, 197, 159),
            accent: Rgb::new(46, 31, 94),
        }
    }

    fn record(kind: &EntityKind, style: &str, time_ms: f64) -> Vec<DrawCommand> {
        let variant = derive_variant(style, kind.as_str());
        let palette = palette();
        let mut frame = Frame::new(1280, 720, 1.0);
        let ctx = PatternContext {
            size: frame.logical_size(),
            time_ms,
            palette: &palette,
            variant: &variant,
        };
        if let Some(f) = pattern_for(kind) {
            f(&mut frame, &ctx);
        }
        frame.into_commands()
    }

    #[test]
    fn test_every_known_kind_draws_glyphs() {
        for kind in EntityKind::KNOWN.iter() {
            let commands = record(kind, "", 4_000.0);
            assert!(!commands.is_empty(), "{:?} drew nothing", kind);
        }
    }

    #[test]
    fn test_unknown_kind_has_no_pattern() {
        assert!(pattern_for(&EntityKind::Other("wormhole".into())).is_none());
    }

    #[test]
    fn test_patterns_are_deterministic() {
        for kind in EntityKind::KNOWN.iter() {
            assert_eq!(record(kind, "swirl", 1234.5), record(kind, "swirl", 1234.5));
        }
    }

    #[test]
    fn test_style_changes_output() {
        for kind in EntityKind::KNOWN.iter() {
            assert_ne!(
                record(kind, "calm", 2_500.0),
                record(kind, "violent", 2_500.0),
                "{:?} ignored its variant",
                kind
            );
        }
    }

    #[test]
    fn test_patterns_animate_over_time() {
        for kind in EntityKind::KNOWN.iter() {
            assert_ne!(record(kind, "drift", 1_000.0), record(kind, "drift", 1_700.0));
        }
    }

    #[test]
    fn test_hash01_range() {
        for i in 0..1000 {
            let v = hash01(0xDEAD_BEEF, i);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_ramp_glyph_ends() {
        assert_eq!(ramp_glyph(&RAMP, 0.0), '.');
        assert_eq!(ramp_glyph(&RAMP, 1.0), '@');
        assert_eq!(ramp_glyph(&RAMP, 7.0), '@');
    }
}
