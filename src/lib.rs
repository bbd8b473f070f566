//! Cosmic Scene - a procedural ASCII celestial backdrop
//!
//! Core modules:
//! - `catalog`: Static entity catalog (types, palettes, durations)
//! - `scene`: Deterministic scene logic (style variants, playback, particles)
//! - `renderer`: Glyph patterns, compositing and ordered dithering
//! - `overlay`: Clock and weather text overlay
//! - `weather`: Open-Meteo parsing and condition labels
//! - `platform`: Browser/native platform abstraction (clock, frame loop)
//! - `settings`: Persisted preferences

pub mod catalog;
pub mod overlay;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod weather;

pub use catalog::{Catalog, Entity, EntityKind, Palette, Rgb};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Scene configuration constants
pub mod consts {
    /// Scene-advance tick cadence (~60 Hz)
    pub const TICK_INTERVAL_MS: i32 = 16;
    /// Cross-fade length between two entities
    pub const TRANSITION_DURATION_MS: f64 = 1000.0;
    /// Weather re-poll interval (10 minutes)
    pub const WEATHER_POLL_MS: i32 = 600_000;

    /// Below this physical width the layout uses the mobile scale
    pub const MOBILE_BREAKPOINT: f32 = 640.0;
    /// At or above this physical width the layout uses full scale
    pub const DESKTOP_BREAKPOINT: f32 = 1024.0;
    pub const MIN_SCALE: f32 = 0.6;
    pub const MAX_SCALE: f32 = 1.0;

    /// Background star count (fixed lattice)
    pub const STAR_COUNT: usize = 120;

    /// Particle pool sizing: max(MIN_PARTICLES, PARTICLES_PER_DENSITY * density)
    pub const MIN_PARTICLES: usize = 40;
    pub const PARTICLES_PER_DENSITY: f32 = 90.0;

    /// Per-element cascade offset for staggered glyph groups
    pub const STAGGER_STEP_MS: f64 = 200.0;

    /// Default glyph size in logical pixels
    pub const GLYPH_SIZE: f32 = 14.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Staggered time for element `index` of a glyph group.
///
/// Shifts each element back by `(index + offset) * 200ms` so large groups
/// animate as a cascade instead of in lock-step.
#[inline]
pub fn stagger(time: f64, index: usize, offset: f64) -> f64 {
    time - (index as f64 + offset) * consts::STAGGER_STEP_MS
}

/// Uniform layout scale for a buffer of the given physical width.
///
/// Clamped to `[MIN_SCALE, MAX_SCALE]`, interpolated linearly between the
/// mobile and desktop breakpoints.
pub fn layout_scale(width: f32) -> f32 {
    use consts::*;
    if width <= MOBILE_BREAKPOINT {
        MIN_SCALE
    } else if width >= DESKTOP_BREAKPOINT {
        MAX_SCALE
    } else {
        let t = (width - MOBILE_BREAKPOINT) / (DESKTOP_BREAKPOINT - MOBILE_BREAKPOINT);
        MIN_SCALE + (MAX_SCALE - MIN_SCALE) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_scale_bounds() {
        assert_eq!(layout_scale(320.0), consts::MIN_SCALE);
        assert_eq!(layout_scale(1920.0), consts::MAX_SCALE);
        let mid = layout_scale(832.0);
        assert!(mid > consts::MIN_SCALE && mid < consts::MAX_SCALE);
    }

    #[test]
    fn test_stagger_offsets() {
        assert_eq!(stagger(1000.0, 0, 0.0), 1000.0);
        assert_eq!(stagger(1000.0, 2, 0.5), 500.0);
    }
}
