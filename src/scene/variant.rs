//! Style variant derivation
//!
//! A style variant is a bundle of rendering parameters derived from an
//! entity's animation-style label and type. Derivation is a pure function of
//! a 32-bit rolling hash, so the same inputs always render the same way.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::EntityKind;

/// Label hashed when both the style label and the type tag are empty
pub const DEFAULT_STYLE_KEY: &str = "cosmic";

/// Base motion styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseStyle {
    Drift,
    Swirl,
    Pulse,
    Twinkle,
    Wave,
    Orbit,
    Flare,
    Ripple,
}

impl BaseStyle {
    pub const ALL: [BaseStyle; 8] = [
        BaseStyle::Drift,
        BaseStyle::Swirl,
        BaseStyle::Pulse,
        BaseStyle::Twinkle,
        BaseStyle::Wave,
        BaseStyle::Orbit,
        BaseStyle::Flare,
        BaseStyle::Ripple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseStyle::Drift => "drift",
            BaseStyle::Swirl => "swirl",
            BaseStyle::Pulse => "pulse",
            BaseStyle::Twinkle => "twinkle",
            BaseStyle::Wave => "wave",
            BaseStyle::Orbit => "orbit",
            BaseStyle::Flare => "flare",
            BaseStyle::Ripple => "ripple",
        }
    }

    /// Preferred base styles for an entity type (all eight when unknown)
    pub fn candidates_for(kind: &EntityKind) -> &'static [BaseStyle] {
        use BaseStyle::*;
        match kind {
            EntityKind::Meteoroid => &[Drift, Flare, Ripple],
            EntityKind::Comet => &[Drift, Wave, Flare],
            EntityKind::BlackHole => &[Swirl, Orbit, Ripple],
            EntityKind::Sun => &[Pulse, Flare, Wave],
            EntityKind::Star => &[Twinkle, Pulse, Flare],
            EntityKind::Pulsar => &[Pulse, Orbit, Ripple],
            EntityKind::Nebula => &[Drift, Wave, Swirl],
            EntityKind::Galaxy => &[Swirl, Orbit, Drift],
            EntityKind::Cluster => &[Twinkle, Orbit, Drift],
            EntityKind::Quasar => &[Flare, Swirl, Pulse],
            EntityKind::Supernova => &[Flare, Ripple, Pulse],
            EntityKind::Exoplanet => &[Orbit, Drift, Wave],
            EntityKind::Rings => &[Orbit, Ripple, Wave],
            EntityKind::Other(_) => &BaseStyle::ALL,
        }
    }
}

/// Derived rendering parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleVariant {
    pub base: BaseStyle,
    /// Motion speed multiplier (0.6 - 2.8)
    pub speed: f32,
    /// Particle/glyph density multiplier (0.7 - 3.2)
    pub density: f32,
    /// Brightness/size intensity (0.5 - 2.0)
    pub intensity: f32,
    /// Oscillation phase offset (0 - 2π)
    pub phase: f32,
    /// Shape distortion factor (0 - 1)
    pub distortion: f32,
    /// Absolute hash, used as a per-variant seed
    pub seed: u32,
}

impl Default for StyleVariant {
    fn default() -> Self {
        derive_variant("", "")
    }
}

impl StyleVariant {
    /// Style-specific brightness/size modulation for element `index` at `time_ms`.
    ///
    /// Stays within roughly [0.2, 1.8] for every base style.
    pub fn modulation(&self, time_ms: f64, index: usize) -> f32 {
        let t = (time_ms * 0.001) as f32 * self.speed + self.phase;
        let i = index as f32;
        let m = match self.base {
            BaseStyle::Drift => 1.0 + 0.15 * (t * 0.5 + i * 0.3).sin(),
            BaseStyle::Swirl => 1.0 + 0.3 * (t * 1.5 + i * 0.6).sin(),
            BaseStyle::Pulse => 1.0 + 0.5 * (t * 3.0).sin(),
            BaseStyle::Twinkle => 0.6 + 0.6 * (t * 4.0 + i * 1.7).sin().abs(),
            BaseStyle::Wave => 1.0 + 0.35 * (t * 2.0 - i * 0.4).sin(),
            BaseStyle::Orbit => 1.0 + 0.2 * (t + i * 0.9).cos(),
            BaseStyle::Flare => 0.8 + 0.8 * (t * 2.5 + i).sin().max(0.0).powi(3),
            BaseStyle::Ripple => 1.0 + 0.4 * (t * 2.2 - i * 0.8).sin(),
        };
        m.clamp(0.2, 1.8)
    }

    /// Style-specific positional jitter, scaled by distortion
    pub fn offset(&self, time_ms: f64, index: usize) -> Vec2 {
        let t = (time_ms * 0.001) as f32 * self.speed + self.phase;
        let i = index as f32;
        let amp = 1.0 + self.distortion * 6.0;
        let v = match self.base {
            BaseStyle::Drift => Vec2::new((t * 0.4 + i).sin(), (t * 0.3 + i * 1.3).cos()),
            BaseStyle::Swirl => Vec2::new((t + i).cos(), (t + i).sin()),
            BaseStyle::Pulse | BaseStyle::Twinkle => Vec2::ZERO,
            BaseStyle::Wave => Vec2::new(0.0, (t * 2.0 + i * 0.5).sin()),
            BaseStyle::Orbit => Vec2::new((t * 0.8 + i).cos(), (t * 0.8 + i).sin() * 0.5),
            BaseStyle::Flare => Vec2::new((t * 3.0 + i).sin() * 0.5, 0.0),
            BaseStyle::Ripple => {
                let r = (t * 2.0 - i * 0.3).sin();
                Vec2::new(r, r) * 0.7
            }
        };
        v * amp
    }
}

/// 32-bit polynomial rolling hash over UTF-16 code units (`h = h * 31 + c`)
pub fn style_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |h, c| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(c as i32)
    })
}

/// Derive the style variant for a label/type pair.
///
/// The hash key is `style_label`, falling back to `entity_type` and then to
/// [`DEFAULT_STYLE_KEY`] when empty.
pub fn derive_variant(style_label: &str, entity_type: &str) -> StyleVariant {
    let key = [style_label, entity_type]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STYLE_KEY);
    let h = style_hash(key).unsigned_abs();

    let kind = EntityKind::from_tag(entity_type);
    let candidates = BaseStyle::candidates_for(&kind);
    let base = candidates[h as usize % candidates.len()];

    let field = |shift: u32, mask: u32| ((h >> shift) & mask) as f32 / mask as f32;

    StyleVariant {
        base,
        speed: 0.6 + field(3, 0xFF) * 2.2,
        density: 0.7 + field(11, 0xFF) * 2.5,
        intensity: 0.5 + field(19, 0x7F) * 1.5,
        phase: field(5, 0x3FF) * TAU,
        distortion: field(13, 0x3FF),
        seed: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_matches_reference_values() {
        assert_eq!(style_hash(""), 0);
        assert_eq!(style_hash("a"), 97);
        // 's'*31^4 + 'w'*31^3 + 'i'*31^2 + 'r'*31 + 'l'
        assert_eq!(style_hash("swirl"), 109_854_591);
        // Long keys wrap like a 32-bit signed integer
        let long = "supercalifragilisticexpialidocious";
        let expected = long
            .bytes()
            .fold(0i64, |h, c| ((h * 31 + c as i64) as i32) as i64);
        assert_eq!(style_hash(long) as i64, expected);
    }

    #[test]
    fn test_swirl_blackhole_is_reproducible() {
        let a = derive_variant("swirl", "blackhole");
        let b = derive_variant("swirl", "blackhole");
        assert_eq!(a, b);
        assert_eq!(a.speed.to_bits(), b.speed.to_bits());
        assert_eq!(a.density.to_bits(), b.density.to_bits());
        assert_eq!(a.intensity.to_bits(), b.intensity.to_bits());
        assert_eq!(a.phase.to_bits(), b.phase.to_bits());
        assert_eq!(a.distortion.to_bits(), b.distortion.to_bits());
        assert!(BaseStyle::candidates_for(&EntityKind::BlackHole).contains(&a.base));
    }

    #[test]
    fn test_empty_label_falls_back_to_type_then_default() {
        assert_eq!(derive_variant("", "nebula"), derive_variant("nebula", "nebula"));
        assert_eq!(derive_variant("", "").seed, style_hash(DEFAULT_STYLE_KEY).unsigned_abs());
    }

    #[test]
    fn test_modulation_in_range() {
        for base in BaseStyle::ALL {
            let v = StyleVariant { base, ..derive_variant("pulse", "star") };
            for step in 0..200 {
                let m = v.modulation(step as f64 * 37.0, step);
                assert!((0.2..=1.8).contains(&m), "{:?} gave {}", base, m);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic(label in ".{0,24}", kind in "[a-z]{0,10}") {
            let a = derive_variant(&label, &kind);
            let b = derive_variant(&label, &kind);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_base_style_respects_type_bias(label in ".{0,24}", idx in 0usize..13) {
            let kind = &EntityKind::KNOWN[idx];
            let v = derive_variant(&label, kind.as_str());
            let candidates = BaseStyle::candidates_for(kind);
            prop_assert_eq!(candidates.len(), 3);
            prop_assert!(candidates.contains(&v.base));
        }

        #[test]
        fn prop_unknown_type_uses_all_styles(label in ".{0,24}", kind in "zz[a-z]{0,8}") {
            let v = derive_variant(&label, &kind);
            prop_assert!(BaseStyle::ALL.contains(&v.base));
        }

        #[test]
        fn prop_fields_in_range(label in ".{0,32}", kind in "[a-z]{0,10}") {
            let v = derive_variant(&label, &kind);
            let eps = 1e-4;
            prop_assert!(v.speed >= 0.6 - eps && v.speed <= 2.8 + eps);
            prop_assert!(v.density >= 0.7 - eps && v.density <= 3.2 + eps);
            prop_assert!(v.intensity >= 0.5 - eps && v.intensity <= 2.0 + eps);
            prop_assert!(v.phase >= 0.0 && v.phase <= TAU + eps);
            prop_assert!((0.0..=1.0).contains(&v.distortion));
        }
    }
}
