//! Deterministic scene module
//!
//! All scene logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Style variants are pure functions of their inputs
//! - Playback advances only through explicit ticks with caller-supplied time
//! - Particles use a seeded RNG only

pub mod driver;
pub mod particles;
pub mod playback;
pub mod variant;

pub use driver::{FramePlan, Layer, SceneDriver};
pub use particles::{Particle, ParticlePool};
pub use playback::{PlaybackEvent, PlaybackPhase, PlaybackState, manual_index};
pub use variant::{BaseStyle, StyleVariant, derive_variant, style_hash};
