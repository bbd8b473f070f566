//! Ambient particle pool
//!
//! Particles are recycled in place: an expired or out-of-bounds particle is
//! respawned with fresh values instead of being reallocated. The pool grows
//! or shrinks every frame toward a density-driven target.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::variant::StyleVariant;
use crate::catalog::{Palette, Rgb};
use crate::consts::{MIN_PARTICLES, PARTICLES_PER_DENSITY};

/// Glyphs used for ambient particles
pub const PARTICLE_GLYPHS: [char; 7] = ['.', '·', '*', '+', '˚', '°', '✦'];

/// Base life drained per frame (scaled by variant speed)
const LIFE_DECAY: f32 = 0.6;

/// A short-lived ambient glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub glyph: char,
    pub color: Rgb,
}

impl Particle {
    /// Draw alpha: `(life / max_life)^0.8`
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0).powf(0.8)
    }

    fn is_out_of_bounds(&self, bounds: Vec2) -> bool {
        self.pos.x < 0.0 || self.pos.y < 0.0 || self.pos.x > bounds.x || self.pos.y > bounds.y
    }
}

/// Palette slot for a respawning particle.
///
/// Sine-hash of seed and life: varies with time but is reproducible for a
/// given seed/life pair.
pub fn palette_slot(seed: u32, life: f32) -> usize {
    let x = (seed as f64 * 12.9898 + life as f64 * 78.233).sin().abs();
    ((x * 3.0).floor() as usize).min(2)
}

/// Target pool size for a variant: `max(40, 90 * density)`
pub fn target_size(variant: &StyleVariant) -> usize {
    ((PARTICLES_PER_DENSITY * variant.density).round() as usize).max(MIN_PARTICLES)
}

/// Recycled particle pool with its own seeded RNG
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl ParticlePool {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Grow by spawning or shrink by truncating the tail until `target`
    pub fn sync_size(
        &mut self,
        target: usize,
        bounds: Vec2,
        variant: &StyleVariant,
        palette: &Palette,
    ) {
        if self.particles.len() > target {
            self.particles.truncate(target);
            return;
        }
        while self.particles.len() < target {
            let p = self.spawn(bounds, variant, palette);
            self.particles.push(p);
        }
    }

    /// Move, age and recycle every particle for one frame
    pub fn advance(&mut self, bounds: Vec2, variant: &StyleVariant, palette: &Palette) {
        let speed = variant.speed;
        for i in 0..self.particles.len() {
            let expired = {
                let p = &mut self.particles[i];
                p.pos += p.vel * speed;
                p.life -= LIFE_DECAY * speed;
                p.life <= 0.0 || p.is_out_of_bounds(bounds)
            };
            if expired {
                let fresh = self.spawn(bounds, variant, palette);
                self.particles[i] = fresh;
            }
        }
    }

    fn spawn(&mut self, bounds: Vec2, variant: &StyleVariant, palette: &Palette) -> Particle {
        let pos = Vec2::new(
            self.rng.random_range(0.0..bounds.x.max(1.0)),
            self.rng.random_range(0.0..bounds.y.max(1.0)),
        );
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let magnitude = self.rng.random_range(0.1..0.6) * (0.5 + variant.distortion);
        let max_life = self.rng.random_range(60.0..180.0);
        let glyph = PARTICLE_GLYPHS[self.rng.random_range(0..PARTICLE_GLYPHS.len())];

        Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * magnitude,
            life: max_life,
            max_life,
            glyph,
            color: palette.pick(palette_slot(variant.seed, max_life)),
        }
    }
}
