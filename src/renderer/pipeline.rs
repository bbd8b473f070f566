//! Per-frame rendering pipeline
//!
//! clear → scale → (star field → particles → pattern) per layer → overlay →
//! ordered dither.

use glam::Vec2;

use super::background::{draw_particles, draw_star_field};
use super::dither::ordered_dither;
use super::frame::{Composite, Frame};
use super::patterns::{PatternContext, pattern_for};
use super::surface::Surface;
use crate::catalog::Rgb;
use crate::layout_scale;
use crate::overlay::{OverlayInfo, draw_overlay};
use crate::scene::particles::target_size;
use crate::scene::{FramePlan, Layer, ParticlePool};

/// Per-frame rendering switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Run the ordered-dither post-process
    pub dithering: bool,
    /// Upper bound on particles per layer
    pub max_particles: usize,
    /// Keep particles still (reduced motion)
    pub freeze_particles: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dithering: true,
            max_particles: usize::MAX,
            freeze_particles: false,
        }
    }
}

/// Summary of one rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub layers: usize,
    pub glyphs: usize,
    pub particles: usize,
    pub dithered: bool,
}

/// Owns the particle pools that persist between frames
pub struct SceneRenderer {
    seed: u64,
    /// One pool per visible entity id
    pools: Vec<(u32, ParticlePool)>,
}

impl SceneRenderer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            pools: Vec::with_capacity(2),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.pools.iter().map(|(_, p)| p.len()).sum()
    }

    /// Record the full command list for a frame without touching a surface
    pub fn record(
        &mut self,
        width: u32,
        height: u32,
        plan: &FramePlan<'_>,
        overlay: &OverlayInfo,
        options: &RenderOptions,
    ) -> Frame {
        let mut frame = Frame::new(width, height, layout_scale(width as f32));
        frame.clear(Rgb::BLACK);

        let crossfade = plan.is_crossfade();
        if crossfade {
            frame.set_composite(Composite::Lighter);
        }
        for layer in &plan.layers {
            frame.set_global_alpha(layer.alpha);
            self.draw_layer(&mut frame, layer, plan.time_ms, options);
        }
        if crossfade {
            frame.set_composite(Composite::SourceOver);
        }

        // Drop pools for entities that are no longer on screen
        self.pools
            .retain(|(id, _)| plan.layers.iter().any(|l| l.entity.id == *id));

        frame.set_global_alpha(1.0);
        draw_overlay(&mut frame, plan.headline(), overlay);
        frame
    }

    /// Record, replay onto `surface`, then post-process
    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        plan: &FramePlan<'_>,
        overlay: &OverlayInfo,
        options: &RenderOptions,
    ) -> FrameStats {
        let (width, height) = surface.size();
        let frame = self.record(width, height, plan, overlay, options);
        let glyphs = frame.glyph_count();
        surface.execute(frame.commands());

        let palette = plan.headline().map(|l| l.entity.palette);
        let dithered = match palette {
            Some(palette) if options.dithering => {
                surface.with_pixels(&mut |pixels, w, _h| ordered_dither(pixels, w, &palette));
                true
            }
            _ => false,
        };

        FrameStats {
            layers: plan.layers.len(),
            glyphs,
            particles: self.particle_count(),
            dithered,
        }
    }

    fn draw_layer(
        &mut self,
        frame: &mut Frame,
        layer: &Layer<'_>,
        time_ms: f64,
        options: &RenderOptions,
    ) {
        let size: Vec2 = frame.logical_size();
        let entity = layer.entity;
        let variant = layer.variant;

        draw_star_field(frame, time_ms, variant);

        let pool = self.pool_for(entity.id, variant.seed);
        let target = target_size(variant).min(options.max_particles);
        pool.sync_size(target, size, variant, &entity.palette);
        if !options.freeze_particles {
            pool.advance(size, variant, &entity.palette);
        }
        draw_particles(frame, pool, &entity.palette);

        if let Some(pattern) = pattern_for(&entity.kind) {
            let ctx = PatternContext {
                size,
                time_ms,
                palette: &entity.palette,
                variant,
            };
            pattern(frame, &ctx);
        }
    }

    fn pool_for(&mut self, entity_id: u32, variant_seed: u32) -> &mut ParticlePool {
        let index = match self.pools.iter().position(|(id, _)| *id == entity_id) {
            Some(index) => index,
            None => {
                let seed = self.seed ^ ((entity_id as u64) << 32) ^ variant_seed as u64;
                self.pools.push((entity_id, ParticlePool::new(seed)));
                self.pools.len() - 1
            }
        };
        &mut self.pools[index].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Entity, EntityKind};
    use crate::consts::MIN_PARTICLES;
    use crate::renderer::frame::DrawCommand;
    use crate::renderer::surface::SoftwareSurface;
    use crate::scene::{SceneDriver, derive_variant};

    fn overlay() -> OverlayInfo {
        OverlayInfo::default()
    }

    #[test]
    fn test_render_each_entity() {
        let mut driver = SceneDriver::new(Catalog::builtin(), 0.0);
        driver.set_interactive(true, 0.0);
        let mut renderer = SceneRenderer::new(1);
        let mut surface = SoftwareSurface::new(320, 200);
        for i in 0..driver.catalog().len() {
            driver.set_manual_scene(i as i64);
            let plan = driver.plan(2_000.0);
            let stats = renderer.render(&mut surface, &plan, &overlay(), &RenderOptions::default());
            assert_eq!(stats.layers, 1);
            assert!(stats.glyphs > 0);
            assert!(stats.dithered);
            assert!(stats.particles >= MIN_PARTICLES);
            assert!(surface.mean_luma() > 0.0);
        }
    }

    #[test]
    fn test_crossfade_uses_additive_composite() {
        let catalog = Catalog::builtin();
        let first = catalog.get(0).unwrap().duration_ms;
        let mut driver = SceneDriver::new(catalog, 0.0);
        driver.tick(first);
        driver.tick(first + 500.0);
        let plan = driver.plan(first + 500.0);
        assert!(plan.is_crossfade());

        let mut renderer = SceneRenderer::new(1);
        let frame = renderer.record(800, 600, &plan, &overlay(), &RenderOptions::default());
        let commands = frame.commands();
        assert_eq!(commands[0], DrawCommand::Clear(Rgb::BLACK));
        assert_eq!(commands[1], DrawCommand::SetComposite(Composite::Lighter));
        assert!(commands.contains(&DrawCommand::SetComposite(Composite::SourceOver)));
        // Both entities keep their own particle pool during the fade
        assert_eq!(renderer.pools.len(), 2);
    }

    #[test]
    fn test_pools_pruned_after_commit() {
        let catalog = Catalog::builtin();
        let first = catalog.get(0).unwrap().duration_ms;
        let mut driver = SceneDriver::new(catalog, 0.0);
        let mut renderer = SceneRenderer::new(1);
        let options = RenderOptions::default();

        driver.tick(first);
        driver.tick(first + 500.0);
        renderer.record(800, 600, &driver.plan(first + 500.0), &overlay(), &options);
        assert_eq!(renderer.pools.len(), 2);

        driver.tick(first + 1_000.0);
        renderer.record(800, 600, &driver.plan(first + 1_000.0), &overlay(), &options);
        assert_eq!(renderer.pools.len(), 1);
    }

    #[test]
    fn test_single_entity_catalog_fade_keeps_one_pass() {
        let entity = Catalog::builtin().get(2).unwrap().clone();
        let duration = entity.duration_ms;
        let mut driver = SceneDriver::new(Catalog::new(vec![entity]), 0.0);
        driver.tick(duration);
        driver.tick(duration + 500.0);

        let mut renderer = SceneRenderer::new(1);
        let mut surface = SoftwareSurface::new(320, 200);
        let plan = driver.plan(duration + 500.0);
        let stats = renderer.render(&mut surface, &plan, &overlay(), &RenderOptions::default());
        assert_eq!(stats.layers, 1);
        assert_eq!(renderer.pools.len(), 1);
        let frame = renderer.record(320, 200, &plan, &overlay(), &RenderOptions::default());
        assert!(!frame.commands().contains(&DrawCommand::SetComposite(Composite::Lighter)));
    }

    #[test]
    fn test_unknown_entity_draws_shared_layers_only() {
        let mut entity = Catalog::builtin().get(0).unwrap().clone();
        entity.kind = EntityKind::Other("wormhole".into());
        let variant = derive_variant(&entity.animation_style, entity.kind.as_str());
        let plan = FramePlan {
            time_ms: 0.0,
            layers: vec![Layer {
                entity: &entity,
                variant: &variant,
                alpha: 1.0,
            }],
        };
        let options = RenderOptions {
            max_particles: 0,
            ..Default::default()
        };
        let mut renderer = SceneRenderer::new(1);
        let frame = renderer.record(1280, 720, &plan, &overlay(), &options);
        // Only the star field remains when particles are capped at zero
        assert_eq!(frame.glyph_count(), crate::consts::STAR_COUNT);
    }

    #[test]
    fn test_particle_cap_respected() {
        let entity: Entity = Catalog::builtin().get(4).unwrap().clone();
        let variant = derive_variant(&entity.animation_style, entity.kind.as_str());
        let plan = FramePlan {
            time_ms: 0.0,
            layers: vec![Layer {
                entity: &entity,
                variant: &variant,
                alpha: 1.0,
            }],
        };
        let options = RenderOptions {
            max_particles: 25,
            ..Default::default()
        };
        let mut renderer = SceneRenderer::new(1);
        renderer.record(640, 480, &plan, &overlay(), &options);
        assert_eq!(renderer.particle_count(), 25);
    }

    #[test]
    fn test_empty_plan_renders_black_without_dither() {
        let plan = FramePlan {
            time_ms: 0.0,
            layers: Vec::new(),
        };
        let mut surface = SoftwareSurface::new(64, 64);
        let mut renderer = SceneRenderer::new(1);
        let stats = renderer.render(&mut surface, &plan, &overlay(), &RenderOptions::default());
        assert_eq!(stats.layers, 0);
        assert!(!stats.dithered);
    }
}
