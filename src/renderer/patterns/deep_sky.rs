//! Extended objects: nebula, galaxy, star cluster

use std::f32::consts::TAU;

use glam::Vec2;

use super::{PatternContext, RAMP, ramp_glyph};
use crate::polar_to_cartesian;
use crate::renderer::frame::Frame;

const CLOUD_GLYPHS: [char; 5] = ['.', ':', '~', '=', '≈'];

pub fn nebula(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();
    let extent = Vec2::new(ctx.radius(0.7), ctx.radius(0.4));
    let cell = ctx.glyph_size(1.1);

    // Cloud: sampled on a coarse grid, density from layered sines
    let cols = (extent.x * 2.0 / cell) as i32;
    let rows = (extent.y * 2.0 / cell) as i32;
    for gy in 0..rows {
        for gx in 0..cols {
            let p = Vec2::new(gx as f32 / cols as f32, gy as f32 / rows as f32) * 2.0 - Vec2::ONE;
            let falloff = 1.0 - p.length_squared();
            if falloff <= 0.0 {
                continue;
            }
            let n = (p.x * 3.1 + t * 0.3 + v.phase).sin() * (p.y * 2.3 - t * 0.2).cos()
                + 0.5 * (p.x * 5.7 - p.y * 4.1 + t * 0.5).sin() * v.distortion;
            let density = ((n * 0.5 + 0.5) * falloff).clamp(0.0, 1.0);
            if density < 0.15 {
                continue;
            }
            let pos = c + p * extent + v.offset(ctx.time_ms, (gy * cols + gx) as usize) * 0.5;
            let color = ctx.palette.primary.lerp(ctx.palette.secondary, (p.x + 1.0) * 0.5);
            let glyph = CLOUD_GLYPHS[((density * CLOUD_GLYPHS.len() as f32) as usize)
                .min(CLOUD_GLYPHS.len() - 1)];
            frame.glyph(glyph, pos, cell, color, density * 0.8);
        }
    }

    // Hotspots: embedded young stars
    let hotspots = ctx.count(6.0);
    for i in 0..hotspots {
        let p = Vec2::new(ctx.hash01(i * 2) * 2.0 - 1.0, ctx.hash01(i * 2 + 1) * 2.0 - 1.0) * 0.7;
        let m = v.modulation(crate::stagger(ctx.time_ms, i, 0.0), i);
        frame.glyph(
            '✦',
            c + p * extent,
            ctx.glyph_size(1.2) * m,
            ctx.palette.accent,
            (0.5 * m).min(1.0),
        );
    }
}

pub fn galaxy(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();
    let disk = ctx.radius(0.45);
    let arms = 2 + (v.seed % 3) as usize;
    let per_arm = ctx.count(36.0);
    let tilt = 0.45 + 0.2 * v.distortion;
    let rotation = t * 0.15 + v.phase;

    for arm in 0..arms {
        let arm_angle = arm as f32 / arms as f32 * TAU;
        for i in 0..per_arm {
            let f = (i as f32 + 1.0) / per_arm as f32;
            // Logarithmic spiral: angle grows with log radius
            let r = disk * f;
            let wind = (1.0 + f * 8.0).ln() * 1.6;
            let scatter = (ctx.hash01(arm * per_arm + i) - 0.5) * 0.35 * (1.0 + v.distortion);
            let angle = arm_angle + wind + rotation + scatter;
            let p = polar_to_cartesian(r, angle);
            let pos = c + Vec2::new(p.x, p.y * tilt);
            let brightness = (1.0 - f) * v.modulation(ctx.time_ms, i);
            let color = ctx.palette.primary.lerp(ctx.palette.secondary, f);
            frame.glyph(
                ramp_glyph(&RAMP, brightness),
                pos,
                ctx.glyph_size(0.85),
                color,
                0.3 + 0.6 * (1.0 - f),
            );
        }
    }

    // Bulge
    let bulge = ctx.count(20.0);
    let bulge_r = disk * 0.18;
    for i in 0..bulge {
        let angle = ctx.hash01(i + 997) * TAU + rotation;
        let r = bulge_r * ctx.hash01(i + 1999).sqrt();
        let p = polar_to_cartesian(r, angle);
        frame.glyph(
            '*',
            c + Vec2::new(p.x, p.y * tilt),
            ctx.glyph_size(0.9),
            ctx.palette.accent,
            0.9,
        );
    }
}

pub fn cluster(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let members = ctx.count(28.0);
    let spread = ctx.radius(0.32);

    for i in 0..members {
        // Concentrated toward the core: r ~ u²
        let u = ctx.hash01(i);
        let angle = ctx.hash01(i + 4093) * TAU;
        let orbit = ctx.stagger_secs(i, 0.0) * 0.05 * (1.0 - u);
        let pos = c + polar_to_cartesian(spread * u * u + 4.0, angle + orbit)
            + v.offset(ctx.time_ms, i) * 0.4;
        let m = v.modulation(ctx.time_ms, i);
        let glyph = if u < 0.3 { '✦' } else if u < 0.7 { '*' } else { '·' };
        frame.glyph(
            glyph,
            pos,
            ctx.glyph_size(1.0 + (1.0 - u) * 0.5),
            ctx.palette.pick(i),
            (0.35 + 0.5 * m).min(1.0),
        );
    }
}
