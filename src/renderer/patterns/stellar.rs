//! Stars and high-energy sources: star, sun, pulsar, quasar, supernova

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::{PatternContext, RAMP, ramp_glyph};
use crate::polar_to_cartesian;
use crate::renderer::frame::Frame;

const CORONA_GLYPHS: [char; 4] = ['*', '+', '✦', '·'];

/// Corona rays plus a square core grid whose brightness falls off radially
fn corona(frame: &mut Frame, ctx: &PatternContext, core_fraction: f32, ray_fraction: f32) {
    let c = ctx.center();
    let v = ctx.variant;
    let core_r = ctx.radius(core_fraction);
    let cell = ctx.glyph_size(0.9);

    // Core grid
    let cells = (core_r / cell).ceil() as i32;
    for gy in -cells..=cells {
        for gx in -cells..=cells {
            let offset = Vec2::new(gx as f32, gy as f32) * cell;
            let d = offset.length() / core_r;
            if d > 1.0 {
                continue;
            }
            let index = ((gy + cells) * (2 * cells + 1) + gx + cells) as usize;
            let m = v.modulation(ctx.time_ms, index);
            let brightness = (1.0 - d * d) * m;
            let color = ctx.palette.accent.lerp(ctx.palette.primary, d);
            frame.glyph(
                ramp_glyph(&RAMP, brightness),
                c + offset + v.offset(ctx.time_ms, index) * 0.3,
                cell,
                color,
                (0.4 + 0.6 * brightness).min(1.0),
            );
        }
    }

    // Rays: staggered so each ray flickers on its own beat
    let rays = ctx.count(14.0);
    let ray_len = ctx.radius(ray_fraction);
    for i in 0..rays {
        let t = ctx.stagger_secs(i, 0.0);
        let angle = i as f32 / rays as f32 * TAU + v.phase + t * 0.1;
        let reach = ray_len * (0.7 + 0.3 * (t * 2.0 + ctx.hash01(i) * TAU).sin());
        let steps = 6;
        for s in 0..steps {
            let f = (s as f32 + 1.0) / steps as f32;
            let r = core_r + (reach - core_r).max(0.0) * f;
            let pos = c + polar_to_cartesian(r, angle + v.distortion * 0.2 * (t + f).sin());
            frame.glyph(
                CORONA_GLYPHS[(i + s) % CORONA_GLYPHS.len()],
                pos,
                ctx.glyph_size(0.8),
                ctx.palette.secondary,
                (1.0 - f) * 0.8,
            );
        }
    }
}

pub fn star(frame: &mut Frame, ctx: &PatternContext) {
    corona(frame, ctx, 0.08, 0.22);
}

pub fn sun(frame: &mut Frame, ctx: &PatternContext) {
    corona(frame, ctx, 0.14, 0.3);

    // Prominences arcing off the limb
    let loops = ctx.count(3.0);
    let base_r = ctx.radius(0.14);
    for i in 0..loops {
        let t = ctx.stagger_secs(i, 0.5);
        let root = ctx.hash01(i) * TAU + ctx.variant.phase;
        let height = base_r * (0.3 + 0.25 * (t * 0.8).sin().abs()) * ctx.variant.intensity;
        for s in 0..12 {
            let u = s as f32 / 11.0;
            let angle = root + (u - 0.5) * 0.5;
            let r = base_r + (u * PI).sin() * height;
            frame.glyph(
                '~',
                ctx.center() + polar_to_cartesian(r, angle),
                ctx.glyph_size(0.8),
                ctx.palette.primary,
                0.7,
            );
        }
    }
}

pub fn pulsar(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();

    // Neutron star core
    frame.glyph('◉', c, ctx.glyph_size(1.6), ctx.palette.accent, 1.0);

    // Twin rotating beams
    let spin = t * 2.5 + v.phase;
    let beam_len = ctx.radius(0.45);
    let beam_steps = ctx.count(10.0).max(6);
    for side in [0.0, PI] {
        let angle = spin + side;
        for s in 1..=beam_steps {
            let f = s as f32 / beam_steps as f32;
            let spread = f * 0.12 * (1.0 + v.distortion);
            for k in [-1.0, 0.0, 1.0] {
                let pos = c + polar_to_cartesian(beam_len * f, angle + spread * k);
                let alpha = (1.0 - f) * if k == 0.0 { 1.0 } else { 0.5 };
                frame.glyph('|', pos, ctx.glyph_size(0.9), ctx.palette.primary, alpha);
            }
        }
    }

    // Dipole field lines
    let lines = ctx.count(4.0);
    let field_r = ctx.radius(0.22);
    for i in 0..lines {
        let scale = field_r * (0.5 + i as f32 / lines as f32);
        let tt = ctx.stagger_secs(i, 0.0);
        for s in 0..24 {
            let theta = s as f32 / 24.0 * TAU;
            // r = L sin²θ
            let r = scale * theta.sin().powi(2);
            let pos = c + polar_to_cartesian(r, theta + spin * 0.2);
            let pulse = 0.5 + 0.5 * (tt * 3.0 - s as f32 * 0.3).sin();
            frame.glyph('·', pos, ctx.glyph_size(0.7), ctx.palette.secondary, 0.25 + 0.5 * pulse);
        }
    }
}

pub fn quasar(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();

    // Accretion disk, squashed ellipse
    let disk_r = ctx.radius(0.2);
    let particles = ctx.count(40.0);
    for i in 0..particles {
        let f = ctx.hash01(i);
        let r = disk_r * (0.35 + 0.65 * f);
        let angle = i as f32 / particles as f32 * TAU + t * (1.5 - f);
        let pos = c + Vec2::new(angle.cos() * r, angle.sin() * r * 0.3);
        let color = ctx.palette.accent.lerp(ctx.palette.primary, f);
        frame.glyph(ramp_glyph(&RAMP, 1.0 - f), pos, ctx.glyph_size(0.9), color, 0.9);
    }

    // Relativistic jets, knots travelling outward
    let jet_len = ctx.radius(0.48);
    let knots = ctx.count(12.0);
    for dir in [-1.0f32, 1.0] {
        for i in 0..knots {
            let travel = (ctx.stagger_secs(i, 0.0) * 0.4 + i as f32 / knots as f32).fract();
            let wobble = (travel * 8.0 + v.phase).sin() * v.distortion * 10.0;
            let pos = c + Vec2::new(wobble, dir * jet_len * travel);
            frame.glyph(
                if travel < 0.5 { '!' } else { ':' },
                pos,
                ctx.glyph_size(1.0),
                ctx.palette.secondary,
                (1.0 - travel) * v.modulation(ctx.time_ms, i),
            );
        }
    }

    frame.glyph('@', c, ctx.glyph_size(1.4), ctx.palette.accent, 1.0);
}

pub fn supernova(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();

    // Expanding shockwave, restarting every cycle
    let cycle = (t * 0.25).fract();
    let max_r = ctx.radius(0.42);
    let shock_r = max_r * cycle;
    let ring = ctx.count(48.0);
    for i in 0..ring {
        let angle = i as f32 / ring as f32 * TAU;
        let jitter = 1.0 + v.distortion * 0.15 * (angle * 5.0 + t).sin();
        let pos = c + polar_to_cartesian(shock_r * jitter, angle);
        frame.glyph('o', pos, ctx.glyph_size(0.9), ctx.palette.secondary, 1.0 - cycle);
    }

    // Filaments streaming out behind the shock
    let filaments = ctx.count(10.0);
    for i in 0..filaments {
        let angle = ctx.hash01(i) * TAU + v.phase;
        let tt = ctx.stagger_secs(i, 0.25);
        for s in 0..8 {
            let f = s as f32 / 8.0;
            let r = shock_r * f + (tt * 3.0 + f * 6.0).sin() * 3.0;
            let pos = c + polar_to_cartesian(r, angle + f * 0.3 * v.distortion);
            frame.glyph('/', pos, ctx.glyph_size(0.8), ctx.palette.primary, f * (1.0 - cycle));
        }
    }

    // Remnant core
    let flash = (1.0 - cycle).powi(3) * v.intensity;
    frame.glyph('#', c, ctx.glyph_size(1.5 + flash), ctx.palette.accent, 1.0);
}
