//! Compact bodies and minor bodies: black hole, exoplanet, rings,
//! meteoroids and comets

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::{PatternContext, RAMP, ramp_glyph};
use crate::polar_to_cartesian;
use crate::renderer::frame::Frame;

const DISK_GLYPHS: [char; 5] = ['-', '=', '~', '*', '+'];
const SURFACE_GLYPHS: [char; 4] = ['░', '▒', '▓', '█'];

pub fn black_hole(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();
    let horizon = ctx.radius(0.07);
    let disk_outer = ctx.radius(0.38);
    let tilt = 0.28 + 0.12 * v.distortion;

    // Accretion disk: inner orbits faster (Keplerian-ish)
    let rings = ctx.count(7.0).clamp(3, 24);
    for ring in 0..rings {
        let f = (ring as f32 + 1.0) / rings as f32;
        let r = horizon * 1.6 + (disk_outer - horizon * 1.6) * f;
        let omega = 1.2 / f.sqrt();
        let per_ring = (18.0 + 30.0 * f) as usize;
        for i in 0..per_ring {
            let angle = i as f32 / per_ring as f32 * TAU + t * omega + v.phase;
            let p = polar_to_cartesian(r, angle);
            let pos = c + Vec2::new(p.x, p.y * tilt);
            // Doppler beaming: approaching side brighter
            let beaming = 0.55 + 0.45 * angle.cos();
            let hidden = p.y < 0.0 && p.x.abs() < horizon * 1.1;
            if hidden {
                continue;
            }
            let color = ctx.palette.primary.lerp(ctx.palette.secondary, f);
            frame.glyph(
                DISK_GLYPHS[(ring + i) % DISK_GLYPHS.len()],
                pos,
                ctx.glyph_size(0.85),
                color,
                beaming * (1.0 - f * 0.6),
            );
        }
    }

    // Photon ring, staggered shimmer
    let photons = ctx.count(24.0);
    for i in 0..photons {
        let angle = i as f32 / photons as f32 * TAU;
        let shimmer = v.modulation(crate::stagger(ctx.time_ms, i, 0.0), i);
        frame.glyph(
            '°',
            c + polar_to_cartesian(horizon * 1.25, angle),
            ctx.glyph_size(0.8),
            ctx.palette.secondary,
            (0.4 * shimmer).min(1.0),
        );
    }

    // Event horizon
    frame.glyph('●', c, ctx.glyph_size(1.0), ctx.palette.accent, 0.5);
}

pub fn exoplanet(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();
    let planet_r = ctx.radius(0.16);
    let cell = ctx.glyph_size(0.9);

    // Lit hemisphere: Lambert shading against a slowly moving light
    let light = polar_to_cartesian(1.0, -PI * 0.75 + (t * 0.1).sin() * 0.3).extend(0.6);
    let light = light.normalize();
    let cells = (planet_r / cell).ceil() as i32;
    for gy in -cells..=cells {
        for gx in -cells..=cells {
            let p = Vec2::new(gx as f32, gy as f32) * cell / planet_r;
            let d2 = p.length_squared();
            if d2 > 1.0 {
                continue;
            }
            let normal = p.extend((1.0 - d2).sqrt());
            let lambert = normal.dot(light).max(0.0);
            // Banded atmosphere drifting with rotation
            let band = 0.5 + 0.5 * (p.y * 6.0 + (p.x + t * 0.2) * v.distortion * 3.0).sin();
            let shade = (lambert * (0.7 + 0.3 * band)).clamp(0.0, 1.0);
            let glyph = SURFACE_GLYPHS[((shade * SURFACE_GLYPHS.len() as f32) as usize)
                .min(SURFACE_GLYPHS.len() - 1)];
            let color = ctx.palette.accent.lerp(ctx.palette.primary, band);
            frame.glyph(glyph, c + p * planet_r, cell, color, 0.15 + 0.85 * shade);
        }
    }

    // Moon on an inclined orbit, hidden behind the disk on the far side
    let orbit_r = planet_r * (1.8 + 0.4 * v.intensity);
    let angle = t * 0.6 + v.phase;
    let offset = Vec2::new(angle.cos() * orbit_r, angle.sin() * orbit_r * 0.35);
    let behind = angle.sin() < 0.0 && offset.x.abs() < planet_r;
    if !behind {
        frame.glyph('o', c + offset, ctx.glyph_size(1.1), ctx.palette.secondary, 1.0);
    }
}

pub fn rings(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();
    let planet_r = ctx.radius(0.12);
    let tilt = 0.22 + 0.1 * v.distortion;

    // Back half of the rings, then the planet, then the front half
    let bands = ctx.count(4.0).clamp(2, 10);
    let draw_rings = |frame: &mut Frame, front: bool| {
        for band in 0..bands {
            let r = planet_r * (1.4 + band as f32 * 0.22);
            let count = (48.0 + band as f32 * 8.0) as usize;
            for i in 0..count {
                let angle = i as f32 / count as f32 * TAU + t * 0.2 / (1.0 + band as f32 * 0.3);
                let is_front = angle.sin() > 0.0;
                if is_front != front {
                    continue;
                }
                let p = polar_to_cartesian(r, angle);
                let gap = band % 3 == 2;
                let base = if gap { 0.25 } else { 0.8 };
                let brightness = base * v.modulation(ctx.time_ms, band);
                frame.glyph(
                    ramp_glyph(&RAMP[..5], brightness),
                    c + Vec2::new(p.x, p.y * tilt),
                    ctx.glyph_size(0.8),
                    ctx.palette.pick(band + 1),
                    brightness.min(1.0),
                );
            }
        }
    };

    draw_rings(frame, false);
    let cell = ctx.glyph_size(1.0);
    let cells = (planet_r / cell).ceil() as i32;
    for gy in -cells..=cells {
        for gx in -cells..=cells {
            let p = Vec2::new(gx as f32, gy as f32) * cell;
            let d = p.length() / planet_r;
            if d > 1.0 {
                continue;
            }
            frame.glyph(
                ramp_glyph(&RAMP, 1.0 - d * 0.7),
                c + p,
                cell,
                ctx.palette.primary,
                0.9,
            );
        }
    }
    draw_rings(frame, true);
}

/// Diagonal streaks with fading tails
fn streaks(frame: &mut Frame, ctx: &PatternContext, count: usize, tail: usize, head: char) {
    let v = ctx.variant;
    let size = ctx.size;
    let heading = Vec2::new(1.0, 0.55 + 0.3 * v.distortion).normalize();
    let travel = size.length() + 200.0;

    for i in 0..count {
        let t = ctx.stagger_secs(i, ctx.hash01(i) as f64 * 10.0);
        let speed = 120.0 * (0.6 + ctx.hash01(i + 31));
        let progress = (t * speed + ctx.hash01(i + 61) * travel).rem_euclid(travel);
        let start = Vec2::new(
            ctx.hash01(i + 91) * size.x - size.x * 0.5,
            -100.0 - ctx.hash01(i + 127) * size.y * 0.3,
        );
        let head_pos = start + heading * progress;
        frame.glyph(head, head_pos, ctx.glyph_size(1.2), ctx.palette.accent, 1.0);
        for s in 1..=tail {
            let f = s as f32 / tail as f32;
            let pos = head_pos - heading * (s as f32 * ctx.glyph_size(0.7))
                + v.offset(ctx.time_ms, i * tail + s) * f;
            let color = ctx.palette.primary.lerp(ctx.palette.secondary, f);
            frame.glyph(
                ramp_glyph(&RAMP[..4], 1.0 - f),
                pos,
                ctx.glyph_size(0.9),
                color,
                (1.0 - f).powf(1.5),
            );
        }
    }
}

pub fn meteoroid(frame: &mut Frame, ctx: &PatternContext) {
    let count = ctx.count(6.0);
    streaks(frame, ctx, count, 6, '*');
    // Shower radiant
    let radiant = Vec2::new(ctx.size.x * 0.15, ctx.size.y * 0.12);
    let m = ctx.variant.modulation(ctx.time_ms, 0);
    frame.glyph('✧', radiant, ctx.glyph_size(1.3), ctx.palette.accent, (0.5 * m).min(1.0));
}

pub fn comet(frame: &mut Frame, ctx: &PatternContext) {
    let c = ctx.center();
    let v = ctx.variant;
    let t = ctx.secs();

    // Nucleus on a wide ellipse around the frame center
    let orbit = Vec2::new(ctx.radius(0.5), ctx.radius(0.22));
    let angle = t * 0.25 + v.phase;
    let nucleus = c + Vec2::new(angle.cos() * orbit.x, angle.sin() * orbit.y);
    frame.glyph('@', nucleus, ctx.glyph_size(1.3), ctx.palette.accent, 1.0);

    // Tail points away from the center, widening with distance
    let away = (nucleus - c).normalize_or(Vec2::X);
    let side = away.perp();
    let tail = (14.0 * v.intensity) as usize + 6;
    let step = ctx.glyph_size(0.75);
    for s in 1..=tail {
        let f = s as f32 / tail as f32;
        for k in [-1.0f32, 0.0, 1.0] {
            let spread = k * f * step * (1.5 + v.distortion * 2.0);
            let flutter = (crate::stagger(ctx.time_ms, s, 0.0) * 0.004) as f32;
            let pos =
                nucleus + away * (s as f32 * step) + side * (spread + flutter.sin() * f * 3.0);
            let color = ctx.palette.primary.lerp(ctx.palette.secondary, f);
            let alpha = (1.0 - f).powf(1.5) * if k == 0.0 { 1.0 } else { 0.5 };
            frame.glyph(ramp_glyph(&RAMP[..4], 1.0 - f), pos, ctx.glyph_size(0.9), color, alpha);
        }
    }

    // Fainter fragments crossing the field
    streaks(frame, ctx, 2, tail / 2, 'o');
}
