//! Scene driver
//!
//! Owns the catalog, the pre-derived style variants, playback state and the
//! host inputs (interactive flag, manual scene index). Each frame it produces
//! a [`FramePlan`] describing which entities to draw and at which time.

use std::cell::Cell;

use super::playback::{PlaybackEvent, PlaybackState, manual_index};
use super::variant::{StyleVariant, derive_variant};
use crate::catalog::{Catalog, Entity};

/// One entity pass within a frame
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub entity: &'a Entity,
    pub variant: &'a StyleVariant,
    /// Global alpha for this pass
    pub alpha: f32,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FramePlan<'a> {
    /// Animation time (frozen under reduced motion)
    pub time_ms: f64,
    /// One layer normally, two while cross-fading (outgoing first)
    pub layers: Vec<Layer<'a>>,
}

impl FramePlan<'_> {
    pub fn is_crossfade(&self) -> bool {
        self.layers.len() > 1
    }

    /// The entity whose name and style the overlay shows
    pub fn headline(&self) -> Option<&Layer<'_>> {
        self.layers.iter().max_by(|a, b| a.alpha.total_cmp(&b.alpha))
    }
}

pub struct SceneDriver {
    catalog: Catalog,
    variants: Vec<StyleVariant>,
    playback: PlaybackState,
    interactive: bool,
    manual_scene: i64,
    reduced_motion: bool,
    /// Captured on the first plan under reduced motion
    frozen_time: Cell<Option<f64>>,
}

impl SceneDriver {
    pub fn new(catalog: Catalog, now_ms: f64) -> Self {
        let variants = catalog
            .iter()
            .map(|e| derive_variant(&e.animation_style, e.kind.as_str()))
            .collect();
        let playback = PlaybackState::new(catalog.len(), now_ms);
        Self {
            catalog,
            variants,
            playback,
            interactive: false,
            manual_scene: 0,
            reduced_motion: false,
            frozen_time: Cell::new(None),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn variant(&self, index: usize) -> Option<&StyleVariant> {
        self.variants.get(index)
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, interactive: bool, now_ms: f64) {
        if self.interactive == interactive {
            return;
        }
        self.interactive = interactive;
        if !interactive {
            // Resume auto-play from the entity the visitor was looking at
            let start = manual_index(self.manual_scene, self.catalog.len());
            self.playback = PlaybackState::new(self.catalog.len(), now_ms);
            if let Some(start) = start {
                self.playback.current = start;
                self.playback.next = (start + 1) % self.catalog.len();
            }
        }
        log::info!("Interactive mode: {}", interactive);
    }

    pub fn manual_scene(&self) -> i64 {
        self.manual_scene
    }

    pub fn set_manual_scene(&mut self, scene: i64) {
        self.manual_scene = scene;
    }

    /// Move the manual scene by `delta`, wrapping within the catalog
    pub fn step_manual(&mut self, delta: i64) {
        let count = self.catalog.len() as i64;
        if count == 0 {
            return;
        }
        self.manual_scene = (self.manual_scene + delta).rem_euclid(count);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if !reduced {
            self.frozen_time.set(None);
        }
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Advance auto-play (no-op in interactive mode)
    pub fn tick(&mut self, now_ms: f64) -> Option<PlaybackEvent> {
        if self.interactive {
            return None;
        }
        let event = self.playback.advance(&self.catalog, now_ms);
        if let Some(PlaybackEvent::Committed { current }) = event {
            if let Some(entity) = self.catalog.get(current) {
                log::debug!("Now showing {} ({})", entity.name, entity.kind.as_str());
            }
        }
        event
    }

    /// Index of the entity currently in focus
    pub fn active_index(&self) -> Option<usize> {
        if self.interactive {
            manual_index(self.manual_scene, self.catalog.len())
        } else if self.catalog.is_empty() {
            None
        } else {
            Some(self.playback.current)
        }
    }

    /// Time used for rendering: `now_ms`, or the first captured value under
    /// reduced motion
    pub fn render_time(&self, now_ms: f64) -> f64 {
        if !self.reduced_motion {
            return now_ms;
        }
        match self.frozen_time.get() {
            Some(frozen) => frozen,
            None => {
                self.frozen_time.set(Some(now_ms));
                now_ms
            }
        }
    }

    /// Build the frame plan for `now_ms`
    pub fn plan(&self, now_ms: f64) -> FramePlan<'_> {
        let time_ms = self.render_time(now_ms);
        let mut layers = Vec::with_capacity(2);

        if let Some(active) = self.active_index() {
            // A one-entity catalog fades into itself; draw it once
            let crossfading = !self.interactive
                && self.playback.transitioning
                && self.playback.next != active;
            if crossfading {
                let progress = self.playback.progress as f32;
                layers.push(self.layer(active, 1.0 - progress));
                layers.push(self.layer(self.playback.next, progress));
            } else {
                layers.push(self.layer(active, 1.0));
            }
        }

        FramePlan {
            time_ms,
            layers: layers.into_iter().flatten().collect(),
        }
    }

    fn layer(&self, index: usize, alpha: f32) -> Option<Layer<'_>> {
        Some(Layer {
            entity: self.catalog.get(index)?,
            variant: self.variants.get(index)?,
            alpha,
        })
    }
}
