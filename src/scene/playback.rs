//! Auto-play state machine
//!
//! Showing → (duration elapsed) → Transitioning → (1s cross-fade) → commit →
//! Showing the next entity. Time is always supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::consts::TRANSITION_DURATION_MS;

/// Current phase of playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Current entity fully visible
    Showing,
    /// Cross-fading from current to next
    Transitioning,
}

/// Outcome of a single playback tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Cross-fade toward `next` began
    TransitionStarted { from: usize, next: usize },
    /// `current` is now the active entity
    Committed { current: usize },
}

/// Auto-play playback state (owned by the scene driver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current: usize,
    pub next: usize,
    /// Cross-fade progress in [0, 1]
    pub progress: f64,
    pub transitioning: bool,
    /// Clock reading at the last commit (ms)
    pub last_transition_ms: f64,
}

impl PlaybackState {
    /// Start on entity 0 at `now_ms`
    pub fn new(entity_count: usize, now_ms: f64) -> Self {
        Self {
            current: 0,
            next: if entity_count == 0 { 0 } else { 1 % entity_count },
            progress: 0.0,
            transitioning: false,
            last_transition_ms: now_ms,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.transitioning {
            PlaybackPhase::Transitioning
        } else {
            PlaybackPhase::Showing
        }
    }

    /// Advance the state machine to `now_ms`.
    ///
    /// Returns the event that fired during this tick, if any.
    pub fn advance(&mut self, catalog: &Catalog, now_ms: f64) -> Option<PlaybackEvent> {
        let count = catalog.len();
        let Some(entity) = catalog.get(self.current) else {
            return None;
        };
        let duration = entity.duration_ms;
        let elapsed = now_ms - self.last_transition_ms;

        if !self.transitioning {
            if elapsed < duration {
                return None;
            }
            self.transitioning = true;
            self.progress = 0.0;
            if elapsed < duration + TRANSITION_DURATION_MS {
                self.progress = ((elapsed - duration) / TRANSITION_DURATION_MS).clamp(0.0, 1.0);
                return Some(PlaybackEvent::TransitionStarted {
                    from: self.current,
                    next: self.next,
                });
            }
        }

        if elapsed >= duration + TRANSITION_DURATION_MS {
            self.current = self.next;
            self.next = (self.next + 1) % count;
            self.progress = 0.0;
            self.transitioning = false;
            self.last_transition_ms = now_ms;
            return Some(PlaybackEvent::Committed {
                current: self.current,
            });
        }

        let progress = ((elapsed - duration) / TRANSITION_DURATION_MS).clamp(0.0, 1.0);
        self.progress = self.progress.max(progress);
        None
    }
}

/// Entity index for interactive mode: `manual mod count`, wrapping negatives
pub fn manual_index(manual: i64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(manual.rem_euclid(count as i64) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Entity, EntityKind, Palette, Rgb};
    use proptest::prelude::*;

    fn catalog_with(durations: &[f64]) -> Catalog {
        let palette = Palette {
            primary: Rgb::WHITE,
            secondary: Rgb::WHITE,
            accent: Rgb::WHITE,
        };
        Catalog::new(
            durations
                .iter()
                .enumerate()
                .map(|(i, &duration_ms)| Entity {
                    id: i as u32,
                    name: format!("E{}", i),
                    kind: EntityKind::Star,
                    palette,
                    animation_style: "twinkle".into(),
                    duration_ms,
                })
                .collect(),
        )
    }

    #[test]
    fn test_three_entity_scenario() {
        let catalog = catalog_with(&[2000.0, 3000.0, 4000.0]);
        let mut state = PlaybackState::new(catalog.len(), 0.0);

        state.advance(&catalog, 1000.0);
        assert_eq!(state.phase(), PlaybackPhase::Showing);
        assert_eq!(state.current, 0);

        let event = state.advance(&catalog, 2000.0);
        assert_eq!(event, Some(PlaybackEvent::TransitionStarted { from: 0, next: 1 }));
        assert_eq!(state.phase(), PlaybackPhase::Transitioning);
        assert_eq!(state.progress, 0.0);

        state.advance(&catalog, 2500.0);
        assert_eq!(state.phase(), PlaybackPhase::Transitioning);
        assert!((state.progress - 0.5).abs() < 1e-9);

        let event = state.advance(&catalog, 3000.0);
        assert_eq!(event, Some(PlaybackEvent::Committed { current: 1 }));
        assert_eq!(state.current, 1);
        assert_eq!(state.next, 2);
        assert_eq!(state.progress, 0.0);
        assert_eq!(state.last_transition_ms, 3000.0);
        assert_eq!(state.phase(), PlaybackPhase::Showing);
    }

    #[test]
    fn test_wraps_to_first_entity() {
        let catalog = catalog_with(&[100.0, 100.0]);
        let mut state = PlaybackState::new(catalog.len(), 0.0);
        let mut now = 0.0;
        let mut order = vec![state.current];
        while order.len() < 5 {
            now += 16.0;
            if let Some(PlaybackEvent::Committed { current }) = state.advance(&catalog, now) {
                order.push(current);
            }
        }
        assert_eq!(order, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_late_tick_commits_directly() {
        let catalog = catalog_with(&[2000.0, 3000.0]);
        let mut state = PlaybackState::new(catalog.len(), 0.0);
        let event = state.advance(&catalog, 5000.0);
        assert_eq!(event, Some(PlaybackEvent::Committed { current: 1 }));
        assert!(!state.transitioning);
    }

    #[test]
    fn test_empty_catalog_never_transitions() {
        let catalog = Catalog::default();
        let mut state = PlaybackState::new(0, 0.0);
        assert_eq!(state.advance(&catalog, 1e9), None);
        assert_eq!(state.phase(), PlaybackPhase::Showing);
    }

    #[test]
    fn test_manual_index_wraps_negative() {
        assert_eq!(manual_index(-1, 13), Some(12));
        assert_eq!(manual_index(13, 13), Some(0));
        assert_eq!(manual_index(5, 0), None);
    }

    proptest! {
        #[test]
        fn prop_manual_index_in_bounds(manual in any::<i64>(), count in 1usize..64) {
            let idx = manual_index(manual, count).unwrap();
            prop_assert!(idx < count);
            prop_assert_eq!((idx as i64 - manual).rem_euclid(count as i64), 0);
        }

        #[test]
        fn prop_follows_catalog_order(
            durations in proptest::collection::vec(50.0f64..3000.0, 1..6),
            steps in proptest::collection::vec(1.0f64..400.0, 1..300),
        ) {
            let catalog = catalog_with(&durations);
            let count = catalog.len();
            let mut state = PlaybackState::new(count, 0.0);
            let mut now = 0.0;
            let mut last_progress = 0.0;
            let mut expected = 0usize;
            for dt in steps {
                now += dt;
                match state.advance(&catalog, now) {
                    Some(PlaybackEvent::Committed { current }) => {
                        expected = (expected + 1) % count;
                        prop_assert_eq!(current, expected);
                        prop_assert_eq!(state.progress, 0.0);
                        last_progress = 0.0;
                    }
                    _ => {
                        prop_assert!(state.progress >= last_progress);
                        last_progress = state.progress;
                    }
                }
                prop_assert!((0.0..=1.0).contains(&state.progress));
                prop_assert_eq!(state.next, (state.current + 1) % count);
            }
        }
    }
}
