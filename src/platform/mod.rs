//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic frame clock, wall clock)
//! - Frame scheduling (requestAnimationFrame on web)
//! - The frame loop shared by the browser widget and the native preview

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::Cell;

use crate::catalog::Catalog;
use crate::overlay::{OverlayInfo, WallClock};
use crate::renderer::{FrameStats, SceneRenderer, Surface};
use crate::scene::{PlaybackEvent, SceneDriver};
use crate::settings::{QualityPreset, Settings};
use crate::weather::WeatherReport;

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Requests that the host call back for another frame
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Clock driven by hand (tests, headless rendering)
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Monotonic clock starting at zero on creation
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Scheduler that only counts requests
#[derive(Debug, Default)]
pub struct CountingScheduler {
    pub requested: usize,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn wall_clock_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn wall_clock_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Smoothed per-frame render time against a budget
#[derive(Debug, Clone)]
pub struct FrameBudget {
    budget_ms: f64,
    smoothed_ms: f64,
    over: bool,
}

impl FrameBudget {
    /// Weight of the newest sample
    const SMOOTHING: f64 = 0.1;

    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms,
            smoothed_ms: 0.0,
            over: false,
        }
    }

    pub fn set_budget(&mut self, budget_ms: f64) {
        self.budget_ms = budget_ms;
    }

    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }

    pub fn smoothed_ms(&self) -> f64 {
        self.smoothed_ms
    }

    pub fn over_budget(&self) -> bool {
        self.over
    }

    /// Record a frame's render time
    pub fn record(&mut self, elapsed_ms: f64) {
        if !elapsed_ms.is_finite() || elapsed_ms < 0.0 {
            return;
        }
        self.smoothed_ms += (elapsed_ms - self.smoothed_ms) * Self::SMOOTHING;
        let over = self.budget_ms > 0.0 && self.smoothed_ms > self.budget_ms;
        if over != self.over {
            if over {
                log::debug!(
                    "Frame time {:.1}ms over {:.1}ms budget, skipping dither",
                    self.smoothed_ms,
                    self.budget_ms
                );
            } else {
                log::debug!("Frame time back under budget, dithering resumed");
            }
            self.over = over;
        }
    }
}

/// Scene state, renderer and preferences stepped together by the host
pub struct FrameLoop {
    driver: SceneDriver,
    renderer: SceneRenderer,
    settings: Settings,
    budget: FrameBudget,
    overlay: OverlayInfo,
    prefers_reduced_motion: bool,
}

impl FrameLoop {
    pub fn new(catalog: Catalog, settings: Settings, now_ms: f64, seed: u64) -> Self {
        let mut driver = SceneDriver::new(catalog, now_ms);
        driver.set_reduced_motion(settings.effective_reduced_motion(false));
        let overlay = OverlayInfo {
            clock: None,
            timezone_label: settings.timezone_label.clone(),
            location_label: settings.location.label.clone(),
            weather: None,
        };
        Self {
            driver,
            renderer: SceneRenderer::new(seed),
            budget: FrameBudget::new(settings.frame_budget_ms),
            settings,
            overlay,
            prefers_reduced_motion: false,
        }
    }

    pub fn driver(&self) -> &SceneDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut SceneDriver {
        &mut self.driver
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn budget(&self) -> &FrameBudget {
        &self.budget
    }

    pub fn overlay(&self) -> &OverlayInfo {
        &self.overlay
    }

    /// Replace the preferences, refreshing everything derived from them
    pub fn apply_settings(&mut self, settings: Settings) {
        self.budget.set_budget(settings.frame_budget_ms);
        self.overlay.timezone_label = settings.timezone_label.clone();
        self.overlay.location_label = settings.location.label.clone();
        self.driver
            .set_reduced_motion(settings.effective_reduced_motion(self.prefers_reduced_motion));
        self.settings = settings;
    }

    /// Switch quality preset; returns the updated settings
    pub fn set_quality(&mut self, preset: QualityPreset) -> &Settings {
        let mut settings = self.settings.clone();
        settings.apply_preset(preset);
        self.apply_settings(settings);
        log::info!("Quality set to {}", preset.as_str());
        &self.settings
    }

    /// Host `prefers-reduced-motion` state
    pub fn set_prefers_reduced_motion(&mut self, prefers: bool) {
        self.prefers_reduced_motion = prefers;
        self.driver
            .set_reduced_motion(self.settings.effective_reduced_motion(prefers));
    }

    /// Latest weather, or `None` to blank the line
    pub fn set_weather(&mut self, weather: Option<WeatherReport>) {
        self.overlay.weather = weather;
    }

    /// Advance auto-play
    pub fn tick(&mut self, clock: &dyn Clock) -> Option<PlaybackEvent> {
        self.driver.tick(clock.now_ms())
    }

    /// Render one frame and ask for the next
    pub fn frame(
        &mut self,
        surface: &mut dyn Surface,
        clock: &dyn Clock,
        unix_ms: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> FrameStats {
        let start = clock.now_ms();
        self.overlay.clock = Some(WallClock::from_unix_ms(
            unix_ms,
            self.settings.utc_offset_minutes,
        ));

        let mut options = self.settings.render_options(self.prefers_reduced_motion);
        if self.budget.over_budget() {
            options.dithering = false;
        }

        let plan = self.driver.plan(start);
        let stats = self
            .renderer
            .render(surface, &plan, &self.overlay, &options);

        self.budget.record(clock.now_ms() - start);
        scheduler.request_frame();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::SoftwareSurface;
    use crate::scene::PlaybackPhase;

    /// Clock that moves forward by a fixed step every time it is read
    struct SteppingClock {
        now: Cell<f64>,
        step: f64,
    }

    impl Clock for SteppingClock {
        fn now_ms(&self) -> f64 {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100.0);
        clock.advance(16.0);
        assert_eq!(clock.now_ms(), 116.0);
        clock.set(5.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn test_budget_smoothing_and_recovery() {
        let mut budget = FrameBudget::new(10.0);
        budget.record(5.0);
        assert!(!budget.over_budget());
        for _ in 0..100 {
            budget.record(40.0);
        }
        assert!(budget.over_budget());
        for _ in 0..100 {
            budget.record(1.0);
        }
        assert!(!budget.over_budget());
        assert!(budget.smoothed_ms() < 10.0);
    }

    #[test]
    fn test_quality_switch_updates_render_path() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = CountingScheduler::default();
        let mut surface = SoftwareSurface::new(64, 64);
        let mut frames = FrameLoop::new(Catalog::builtin(), Settings::default(), 0.0, 7);
        assert!(frames.frame(&mut surface, &clock, 0.0, &mut scheduler).dithered);

        let settings = frames.set_quality(QualityPreset::Low);
        assert_eq!(settings.quality, QualityPreset::Low);
        let stats = frames.frame(&mut surface, &clock, 0.0, &mut scheduler);
        assert!(!stats.dithered);
        assert!(stats.particles <= QualityPreset::Low.max_particles());
    }

    #[test]
    fn test_apply_settings_refreshes_budget_and_labels() {
        let mut frames = FrameLoop::new(Catalog::builtin(), Settings::default(), 0.0, 7);
        let mut settings = Settings::default();
        settings.frame_budget_ms = 3.0;
        settings.timezone_label = "JST".into();
        settings.location.label = "Tokyo".into();
        settings.reduced_motion = true;
        frames.apply_settings(settings);

        assert_eq!(frames.budget().budget_ms(), 3.0);
        assert_eq!(frames.overlay().timezone_label, "JST");
        assert_eq!(frames.overlay().location_label, "Tokyo");
        assert!(frames.driver().reduced_motion());
    }

    #[test]
    fn test_zero_budget_never_skips() {
        let mut budget = FrameBudget::new(0.0);
        for _ in 0..50 {
            budget.record(100.0);
        }
        assert!(!budget.over_budget());
    }

    #[test]
    fn test_frame_loop_steps_without_browser() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = CountingScheduler::default();
        let mut surface = SoftwareSurface::new(200, 120);
        let catalog = Catalog::builtin();
        let first = catalog.get(0).map(|e| e.duration_ms).unwrap();
        let mut frames = FrameLoop::new(catalog, Settings::default(), 0.0, 7);

        let stats = frames.frame(&mut surface, &clock, 0.0, &mut scheduler);
        assert_eq!(stats.layers, 1);
        assert_eq!(scheduler.requested, 1);
        assert_eq!(
            frames.overlay().clock,
            Some(WallClock {
                hours: 0,
                minutes: 0,
                seconds: 0
            })
        );

        clock.set(first);
        frames.tick(&clock);
        clock.advance(500.0);
        frames.tick(&clock);
        assert_eq!(frames.driver().playback().phase(), PlaybackPhase::Transitioning);
        let stats = frames.frame(&mut surface, &clock, 0.0, &mut scheduler);
        assert_eq!(stats.layers, 2);
        assert_eq!(scheduler.requested, 2);
    }

    #[test]
    fn test_slow_frames_skip_dither() {
        let mut settings = Settings::default();
        settings.frame_budget_ms = 5.0;
        let mut frames = FrameLoop::new(Catalog::builtin(), settings, 0.0, 7);
        let clock = SteppingClock {
            now: Cell::new(0.0),
            step: 50.0,
        };
        let mut scheduler = CountingScheduler::default();
        let mut surface = SoftwareSurface::new(64, 64);

        let first = frames.frame(&mut surface, &clock, 0.0, &mut scheduler);
        assert!(first.dithered);
        let mut skipped = false;
        for _ in 0..10 {
            skipped |= !frames.frame(&mut surface, &clock, 0.0, &mut scheduler).dithered;
        }
        assert!(skipped);
        assert!(frames.budget().over_budget());
    }

    #[test]
    fn test_reduced_motion_preference() {
        let mut frames = FrameLoop::new(Catalog::builtin(), Settings::default(), 0.0, 7);
        assert!(!frames.driver().reduced_motion());
        frames.set_prefers_reduced_motion(true);
        assert!(frames.driver().reduced_motion());
        frames.set_prefers_reduced_motion(false);
        assert!(!frames.driver().reduced_motion());
    }

    #[test]
    fn test_weather_blank_until_set() {
        let mut frames = FrameLoop::new(Catalog::builtin(), Settings::default(), 0.0, 7);
        assert!(frames.overlay().weather.is_none());
        frames.set_weather(Some(WeatherReport {
            temperature: 3.0,
            code: 61,
            is_day: true,
        }));
        assert!(frames.overlay().weather.is_some());
        frames.set_weather(None);
        assert!(frames.overlay().weather.is_none());
    }
}
