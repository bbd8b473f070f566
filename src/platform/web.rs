//! Browser host: canvas surface, animation loop and the exported widget

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::{Context, Result, anyhow};
use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, Window};

use super::{Clock, CountingScheduler, FrameLoop, FrameScheduler, wall_clock_ms};
use crate::catalog::Catalog;
use crate::consts::{TICK_INTERVAL_MS, WEATHER_POLL_MS};
use crate::renderer::{DrawCommand, Surface};
use crate::settings::{QualityPreset, Settings};
use crate::weather;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Install the panic hook and console logger (safe to call repeatedly)
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Errors only when a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_error(value: JsValue) -> anyhow::Error {
    anyhow!("{:?}", value)
}

/// `performance.now()`, falling back to `Date.now()`
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
}

impl PerformanceClock {
    pub fn new(window: &Window) -> Self {
        Self {
            performance: window.performance(),
        }
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(p) => p.now(),
            None => js_sys::Date::now(),
        }
    }
}

/// 2D canvas render target
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Last font size set on the context
    font_px: f32,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_error)?
            .context("Canvas has no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("Context is not a CanvasRenderingContext2d"))?;
        Ok(Self {
            canvas,
            ctx,
            font_px: 0.0,
        })
    }

    /// Match the backing store to the CSS size times the device pixel ratio
    pub fn fit_to_display(&mut self, window: &Window) {
        let dpr = window.device_pixel_ratio().max(1.0);
        let width = (self.canvas.client_width().max(1) as f64 * dpr).round() as u32;
        let height = (self.canvas.client_height().max(1) as f64 * dpr).round() as u32;
        if width != self.canvas.width() || height != self.canvas.height() {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            // Resizing resets context state
            self.font_px = 0.0;
            log::info!("Canvas resized to {}x{}", width, height);
        }
    }

    fn set_font(&mut self, px: f32, bold: bool) {
        let px = px.round().max(1.0);
        if px == self.font_px && !bold {
            return;
        }
        let weight = if bold { "bold " } else { "" };
        self.ctx.set_font(&format!("{}{}px monospace", weight, px));
        self.font_px = if bold { 0.0 } else { px };
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn execute(&mut self, commands: &[DrawCommand]) {
        let (w, h) = self.size();
        self.ctx.set_text_baseline("middle");
        for command in commands {
            match command {
                DrawCommand::Clear(color) => {
                    let _ = self.ctx.set_global_composite_operation("source-over");
                    self.ctx.set_global_alpha(1.0);
                    self.ctx.set_fill_style_str(&color.css());
                    self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
                }
                DrawCommand::SetComposite(composite) => {
                    let _ = self
                        .ctx
                        .set_global_composite_operation(composite.as_canvas_op());
                }
                DrawCommand::Glyph {
                    ch,
                    pos,
                    size,
                    color,
                    alpha,
                } => {
                    self.set_font(*size, false);
                    self.ctx.set_text_align("center");
                    self.ctx.set_global_alpha(*alpha as f64);
                    self.ctx.set_fill_style_str(&color.css());
                    let mut buf = [0u8; 4];
                    let _ = self
                        .ctx
                        .fill_text(ch.encode_utf8(&mut buf), pos.x as f64, pos.y as f64);
                }
                DrawCommand::Text {
                    text,
                    pos,
                    size,
                    align,
                    fill,
                    stroke,
                    stroke_width,
                } => {
                    self.set_font(*size, true);
                    self.ctx.set_text_align(align.as_canvas_align());
                    self.ctx.set_global_alpha(1.0);
                    self.ctx.set_line_width(*stroke_width as f64);
                    self.ctx.set_stroke_style_str(&stroke.css());
                    let _ = self.ctx.stroke_text(text, pos.x as f64, pos.y as f64);
                    self.ctx.set_fill_style_str(&fill.css());
                    let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
            }
        }
        self.ctx.set_global_alpha(1.0);
    }

    fn with_pixels(&mut self, f: &mut dyn FnMut(&mut [u8], u32, u32)) {
        let (w, h) = self.size();
        if w == 0 || h == 0 {
            return;
        }
        let image = match self.ctx.get_image_data(0.0, 0.0, w as f64, h as f64) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Pixel readback failed: {:?}", e);
                return;
            }
        };
        let mut data = image.data();
        f(data.as_mut_slice(), w, h);
        match ImageData::new_with_u8_clamped_array_and_sh(Clamped(data.as_slice()), w, h) {
            Ok(image) => {
                let _ = self.ctx.put_image_data(&image, 0.0, 0.0);
            }
            Err(e) => log::warn!("Pixel write-back failed: {:?}", e),
        }
    }
}

/// `requestAnimationFrame` scheduler around a shared callback
struct RafScheduler {
    window: Window,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    handle: Option<i32>,
}

impl RafScheduler {
    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        // Drops the closure and the widget it holds
        self.callback.borrow_mut().take();
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) {
        if let Some(callback) = self.callback.borrow().as_ref() {
            self.handle = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .ok();
        }
    }
}

/// Everything a mounted widget mutates per frame
struct Widget {
    frames: FrameLoop,
    surface: CanvasSurface,
    clock: PerformanceClock,
}

impl Widget {
    fn frame(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.frames
            .frame(&mut self.surface, &self.clock, wall_clock_ms(), scheduler);
    }

    fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }
}

struct Mounted {
    window: Window,
    widget: Rc<RefCell<Widget>>,
    scheduler: Rc<RefCell<RafScheduler>>,
    tick_handle: i32,
    weather_handle: Option<i32>,
    // Kept alive for the intervals
    _tick: Closure<dyn FnMut()>,
    _weather: Option<Closure<dyn FnMut()>>,
}

impl Mounted {
    fn mount(canvas_id: &str) -> Result<Self> {
        let window = web_sys::window().context("No window")?;
        let document = window.document().context("No document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .with_context(|| format!("No element with id '{}'", canvas_id))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| anyhow!("Element '{}' is not a canvas", canvas_id))?;

        let settings = Settings::load();
        let catalog = Catalog::builtin();
        let clock = PerformanceClock::new(&window);
        let seed = js_sys::Date::now() as u64;
        let weather_enabled = settings.weather;
        let (latitude, longitude) = (settings.location.latitude, settings.location.longitude);

        let mut surface = CanvasSurface::new(canvas)?;
        surface.fit_to_display(&window);
        let mut frames = FrameLoop::new(catalog, settings, clock.now_ms(), seed);
        frames.set_prefers_reduced_motion(prefers_reduced_motion(&window));

        let widget = Rc::new(RefCell::new(Widget {
            frames,
            surface,
            clock,
        }));

        // Animation loop
        let callback = Rc::new(RefCell::new(None));
        let scheduler = Rc::new(RefCell::new(RafScheduler {
            window: window.clone(),
            callback: callback.clone(),
            handle: None,
        }));
        {
            let widget = widget.clone();
            let scheduler = scheduler.clone();
            *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |_time: f64| {
                widget.borrow_mut().frame(&mut *scheduler.borrow_mut());
            }));
        }
        scheduler.borrow_mut().request_frame();

        // Auto-play tick
        let tick = {
            let widget = widget.clone();
            Closure::<dyn FnMut()>::new(move || {
                let mut w = widget.borrow_mut();
                let now = w.now_ms();
                let _ = w.frames.driver_mut().tick(now);
            })
        };
        let tick_handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                TICK_INTERVAL_MS,
            )
            .map_err(js_error)
            .context("Failed to start tick interval")?;

        // Weather polling
        let (weather_handle, weather) = if weather_enabled {
            let poll = {
                let widget = Rc::downgrade(&widget);
                Closure::<dyn FnMut()>::new(move || {
                    spawn_weather_fetch(widget.clone(), latitude, longitude);
                })
            };
            let handle = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    poll.as_ref().unchecked_ref(),
                    WEATHER_POLL_MS,
                )
                .map_err(js_error)
                .context("Failed to start weather interval")?;
            spawn_weather_fetch(Rc::downgrade(&widget), latitude, longitude);
            (Some(handle), Some(poll))
        } else {
            (None, None)
        };

        log::info!(
            "Cosmic scene mounted on #{} ({} entities)",
            canvas_id,
            widget.borrow().frames.driver().catalog().len()
        );

        Ok(Self {
            window,
            widget,
            scheduler,
            tick_handle,
            weather_handle,
            _tick: tick,
            _weather: weather,
        })
    }

    fn unmount(self) {
        self.window.clear_interval_with_handle(self.tick_handle);
        if let Some(handle) = self.weather_handle {
            self.window.clear_interval_with_handle(handle);
        }
        self.scheduler.borrow_mut().cancel();
        log::info!("Cosmic scene unmounted");
    }
}

fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

fn spawn_weather_fetch(widget: Weak<RefCell<Widget>>, latitude: f64, longitude: f64) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = weather::fetch_current(latitude, longitude).await;
        let Some(widget) = widget.upgrade() else {
            return;
        };
        let report = match result {
            Ok(report) => {
                log::info!("Weather updated: {}", report.summary());
                Some(report)
            }
            Err(e) => {
                log::warn!("Weather unavailable: {:#}", e);
                None
            }
        };
        widget.borrow_mut().frames.set_weather(report);
    });
}

/// Embeddable cosmic scene widget
#[wasm_bindgen]
pub struct CosmicScene {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl CosmicScene {
    #[wasm_bindgen(constructor)]
    pub fn new() -> CosmicScene {
        init_logging();
        CosmicScene { mounted: None }
    }

    /// Attach to the canvas with `canvas_id` and start animating
    pub fn mount(&mut self, canvas_id: &str) -> Result<(), JsValue> {
        if let Some(old) = self.mounted.take() {
            old.unmount();
        }
        match Mounted::mount(canvas_id) {
            Ok(mounted) => {
                self.mounted = Some(mounted);
                Ok(())
            }
            Err(e) => {
                log::error!("Mount failed: {:#}", e);
                Err(JsValue::from_str(&format!("{:#}", e)))
            }
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.with_widget(|w| {
            let now = w.now_ms();
            w.frames.driver_mut().set_interactive(interactive, now);
        });
    }

    pub fn set_manual_scene(&mut self, index: i32) {
        self.with_widget(|w| w.frames.driver_mut().set_manual_scene(index as i64));
    }

    pub fn next_scene(&mut self) {
        self.with_widget(|w| w.frames.driver_mut().step_manual(1));
    }

    pub fn previous_scene(&mut self) {
        self.with_widget(|w| w.frames.driver_mut().step_manual(-1));
    }

    /// Switch quality preset ("low", "medium", "high") and persist it
    pub fn set_quality(&mut self, preset: &str) -> Result<(), JsValue> {
        let preset = QualityPreset::from_str(preset)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown quality preset '{}'", preset)))?;
        self.with_widget(|w| w.frames.set_quality(preset).save());
        Ok(())
    }

    /// Refit the canvas and redraw immediately
    pub fn resize(&mut self) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        let prefers = prefers_reduced_motion(&mounted.window);
        let mut widget = mounted.widget.borrow_mut();
        widget.surface.fit_to_display(&mounted.window);
        widget.frames.set_prefers_reduced_motion(prefers);
        // The animation loop keeps its own schedule
        widget.frame(&mut CountingScheduler::default());
    }

    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.unmount();
        }
    }
}

impl Default for CosmicScene {
    fn default() -> Self {
        Self::new()
    }
}

impl CosmicScene {
    fn with_widget(&self, f: impl FnOnce(&mut Widget)) {
        if let Some(mounted) = &self.mounted {
            f(&mut mounted.widget.borrow_mut());
        }
    }
}
