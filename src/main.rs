//! Cosmic Scene entry point
//!
//! On the web this only installs logging; the host page owns the widget
//! (`new CosmicScene().mount(id)`) so every control and `unmount` reach it.
//! Natively it renders headless frames per catalog entity and logs what was
//! drawn.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    cosmic_scene::platform::web::init_logging();
    log::info!("Cosmic Scene loaded, waiting for the host to mount a CosmicScene");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cosmic Scene (native) starting...");
    log::info!("Native mode renders headless previews - run with `trunk serve` for the widget");

    if let Err(e) = preview::run(&[(1280, 720), (480, 800)]) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod preview {
    use anyhow::{Result, ensure};

    use cosmic_scene::Catalog;
    use cosmic_scene::platform::{CountingScheduler, FrameLoop, ManualClock, wall_clock_ms};
    use cosmic_scene::renderer::SoftwareSurface;
    use cosmic_scene::settings::Settings;

    /// Scene time at which each preview frame is taken
    const PREVIEW_TIME_MS: f64 = 2_500.0;

    /// Render every entity at each `(width, height)`
    pub fn run(sizes: &[(u32, u32)]) -> Result<()> {
        let catalog = Catalog::builtin();
        ensure!(!catalog.is_empty(), "Entity catalog is empty");

        let names: Vec<String> = catalog.iter().map(|e| e.name.clone()).collect();
        let settings = Settings::load();
        let clock = ManualClock::new(0.0);
        let mut scheduler = CountingScheduler::default();
        let mut surface = SoftwareSurface::new(1, 1);
        let mut frames = FrameLoop::new(catalog, settings, 0.0, 0x00C0_5A1C);
        frames.driver_mut().set_interactive(true, 0.0);

        for &(width, height) in sizes {
            surface.resize(width, height);
            for (i, name) in names.iter().enumerate() {
                frames.driver_mut().set_manual_scene(i as i64);
                clock.set(PREVIEW_TIME_MS);
                let stats = frames.frame(&mut surface, &clock, wall_clock_ms(), &mut scheduler);

                let variant = frames.driver().variant(i).map(|v| v.base.as_str()).unwrap_or("-");
                log::info!(
                    "{:>2} {:<16} style={:<8} glyphs={:>5} particles={:>4} dithered={} luma={:.1}",
                    i,
                    name,
                    variant,
                    stats.glyphs,
                    stats.particles,
                    stats.dithered,
                    surface.mean_luma()
                );
            }
            log::info!("Rendered {} preview frames at {}x{}", names.len(), width, height);
        }
        Ok(())
    }
}
