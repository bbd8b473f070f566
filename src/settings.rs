//! Scene settings and preferences
//!
//! Persisted in LocalStorage. Native builds always use defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::renderer::RenderOptions;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles per layer for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 160,
            QualityPreset::High => 400,
        }
    }

    /// Whether the ordered-dither pass runs
    pub fn dithering_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Where the weather and caption come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 40.7128,
            longitude: -74.006,
            label: "New York".to_string(),
        }
    }
}

/// Scene settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Rendering ===
    /// Ordered-dither post-process
    pub dithering: bool,
    /// Smoothed render time above which dithering is skipped
    pub frame_budget_ms: f64,

    // === Overlay ===
    pub location: Location,
    /// Shown after the clock
    pub timezone_label: String,
    /// Offset applied to UTC for the clock
    pub utc_offset_minutes: i32,
    /// Poll the weather service
    pub weather: bool,

    // === Accessibility ===
    /// Reduced motion (OR-ed with the host media query)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            dithering: true,
            frame_budget_ms: 12.0,

            location: Location::default(),
            timezone_label: "UTC".to_string(),
            utc_offset_minutes: 0,
            weather: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.dithering = preset.dithering_enabled();
    }

    /// Effective reduced motion (settings override OR host preference)
    pub fn effective_reduced_motion(&self, prefers_reduced_motion: bool) -> bool {
        self.reduced_motion || prefers_reduced_motion
    }

    /// Effective dithering (setting AND preset)
    pub fn effective_dithering(&self) -> bool {
        self.dithering && self.quality.dithering_enabled()
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        self.quality.max_particles()
    }

    /// Renderer switches for the current preferences
    pub fn render_options(&self, prefers_reduced_motion: bool) -> RenderOptions {
        RenderOptions {
            dithering: self.effective_dithering(),
            max_particles: self.max_particles(),
            freeze_particles: self.effective_reduced_motion(prefers_reduced_motion),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid settings JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize settings")
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "cosmic_scene_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {:#}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::error!("{:#}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::from_str("LOW"), Some(QualityPreset::Low));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_particle_cap_grows_with_quality() {
        assert!(QualityPreset::Low.max_particles() < QualityPreset::Medium.max_particles());
        assert!(QualityPreset::Medium.max_particles() < QualityPreset::High.max_particles());
    }

    #[test]
    fn test_low_preset_disables_dithering() {
        let settings = Settings::from_preset(QualityPreset::Low);
        assert!(!settings.dithering);
        assert!(!settings.effective_dithering());

        // Re-enabling the flag does not override the preset
        let mut settings = settings;
        settings.dithering = true;
        assert!(!settings.effective_dithering());
    }

    #[test]
    fn test_reduced_motion_is_or_of_setting_and_media_query() {
        let mut settings = Settings::default();
        assert!(!settings.effective_reduced_motion(false));
        assert!(settings.effective_reduced_motion(true));
        settings.reduced_motion = true;
        assert!(settings.effective_reduced_motion(false));
        assert!(settings.render_options(false).freeze_particles);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"quality":"High","utc_offset_minutes":60}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.utc_offset_minutes, 60);
        assert_eq!(settings.location, Location::default());
        assert_eq!(settings.timezone_label, "UTC");
    }

    #[test]
    fn test_json_survives_save_format() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        settings.location.label = "Reykjavík".into();
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json("{quality:").is_err());
    }
}
