//! Text overlay: entity name, clock, weather and captions

use glam::Vec2;

use crate::renderer::frame::{Frame, TextAlign};
use crate::scene::Layer;
use crate::weather::WeatherReport;

const MARGIN: f32 = 24.0;
const BANNER_SIZE: f32 = 42.0;
const CLOCK_SIZE: f32 = 22.0;
const CAPTION_SIZE: f32 = 14.0;

/// Wall-clock time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallClock {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl WallClock {
    /// Time of day for a Unix timestamp shifted by a UTC offset
    pub fn from_unix_ms(unix_ms: f64, utc_offset_minutes: i32) -> Self {
        let secs = (unix_ms / 1000.0).floor() as i64 + utc_offset_minutes as i64 * 60;
        let day = secs.rem_euclid(86_400);
        Self {
            hours: (day / 3600) as u8,
            minutes: (day / 60 % 60) as u8,
            seconds: (day % 60) as u8,
        }
    }
}

/// `HH:MM:SS TZ`
pub fn format_clock(clock: &WallClock, timezone_label: &str) -> String {
    let time = format!(
        "{:02}:{:02}:{:02}",
        clock.hours, clock.minutes, clock.seconds
    );
    if timezone_label.is_empty() {
        time
    } else {
        format!("{} {}", time, timezone_label)
    }
}

/// Host-side data drawn over the scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayInfo {
    pub clock: Option<WallClock>,
    pub timezone_label: String,
    pub location_label: String,
    /// Absent until the first successful fetch, or after a failed one
    pub weather: Option<WeatherReport>,
}

/// Draw the overlay for the headline layer
pub fn draw_overlay(frame: &mut Frame, headline: Option<&Layer<'_>>, info: &OverlayInfo) {
    let size = frame.logical_size();
    let cx = size.x * 0.5;
    let mut y = size.y * 0.78;

    if let Some(layer) = headline {
        frame.text(
            layer.entity.name.to_uppercase(),
            Vec2::new(cx, y),
            BANNER_SIZE,
            TextAlign::Center,
        );
    }
    y += BANNER_SIZE * 0.9;

    if let Some(clock) = &info.clock {
        frame.text(
            format_clock(clock, &info.timezone_label),
            Vec2::new(cx, y),
            CLOCK_SIZE,
            TextAlign::Center,
        );
    }
    y += CLOCK_SIZE * 1.3;

    if let Some(weather) = &info.weather {
        frame.text(weather.summary(), Vec2::new(cx, y), CLOCK_SIZE * 0.8, TextAlign::Center);
    }

    let bottom = size.y - MARGIN;
    if let Some(layer) = headline {
        let caption = format!(
            "{} · {}",
            layer.entity.kind.as_str().to_uppercase(),
            layer.variant.base.as_str().to_uppercase()
        );
        frame.text(caption, Vec2::new(MARGIN, bottom), CAPTION_SIZE, TextAlign::Left);
    }
    if !info.location_label.is_empty() {
        frame.text(
            info.location_label.to_uppercase(),
            Vec2::new(size.x - MARGIN, bottom),
            CAPTION_SIZE,
            TextAlign::Right,
        );
    }
}
