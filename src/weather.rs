//! Ambient weather for the overlay
//!
//! Parses the Open-Meteo `current_weather` response and maps WMO weather
//! codes to the short labels shown on screen.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

/// Coarse condition derived from a WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Foggy,
    Rainy,
    Snowy,
    Stormy,
    Unknown,
}

impl WeatherCondition {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1..=3 => WeatherCondition::Cloudy,
            45..=48 => WeatherCondition::Foggy,
            51..=67 => WeatherCondition::Rainy,
            71..=77 => WeatherCondition::Snowy,
            80..=99 => WeatherCondition::Stormy,
            _ => WeatherCondition::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "CLEAR",
            WeatherCondition::Cloudy => "CLOUDY",
            WeatherCondition::Foggy => "FOGGY",
            WeatherCondition::Rainy => "RAINY",
            WeatherCondition::Snowy => "SNOWY",
            WeatherCondition::Stormy => "STORMY",
            WeatherCondition::Unknown => "UNKNOWN",
        }
    }
}

/// Shorthand for `WeatherCondition::from_code(code).label()`
pub fn weather_label(code: i32) -> &'static str {
    WeatherCondition::from_code(code).label()
}

/// Latest observation for the configured location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Degrees Celsius
    pub temperature: f32,
    pub code: i32,
    pub is_day: bool,
}

impl WeatherReport {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.code)
    }

    /// Overlay line, e.g. `CLOUDY 14°C` (`☾` appended at night)
    pub fn summary(&self) -> String {
        let degrees = self.temperature.round() as i32;
        let mut line = format!("{} {}°C", self.condition().label(), degrees);
        if !self.is_day {
            line.push_str(" ☾");
        }
        line
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f32,
    weathercode: i32,
    /// Open-Meteo sends 0/1
    #[serde(default = "default_is_day")]
    is_day: u8,
}

fn default_is_day() -> u8 {
    1
}

/// Parse an Open-Meteo forecast body
pub fn parse_open_meteo(body: &str) -> Result<WeatherReport> {
    let response: ForecastResponse =
        serde_json::from_str(body).context("Malformed Open-Meteo response")?;
    let current = response.current_weather;
    if !current.temperature.is_finite() {
        anyhow::bail!("Non-finite temperature in weather response");
    }
    Ok(WeatherReport {
        temperature: current.temperature,
        code: current.weathercode,
        is_day: current.is_day != 0,
    })
}

/// Request URL for the current weather at a location
pub fn forecast_url(latitude: f64, longitude: f64) -> String {
    format!(
        "{}?latitude={:.4}&longitude={:.4}&current_weather=true",
        FORECAST_ENDPOINT, latitude, longitude
    )
}

/// Fetch and parse the current weather (browser only)
#[cfg(target_arch = "wasm32")]
pub async fn fetch_current(latitude: f64, longitude: f64) -> Result<WeatherReport> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let js_err = |e: wasm_bindgen::JsValue| anyhow::anyhow!("{:?}", e);

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);
    let url = forecast_url(latitude, longitude);
    let request = Request::new_with_str_and_init(&url, &opts)
        .map_err(js_err)
        .context("Failed to build weather request")?;

    let window = web_sys::window().context("No window")?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)
        .context("Weather request failed")?;
    let response: Response = response
        .dyn_into()
        .map_err(js_err)
        .context("Unexpected fetch result")?;
    if !response.ok() {
        anyhow::bail!("Weather service returned HTTP {}", response.status());
    }

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)
        .context("Failed to read weather body")?;
    let body = text.as_string().context("Weather body is not text")?;
    parse_open_meteo(&body)
}
