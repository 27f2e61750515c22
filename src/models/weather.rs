//! Weather reading model and display methods

use serde::{Deserialize, Serialize};

/// Weather conditions an activity is judged against
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReading {
    /// Temperature in Celsius
    pub temperature: f32,
    /// Relative humidity percentage (0-100)
    pub humidity: f32,
    /// Wind speed in km/h
    pub wind_speed_kmh: f32,
    /// Probability of precipitation percentage (0-100)
    pub rain_probability: f32,
    /// Provider timestamp (`YYYY-MM-DD HH:MM:SS`) for forecast readings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl WeatherReading {
    #[must_use]
    pub fn new(temperature: f32, humidity: f32, wind_speed_kmh: f32, rain_probability: f32) -> Self {
        Self {
            temperature,
            humidity,
            wind_speed_kmh,
            rain_probability,
            timestamp: None,
        }
    }

    /// Convert wind speed from m/s (provider unit) to km/h
    #[must_use]
    pub fn ms_to_kmh(speed_ms: f32) -> f32 {
        speed_ms * 3.6
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format wind with unit
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} km/h", self.wind_speed_kmh)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{:.0}%", self.humidity)
    }

    #[must_use]
    pub fn format_rain_probability(&self) -> String {
        format!("{:.0}%", self.rain_probability)
    }
}

/// Outcome of judging a reading for an activity
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Verdict {
    pub suitable: bool,
    /// Reason the activity is not suitable, absent when it is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl Verdict {
    #[must_use]
    pub fn suitable() -> Self {
        Self {
            suitable: true,
            justification: None,
        }
    }

    #[must_use]
    pub fn unsuitable<S: Into<String>>(justification: S) -> Self {
        Self {
            suitable: false,
            justification: Some(justification.into()),
        }
    }

    /// Text stored on a card: "Suitable" or the failing rule's justification
    #[must_use]
    pub fn condition(&self) -> String {
        if self.suitable {
            "Suitable".to_string()
        } else {
            self.justification
                .clone()
                .unwrap_or_else(|| "Unsuitable".to_string())
        }
    }
}

/// One day of a card's forecast with the verdict for its activity
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DailyForecast {
    pub date: Option<String>,
    pub weather: WeatherReading,
    pub verdict: Verdict,
}
