//! Card and audit history models

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Verdict, WeatherReading};

/// A city and activity pair with its latest weather verdict
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    /// City name as corrected by the weather provider
    pub city: String,
    pub activity_id: String,
    pub temperature: f32,
    pub humidity: f32,
    pub wind_speed_kmh: f32,
    pub rain_probability: f32,
    /// "Suitable" or the justification of the failing rule
    pub condition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    #[must_use]
    pub fn new(city: String, activity_id: String, weather: &WeatherReading, verdict: &Verdict) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            city,
            activity_id,
            temperature: weather.temperature,
            humidity: weather.humidity,
            wind_speed_kmh: weather.wind_speed_kmh,
            rain_probability: weather.rain_probability,
            condition: verdict.condition(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite weather values and condition with a fresh evaluation
    pub fn apply(&mut self, city: String, weather: &WeatherReading, verdict: &Verdict) {
        self.city = city;
        self.temperature = weather.temperature;
        self.humidity = weather.humidity;
        self.wind_speed_kmh = weather.wind_speed_kmh;
        self.rain_probability = weather.rain_probability;
        self.condition = verdict.condition();
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// Audit row recorded for every card mutation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub operation: Operation,
    pub entity: String,
    pub entity_id: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    #[must_use]
    pub fn for_card(operation: Operation, card_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            operation,
            entity: "CARD".to_string(),
            entity_id: card_id.to_string(),
            recorded_at: Utc::now(),
        }
    }
}
