//! Data models for the weathercard application
//!
//! This module contains the core domain models organized by concern:
//! - Weather: readings, verdicts and daily forecasts
//! - Card: persisted cards and their audit history

pub mod card;
pub mod weather;

// Re-export all public types for convenient access
pub use card::{Card, HistoryEntry, Operation};
pub use weather::{DailyForecast, Verdict, WeatherReading};
