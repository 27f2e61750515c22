//! `weathercard` - weather suitability cards for outdoor activities
//!
//! Users pair a city with an activity; the current forecast is judged against
//! the activity's thresholds and the verdict is stored as a card with an
//! audit history.

pub mod activity;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use activity::{Activity, ActivityEvaluator, ActivityStrategy};
pub use cache::PersistentCache;
pub use config::WeatherCardConfig;
pub use error::WeatherCardError;
pub use models::{Card, DailyForecast, HistoryEntry, Operation, Verdict, WeatherReading};
pub use service::CardService;
pub use store::{CardRepository, FjallCardStore, MemoryCardStore};
pub use weather::{CurrentWeather, OpenWeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherCardError>;
