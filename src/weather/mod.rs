//! Weather providers
//!
//! A [`WeatherProvider`] turns a city name into the readings activities are
//! judged against. [`openweather::OpenWeatherClient`] is the production
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::models::WeatherReading;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Current conditions together with the provider's spelling of the city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub reading: WeatherReading,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Conditions for the nearest forecast slot
    async fn current(&self, city: &str) -> Result<CurrentWeather>;

    /// Like [`current`](Self::current) but never answered from a cache.
    /// Providers that cache should still store the fresh reading.
    async fn current_fresh(&self, city: &str) -> Result<CurrentWeather> {
        self.current(city).await
    }

    /// One midday reading per upcoming day, each carrying its timestamp
    async fn daily_forecast(&self, city: &str) -> Result<Vec<WeatherReading>>;
}
