//! OpenWeatherMap forecast client
//!
//! Uses the 5 day / 3 hour `/forecast` endpoint because it carries the
//! probability of precipitation (`pop`) the activity rules need.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::{CurrentWeather, WeatherProvider};
use crate::cache::PersistentCache;
use crate::config::{MAX_RETRY_INTERVAL, WeatherCardConfig};
use crate::models::WeatherReading;
use crate::{Result, WeatherCardError};

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MIDDAY_HOUR: u32 = 12;

/// `/forecast` response, reduced to the fields we adapt
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
    pub city: CityInfo,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    /// UTC slot time, `YYYY-MM-DD HH:MM:SS`
    pub dt_txt: String,
    pub main: MainData,
    pub wind: WindData,
    /// Probability of precipitation, 0.0-1.0
    #[serde(default)]
    pub pop: f32,
}

#[derive(Debug, Deserialize)]
pub struct MainData {
    pub temp: f32,
    pub humidity: f32,
}

#[derive(Debug, Deserialize)]
pub struct WindData {
    /// m/s with `units=metric`
    pub speed: f32,
}

#[derive(Debug, Deserialize)]
pub struct CityInfo {
    pub name: String,
}

impl ForecastEntry {
    #[must_use]
    pub fn to_reading(&self) -> WeatherReading {
        WeatherReading {
            temperature: self.main.temp,
            humidity: self.main.humidity,
            wind_speed_kmh: WeatherReading::ms_to_kmh(self.wind.speed),
            rain_probability: self.pop * 100.0,
            timestamp: Some(self.dt_txt.clone()),
        }
    }
}

impl ForecastResponse {
    /// The first slot is the closest thing to "now" the endpoint offers
    pub fn current(&self) -> Result<CurrentWeather> {
        let first = self.list.first().ok_or_else(|| {
            WeatherCardError::weather(format!("No forecast data returned for {}", self.city.name))
        })?;

        let mut reading = first.to_reading();
        reading.timestamp = None;

        Ok(CurrentWeather {
            city: self.city.name.clone(),
            reading,
        })
    }

    /// Midday (12:00 UTC) slots, at most one per calendar day, in list order
    #[must_use]
    pub fn daily_middays(&self) -> Vec<WeatherReading> {
        let mut seen_days: HashSet<NaiveDate> = HashSet::new();

        self.list
            .iter()
            .filter(|entry| {
                match NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT) {
                    Ok(slot) => slot.hour() == MIDDAY_HOUR && seen_days.insert(slot.date()),
                    Err(e) => {
                        debug!("Skipping slot with unparsable time '{}': {}", entry.dt_txt, e);
                        false
                    }
                }
            })
            .map(ForecastEntry::to_reading)
            .collect()
    }
}

/// Cache record for a current-weather lookup
#[derive(Debug, Serialize, Deserialize)]
struct CachedCurrent {
    city: String,
    temperature: f32,
    humidity: f32,
    wind_speed_kmh: f32,
    rain_probability: f32,
}

impl From<&CurrentWeather> for CachedCurrent {
    fn from(current: &CurrentWeather) -> Self {
        Self {
            city: current.city.clone(),
            temperature: current.reading.temperature,
            humidity: current.reading.humidity,
            wind_speed_kmh: current.reading.wind_speed_kmh,
            rain_probability: current.reading.rain_probability,
        }
    }
}

impl From<CachedCurrent> for CurrentWeather {
    fn from(cached: CachedCurrent) -> Self {
        Self {
            city: cached.city,
            reading: WeatherReading::new(
                cached.temperature,
                cached.humidity,
                cached.wind_speed_kmh,
                cached.rain_probability,
            ),
        }
    }
}

/// Weather provider backed by the OpenWeatherMap API
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    cache: Option<PersistentCache>,
    cache_ttl: Duration,
}

impl OpenWeatherClient {
    /// Create a client from configuration. Fails when no API key is configured.
    pub fn new(config: &WeatherCardConfig) -> Result<Self> {
        let api_key = config.weather.api_key.clone().ok_or_else(|| {
            WeatherCardError::config(
                "Weather API key is not configured. Set WEATHERCARD_WEATHER__API_KEY.",
            )
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.weather.timeout_seconds.into()))
            .user_agent(concat!("weathercard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherCardError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), MAX_RETRY_INTERVAL)
            .build_with_max_retries(config.weather.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.weather.base_url.trim_end_matches('/').to_string(),
            api_key,
            cache: None,
            cache_ttl: Duration::from_secs(u64::from(config.cache.ttl_minutes) * 60),
        })
    }

    /// Reuse current-weather lookups through `cache`
    #[must_use]
    pub fn with_cache(mut self, cache: PersistentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn cache_key(city: &str) -> String {
        format!("weather:current:{}", city.trim().to_lowercase())
    }

    #[instrument(skip(self))]
    async fn fetch_forecast(&self, city: &str) -> Result<ForecastResponse> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherCardError::validation("City cannot be empty"));
        }

        let url = format!(
            "{}/forecast?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key)
        );

        let start_time = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error while fetching weather for '{}': {}", city, e);
            WeatherCardError::weather(format!("Could not fetch weather data: {e}"))
        })?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => {
                warn!("City not found by weather API: '{}'", city);
                return Err(WeatherCardError::weather(format!("City not found: {city}")));
            }
            StatusCode::UNAUTHORIZED => {
                error!("Weather API authentication failed (HTTP 401)");
                return Err(WeatherCardError::config(
                    "Invalid weather API key. Please check your OpenWeatherMap API key.",
                ));
            }
            _ => {
                error!("Weather API request failed with status {}", status);
                return Err(WeatherCardError::weather(format!(
                    "Weather API request failed with status: {} - {}",
                    status,
                    status.canonical_reason().unwrap_or("Unknown error")
                )));
            }
        }

        let forecast: ForecastResponse = response.json().await.map_err(|e| {
            error!("Failed to parse forecast response for '{}': {}", city, e);
            WeatherCardError::weather("Invalid forecast data received from weather API")
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved {} forecast slots for '{}' in {:.3}s",
            forecast.list.len(),
            forecast.city.name,
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow weather API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(forecast)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<CurrentWeather> {
        let key = Self::cache_key(city);

        if let Some(cache) = &self.cache {
            match cache.get::<CachedCurrent>(&key).await {
                Ok(Some(cached)) => {
                    debug!("Using cached weather for '{}'", city);
                    return Ok(cached.into());
                }
                Ok(None) => {}
                Err(e) => warn!("Weather cache read failed: {}", e),
            }
        }

        self.current_fresh(city).await
    }

    #[instrument(skip(self))]
    async fn current_fresh(&self, city: &str) -> Result<CurrentWeather> {
        let current = self.fetch_forecast(city).await?.current()?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache
                .put_with_jitter(
                    &Self::cache_key(city),
                    CachedCurrent::from(&current),
                    self.cache_ttl,
                )
                .await
            {
                warn!("Weather cache write failed: {}", e);
            }
        }

        Ok(current)
    }

    #[instrument(skip(self))]
    async fn daily_forecast(&self, city: &str) -> Result<Vec<WeatherReading>> {
        let forecast = self.fetch_forecast(city).await?;
        let days = forecast.daily_middays();
        debug!("Selected {} midday slots for '{}'", days.len(), city);
        Ok(days)
    }
}
