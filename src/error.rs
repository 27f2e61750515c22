//! Error types and handling for the `weathercard` application

use thiserror::Error;

/// Main error type for the `weathercard` application
#[derive(Error, Debug)]
pub enum WeatherCardError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather provider communication errors
    #[error("Weather error: {message}")]
    Weather { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A requested record does not exist
    #[error("{message}")]
    NotFound { message: String },

    /// No strategy is registered for the activity
    #[error("Activity \"{activity}\" is not supported.")]
    UnsupportedActivity { activity: String },

    /// Card store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl WeatherCardError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new weather provider error
    pub fn weather<S: Into<String>>(message: S) -> Self {
        Self::Weather {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unsupported_activity<S: Into<String>>(activity: S) -> Self {
        Self::UnsupportedActivity {
            activity: activity.into(),
        }
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherCardError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            WeatherCardError::Weather { message } => message.clone(),
            WeatherCardError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WeatherCardError::NotFound { message } => message.clone(),
            WeatherCardError::UnsupportedActivity { .. } => self.to_string(),
            WeatherCardError::Storage { .. } => {
                "Card storage failed. Please check the data directory.".to_string()
            }
            WeatherCardError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
        }
    }
}
