//! Application-level error type.
//!
//! Every error the library crates report converts into `AppError`, which is
//! the one place that decides what the user sees.

use skycast_core::ConfigError;
use skycast_favorites::FavoritesError;
use skycast_weather::WeatherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Favorites error: {0}")]
    Favorites(#[from] FavoritesError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Weather(e) => e.user_message().to_string(),
            AppError::Favorites(e) => e.user_message(),
        }
    }
}
