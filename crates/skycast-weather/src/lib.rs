//! Weather lookup for SkyCast
//!
//! Fetches current conditions by city name from OpenWeatherMap, decodes the
//! nested payload into a flat [`WeatherRecord`], and caches results in memory
//! with at most one outstanding request per city.

pub mod cache;
pub mod client;
pub mod decode;
pub mod error;
pub mod session;
pub mod types;

pub use cache::{CacheStats, FetchCache};
pub use client::{encode_city, WeatherClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use decode::decode;
pub use error::{DecodeError, NetworkError, WeatherError};
pub use session::{WeatherSession, WeatherState};
pub use types::WeatherRecord;
