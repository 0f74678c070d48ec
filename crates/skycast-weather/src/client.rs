//! OpenWeatherMap "current weather by city name" client.

use std::time::Duration;
use tracing::instrument;

use crate::cache::{CacheStats, FetchCache};
use crate::decode;
use crate::error::{NetworkError, ReqwestErrorExt, WeatherError};
use crate::types::WeatherRecord;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const WEATHER_PATH: &str = "/data/2.5/weather";
const USER_AGENT: &str = "SkyCast/0.1.0";

/// Fetches current weather, caching successful lookups per city name.
///
/// The cache key is the city exactly as given; "paris" and "Paris" are
/// different entries.
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    cache: FetchCache<WeatherRecord, WeatherError>,
}

impl WeatherClient {
    /// Client against the public OpenWeatherMap endpoint.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Fails if the HTTP client cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: FetchCache::new(),
        })
    }

    /// Current weather for `city`.
    ///
    /// A cached record is returned without touching the network. Concurrent
    /// calls for the same uncached city share one request. Failures are never
    /// cached and are not retried.
    ///
    /// # Errors
    /// `Encoding` for an unusable city name (checked before the cache),
    /// `Network` for transport or HTTP failures, `Decode` for an unexpected
    /// response shape.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let encoded = encode_city(city)?;

        self.cache
            .get_or_fetch(city, || self.request(city, &encoded))
            .await
    }

    /// Cached record for `city`, if one exists.
    pub fn cached(&self, city: &str) -> Option<WeatherRecord> {
        self.cache.get(city)
    }

    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    async fn request(&self, city: &str, encoded: &str) -> Result<WeatherRecord, WeatherError> {
        // The URL carries the API key, so it is never logged.
        let url = format!(
            "{}{}?q={}&appid={}&units=metric",
            self.base_url,
            WEATHER_PATH,
            encoded,
            urlencoding::encode(&self.api_key),
        );

        tracing::info!(city, "requesting current weather");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| e.into_network_error())?;

        if !status.is_success() {
            let message = decode::error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
            tracing::warn!(city, status = status.as_u16(), "weather request failed: {}", message);
            return Err(NetworkError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let record = decode::decode(&body).map_err(|e| {
            tracing::warn!(city, "failed to decode weather response: {}", e);
            e
        })?;

        tracing::info!(city, resolved = %record.city, "weather fetched");
        Ok(record)
    }
}

/// Validate a city name and percent-encode it for a URL query component.
///
/// # Errors
/// `WeatherError::Encoding` for blank names or names with control characters.
pub fn encode_city(city: &str) -> Result<String, WeatherError> {
    if city.trim().is_empty() {
        return Err(WeatherError::Encoding("city name is empty".to_string()));
    }
    if city.chars().any(char::is_control) {
        return Err(WeatherError::Encoding(format!(
            "city name contains control characters: {:?}",
            city
        )));
    }
    Ok(urlencoding::encode(city).into_owned())
}
