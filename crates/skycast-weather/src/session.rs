//! Observable "latest weather / latest error" slot for a presentation layer.
//!
//! Callers can await [`WeatherSession::request`] directly, or subscribe and
//! react to state changes.

use std::sync::Arc;
use tokio::sync::watch;

use crate::client::WeatherClient;
use crate::error::WeatherError;
use crate::types::WeatherRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    /// City of the most recent request
    pub city: Option<String>,
    /// Most recent successful result. Kept when a later request fails.
    pub weather: Option<WeatherRecord>,
    /// User-facing message for the most recent failure, cleared on success
    pub error: Option<String>,
    pub loading: bool,
}

pub struct WeatherSession {
    client: Arc<WeatherClient>,
    state: watch::Sender<WeatherState>,
}

impl WeatherSession {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        let (state, _) = watch::channel(WeatherState::default());
        Self { client, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    pub fn latest(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    /// Fetch weather for `city` and publish the outcome.
    ///
    /// Only the most recently requested city updates the published weather;
    /// results for superseded requests are still returned to their caller.
    /// Dropping the future mid-fetch clears `loading` without publishing.
    ///
    /// # Errors
    /// Same as [`WeatherClient::fetch_weather`].
    pub async fn request(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        self.state.send_modify(|s| {
            s.city = Some(city.to_string());
            s.loading = true;
        });

        let mut pending = PendingRequest {
            state: &self.state,
            city,
            settled: false,
        };
        let result = self.client.fetch_weather(city).await;
        pending.settled = true;

        self.state.send_modify(|s| {
            if s.city.as_deref() != Some(city) {
                return;
            }
            s.loading = false;
            match &result {
                Ok(record) => {
                    s.weather = Some(record.clone());
                    s.error = None;
                }
                Err(e) => {
                    tracing::debug!(city, "publishing weather error: {}", e);
                    s.error = Some(e.user_message().to_string());
                }
            }
        });

        result
    }
}

/// Clears `loading` if a request is dropped before it publishes an outcome.
struct PendingRequest<'a> {
    state: &'a watch::Sender<WeatherState>,
    city: &'a str,
    settled: bool,
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.state.send_if_modified(|s| {
            if s.city.as_deref() == Some(self.city) && s.loading {
                s.loading = false;
                true
            } else {
                false
            }
        });
    }
}
