use std::sync::Arc;
use std::time::Duration;

use skycast_core::Config;
use skycast_favorites::FavoritesStore;
use skycast_weather::{WeatherClient, WeatherRecord, WeatherSession, WeatherState};
use tokio::task::JoinSet;

use crate::error::AppError;

/// Wires configuration, the weather client and the favorites store together.
pub struct App {
    client: Arc<WeatherClient>,
    session: WeatherSession,
    favorites: FavoritesStore,
}

impl App {
    /// Build the application from a validated configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let api_key = config.api_key()?;
        let client = Arc::new(WeatherClient::with_base_url(
            api_key,
            &config.weather.base_url,
            Duration::from_secs(config.weather.timeout_secs),
        )?);
        let session = WeatherSession::new(Arc::clone(&client));

        let favorites_path = config.favorites_path();
        tracing::debug!("Opening favorites at {}", favorites_path.display());
        let favorites = FavoritesStore::open(favorites_path)?;

        Ok(Self {
            client,
            session,
            favorites,
        })
    }

    pub async fn weather(&self, city: &str) -> Result<WeatherRecord, AppError> {
        Ok(self.session.request(city).await?)
    }

    /// Latest published weather/error state.
    pub fn current(&self) -> WeatherState {
        self.session.latest()
    }

    /// Fetch weather for every favorite concurrently, in list order.
    pub async fn favorites_weather(&self) -> Vec<(String, Result<WeatherRecord, AppError>)> {
        let mut tasks = JoinSet::new();
        for (index, city) in self.favorites.cities().iter().cloned().enumerate() {
            let client = Arc::clone(&self.client);
            tasks.spawn(async move {
                let result = client.fetch_weather(&city).await;
                (index, city, result)
            });
        }

        let mut results = Vec::with_capacity(self.favorites.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, city, result)) => {
                    results.push((index, city, result.map_err(AppError::from)))
                }
                Err(e) => tracing::error!("Favorite weather task failed: {}", e),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, city, result)| (city, result))
            .collect()
    }

    pub fn favorites(&self) -> &[String] {
        self.favorites.cities()
    }

    pub fn add_favorite(&mut self, city: &str) -> Result<(), AppError> {
        Ok(self.favorites.add(city)?)
    }

    pub fn remove_favorite(&mut self, index: usize) -> Result<String, AppError> {
        Ok(self.favorites.remove(index)?)
    }
}
