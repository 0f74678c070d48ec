use serde::{Deserialize, Serialize};

/// Current conditions for one city, flattened from the provider payload.
///
/// Records are only ever produced by a complete decode; there is no partial
/// form. Callers receive clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Resolved place name as reported by the provider
    pub city: String,
    /// ISO 3166 country code
    pub country: String,
    pub temperature_celsius: f64,
    /// Short condition group, e.g. "Clouds" or "Rain"
    pub condition_summary: String,
}

impl std::fmt::Display for WeatherRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}: {:.1}°C, {}",
            self.city, self.country, self.temperature_celsius, self.condition_summary
        )
    }
}
