//! Decoding of the OpenWeatherMap "current weather" payload.
//!
//! Field mapping is fixed: `name`, `sys.country`, `main.temp` and
//! `weather[0].main`. Only the first condition entry is read.

use serde::Deserialize;

use crate::error::DecodeError;
use crate::types::WeatherRecord;

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    sys: SysBlock,
    main: MainBlock,
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct SysBlock {
    country: String,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
}

/// Error body returned by the provider on non-2xx responses,
/// e.g. `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Decode a response body into a [`WeatherRecord`].
///
/// # Errors
/// `DecodeError::Malformed` if the body is not a JSON object or any required
/// field is missing or mistyped; `DecodeError::EmptyConditions` if the
/// `weather` array is empty.
pub fn decode(payload: &[u8]) -> Result<WeatherRecord, DecodeError> {
    let response: CurrentWeatherResponse =
        serde_json::from_slice(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let condition = response
        .weather
        .into_iter()
        .next()
        .ok_or(DecodeError::EmptyConditions)?;

    Ok(WeatherRecord {
        city: response.name,
        country: response.sys.country,
        temperature_celsius: response.main.temp,
        condition_summary: condition.main,
    })
}

/// Pull the human-readable message out of a provider error body, if present.
pub(crate) fn error_message(payload: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiErrorBody>(payload)
        .ok()
        .map(|body| body.message)
}
