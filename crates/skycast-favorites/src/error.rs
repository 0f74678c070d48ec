//! Favorites error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavoritesError {
    #[error("'{0}' is already a favorite")]
    Duplicate(String),

    #[error("Favorite index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid city name: {0:?}")]
    InvalidName(String),

    #[error("Failed to persist favorites: {0}")]
    Storage(String),
}

impl FavoritesError {
    pub(crate) fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", err))
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Duplicate(city) => format!("{} is already in your favorites.", city),
            Self::IndexOutOfRange { .. } => "That favorite no longer exists.".to_string(),
            Self::InvalidName(_) => "Please enter a city name.".to_string(),
            Self::Storage(_) => "Failed to save favorites. Please try again.".to_string(),
        }
    }
}
