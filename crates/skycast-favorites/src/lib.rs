//! Favorite cities for SkyCast.
//!
//! Keeps a user-ordered, duplicate-free list of city names persisted in a
//! SQLite preferences table.

pub mod error;
pub mod preferences;
pub mod store;

pub use error::FavoritesError;
pub use preferences::Preferences;
pub use store::{FavoritesStore, FAVORITES_KEY};
