//! Favorites list backed by the preferences store.

use std::path::Path;

use crate::error::FavoritesError;
use crate::preferences::Preferences;

/// Preference key holding the favorites list.
pub const FAVORITES_KEY: &str = "favoriteCities";

/// Ordered, duplicate-free list of favorite city names.
///
/// The list is loaded once on construction. Every mutation writes the full
/// list back before returning; if that write fails the in-memory change is
/// undone so memory and storage never disagree.
pub struct FavoritesStore {
    prefs: Preferences,
    cities: Vec<String>,
}

impl FavoritesStore {
    pub fn new(prefs: Preferences) -> Self {
        let cities = Self::load(&prefs);
        tracing::debug!("Loaded {} favorite cities", cities.len());
        Self { prefs, cities }
    }

    /// Open the preferences database at `path` and load favorites from it.
    ///
    /// # Errors
    /// `Storage` if the database cannot be opened. A missing or corrupt
    /// favorites value is not an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FavoritesError> {
        let prefs = Preferences::open(path).map_err(FavoritesError::storage)?;
        Ok(Self::new(prefs))
    }

    /// Persisted favorites, or an empty list when absent or unreadable.
    pub fn load(prefs: &Preferences) -> Vec<String> {
        match prefs.get_string_list(FAVORITES_KEY) {
            Ok(Some(cities)) => cities,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable favorites: {:#}", e);
                Vec::new()
            }
        }
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cities.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Exact, case-sensitive membership check.
    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    /// Append `city` to the end of the list.
    ///
    /// # Errors
    /// `Duplicate` if already present, `InvalidName` for a blank name,
    /// `Storage` if persisting fails. The list is unchanged on any error.
    pub fn add(&mut self, city: &str) -> Result<(), FavoritesError> {
        if city.trim().is_empty() {
            return Err(FavoritesError::InvalidName(city.to_string()));
        }
        if self.contains(city) {
            tracing::debug!(city, "favorite already present");
            return Err(FavoritesError::Duplicate(city.to_string()));
        }

        self.cities.push(city.to_string());
        if let Err(e) = self.persist() {
            self.cities.pop();
            return Err(e);
        }

        tracing::info!(city, "Added favorite");
        Ok(())
    }

    /// Remove and return the favorite at `index`, shifting later entries down.
    ///
    /// # Errors
    /// `IndexOutOfRange` if `index >= len`, `Storage` if persisting fails.
    /// The list is unchanged on any error.
    pub fn remove(&mut self, index: usize) -> Result<String, FavoritesError> {
        if index >= self.cities.len() {
            return Err(FavoritesError::IndexOutOfRange {
                index,
                len: self.cities.len(),
            });
        }

        let removed = self.cities.remove(index);
        if let Err(e) = self.persist() {
            self.cities.insert(index, removed);
            return Err(e);
        }

        tracing::info!(city = %removed, index, "Removed favorite");
        Ok(removed)
    }

    fn persist(&self) -> Result<(), FavoritesError> {
        self.prefs
            .set_string_list(FAVORITES_KEY, &self.cities)
            .map_err(|e| {
                tracing::error!("Failed to persist favorites: {:#}", e);
                FavoritesError::storage(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(cities: &[&str]) -> FavoritesStore {
        let mut store = FavoritesStore::new(Preferences::in_memory().unwrap());
        for city in cities {
            store.add(city).unwrap();
        }
        store
    }

    fn persisted(store: &FavoritesStore) -> Option<Vec<String>> {
        store.prefs.get_string_list(FAVORITES_KEY).unwrap()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = FavoritesStore::new(Preferences::in_memory().unwrap());
        assert!(store.is_empty());
        assert_eq!(store.get(0), None);
    }

    #[test]
    fn test_add_appends_in_order_and_persists() {
        let store = store_with(&["Tokyo", "Lima", "Oslo"]);

        assert_eq!(store.cities(), ["Tokyo", "Lima", "Oslo"]);
        assert_eq!(
            persisted(&store),
            Some(vec!["Tokyo".into(), "Lima".into(), "Oslo".into()])
        );
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut store = store_with(&["Tokyo"]);

        let result = store.add("Tokyo");

        assert_eq!(result, Err(FavoritesError::Duplicate("Tokyo".into())));
        assert_eq!(store.cities(), ["Tokyo"]);
    }

    #[test]
    fn test_duplicate_check_is_case_sensitive() {
        let mut store = store_with(&["Tokyo"]);
        store.add("tokyo").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_does_not_reorder() {
        let mut store = store_with(&["A", "B"]);
        assert!(store.add("A").is_err());
        assert_eq!(store.cities(), ["A", "B"]);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut store = store_with(&[]);
        assert!(matches!(store.add("  "), Err(FavoritesError::InvalidName(_))));
        assert!(store.is_empty());
        assert_eq!(persisted(&store), None);
    }

    #[test]
    fn test_remove_out_of_range_leaves_list_unchanged() {
        let mut store = store_with(&["A", "B"]);

        let result = store.remove(5);

        assert_eq!(
            result,
            Err(FavoritesError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(store.cities(), ["A", "B"]);
    }

    #[test]
    fn test_remove_at_len_is_out_of_range() {
        let mut store = store_with(&["A", "B"]);
        assert!(store.remove(2).is_err());
    }

    #[test]
    fn test_remove_first_shifts_and_persists() {
        let mut store = store_with(&["A", "B"]);

        assert_eq!(store.remove(0).unwrap(), "A");

        assert_eq!(store.cities(), ["B"]);
        assert_eq!(persisted(&store), Some(vec!["B".into()]));
    }

    #[test]
    fn test_remove_middle() {
        let mut store = store_with(&["A", "B", "C"]);
        store.remove(1).unwrap();
        assert_eq!(store.cities(), ["A", "C"]);
    }

    #[test]
    fn test_remove_last_element_persists_empty_list() {
        let mut store = store_with(&["A"]);
        store.remove(0).unwrap();
        assert_eq!(persisted(&store), Some(Vec::new()));
    }

    #[test]
    fn test_corrupt_value_loads_as_empty() {
        let prefs = Preferences::in_memory().unwrap();
        prefs.set_raw(FAVORITES_KEY, "not json").unwrap();

        let mut store = FavoritesStore::new(prefs);
        assert!(store.is_empty());

        // The store stays usable and overwrites the corrupt value
        store.add("Rome").unwrap();
        assert_eq!(persisted(&store), Some(vec!["Rome".into()]));
    }

    #[test]
    fn test_wrong_element_type_loads_as_empty() {
        let prefs = Preferences::in_memory().unwrap();
        prefs.set_raw(FAVORITES_KEY, "[1, 2, 3]").unwrap();

        assert!(FavoritesStore::load(&prefs).is_empty());
    }
}
