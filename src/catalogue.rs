// File: src/catalogue.rs
//! Seams to the stores the engine reads from and writes through.
//!
//! The engine holds no recipe rows, persisted reviews or view counters of its
//! own. It asks these collaborators at startup and on demand. The in-memory
//! versions here back the tests and any embedding that doesn't need files;
//! the file-backed ones live in [`crate::persistence`].

use crate::core::types::{RecipeRow, Review};
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Holds the recipe rows, read at startup and for catalogue filtering.
pub trait RecipeSource: Send + Sync {
    fn recipes(&self) -> Result<Vec<RecipeRow>>;

    /// Stores a newly imported recipe so later rebuilds and restarts see it.
    fn add_recipe(&self, row: &RecipeRow) -> Result<()>;
}

/// Persists reviews per recipe, in insertion order.
pub trait ReviewStore: Send + Sync {
    /// Every recipe with its reviews. Used once to seed the selectors.
    fn load_all(&self) -> Result<Vec<(String, Vec<Review>)>>;

    fn append(&self, recipe_name: &str, review: &Review) -> Result<()>;

    /// Reviews for one recipe, oldest first. Unknown recipes yield an empty list.
    fn reviews_for(&self, recipe_name: &str) -> Result<Vec<Review>>;

    /// Names of recipes holding at least one review.
    fn reviewed_recipes(&self) -> Result<Vec<String>>;
}

/// Counts recipe views with increment-or-initialize semantics.
pub trait ViewCounter: Send + Sync {
    /// Adds one view and returns the new total.
    fn increment(&self, recipe_name: &str) -> Result<u64>;

    fn counts(&self) -> Result<Vec<(String, u64)>>;
}

/// Recipe rows kept only for the life of the process.
#[derive(Default)]
pub struct MemoryRecipeSource {
    rows: Mutex<Vec<RecipeRow>>,
}

impl MemoryRecipeSource {
    pub fn new(rows: Vec<RecipeRow>) -> Self {
        Self { rows: Mutex::new(rows) }
    }
}

impl RecipeSource for MemoryRecipeSource {
    fn recipes(&self) -> Result<Vec<RecipeRow>> {
        Ok(self.rows.lock().clone())
    }

    fn add_recipe(&self, row: &RecipeRow) -> Result<()> {
        self.rows.lock().push(row.clone());
        Ok(())
    }
}

/// Reviews kept only for the life of the process.
#[derive(Default)]
pub struct MemoryReviewStore {
    reviews: Mutex<HashMap<String, Vec<Review>>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reviews(reviews: HashMap<String, Vec<Review>>) -> Self {
        Self { reviews: Mutex::new(reviews) }
    }
}

impl ReviewStore for MemoryReviewStore {
    fn load_all(&self) -> Result<Vec<(String, Vec<Review>)>> {
        Ok(self
            .reviews
            .lock()
            .iter()
            .map(|(name, reviews)| (name.clone(), reviews.clone()))
            .collect())
    }

    fn append(&self, recipe_name: &str, review: &Review) -> Result<()> {
        self.reviews
            .lock()
            .entry(recipe_name.to_string())
            .or_default()
            .push(review.clone());
        Ok(())
    }

    fn reviews_for(&self, recipe_name: &str) -> Result<Vec<Review>> {
        Ok(self.reviews.lock().get(recipe_name).cloned().unwrap_or_default())
    }

    fn reviewed_recipes(&self) -> Result<Vec<String>> {
        Ok(self
            .reviews
            .lock()
            .iter()
            .filter(|(_, reviews)| !reviews.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }
}

/// View counters kept only for the life of the process.
#[derive(Default)]
pub struct MemoryViewCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl MemoryViewCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts<I: IntoIterator<Item = (String, u64)>>(counts: I) -> Self {
        Self { counts: Mutex::new(counts.into_iter().collect()) }
    }
}

impl ViewCounter for MemoryViewCounter {
    fn increment(&self, recipe_name: &str) -> Result<u64> {
        let mut counts = self.counts.lock();
        let count = counts.entry(recipe_name.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    fn counts(&self) -> Result<Vec<(String, u64)>> {
        Ok(self.counts.lock().iter().map(|(n, c)| (n.clone(), *c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(user: &str, rating: f64) -> Review {
        Review { username: user.into(), rating, comment: String::new(), timestamp: 0.0 }
    }

    #[test]
    fn memory_reviews_keep_insertion_order() {
        let store = MemoryReviewStore::new();
        store.append("Bannock", &review("ana", 4.0)).unwrap();
        store.append("Bannock", &review("bo", 2.0)).unwrap();

        let names: Vec<String> = store
            .reviews_for("Bannock")
            .unwrap()
            .into_iter()
            .map(|r| r.username)
            .collect();
        assert_eq!(names, vec!["ana", "bo"]);
        assert!(store.reviews_for("Pemmican").unwrap().is_empty());
        assert_eq!(store.reviewed_recipes().unwrap(), vec!["Bannock".to_string()]);
    }

    #[test]
    fn memory_recipes_accept_additions() {
        let source = MemoryRecipeSource::new(vec![RecipeRow::new("Bannock", "flour")]);
        source.add_recipe(&RecipeRow::new("Pemmican", "bison")).unwrap();
        let names: Vec<String> = source.recipes().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Bannock", "Pemmican"]);
    }

    #[test]
    fn memory_views_increment_or_initialize() {
        let views = MemoryViewCounter::new();
        assert_eq!(views.increment("Bannock").unwrap(), 1);
        assert_eq!(views.increment("Bannock").unwrap(), 2);
        assert_eq!(views.counts().unwrap(), vec![("Bannock".to_string(), 2)]);
    }
}
