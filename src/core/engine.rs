use crate::catalogue::{RecipeSource, ReviewStore, ViewCounter};
use crate::config::EngineConfig;
use crate::core::heap::PrioritySelector;
use crate::core::tokenizer::ingredient_tokens;
use crate::core::trie::PrefixTrie;
use crate::core::types::{
    RankedRecipe, RecipeRow, RecipeSummary, Review, TrendingMetric, MAX_RATING, MIN_RATING,
};
use crate::error::{EngineError, Result};
use crate::persistence::{FileViewCounter, JsonRecipeFile, JsonReviewStore};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

/// Recipe names keyed by their lowercase form, remembering how each was
/// first spelled so suggestions come back in display casing.
#[derive(Default)]
struct NameIndex {
    trie: PrefixTrie,
    display: HashMap<String, String>,
}

impl NameIndex {
    fn insert(&mut self, name: &str) {
        self.trie.insert(name);
        self.display
            .entry(name.to_lowercase())
            .or_insert_with(|| name.to_string());
    }
}

/// Owns the autocomplete tries and the per-recipe review selectors, and runs
/// ranking queries against the external stores.
///
/// Each structure sits behind its own `RwLock`: lookups share a read lock,
/// indexing and review insertion take the write lock. The coordinator is
/// `Send + Sync`; wrap it in an `Arc` to share it between request handlers.
pub struct RankingCoordinator {
    config: EngineConfig,
    names: RwLock<NameIndex>,
    ingredients: RwLock<PrefixTrie>,
    review_queues: RwLock<HashMap<String, PrioritySelector<Review>>>,
    recipes: Box<dyn RecipeSource>,
    reviews: Box<dyn ReviewStore>,
    views: Box<dyn ViewCounter>,
}

impl RankingCoordinator {
    /// A coordinator with empty indexes. Call [`Self::start`] instead to
    /// build them from the stores.
    pub fn new(
        config: EngineConfig,
        recipes: Box<dyn RecipeSource>,
        reviews: Box<dyn ReviewStore>,
        views: Box<dyn ViewCounter>,
    ) -> Self {
        Self {
            config,
            names: RwLock::new(NameIndex::default()),
            ingredients: RwLock::new(PrefixTrie::new()),
            review_queues: RwLock::new(HashMap::new()),
            recipes,
            reviews,
            views,
        }
    }

    /// Builds both tries and every review selector from the stores.
    pub fn start(
        config: EngineConfig,
        recipes: Box<dyn RecipeSource>,
        reviews: Box<dyn ReviewStore>,
        views: Box<dyn ViewCounter>,
    ) -> Result<Self> {
        let coordinator = Self::new(config, recipes, reviews, views);
        let rows = coordinator.recipes.recipes()?;
        coordinator.index_rows(&rows);
        coordinator.load_review_queues()?;
        Ok(coordinator)
    }

    /// Starts a coordinator over the JSON/bincode files named in `config`.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let recipes = JsonRecipeFile::new(&config.recipes_path);
        let reviews = JsonReviewStore::open(&config.reviews_path)?;
        let views = FileViewCounter::open(&config.views_path)?;
        Self::start(config, Box::new(recipes), Box::new(reviews), Box::new(views))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rebuilds the name trie from every recipe row. Returns the number of
    /// distinct names indexed.
    pub fn build_name_index(&self) -> Result<usize> {
        let rows = self.recipes.recipes()?;
        let mut index = NameIndex::default();
        for row in &rows {
            index.insert(&row.name);
        }
        let count = index.trie.len();
        *self.names.write() = index;
        info!(names = count, "built recipe name index");
        Ok(count)
    }

    /// Rebuilds the ingredient trie from every recipe row. Returns the number
    /// of distinct tokens indexed.
    pub fn build_ingredient_index(&self) -> Result<usize> {
        let rows = self.recipes.recipes()?;
        let mut trie = PrefixTrie::new();
        for row in &rows {
            for token in ingredient_tokens(&row.ingredients) {
                trie.insert(&token);
            }
        }
        let count = trie.len();
        *self.ingredients.write() = trie;
        info!(tokens = count, "built ingredient index");
        Ok(count)
    }

    fn index_rows(&self, rows: &[RecipeRow]) {
        let mut names = self.names.write();
        let mut ingredients = self.ingredients.write();
        for row in rows {
            names.insert(&row.name);
            for token in ingredient_tokens(&row.ingredients) {
                ingredients.insert(&token);
            }
        }
        info!(
            recipes = rows.len(),
            names = names.trie.len(),
            tokens = ingredients.len(),
            "built autocomplete indexes"
        );
    }

    fn load_review_queues(&self) -> Result<()> {
        let mut queues = HashMap::new();
        let mut total = 0usize;
        for (recipe_name, reviews) in self.reviews.load_all()? {
            let selector = queues
                .entry(recipe_name)
                .or_insert_with(PrioritySelector::new);
            for review in reviews {
                selector.insert(review.rating, review);
                total += 1;
            }
        }
        info!(recipes = queues.len(), reviews = total, "loaded review queues");
        *self.review_queues.write() = queues;
        Ok(())
    }

    /// Stores a recipe imported at runtime, then adds it to both tries.
    ///
    /// The row is written to the recipe source first; a failed write leaves
    /// the tries untouched.
    pub fn index_recipe(&self, name: &str, ingredients: &str, instructions: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyRecipeName);
        }
        let row = RecipeRow {
            name: name.to_string(),
            ingredients: ingredients.to_string(),
            instructions: instructions.to_string(),
        };
        self.recipes.add_recipe(&row)?;

        self.names.write().insert(name);
        let mut trie = self.ingredients.write();
        for token in ingredient_tokens(ingredients) {
            trie.insert(&token);
        }
        debug!(recipe = name, "indexed recipe");
        Ok(())
    }

    /// Recipe names starting with `prefix`, alphabetical, at most `max_results`.
    /// A blank prefix suggests nothing.
    pub fn autocomplete_names(&self, prefix: &str, max_results: usize) -> Vec<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return vec![];
        }
        let names = self.names.read();
        let mut matches = names.trie.autocomplete(prefix);
        matches.sort_unstable();
        matches
            .into_iter()
            .take(max_results)
            .map(|key| names.display.get(&key).cloned().unwrap_or(key))
            .collect()
    }

    /// Ingredient tokens starting with `prefix`, alphabetical, at most
    /// `max_results`. A blank prefix suggests nothing.
    pub fn autocomplete_ingredients(&self, prefix: &str, max_results: usize) -> Vec<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return vec![];
        }
        let mut matches = self.ingredients.read().autocomplete(prefix);
        matches.sort_unstable();
        matches.truncate(max_results);
        matches
    }

    pub fn has_recipe(&self, name: &str) -> bool {
        self.names.read().trie.search(name.trim())
    }

    pub fn has_ingredient(&self, token: &str) -> bool {
        self.ingredients.read().search(token.trim())
    }

    /// Validates, persists and queues a new review.
    ///
    /// The review is written to the store before it enters the selector, so a
    /// failed write leaves the in-memory ranking untouched.
    pub fn record_review(
        &self,
        recipe_name: &str,
        username: &str,
        rating: f64,
        comment: &str,
    ) -> Result<Review> {
        let recipe_name = recipe_name.trim();
        if recipe_name.is_empty() {
            return Err(EngineError::EmptyRecipeName);
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::EmptyUsername);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(EngineError::InvalidRating { rating });
        }

        let review = Review {
            username: username.to_string(),
            rating,
            comment: comment.to_string(),
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
        };
        self.reviews.append(recipe_name, &review)?;
        self.review_queues
            .write()
            .entry(recipe_name.to_string())
            .or_insert_with(PrioritySelector::new)
            .insert(rating, review.clone());

        debug!(recipe = recipe_name, user = username, rating, "recorded review");
        Ok(review)
    }

    /// The `limit` highest-rated reviews of a recipe. Ties come back in no
    /// particular order.
    pub fn top_reviews(&self, recipe_name: &str, limit: usize) -> Vec<Review> {
        self.review_queues
            .read()
            .get(recipe_name.trim())
            .map(|selector| {
                selector
                    .top_k(limit)
                    .into_iter()
                    .map(|ranked| ranked.payload)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every stored review of a recipe, oldest first.
    pub fn all_reviews(&self, recipe_name: &str) -> Result<Vec<Review>> {
        self.reviews.reviews_for(recipe_name.trim())
    }

    /// Mean rating over the stored reviews, or 0 when there are none.
    pub fn average_rating(&self, recipe_name: &str) -> Result<f64> {
        let reviews = self.reviews.reviews_for(recipe_name.trim())?;
        Ok(mean_rating(&reviews))
    }

    /// Recipes with at least one review, best average first.
    pub fn top_rated(&self, limit: usize) -> Result<Vec<RankedRecipe>> {
        let mut selector = PrioritySelector::new();
        for name in self.reviews.reviewed_recipes()? {
            // Stored keys are used as-is, surrounding whitespace included.
            let average = mean_rating(&self.reviews.reviews_for(&name)?);
            selector.insert(average, name);
        }
        Ok(ranked(&selector, limit))
    }

    /// Top recipes by the configured trending metric.
    pub fn trending(&self, limit: usize) -> Result<Vec<RankedRecipe>> {
        self.trending_by(self.config.trending_metric, limit)
    }

    pub fn trending_by(&self, metric: TrendingMetric, limit: usize) -> Result<Vec<RankedRecipe>> {
        match metric {
            TrendingMetric::Views => {
                let selector: PrioritySelector<String> = self
                    .views
                    .counts()?
                    .into_iter()
                    .map(|(name, count)| (count as f64, name))
                    .collect();
                Ok(ranked(&selector, limit))
            }
            TrendingMetric::AverageRating => self.top_rated(limit),
        }
    }

    /// Bumps the view counter for a recipe and returns the new count.
    pub fn record_view(&self, recipe_name: &str) -> Result<u64> {
        let recipe_name = recipe_name.trim();
        if recipe_name.is_empty() {
            return Err(EngineError::EmptyRecipeName);
        }
        self.views.increment(recipe_name)
    }

    /// Recipes whose name and ingredients contain the given substrings,
    /// case-insensitively. Blank queries match everything.
    pub fn find_recipes(
        &self,
        name_query: &str,
        ingredient_query: &str,
    ) -> Result<Vec<RecipeSummary>> {
        let name_query = name_query.trim().to_lowercase();
        let ingredient_query = ingredient_query.trim().to_lowercase();

        let mut out = Vec::new();
        for row in self.recipes.recipes()? {
            if !row.name.to_lowercase().contains(&name_query)
                || !row.ingredients.to_lowercase().contains(&ingredient_query)
            {
                continue;
            }
            let average = mean_rating(&self.reviews.reviews_for(&row.name)?);
            out.push(RecipeSummary::from_row(&row, average));
        }
        Ok(out)
    }
}

fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64
}

fn ranked(selector: &PrioritySelector<String>, limit: usize) -> Vec<RankedRecipe> {
    selector
        .top_k(limit)
        .into_iter()
        .map(|entry| RankedRecipe { name: entry.payload, metric: entry.priority })
        .collect()
}
