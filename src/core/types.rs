// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Lowest accepted review rating.
pub const MIN_RATING: f64 = 1.0;
/// Highest accepted review rating.
pub const MAX_RATING: f64 = 5.0;

/// One user review of a recipe.
/// `timestamp` is Unix seconds with a fractional part, the layout used by the
/// reviews file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub username: String,
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    pub timestamp: f64,
}

/// A recipe row as handed over by the recipe source.
/// `ingredients` and `instructions` are newline separated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRow {
    pub name: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub instructions: String,
}

impl RecipeRow {
    pub fn new(name: &str, ingredients: &str) -> Self {
        Self {
            name: name.to_string(),
            ingredients: ingredients.to_string(),
            instructions: String::new(),
        }
    }
}

/// A recipe paired with the number it was ranked by (average rating or views).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecipe {
    pub name: String,
    pub metric: f64,
}

/// Which aggregate a trending query ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendingMetric {
    #[default]
    Views,
    AverageRating,
}

impl std::str::FromStr for TrendingMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "views" | "view" => Ok(Self::Views),
            "rating" | "average_rating" => Ok(Self::AverageRating),
            other => Err(format!("unknown trending metric '{}'", other)),
        }
    }
}

/// Listing view of a recipe with its current average rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub average_rating: f64,
}

impl RecipeSummary {
    pub fn from_row(row: &RecipeRow, average_rating: f64) -> Self {
        Self {
            name: row.name.clone(),
            ingredients: row.ingredients.split('\n').map(str::to_string).collect(),
            instructions: row.instructions.split('\n').map(str::to_string).collect(),
            average_rating,
        }
    }
}
