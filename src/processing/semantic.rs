//! Hybrid scoring: embedding similarity blended with a demographic score

use crate::catalog::row::CatalogRow;
use crate::config::HybridConfig;
use crate::processing::classifier::Category;
use crate::processing::embeddings::cosine_similarity;
use crate::processing::ranking::RowScorer;
use serde::{Deserialize, Serialize};

/// Caller-supplied profile for the hybrid path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridQuery {
    pub first_name: String,
    pub age: i64,
    pub occupation: String,
    pub income: i64,
    pub health: String,
    pub need: String,
}

impl HybridQuery {
    pub fn occupation_normalized(&self) -> String {
        self.occupation.trim().to_lowercase()
    }

    /// Category used for the hard filter; `None` means keep every row
    pub fn category(&self) -> Option<Category> {
        Category::from_occupation(&self.occupation)
    }

    /// Sentence embedded against the catalog
    pub fn profile_sentence(&self) -> String {
        format!(
            "{} years old {} with income {}. Need: {}",
            self.age,
            self.occupation_normalized(),
            self.income,
            self.need
        )
    }
}

fn logistic(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Weighted demographic features squashed into (0, 1).
///
/// Features are normalized into [0, 1]: age / age_cap, income / income_cap,
/// known-occupation flag, `health == "yes"` flag.
pub fn demographic_score(query: &HybridQuery, config: &HybridConfig) -> f32 {
    let weights = &config.demographic_weights;

    let normalize = |value: i64, cap: f32| -> f32 {
        if cap <= 0.0 {
            0.0
        } else {
            (value as f32 / cap).clamp(0.0, 1.0)
        }
    };

    let age = normalize(query.age, config.age_cap);
    let income = normalize(query.income, config.income_cap);
    let occupation = if query.category().is_some() { 1.0 } else { 0.0 };
    let health = if query.health.trim().eq_ignore_ascii_case("yes") { 1.0 } else { 0.0 };

    logistic(
        age * weights.age
            + income * weights.income
            + occupation * weights.occupation
            + health * weights.health,
    )
}

/// Per-row component scores of the hybrid path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridComponents {
    pub transformer_score: f32,
    pub bp_score: f32,
    pub final_score: f32,
}

/// Scores rows against one embedded profile sentence.
///
/// Row vectors come from the snapshot, indexed by `CatalogRow::index`.
pub struct HybridScorer<'a> {
    row_embeddings: &'a [Vec<f32>],
    user_embedding: Vec<f32>,
    bp_score: f32,
    semantic_weight: f32,
    demographic_weight: f32,
}

impl<'a> HybridScorer<'a> {
    pub fn new(
        row_embeddings: &'a [Vec<f32>],
        user_embedding: Vec<f32>,
        bp_score: f32,
        config: &HybridConfig,
    ) -> Self {
        Self {
            row_embeddings,
            user_embedding,
            bp_score,
            semantic_weight: config.semantic_weight,
            demographic_weight: config.demographic_weight,
        }
    }

    /// Raw cosine blended with the demographic score; only the blend is clamped to [0, 1]
    pub fn components(&self, row: &CatalogRow) -> HybridComponents {
        let transformer_score = self
            .row_embeddings
            .get(row.index)
            .map(|v| cosine_similarity(&self.user_embedding, v))
            .unwrap_or(0.0);

        let final_score = (self.semantic_weight * transformer_score
            + self.demographic_weight * self.bp_score)
            .clamp(0.0, 1.0);

        HybridComponents {
            transformer_score,
            bp_score: self.bp_score,
            final_score,
        }
    }
}

impl RowScorer for HybridScorer<'_> {
    fn score(&self, row: &CatalogRow) -> f32 {
        self.components(row).final_score
    }
}
