//! Scoring strategy seam, deterministic ranking, and top-pool diversification

use crate::catalog::row::CatalogRow;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

/// A prepared scorer: the query is baked in, rows are scored one at a time
pub trait RowScorer: Send + Sync {
    fn score(&self, row: &CatalogRow) -> f32;
}

/// A row paired with its score for one request
#[derive(Debug, Clone, Copy)]
pub struct ScoredRow<'a> {
    pub row: &'a CatalogRow,
    pub score: f32,
}

/// Score every row with the given strategy, preserving catalog order
pub fn score_rows<'a, I>(rows: I, scorer: &dyn RowScorer) -> Vec<ScoredRow<'a>>
where
    I: IntoIterator<Item = &'a CatalogRow>,
{
    rows.into_iter()
        .map(|row| ScoredRow {
            row,
            score: scorer.score(row),
        })
        .collect()
}

/// Score descending, then original catalog index ascending
fn ranking_order(a: &ScoredRow<'_>, b: &ScoredRow<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.row.index.cmp(&b.row.index))
}

/// Sort by `(score desc, index asc)`. The order is total, so stability of the
/// underlying sort never matters.
pub fn rank(mut scored: Vec<ScoredRow<'_>>) -> Vec<ScoredRow<'_>> {
    scored.sort_by(ranking_order);
    scored
}

/// Rank and keep the first `limit`
pub fn top_n(scored: Vec<ScoredRow<'_>>, limit: usize) -> Vec<ScoredRow<'_>> {
    let mut ranked = rank(scored);
    ranked.truncate(limit);
    ranked
}

/// Rank, keep the top `pool_size`, shuffle only that pool, return `final_size`.
///
/// The result is always a subset of the top pool.
pub fn diversify<'a, R: Rng + ?Sized>(
    scored: Vec<ScoredRow<'a>>,
    pool_size: usize,
    final_size: usize,
    rng: &mut R,
) -> Vec<ScoredRow<'a>> {
    let mut pool = top_n(scored, pool_size);
    pool.shuffle(rng);
    pool.truncate(final_size);
    pool
}

/// Uniform sample of `amount` distinct rows (or all rows if fewer)
pub fn random_sample<'a, R: Rng + ?Sized>(
    rows: &'a [CatalogRow],
    amount: usize,
    rng: &mut R,
) -> Vec<&'a CatalogRow> {
    let amount = amount.min(rows.len());
    rand::seq::index::sample(rng, rows.len(), amount)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}
