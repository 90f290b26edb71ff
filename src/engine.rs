//! Matching engine: one snapshot store, two recommendation strategies, skill gaps

use crate::catalog::audit::{audit_catalog, CatalogAudit};
use crate::catalog::row::CatalogRow;
use crate::catalog::snapshot::{CatalogSnapshot, CatalogSource, CatalogStore, SnapshotStats};
use crate::config::Config;
use crate::processing::classifier::passes_filter;
use crate::processing::embeddings::Embedder;
use crate::processing::lexical::{JobScorer, RecommendationQuery, SchemeScorer};
use crate::processing::ranking::{diversify, random_sample, score_rows, top_n, ScoredRow};
use crate::processing::semantic::{demographic_score, HybridComponents, HybridQuery, HybridScorer};
use crate::processing::skill_gap::{analyze_gap, SkillGapResult};
use log::{debug, info};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A catalog row's exported fields plus its lexical score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    pub match_score: f32,
}

impl ScoredResult {
    fn from_scored(scored: &ScoredRow<'_>) -> Self {
        Self::from_row(scored.row, scored.score)
    }

    fn from_row(row: &CatalogRow, match_score: f32) -> Self {
        let mut fields = row.fields.clone();
        // the computed score owns this key in the flattened output
        fields.remove("match_score");
        Self { fields, match_score }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    pub schemes: Vec<ScoredResult>,
    pub jobs: Vec<ScoredResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridRecommendation {
    pub scheme_name: String,
    pub description: String,
    pub benefits: String,
    pub official_link: String,
    #[serde(flatten)]
    pub scores: HybridComponents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridRecommendations {
    pub user: String,
    pub occupation: String,
    pub model: String,
    pub recommendations: Vec<HybridRecommendation>,
}

/// Stateless per call; the only shared state is the snapshot and the RNG
pub struct MatchingEngine {
    store: CatalogStore,
    config: Config,
    rng: Mutex<StdRng>,
}

impl MatchingEngine {
    /// Open the configured dataset files
    pub fn new(config: Config, embedder: Arc<dyn Embedder>) -> Self {
        let source = CatalogSource::Files {
            schemes: config.schemes_path(),
            jobs: config.jobs_path(),
        };
        Self::with_source(config, source, embedder)
    }

    pub fn with_source(config: Config, source: CatalogSource, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store: CatalogStore::open(source, embedder),
            config,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Make diversification and sampling reproducible
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.store.snapshot()
    }

    pub fn reload(&self) -> Arc<CatalogSnapshot> {
        info!("Reloading catalog");
        self.store.reload()
    }

    pub fn stats(&self) -> SnapshotStats {
        self.snapshot().stats()
    }

    pub fn audit(&self) -> CatalogAudit {
        audit_catalog(&self.snapshot())
    }

    /// Lexical path: positive-score schemes and all jobs, each capped to the result limit
    pub fn get_recommendations(&self, query: &RecommendationQuery) -> Recommendations {
        let snapshot = self.snapshot();
        let limits = &self.config.lexical;

        let scheme_scorer = SchemeScorer::new(query, limits);
        let schemes: Vec<ScoredResult> = top_n(
            score_rows(&snapshot.schemes.rows, &scheme_scorer)
                .into_iter()
                .filter(|s| s.score > 0.0)
                .collect(),
            limits.result_limit,
        )
        .iter()
        .map(ScoredResult::from_scored)
        .collect();

        let job_scorer = JobScorer::new(query, limits);
        let jobs: Vec<ScoredResult> = top_n(score_rows(&snapshot.jobs.rows, &job_scorer), limits.result_limit)
            .iter()
            .map(ScoredResult::from_scored)
            .collect();

        debug!(
            "Lexical recommendations for '{}': {} schemes, {} jobs",
            query.occupation,
            schemes.len(),
            jobs.len()
        );

        Recommendations { schemes, jobs }
    }

    /// Fixed-size scheme preview; an all-zero preview is replaced by a random sample
    pub fn preview_schemes(&self, query: &RecommendationQuery) -> Vec<ScoredResult> {
        let snapshot = self.snapshot();
        let size = self.config.lexical.preview_size;

        let scorer = SchemeScorer::new(query, &self.config.lexical);
        let preview = top_n(score_rows(&snapshot.schemes.rows, &scorer), size);

        if preview.iter().any(|s| s.score > 0.0) {
            return preview.iter().map(ScoredResult::from_scored).collect();
        }

        debug!("Scheme preview has no positive scores; sampling {} rows", size);
        let mut rng = self.rng.lock();
        random_sample(&snapshot.schemes.rows, size, &mut *rng)
            .into_iter()
            .map(|row| ScoredResult::from_row(row, 0.0))
            .collect()
    }

    /// Hybrid path: hard category filter, blended score, top-pool diversification
    pub fn recommend(&self, query: &HybridQuery) -> HybridRecommendations {
        let snapshot = self.snapshot();
        let config = &self.config.hybrid;
        let target = query.category();

        let candidates: Vec<&CatalogRow> = snapshot
            .schemes
            .rows
            .iter()
            .filter(|row| passes_filter(row.category, target))
            .collect();
        let candidate_count = candidates.len();

        let bp_score = demographic_score(query, config);
        let user_embedding = self.store.embedder().embed_one(&query.profile_sentence());
        let scorer = HybridScorer::new(&snapshot.scheme_embeddings, user_embedding, bp_score, config);

        let picked = {
            let mut rng = self.rng.lock();
            diversify(
                score_rows(candidates, &scorer),
                config.pool_size,
                config.final_size,
                &mut *rng,
            )
        };

        debug!(
            "Hybrid recommendations for '{}': {} candidates after filter, {} returned",
            query.occupation_normalized(),
            candidate_count,
            picked.len()
        );

        let recommendations = picked
            .iter()
            .map(|s| HybridRecommendation {
                scheme_name: s.row.name.clone(),
                description: s.row.description.clone(),
                benefits: s.row.benefits.clone(),
                official_link: s.row.link.clone(),
                scores: scorer.components(s.row),
            })
            .collect();

        HybridRecommendations {
            user: query.first_name.clone(),
            occupation: query.occupation_normalized(),
            model: format!("hybrid ({} embeddings + demographic score)", snapshot.embedder),
            recommendations,
        }
    }

    /// Skill gap against a freshly reloaded job catalog (configurable)
    pub fn analyze_skill_gap<S: AsRef<str>>(&self, user_skills: &[S], target_role: &str) -> SkillGapResult {
        let snapshot = if self.config.skill_gap.reload_before_analysis {
            self.reload()
        } else {
            self.snapshot()
        };
        analyze_gap(&snapshot.jobs.rows, user_skills, target_role, &self.config.skill_gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::loader::read_dataset;
    use crate::catalog::row::CatalogKind;
    use crate::processing::embeddings::HashingEmbedder;

    const SCHEMES: &str = "scheme_name,description,scheme_type,benefits,official_link\n\
        Kisan Credit Card,kisan credit loan,Agriculture,Low interest credit,https://kcc.example\n\
        Stand Up India,bank finance for women entrepreneurs,Business,Loans,https://sui.example\n\
        Post Matric Scholarship,education fees for students,Education,Fees,https://nsp.example\n\
        Atal Pension Yojana,old age pension,Pension,Monthly pension,https://apy.example\n\
        PM Awas Yojana,housing for all,Housing,Subsidy,https://pmay.example\n";

    const JOBS: &str = "id,name,description,type,job_domains,skill_requirements,website\n\
        1,Naukri,all jobs,Portal,Software Development,\"Python,SQL\",https://naukri.example\n\
        2,Internshala,internship and fresher jobs,Portal,Web Development,\"HTML,CSS\",https://internshala.example\n\
        3,AgriJobs,farm work,Niche,Agriculture,Tractor Driving,https://agri.example\n";

    fn engine() -> MatchingEngine {
        let source = CatalogSource::InMemory {
            schemes: read_dataset(SCHEMES.as_bytes(), CatalogKind::Scheme).unwrap(),
            jobs: read_dataset(JOBS.as_bytes(), CatalogKind::Job).unwrap(),
        };
        MatchingEngine::with_source(Config::default(), source, Arc::new(HashingEmbedder::new(128)))
            .with_seed(11)
    }

    fn lexical(occupation: &str, skills: &str, interest: &str) -> RecommendationQuery {
        RecommendationQuery {
            occupation: occupation.to_string(),
            skills: skills.to_string(),
            interest: interest.to_string(),
            location: "Pune".to_string(),
        }
    }

    fn hybrid(occupation: &str) -> HybridQuery {
        HybridQuery {
            first_name: "Ravi".to_string(),
            age: 40,
            occupation: occupation.to_string(),
            income: 90_000,
            health: "no".to_string(),
            need: "loan for crops".to_string(),
        }
    }

    #[test]
    fn test_farmer_row_ranks_first() {
        let result = engine().get_recommendations(&lexical("farmer", "", "loan"));

        let top = &result.schemes[0];
        assert_eq!(top.fields["scheme_name"], "Kisan Credit Card");
        assert!(top.match_score >= 4.0);
        assert!(result.schemes.iter().all(|s| s.match_score > 0.0));
        assert!(!top.fields.contains_key("combined_text"));
    }

    #[test]
    fn test_catalog_match_score_column_is_not_exported() {
        let jobs = "name,type,match_score\nNaukri,Portal,99\n";
        let source = CatalogSource::InMemory {
            schemes: read_dataset(SCHEMES.as_bytes(), CatalogKind::Scheme).unwrap(),
            jobs: read_dataset(jobs.as_bytes(), CatalogKind::Job).unwrap(),
        };
        let engine = MatchingEngine::with_source(Config::default(), source, Arc::new(HashingEmbedder::new(32)));

        let result = engine.get_recommendations(&lexical("employed", "", ""));
        let job = &result.jobs[0];
        assert!(!job.fields.contains_key("match_score"));

        let json = serde_json::to_string(job).unwrap();
        assert_eq!(json.matches("\"match_score\"").count(), 1);
        assert!(!json.contains("99"));
    }

    #[test]
    fn test_jobs_keep_zero_scores() {
        let result = engine().get_recommendations(&lexical("employed", "rust", ""));
        assert_eq!(result.jobs.len(), 3);
        // Naukri gets the portal boost, the others stay at zero in catalog order
        assert_eq!(result.jobs[0].fields["name"], "Naukri");
        assert_eq!(result.jobs[1].fields["name"], "Internshala");
        assert_eq!(result.jobs[2].match_score, 0.0);
    }

    #[test]
    fn test_preview_falls_back_to_random_sample() {
        let engine = engine();
        // the generic keyword set matches none of the scheme rows
        let preview = engine.preview_schemes(&lexical("astronaut", "", ""));
        assert_eq!(preview.len(), 5);
        assert!(preview.iter().all(|s| s.match_score == 0.0));

        let scored = engine.preview_schemes(&lexical("farmer", "", ""));
        assert_eq!(scored[0].fields["scheme_name"], "Kisan Credit Card");
    }

    #[test]
    fn test_hybrid_respects_category_filter() {
        let result = engine().recommend(&hybrid("Farmer"));

        assert_eq!(result.occupation, "farmer");
        let mut names: Vec<&str> = result.recommendations.iter().map(|r| r.scheme_name.as_str()).collect();
        names.sort_unstable();
        // scholarship (student) and pension (senior) rows are filtered out
        assert_eq!(names, vec!["Kisan Credit Card", "PM Awas Yojana", "Stand Up India"]);
        assert!(result
            .recommendations
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.scores.final_score)));
    }

    #[test]
    fn test_hybrid_unknown_occupation_keeps_all_rows() {
        let result = engine().recommend(&hybrid("weaver"));
        assert_eq!(result.recommendations.len(), 5);
    }

    #[test]
    fn test_hybrid_is_reproducible_with_seed() {
        let names = |r: HybridRecommendations| -> Vec<String> {
            r.recommendations.into_iter().map(|x| x.scheme_name).collect()
        };
        assert_eq!(names(engine().recommend(&hybrid("x"))), names(engine().recommend(&hybrid("x"))));
    }

    #[test]
    fn test_skill_gap_through_engine() {
        let result = engine().analyze_skill_gap(&["python"], "Software Developer");
        // Naukri (software) and Internshala (development) are relevant
        assert_eq!(result.relevant_rows, 2);
        assert_eq!(result.matched_skills, vec!["Python"]);
        assert_eq!(result.score, 25);
    }
}
