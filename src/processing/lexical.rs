//! Keyword-overlap scoring for schemes and job portals

use crate::catalog::row::CatalogRow;
use crate::config::LexicalConfig;
use crate::processing::keywords::{
    is_student, occupation_keywords, KeywordSet, FRESHER_MARKERS, MAJOR_PORTALS,
    STUDENT_JOB_KEYWORDS,
};
use crate::processing::ranking::RowScorer;
use crate::processing::text_processor::split_list;
use serde::{Deserialize, Serialize};

/// Caller-supplied profile for the lexical path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationQuery {
    pub occupation: String,
    /// Comma separated
    pub skills: String,
    /// Comma separated
    pub interest: String,
    /// Passed through, not scored
    pub location: String,
}

/// `occupation_weight × occupation hits + interest_weight × interest hits`
pub struct SchemeScorer {
    occupation: KeywordSet,
    interests: KeywordSet,
    occupation_weight: f32,
    interest_weight: f32,
}

impl SchemeScorer {
    pub fn new(query: &RecommendationQuery, config: &LexicalConfig) -> Self {
        Self {
            occupation: KeywordSet::new(occupation_keywords(&query.occupation)),
            interests: KeywordSet::new(split_list(&query.interest)),
            occupation_weight: config.occupation_weight,
            interest_weight: config.interest_weight,
        }
    }
}

impl RowScorer for SchemeScorer {
    fn score(&self, row: &CatalogRow) -> f32 {
        let text = &row.combined_text;
        self.occupation.count_present(text) as f32 * self.occupation_weight
            + self.interests.count_present(text) as f32 * self.interest_weight
    }
}

/// Skill/interest hits plus the fresher and portal boosts
pub struct JobScorer {
    keywords: KeywordSet,
    student: bool,
    fresher_markers: KeywordSet,
    portals: KeywordSet,
    interest_weight: f32,
    fresher_boost: f32,
    portal_boost: f32,
}

impl JobScorer {
    pub fn new(query: &RecommendationQuery, config: &LexicalConfig) -> Self {
        let student = is_student(&query.occupation);

        let mut keywords = split_list(&query.skills);
        keywords.extend(split_list(&query.interest));
        if student {
            keywords.extend(STUDENT_JOB_KEYWORDS.iter().map(|s| s.to_string()));
        }

        Self {
            keywords: KeywordSet::new(keywords),
            student,
            fresher_markers: KeywordSet::new(FRESHER_MARKERS),
            portals: KeywordSet::new(MAJOR_PORTALS),
            interest_weight: config.interest_weight,
            fresher_boost: config.fresher_boost,
            portal_boost: config.portal_boost,
        }
    }

    pub fn is_student(&self) -> bool {
        self.student
    }
}

impl RowScorer for JobScorer {
    fn score(&self, row: &CatalogRow) -> f32 {
        let text = &row.combined_text;
        let mut score = self.keywords.count_present(text) as f32 * self.interest_weight;

        if self.student && self.fresher_markers.any_present(text) {
            score += self.fresher_boost;
        }
        if self.portals.any_present(text) {
            score += self.portal_boost;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::row::CatalogKind;
    use crate::config::Config;
    use std::collections::BTreeMap;

    fn row(kind: CatalogKind, name: &str, description: &str) -> CatalogRow {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), name.to_string());
        fields.insert("scheme_name".to_string(), name.to_string());
        fields.insert("description".to_string(), description.to_string());
        CatalogRow::from_fields(kind, 0, fields)
    }

    fn query(occupation: &str, skills: &str, interest: &str) -> RecommendationQuery {
        RecommendationQuery {
            occupation: occupation.to_string(),
            skills: skills.to_string(),
            interest: interest.to_string(),
            location: String::new(),
        }
    }

    #[test]
    fn test_farmer_scheme_scoring() {
        let config = Config::default();
        let scorer = SchemeScorer::new(&query("farmer", "", "loan"), &config.lexical);

        let kcc = row(CatalogKind::Scheme, "Kisan Credit Card", "kisan credit loan");
        let other = row(CatalogKind::Scheme, "Stand Up India", "bank finance for women");

        // kisan + loan occupation keywords (2 × 2) + loan interest (1)
        assert_eq!(scorer.score(&kcc), 5.0);
        assert_eq!(scorer.score(&other), 0.0);
    }

    #[test]
    fn test_unknown_occupation_uses_generic_keywords() {
        let config = Config::default();
        let scorer = SchemeScorer::new(&query("astronaut", "", ""), &config.lexical);
        let row = row(CatalogKind::Scheme, "Citizen Welfare Fund", "financial support");
        assert_eq!(scorer.score(&row), 8.0);
    }

    #[test]
    fn test_student_job_boosts() {
        let config = Config::default();
        let scorer = JobScorer::new(&query("student", "python", ""), &config.lexical);
        assert!(scorer.is_student());

        let internshala = row(CatalogKind::Job, "Internshala", "internship and fresher jobs");
        // internship + fresher keywords (2) + fresher boost (2)
        assert_eq!(scorer.score(&internshala), 4.0);

        let naukri = row(CatalogKind::Job, "Naukri", "python jobs");
        // python (1) + portal boost (0.5)
        assert_eq!(scorer.score(&naukri), 1.5);
    }

    #[test]
    fn test_non_student_gets_no_fresher_boost() {
        let config = Config::default();
        let scorer = JobScorer::new(&query("employed", "", ""), &config.lexical);
        let row = row(CatalogKind::Job, "Apna", "entry level training");
        assert_eq!(scorer.score(&row), 0.0);
    }

    #[test]
    fn test_scores_are_never_negative() {
        let config = Config::default();
        let scheme = SchemeScorer::new(&query("", ",,", ""), &config.lexical);
        let job = JobScorer::new(&query("", "", ""), &config.lexical);
        let empty = row(CatalogKind::Job, "", "");
        assert!(scheme.score(&empty) >= 0.0);
        assert!(job.score(&empty) >= 0.0);
    }
}
