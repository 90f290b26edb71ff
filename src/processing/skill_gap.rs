//! Skill gap between a user's skills and the skills demanded for a target role

use crate::catalog::row::CatalogRow;
use crate::config::SkillGapConfig;
use crate::processing::text_processor::{normalize_items, role_keywords, search_link, title_case};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Symmetric role synonyms; expansion only ever adds keywords
const SYNONYMS: &[(&str, &str)] = &[
    ("developer", "development"),
    ("engineer", "engineering"),
    ("admin", "administration"),
    ("manager", "management"),
    ("web", "website"),
];

pub const NO_DATA_NOTE: &str = "No specific data found for this role.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSkill {
    pub name: String,
    pub link: String,
    pub course_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapResult {
    pub role: String,
    pub matched_skills: Vec<String>,
    /// Alphabetical, capped to the display limit
    pub missing_skills: Vec<MissingSkill>,
    /// Size of the full missing set before the display cap
    pub missing_total: usize,
    pub required_total: usize,
    pub relevant_rows: usize,
    /// Coverage in [0, 100]
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Role keywords plus their synonyms, in first-seen order
pub fn expand_keywords(keywords: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = keywords.to_vec();
    for keyword in keywords {
        for (a, b) in SYNONYMS {
            let other = if keyword == a {
                Some(b)
            } else if keyword == b {
                Some(a)
            } else {
                None
            };
            if let Some(other) = other {
                if !expanded.iter().any(|k| k == other) {
                    expanded.push(other.to_string());
                }
            }
        }
    }
    expanded
}

/// A row is relevant when its domain, skills, or name contains any keyword
pub fn is_relevant(row: &CatalogRow, keywords: &[String]) -> bool {
    let domains = row.domains.to_lowercase();
    let skills = row.skill_requirements.to_lowercase();
    let name = row.name.to_lowercase();

    keywords.iter().any(|kw| {
        domains.contains(kw.as_str()) || skills.contains(kw.as_str()) || name.contains(kw.as_str())
    })
}

/// Coverage percentage, rounded. Zero only when nothing is required or matched.
pub fn coverage_score(matched: usize, required: usize) -> u32 {
    if required == 0 || matched == 0 {
        return 0;
    }
    let score = (100.0 * matched as f64 / required as f64).round() as u32;
    score.max(1)
}

/// Compute the gap against the given job rows
pub fn analyze_gap<S: AsRef<str>>(
    jobs: &[CatalogRow],
    user_skills: &[S],
    target_role: &str,
    config: &SkillGapConfig,
) -> SkillGapResult {
    let role = target_role.trim().to_lowercase();
    let user_skills: BTreeSet<String> = normalize_items(user_skills).into_iter().collect();
    let keywords = expand_keywords(&role_keywords(&role));

    debug!("Target role: '{}'", role);
    debug!("Search keywords: {:?}", keywords);

    let relevant: Vec<&CatalogRow> = if keywords.is_empty() {
        Vec::new()
    } else {
        jobs.iter().filter(|row| is_relevant(row, &keywords)).collect()
    };
    debug!("Rows matched: {}", relevant.len());

    if relevant.is_empty() {
        return SkillGapResult {
            role,
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            missing_total: 0,
            required_total: 0,
            relevant_rows: 0,
            score: 0,
            note: Some(NO_DATA_NOTE.to_string()),
        };
    }

    let required: BTreeSet<String> = relevant.iter().flat_map(|row| row.required_skills()).collect();
    debug!("Required skills: {:?}", required);

    // BTreeSet iteration gives alphabetical order for free
    let matched: Vec<&String> = required.intersection(&user_skills).collect();
    let missing: Vec<&String> = required.difference(&user_skills).collect();

    let missing_skills = missing
        .iter()
        .take(config.display_limit)
        .map(|skill| MissingSkill {
            name: title_case(skill),
            link: search_link(&config.video_search_url, skill),
            course_link: search_link(&config.course_search_url, skill),
        })
        .collect();

    SkillGapResult {
        role,
        matched_skills: matched.iter().map(|s| title_case(s)).collect(),
        missing_skills,
        missing_total: missing.len(),
        required_total: required.len(),
        relevant_rows: relevant.len(),
        score: coverage_score(matched.len(), required.len()),
        note: None,
    }
}
