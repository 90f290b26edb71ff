//! Data-quality audit of a loaded catalog snapshot

use crate::catalog::loader::Dataset;
use crate::catalog::snapshot::CatalogSnapshot;
use crate::processing::classifier::Category;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetAudit {
    pub rows: usize,
    pub columns: Vec<String>,
    pub missing_domains: Vec<String>,
    pub missing_skills: Vec<String>,
    pub duplicate_ids: Vec<String>,
    pub unique_domains: usize,
    pub sample_domains: Vec<String>,
    pub unique_skills: usize,
    pub sample_skills: Vec<String>,
    pub categories: BTreeMap<Category, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogAudit {
    pub schemes: DatasetAudit,
    pub jobs: DatasetAudit,
    /// True when job rows are complete and ids unique in both datasets
    pub solid: bool,
}

fn split_values(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn audit_dataset(dataset: &Dataset) -> DatasetAudit {
    let mut missing_domains = Vec::new();
    let mut missing_skills = Vec::new();
    let mut domains = BTreeSet::new();
    let mut skills = BTreeSet::new();
    let mut seen_ids = BTreeSet::new();
    let mut duplicate_ids = BTreeSet::new();
    let mut categories: BTreeMap<Category, usize> = BTreeMap::new();

    for row in &dataset.rows {
        if row.domains.is_empty() {
            missing_domains.push(row.id.clone());
        }
        if row.skill_requirements.is_empty() {
            missing_skills.push(row.id.clone());
        }
        domains.extend(split_values(&row.domains));
        skills.extend(split_values(&row.skill_requirements));
        if !seen_ids.insert(row.id.clone()) {
            duplicate_ids.insert(row.id.clone());
        }
        *categories.entry(row.category).or_insert(0) += 1;
    }

    DatasetAudit {
        rows: dataset.len(),
        columns: dataset.columns.clone(),
        missing_domains,
        missing_skills,
        duplicate_ids: duplicate_ids.into_iter().collect(),
        unique_domains: domains.len(),
        sample_domains: domains.into_iter().take(SAMPLE_SIZE).collect(),
        unique_skills: skills.len(),
        sample_skills: skills.into_iter().take(SAMPLE_SIZE).collect(),
        categories,
    }
}

/// Scheme rows carry no domains or skills, so only their ids count toward the verdict
pub fn audit_catalog(snapshot: &CatalogSnapshot) -> CatalogAudit {
    let schemes = audit_dataset(&snapshot.schemes);
    let jobs = audit_dataset(&snapshot.jobs);

    let solid = jobs.missing_domains.is_empty()
        && jobs.missing_skills.is_empty()
        && jobs.duplicate_ids.is_empty()
        && schemes.duplicate_ids.is_empty();

    CatalogAudit { schemes, jobs, solid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::loader::read_dataset;
    use crate::catalog::row::CatalogKind;

    #[test]
    fn test_audit_flags_gaps_and_duplicates() {
        let csv = "id,name,job_domains,skill_requirements\n\
                   1,Naukri,\"Web Development, Data Science\",\"Python,SQL\"\n\
                   2,Indeed,,Java\n\
                   2,Shine,Sales,\n";
        let dataset = read_dataset(csv.as_bytes(), CatalogKind::Job).unwrap();
        let audit = audit_dataset(&dataset);

        assert_eq!(audit.rows, 3);
        assert_eq!(audit.missing_domains, vec!["2"]);
        assert_eq!(audit.missing_skills, vec!["2"]);
        assert_eq!(audit.duplicate_ids, vec!["2"]);
        assert_eq!(audit.unique_domains, 3);
        assert_eq!(audit.unique_skills, 3);
        assert_eq!(audit.sample_skills, vec!["Java", "Python", "SQL"]);
    }

    #[test]
    fn test_empty_dataset_audit() {
        let audit = audit_dataset(&Dataset::default());
        assert_eq!(audit.rows, 0);
        assert!(audit.categories.is_empty());
    }
}
