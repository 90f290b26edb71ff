//! Catalog row structures

use crate::processing::classifier::{classify, Category};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Scheme,
    Job,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Scheme => write!(f, "schemes"),
            CatalogKind::Job => write!(f, "jobs"),
        }
    }
}

impl CatalogKind {
    fn name_columns(&self) -> &'static [&'static str] {
        match self {
            CatalogKind::Scheme => &["scheme_name", "name"],
            CatalogKind::Job => &["name", "scheme_name"],
        }
    }

    fn type_columns(&self) -> &'static [&'static str] {
        match self {
            CatalogKind::Scheme => &["scheme_type", "type"],
            CatalogKind::Job => &["type", "job_type"],
        }
    }
}

const LINK_COLUMNS: &[&str] = &["official_link", "website", "url", "link"];
const DOMAIN_COLUMNS: &[&str] = &["job_domains", "domains", "domain"];

/// One scheme or job entry, with the derived fields used by every scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    /// Position in the source dataset; the final tie-breaker when ranking
    pub index: usize,
    pub kind: CatalogKind,
    pub id: String,
    pub name: String,
    pub description: String,
    pub type_tag: String,
    pub domains: String,
    pub skill_requirements: String,
    pub benefits: String,
    pub link: String,
    /// Every normalized column of the source row, passed through to results
    pub fields: BTreeMap<String, String>,
    /// Lower-cased `name description type`
    pub combined_text: String,
    pub category: Category,
}

impl CatalogRow {
    /// Build a row from normalized column values. Absent columns read as "".
    pub fn from_fields(kind: CatalogKind, index: usize, fields: BTreeMap<String, String>) -> Self {
        let pick = |columns: &[&str]| -> String {
            columns
                .iter()
                .filter_map(|c| fields.get(*c))
                .find(|v| !v.trim().is_empty())
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let name = pick(kind.name_columns());
        let description = pick(&["description"]);
        let type_tag = pick(kind.type_columns());
        let id = match pick(&["id"]) {
            id if id.is_empty() => (index + 1).to_string(),
            id => id,
        };

        let domains = pick(DOMAIN_COLUMNS);
        let skill_requirements = pick(&["skill_requirements", "skills"]);
        let benefits = pick(&["benefits"]);
        let link = pick(LINK_COLUMNS);

        let combined_text = format!("{} {} {}", name, description, type_tag).to_lowercase();
        let category = classify(&combined_text);

        Self {
            index,
            kind,
            id,
            domains,
            skill_requirements,
            benefits,
            link,
            name,
            description,
            type_tag,
            fields,
            combined_text,
            category,
        }
    }

    /// Text embedded for the semantic scorer
    pub fn semantic_text(&self) -> String {
        format!("{}. {}. {}", self.name, self.description, self.benefits)
    }

    /// Declared skill requirements, trimmed and case-folded
    pub fn required_skills(&self) -> impl Iterator<Item = String> + '_ {
        self.skill_requirements
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_scheme_row_derivation() {
        let row = CatalogRow::from_fields(
            CatalogKind::Scheme,
            0,
            fields(&[
                ("scheme_name", "PM Kisan"),
                ("description", "Income Support"),
                ("scheme_type", "Agriculture"),
                ("official_link", "https://pmkisan.gov.in"),
            ]),
        );

        assert_eq!(row.combined_text, "pm kisan income support agriculture");
        assert_eq!(row.category, Category::Farmer);
        assert_eq!(row.id, "1");
        assert_eq!(row.link, "https://pmkisan.gov.in");
        assert_eq!(row.benefits, "");
    }

    #[test]
    fn test_job_row_skills() {
        let row = CatalogRow::from_fields(
            CatalogKind::Job,
            3,
            fields(&[
                ("id", "J-9"),
                ("name", "Naukri"),
                ("job_domains", "Web Development"),
                ("skill_requirements", " Python, SQL ,,Java "),
            ]),
        );

        assert_eq!(row.id, "J-9");
        assert_eq!(row.domains, "Web Development");
        let skills: Vec<String> = row.required_skills().collect();
        assert_eq!(skills, vec!["python", "sql", "java"]);
        // missing description never becomes "null"
        assert_eq!(row.combined_text, "naukri  ");
    }
}
