//! Report payloads handed to the formatters

use crate::catalog::audit::CatalogAudit;
use crate::catalog::snapshot::SnapshotStats;
use crate::config::OutputFormat;
use crate::engine::{HybridRecommendations, Recommendations, ScoredResult};
use crate::error::Result;
use crate::processing::skill_gap::SkillGapResult;
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Lexical recommendations, optionally with the scheme preview
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub occupation: String,
    pub location: String,
    #[serde(flatten)]
    pub recommendations: Recommendations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<ScoredResult>>,
}

/// Everything the CLI can print
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Recommendations(RecommendationReport),
    Hybrid(HybridRecommendations),
    SkillGap(SkillGapResult),
    Stats(SnapshotStats),
    Audit(CatalogAudit),
}

impl Report {
    pub fn kind(&self) -> &'static str {
        match self {
            Report::Recommendations(_) => "recommendations",
            Report::Hybrid(_) => "hybrid",
            Report::SkillGap(_) => "skill-gap",
            Report::Stats(_) => "stats",
            Report::Audit(_) => "audit",
        }
    }
}

/// Display name of a result row: the scheme name, else the job name
pub fn display_name(fields: &BTreeMap<String, String>) -> &str {
    ["scheme_name", "name"]
        .iter()
        .filter_map(|c| fields.get(*c))
        .find(|v| !v.trim().is_empty())
        .map(|v| v.as_str())
        .unwrap_or("(unnamed)")
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, report: &Report) -> String {
    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
    };
    format!("{}_{}.{}", report.kind(), Local::now().format("%Y%m%d_%H%M%S"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_scheme_name() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), "Naukri".to_string());
        assert_eq!(display_name(&fields), "Naukri");

        fields.insert("scheme_name".to_string(), "PM Kisan".to_string());
        assert_eq!(display_name(&fields), "PM Kisan");

        assert_eq!(display_name(&BTreeMap::new()), "(unnamed)");
    }

    #[test]
    fn test_save_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("gap.json");
        save_report_to_file("{}", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_suggest_filename_extension() {
        let report = Report::SkillGap(SkillGapResult {
            role: "qa".to_string(),
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            missing_total: 0,
            required_total: 0,
            relevant_rows: 0,
            score: 0,
            note: None,
        });
        let name = suggest_filename(OutputFormat::Json, &report);
        assert!(name.starts_with("skill-gap_"));
        assert!(name.ends_with(".json"));
    }
}
