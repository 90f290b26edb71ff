//! Console and JSON rendering of reports

use crate::catalog::audit::{CatalogAudit, DatasetAudit};
use crate::catalog::snapshot::SnapshotStats;
use crate::config::OutputFormat;
use crate::engine::{HybridRecommendations, ScoredResult};
use crate::error::{MatcherError, Result};
use crate::output::report::{display_name, RecommendationReport, Report};
use crate::processing::classifier::Category;
use crate::processing::skill_gap::SkillGapResult;
use crate::processing::text_processor::truncate_text;
use colored::{Color, Colorize};
use std::collections::BTreeMap;
use std::fmt::Write;

const DESCRIPTION_PREVIEW: usize = 120;
const COMPACT_LIST: usize = 10;

pub trait OutputFormatter {
    fn format_report(&self, report: &Report) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Human-readable output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_coverage_badge(&self, score: u32) -> String {
        let (badge, color) = match score {
            80..=100 => ("READY", Color::Green),
            60..=79 => ("CLOSE", Color::BrightGreen),
            40..=59 => ("PARTIAL", Color::Yellow),
            20..=39 => ("EARLY", Color::BrightYellow),
            _ => ("STARTING OUT", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn list_limit(&self, len: usize) -> usize {
        if self.detailed {
            len
        } else {
            len.min(COMPACT_LIST)
        }
    }

    fn format_scored_list(
        &self,
        out: &mut String,
        title: &str,
        rows: &[ScoredResult],
    ) -> std::fmt::Result {
        out.push_str(&self.format_header(title, 2));
        if rows.is_empty() {
            writeln!(out, "  No matches.")?;
            return Ok(());
        }

        for (i, result) in rows.iter().take(self.list_limit(rows.len())).enumerate() {
            let score = self.colorize(&format!("{:.1}", result.match_score), Color::Cyan);
            writeln!(out, "  {}. {} (score {})", i + 1, display_name(&result.fields), score)?;

            if let Some(description) = result.fields.get("description").filter(|d| !d.is_empty()) {
                writeln!(out, "     {}", truncate_text(description, DESCRIPTION_PREVIEW))?;
            }
            let link = ["official_link", "website", "url", "link"]
                .iter()
                .find_map(|c| result.fields.get(*c).filter(|v| !v.is_empty()));
            if let Some(link) = link {
                writeln!(out, "     {}", self.colorize(link, Color::Blue))?;
            }
        }

        if rows.len() > self.list_limit(rows.len()) {
            writeln!(out, "  ... and {} more (use --detailed)", rows.len() - COMPACT_LIST)?;
        }
        Ok(())
    }

    fn render_recommendations(&self, report: &RecommendationReport) -> Result<String> {
        let mut out = String::new();
        out.push_str(&self.format_header("Scheme & Job Recommendations", 1));
        writeln!(out, "Occupation: {}", report.occupation).map_err(format_error)?;
        if !report.location.is_empty() {
            writeln!(out, "Location:   {}", report.location).map_err(format_error)?;
        }

        let lists = |out: &mut String| -> std::fmt::Result {
            if let Some(preview) = &report.preview {
                self.format_scored_list(out, "Top Schemes", preview)?;
            }
            self.format_scored_list(out, "Matching Schemes", &report.recommendations.schemes)?;
            self.format_scored_list(out, "Job Portals", &report.recommendations.jobs)
        };
        lists(&mut out).map_err(format_error)?;
        Ok(out)
    }

    fn render_hybrid(&self, report: &HybridRecommendations) -> Result<String> {
        let mut out = String::new();
        out.push_str(&self.format_header(&format!("Recommendations for {}", report.user), 1));
        writeln!(out, "Occupation: {}", report.occupation).map_err(format_error)?;
        writeln!(out, "Model:      {}", self.colorize(&report.model, Color::Magenta))
            .map_err(format_error)?;

        if report.recommendations.is_empty() {
            writeln!(out, "\nNo schemes matched this profile.").map_err(format_error)?;
            return Ok(out);
        }

        for (i, rec) in report.recommendations.iter().enumerate() {
            let percent = format!("{:.0}%", rec.scores.final_score * 100.0);
            let percent = if self.use_colors {
                percent.green().bold().to_string()
            } else {
                percent
            };
            writeln!(out, "\n{}. {} {}", i + 1, rec.scheme_name, percent).map_err(format_error)?;
            if !rec.description.is_empty() {
                writeln!(out, "   {}", truncate_text(&rec.description, DESCRIPTION_PREVIEW))
                    .map_err(format_error)?;
            }
            if !rec.benefits.is_empty() {
                writeln!(out, "   Benefits: {}", rec.benefits).map_err(format_error)?;
            }
            if !rec.official_link.is_empty() {
                writeln!(out, "   {}", self.colorize(&rec.official_link, Color::Blue))
                    .map_err(format_error)?;
            }
            if self.detailed {
                writeln!(
                    out,
                    "   semantic {:.3} | demographic {:.3} | final {:.3}",
                    rec.scores.transformer_score, rec.scores.bp_score, rec.scores.final_score
                )
                .map_err(format_error)?;
            }
        }
        Ok(out)
    }

    fn render_skill_gap(&self, result: &SkillGapResult) -> Result<String> {
        let mut out = String::new();
        out.push_str(&self.format_header(&format!("Skill Gap: {}", result.role), 1));

        if let Some(note) = &result.note {
            writeln!(out, "{}", self.colorize(note, Color::Yellow)).map_err(format_error)?;
            return Ok(out);
        }

        writeln!(
            out,
            "Coverage: {}% {}  ({} of {} required skills, {} matching listings)",
            result.score,
            self.format_coverage_badge(result.score),
            result.matched_skills.len(),
            result.required_total,
            result.relevant_rows
        )
        .map_err(format_error)?;

        out.push_str(&self.format_header("Skills You Have", 2));
        if result.matched_skills.is_empty() {
            writeln!(out, "  None of the listed skills yet.").map_err(format_error)?;
        }
        for skill in &result.matched_skills {
            writeln!(out, "  {} {}", self.colorize("✓", Color::Green), skill)
                .map_err(format_error)?;
        }

        out.push_str(&self.format_header("Skills To Learn", 2));
        for skill in &result.missing_skills {
            writeln!(out, "  {} {}", self.colorize("•", Color::Red), skill.name)
                .map_err(format_error)?;
            if self.detailed {
                writeln!(out, "      video:  {}", skill.link).map_err(format_error)?;
                writeln!(out, "      course: {}", skill.course_link).map_err(format_error)?;
            }
        }
        if result.missing_total > result.missing_skills.len() {
            writeln!(
                out,
                "  ... and {} more",
                result.missing_total - result.missing_skills.len()
            )
            .map_err(format_error)?;
        }
        Ok(out)
    }

    fn format_histogram(&self, counts: &BTreeMap<Category, usize>) -> String {
        Category::ALL
            .iter()
            .map(|c| format!("{} {}", c, counts.get(c).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_stats(&self, stats: &SnapshotStats) -> Result<String> {
        let mut out = String::new();
        out.push_str(&self.format_header("Catalog", 1));
        let loaded = stats.loaded_at.format("%Y-%m-%d %H:%M:%S UTC");
        writeln!(out, "Snapshot:  v{} (loaded {})", stats.version, loaded).map_err(format_error)?;
        let schemes = self.format_histogram(&stats.scheme_categories);
        writeln!(out, "Schemes:   {} ({})", stats.schemes, schemes).map_err(format_error)?;
        let jobs = self.format_histogram(&stats.job_categories);
        writeln!(out, "Jobs:      {} ({})", stats.jobs, jobs).map_err(format_error)?;
        writeln!(out, "Embedder:  {} ({} dims)", stats.embedder, stats.embedding_dimension)
            .map_err(format_error)?;
        Ok(out)
    }

    fn format_dataset_audit(
        &self,
        out: &mut String,
        title: &str,
        audit: &DatasetAudit,
    ) -> std::fmt::Result {
        out.push_str(&self.format_header(title, 2));
        writeln!(out, "  Rows: {}  Columns: {}", audit.rows, audit.columns.join(", "))?;

        let flag = |label: &str, ids: &[String]| -> String {
            if ids.is_empty() {
                format!("  {} {}: none", self.colorize("✓", Color::Green), label)
            } else {
                format!(
                    "  {} {}: {} (ids {})",
                    self.colorize("!", Color::Red),
                    label,
                    ids.len(),
                    ids.join(", ")
                )
            }
        };
        writeln!(out, "{}", flag("Missing domains", &audit.missing_domains))?;
        writeln!(out, "{}", flag("Missing skills", &audit.missing_skills))?;
        writeln!(out, "{}", flag("Duplicate ids", &audit.duplicate_ids))?;
        let domains = audit.sample_domains.join(", ");
        writeln!(out, "  Unique domains: {}  e.g. {}", audit.unique_domains, domains)?;
        let skills = audit.sample_skills.join(", ");
        writeln!(out, "  Unique skills:  {}  e.g. {}", audit.unique_skills, skills)?;
        writeln!(out, "  Categories: {}", self.format_histogram(&audit.categories))
    }

    fn render_audit(&self, audit: &CatalogAudit) -> Result<String> {
        let mut out = String::new();
        out.push_str(&self.format_header("Catalog Audit", 1));
        self.format_dataset_audit(&mut out, "Schemes", &audit.schemes)
            .map_err(format_error)?;
        self.format_dataset_audit(&mut out, "Jobs", &audit.jobs)
            .map_err(format_error)?;

        let verdict = if audit.solid {
            self.colorize("Dataset looks solid.", Color::Green)
        } else {
            self.colorize("Dataset needs cleaning.", Color::Yellow)
        };
        writeln!(out, "\n{}", verdict).map_err(format_error)?;
        Ok(out)
    }
}

fn format_error(e: std::fmt::Error) -> MatcherError {
    MatcherError::OutputFormatting(e.to_string())
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        match report {
            Report::Recommendations(r) => self.render_recommendations(r),
            Report::Hybrid(r) => self.render_hybrid(r),
            Report::SkillGap(r) => self.render_skill_gap(r),
            Report::Stats(r) => self.render_stats(r),
            Report::Audit(r) => self.render_audit(r),
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Pick the formatter for a format and render
pub fn render(
    report: &Report,
    format: OutputFormat,
    use_colors: bool,
    detailed: bool,
) -> Result<String> {
    let formatter: Box<dyn OutputFormatter> = match format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(use_colors, detailed)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    };
    formatter.format_report(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::skill_gap::MissingSkill;

    fn gap(score: u32, note: Option<&str>) -> SkillGapResult {
        SkillGapResult {
            role: "software developer".to_string(),
            matched_skills: vec!["Python".to_string()],
            missing_skills: vec![MissingSkill {
                name: "Sql".to_string(),
                link: "https://www.youtube.com/results?search_query=learn+sql+course".to_string(),
                course_link: "https://www.classcentral.com/search?q=sql".to_string(),
            }],
            missing_total: 3,
            required_total: 4,
            relevant_rows: 2,
            score,
            note: note.map(str::to_string),
        }
    }

    #[test]
    fn test_console_skill_gap() {
        let formatter = ConsoleFormatter::new(false, true);
        let text = formatter.format_report(&Report::SkillGap(gap(25, None))).unwrap();

        assert!(text.contains("Skill Gap: software developer"));
        assert!(text.contains("Coverage: 25% [EARLY]"));
        assert!(text.contains("✓ Python"));
        assert!(text.contains("• Sql"));
        assert!(text.contains("classcentral.com/search?q=sql"));
        assert!(text.contains("... and 2 more"));
    }

    #[test]
    fn test_console_skill_gap_note() {
        let formatter = ConsoleFormatter::new(false, false);
        let text = formatter
            .format_report(&Report::SkillGap(gap(0, Some("No specific data found for this role."))))
            .unwrap();
        assert!(text.contains("No specific data found"));
        assert!(!text.contains("Coverage"));
    }

    #[test]
    fn test_json_is_untagged_payload() {
        let formatter = JsonFormatter::new(false);
        let json = formatter.format_report(&Report::SkillGap(gap(25, None))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["score"], 25);
        assert_eq!(value["missing_skills"][0]["name"], "Sql");
        assert!(value.get("note").is_none());
    }

    #[test]
    fn test_render_picks_formatter() {
        assert_eq!(JsonFormatter::new(true).supports_format(), OutputFormat::Json);
        assert_eq!(ConsoleFormatter::new(false, false).supports_format(), OutputFormat::Console);

        let report = Report::SkillGap(gap(90, None));
        assert!(render(&report, OutputFormat::Json, false, false).unwrap().starts_with('{'));
        assert!(render(&report, OutputFormat::Console, false, false).unwrap().contains("[READY]"));
    }
}
