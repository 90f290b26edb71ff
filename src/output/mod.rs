//! Report rendering

pub mod formatter;
pub mod report;

pub use formatter::{render, ConsoleFormatter, JsonFormatter, OutputFormatter};
pub use report::{RecommendationReport, Report};
