//! CLI interface for the scheme matcher

use crate::config::{EmbeddingBackend, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scheme-matcher")]
#[command(about = "Match citizens to welfare schemes and job portals")]
#[command(long_about = "Recommend government welfare schemes and job portals from CSV catalogs using keyword overlap or a hybrid embedding + demographic score, and analyze the skill gap for a target role")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for diversification and sampling (reproducible output)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Directory holding schemes.csv and job.csv (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Embedding backend: model2vec or hashing (overrides config)
    #[arg(long, global = true)]
    pub embedder: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Keyword-based scheme and job recommendations
    Recommend {
        /// Occupation, e.g. farmer, student, retired
        #[arg(long)]
        occupation: String,

        /// Comma-separated skills
        #[arg(long, default_value = "")]
        skills: String,

        /// Comma-separated interests
        #[arg(long, default_value = "")]
        interest: String,

        #[arg(long, default_value = "")]
        location: String,

        /// Include the top scheme preview
        #[arg(long)]
        preview: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Semantic + demographic scheme recommendations
    Hybrid {
        /// First name shown in the response
        #[arg(long)]
        name: String,

        #[arg(long)]
        age: i64,

        #[arg(long)]
        occupation: String,

        /// Annual income
        #[arg(long)]
        income: i64,

        /// Health need: "yes" sets the flag, anything else leaves it off
        #[arg(long, default_value = "no")]
        health: String,

        /// Free-text description of what is needed
        #[arg(long, default_value = "")]
        need: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compare your skills with those the target role demands
    SkillGap {
        /// Target role, e.g. "Software Developer"
        #[arg(long)]
        role: String,

        /// Comma-separated skills you already have
        #[arg(long, default_value = "")]
        skills: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Catalog inspection
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Process JSON-lines requests from stdin (or a file)
    Batch {
        /// Read requests from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format: console, json
    #[arg(short, long)]
    pub output: Option<String>,

    /// Show every result and score components
    #[arg(short, long)]
    pub detailed: bool,

    /// Save output to a file, or into a directory under a generated name
    #[arg(short, long)]
    pub save: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum CatalogAction {
    /// Sizes, category histograms, and embedder of the loaded snapshot
    Stats {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Data-quality report for both datasets
    Audit {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "hybrid.pool_size")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" | "text" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

pub fn parse_embedding_backend(name: &str) -> Result<EmbeddingBackend, String> {
    match name.to_lowercase().as_str() {
        "model2vec" => Ok(EmbeddingBackend::Model2vec),
        "hashing" | "hash" => Ok(EmbeddingBackend::Hashing),
        _ => Err(format!("Invalid embedding backend: {}. Supported: model2vec, hashing", name)),
    }
}
