//! Scheme matcher: welfare scheme and job portal recommendations from CSV catalogs

use clap::Parser;
use log::{error, info, warn};
use scheme_matcher::batch::run_batch;
use scheme_matcher::cli::{self, CatalogAction, Cli, Commands, ConfigAction, OutputArgs};
use scheme_matcher::config::{Config, EmbeddingBackend};
use scheme_matcher::engine::MatchingEngine;
use scheme_matcher::error::{MatcherError, Result};
use scheme_matcher::output::report::{save_report_to_file, suggest_filename, RecommendationReport, Report};
use scheme_matcher::output::render;
use scheme_matcher::processing::embeddings::{build_embedder, Embedder, HashingEmbedder};
use scheme_matcher::processing::lexical::RecommendationQuery;
use scheme_matcher::processing::semantic::HybridQuery;
use scheme_matcher::processing::text_processor::split_list;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(cli: Cli, mut config: Config, config_path: PathBuf) -> Result<()> {
    let Cli {
        command,
        seed,
        data_dir,
        embedder,
        ..
    } = cli;

    let command = match command {
        Commands::Config { action } => return run_config_command(action, config, &config_path),
        other => other,
    };

    if let Some(data_dir) = data_dir {
        config.catalog.data_dir = data_dir;
    }
    if let Some(name) = &embedder {
        config.embedding.backend = cli::parse_embedding_backend(name).map_err(MatcherError::InvalidInput)?;
    }

    let engine_config = config.clone();
    let engine = tokio::task::spawn_blocking(move || open_engine(engine_config, seed)).await?;
    let engine = Arc::new(engine);

    match command {
        Commands::Recommend {
            occupation,
            skills,
            interest,
            location,
            preview,
            output,
        } => {
            if occupation.trim().is_empty() {
                return Err(MatcherError::InvalidInput("occupation must not be empty".to_string()));
            }
            let query = RecommendationQuery {
                occupation,
                skills,
                interest,
                location,
            };

            let report = {
                let engine = Arc::clone(&engine);
                tokio::task::spawn_blocking(move || {
                    let recommendations = engine.get_recommendations(&query);
                    let preview = preview.then(|| engine.preview_schemes(&query));
                    RecommendationReport {
                        occupation: query.occupation,
                        location: query.location,
                        recommendations,
                        preview,
                    }
                })
                .await?
            };
            emit(&Report::Recommendations(report), &output, &config)
        }

        Commands::Hybrid {
            name,
            age,
            occupation,
            income,
            health,
            need,
            output,
        } => {
            let query = HybridQuery {
                first_name: name,
                age,
                occupation,
                income,
                health: health.trim().to_lowercase(),
                need,
            };

            let engine = Arc::clone(&engine);
            let report = tokio::task::spawn_blocking(move || engine.recommend(&query)).await?;
            emit(&Report::Hybrid(report), &output, &config)
        }

        Commands::SkillGap { role, skills, output } => {
            if role.trim().is_empty() {
                return Err(MatcherError::InvalidInput("role must not be empty".to_string()));
            }
            let user_skills = split_list(&skills);

            let engine = Arc::clone(&engine);
            let report =
                tokio::task::spawn_blocking(move || engine.analyze_skill_gap(&user_skills, &role)).await?;
            emit(&Report::SkillGap(report), &output, &config)
        }

        Commands::Catalog { action } => match action {
            CatalogAction::Stats { output } => emit(&Report::Stats(engine.stats()), &output, &config),
            CatalogAction::Audit { output } => emit(&Report::Audit(engine.audit()), &output, &config),
        },

        Commands::Batch { input } => {
            let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
                Some(path) => Box::new(BufReader::new(tokio::fs::File::open(&path).await?)),
                None => Box::new(BufReader::new(tokio::io::stdin())),
            };

            let summary = run_batch(engine, reader, tokio::io::stdout()).await?;
            info!(
                "Batch complete: {} responses, {} failed",
                summary.processed, summary.failed
            );
            Ok(())
        }

        // handled before the engine is opened
        Commands::Config { .. } => Ok(()),
    }
}

/// Build the engine; a model that fails to load degrades to the hashing embedder
fn open_engine(config: Config, seed: Option<u64>) -> MatchingEngine {
    let embedder: Arc<dyn Embedder> = match build_embedder(&config.embedding) {
        Ok(embedder) => embedder,
        Err(e) => {
            warn!(
                "Could not load embedding model '{}' ({}); using hashing embedder",
                config.embedding.model, e
            );
            Arc::new(HashingEmbedder::new(config.embedding.dimension))
        }
    };

    info!(
        "Opening catalog from {} with {} embeddings",
        config.catalog.data_dir.display(),
        embedder.name()
    );

    let engine = MatchingEngine::new(config, embedder);
    match seed {
        Some(seed) => engine.with_seed(seed),
        None => engine,
    }
}

fn emit(report: &Report, args: &OutputArgs, config: &Config) -> Result<()> {
    let format = match &args.output {
        Some(name) => cli::parse_output_format(name).map_err(MatcherError::InvalidInput)?,
        None => config.output.format,
    };

    let rendered = render(report, format, config.output.color_output, args.detailed)?;
    println!("{}", rendered);

    if let Some(path) = &args.save {
        let path = if path.is_dir() {
            path.join(suggest_filename(format, report))
        } else {
            path.clone()
        };
        // colors only belong on the terminal
        let plain = render(report, format, false, args.detailed)?;
        save_report_to_file(&plain, &path)?;
        info!("Saved {} report to {}", report.kind(), path.display());
    }
    Ok(())
}

fn run_config_command(action: Option<ConfigAction>, mut config: Config, path: &Path) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            println!("Configuration: {}\n", path.display());
            println!("Schemes file:   {}", config.schemes_path().display());
            println!("Jobs file:      {}", config.jobs_path().display());
            let backend = match config.embedding.backend {
                EmbeddingBackend::Model2vec => format!("model2vec ({})", config.embedding.model),
                EmbeddingBackend::Hashing => format!("hashing ({} dims)", config.embedding.dimension),
            };
            println!("Embeddings:     {}", backend);
            println!(
                "Hybrid weights: semantic {:.0}%, demographic {:.0}%\n",
                config.hybrid.semantic_weight * 100.0,
                config.hybrid.demographic_weight * 100.0
            );
            let content = toml::to_string_pretty(&config)
                .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;
            println!("{}", content);
        }

        Some(ConfigAction::Reset) => {
            Config::default().save_to(path)?;
            println!("Configuration reset to defaults at {}", path.display());
        }

        Some(ConfigAction::Set { key, value }) => {
            config.set_value(&key, &value)?;
            config.save_to(path)?;
            println!("Set {} = {}", key, value);
        }
    }
    Ok(())
}
