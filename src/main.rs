//! Resume matcher: hybrid resume and job description matching engine

use clap::Parser;
use log::{error, info};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction};
use resume_matcher::config::Config;
use resume_matcher::domain::{ParsedJobDescription, ParsedResume};
use resume_matcher::embedding::{Model2VecEmbedder, TextEmbedder};
use resume_matcher::engine::MatchEngine;
use resume_matcher::error::{MatcherError, Result};
use resume_matcher::explain::{DisabledModel, GeminiClient, LanguageModel};
use resume_matcher::output::{self, OutputFormat};
use resume_matcher::retrieval::{GraphStore, InMemoryVectorIndex};
use std::path::Path;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Match {
            resume,
            job,
            output,
            detailed,
            no_explain,
            no_ingest,
        } => {
            cli::validate_file_extension(&resume, &["json"])
                .map_err(|e| MatcherError::InvalidInput(format!("Resume file: {}", e)))?;
            cli::validate_file_extension(&job, &["json"])
                .map_err(|e| MatcherError::InvalidInput(format!("Job description file: {}", e)))?;
            let output_format =
                cli::parse_output_format(&output).map_err(MatcherError::InvalidInput)?;

            let parsed_resume: ParsedResume = read_json(&resume)?;
            let parsed_job: ParsedJobDescription = read_json(&job)?;

            let engine = build_engine(&config, no_explain)?;

            if !no_ingest {
                engine.ingest_resume(&parsed_resume)?;
                engine.ingest_job(&parsed_job)?;
            }

            info!(
                "Matching {} against {}",
                parsed_resume.name, parsed_job.title
            );
            let result = engine.match_candidate(&parsed_resume, &parsed_job).await?;

            if !no_ingest {
                engine.save_stores()?;
            }

            match output_format {
                OutputFormat::Console => println!("{}", output::render_console(&result, detailed)),
                OutputFormat::Json => println!("{}", output::render_json(&result, true)?),
            }
        }

        Commands::Ingest { resume, job } => {
            if resume.is_empty() && job.is_empty() {
                return Err(MatcherError::InvalidInput(
                    "Nothing to ingest: pass --resume and/or --job files".to_string(),
                ));
            }

            let engine = build_engine(&config, true)?;

            for path in &resume {
                let parsed: ParsedResume = read_json(path)?;
                let id = engine.ingest_resume(&parsed)?;
                println!("📄 Ingested resume {}", id);
            }
            for path in &job {
                let parsed: ParsedJobDescription = read_json(path)?;
                let id = engine.ingest_job(&parsed)?;
                println!("💼 Ingested job {}", id);
            }

            engine.save_stores()?;
            println!(
                "✅ Index holds {} documents, graph holds {} entities",
                engine.index_len(),
                engine.graph_entity_count()
            );
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Models Directory: {}", config.embedding.models_dir.display());
                println!("Embedding Model: {}", config.embedding.model_id);
                println!("Explanation Model: {}", config.explanation.model);
                println!("Data Directory: {}", config.storage.data_dir.display());
                println!("\nScoring Weights:");
                println!("  Semantic: {:.0}%", config.scoring.semantic_weight * 100.0);
                println!("  Skills: {:.0}%", config.scoring.skill_weight * 100.0);
                println!(
                    "  Experience: {:.0}%",
                    config.scoring.experience_weight * 100.0
                );
                println!("\nRetrieval:");
                println!("  Top-k: {}", config.retrieval.top_k);
                println!("  Timeout: {}ms", config.retrieval.timeout_ms);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save()?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}

fn build_engine(config: &Config, no_explain: bool) -> Result<MatchEngine> {
    let embedder: Arc<dyn TextEmbedder> = Arc::new(Model2VecEmbedder::from_config(config)?);

    let model: Arc<dyn LanguageModel> = if no_explain {
        Arc::new(DisabledModel)
    } else {
        match GeminiClient::from_env(&config.explanation.model) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                log::warn!("Explanation model unavailable ({}); using fallback text", e);
                Arc::new(DisabledModel)
            }
        }
    };

    let index =
        InMemoryVectorIndex::load_or_new(&config.vector_index_path(), embedder.dimension())?;
    let graph = GraphStore::load_or_new(&config.graph_store_path())?;

    MatchEngine::new(embedder, model, index, graph, config.clone())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
