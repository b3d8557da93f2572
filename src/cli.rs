//! CLI interface for the resume matcher

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Hybrid resume and job description matching engine")]
#[command(
    long_about = "Match candidate resumes against job descriptions using embeddings, a skill relationship graph, and retrieval-augmented explanations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a parsed resume against a parsed job description
    Match {
        /// Path to parsed resume JSON
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to parsed job description JSON
        #[arg(short, long)]
        job: PathBuf,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Show retrieval context in console output
        #[arg(short, long)]
        detailed: bool,

        /// Skip the explanation model (fallback text and deterministic questions)
        #[arg(long)]
        no_explain: bool,

        /// Do not add the documents to the index and graph before matching
        #[arg(long)]
        no_ingest: bool,
    },

    /// Add historical documents to the retrieval stores
    Ingest {
        /// Parsed resume JSON files
        #[arg(short, long)]
        resume: Vec<PathBuf>,

        /// Parsed job description JSON files
        #[arg(short, long)]
        job: Vec<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::output::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::output::OutputFormat::Console),
        "json" => Ok(crate::output::OutputFormat::Json),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert!(parse_output_format("console").is_ok());
        assert!(parse_output_format("JSON").is_ok());
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_extension_validation() {
        assert!(validate_file_extension(Path::new("resume.json"), &["json"]).is_ok());
        assert!(validate_file_extension(Path::new("resume.pdf"), &["json"]).is_err());
        assert!(validate_file_extension(Path::new("resume"), &["json"]).is_err());
    }
}
