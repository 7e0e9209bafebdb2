//! CLI parser.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bestie")]
#[command(about = "BestieAI: companion chat with a blind A/B prompt-preference experiment", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a chat session in the terminal (config from env / .env).
    Run {
        /// JSON user profile; skips the onboarding questions.
        #[arg(short, long)]
        profile: Option<PathBuf>,
        /// Directory for conversation JSON files and the CSV summary (overrides DATA_DIR).
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}
