//! # bestie-cli
//!
//! Terminal host: argument parsing, config loading, onboarding and the chat loop.

pub mod app;
pub mod cli;
pub mod config;
pub mod onboarding;
pub mod terminal;

pub use app::{App, Input, TICK_INTERVAL};
pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use onboarding::{collect_profile, load_profile};
pub use terminal::Terminal;
