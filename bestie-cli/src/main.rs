//! bestie CLI: run the BestieAI chat in the terminal. Config from env (.env) and optional CLI args.

use std::sync::Arc;

use anyhow::Result;
use bestie_cli::{load_profile, App, AppConfig, Cli, Commands, Terminal};
use bestie_core::init_tracing;
use clap::Parser;
use experiment::{ExperimentController, IdleMonitor};
use llm_client::{LlmConfig, OpenAIGateway};
use storage::{ReportMailer, SessionStore, SmtpMailer};
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { profile, data_dir } => {
            let config = AppConfig::load(data_dir);
            init_tracing(&config.log_file)?;
            let profile = profile.as_deref().map(load_profile).transpose()?;
            run(config, profile).await
        }
    }
}

async fn run(config: AppConfig, profile: Option<bestie_core::UserProfile>) -> Result<()> {
    info!(
        model = %config.llm.model(),
        data_dir = %config.data_dir.display(),
        "Starting BestieAI"
    );
    for warning in config.warnings() {
        warn!("{}", warning);
        println!("Warning: {}", warning);
    }

    let gateway = OpenAIGateway::from_config(&config.llm);
    info!(configured = gateway.is_configured(), "Completion gateway ready");
    let gateway = Arc::new(gateway);
    let controller = ExperimentController::new(gateway);

    let mut store = SessionStore::new(&config.data_dir).with_admin_email(config.mail.admin_email.clone());
    match SmtpMailer::from_config(&config.mail) {
        Ok(Some(mailer)) => {
            let mailer: Arc<dyn ReportMailer> = Arc::new(mailer);
            store = store.with_mailer(mailer, config.mail.admin_email.clone());
        }
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "Mailer unavailable");
            println!("Warning: email reports disabled: {}", e);
        }
    }

    let monitor = IdleMonitor::new(std::time::Instant::now())
        .with_thresholds(config.idle_threshold, config.nudge_cooldown);
    let term = Terminal::new(BufReader::new(tokio::io::stdin()), std::io::stdout());

    println!("Welcome to BestieAI, your friendly AI companion!");
    let mut app = App::new(term, controller, store).with_idle_monitor(monitor);
    if let Some(profile) = profile {
        app = app.with_profile(profile);
    }
    app.run().await
}
