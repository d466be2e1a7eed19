use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Local};
use clap::{Parser, Subcommand};
use gfit_client::auth::{ClientSecrets, CredentialManager};
use gfit_client::config::Config;
use gfit_client::http_client::ReqwestFitnessClient;
use gfit_cli::logger::LogRequest;
use gfit_cli::{cleanup, logger};

#[derive(Parser)]
#[command(
    name = "gfit",
    about = "Log fitness activities to Google Fit",
    long_about = "Writes activity segments, calories, and step counts into Google Fit, \
                  and can delete the records it created today."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// OAuth client secrets file override
    #[arg(long, global = true)]
    secrets_file: Option<PathBuf>,

    /// Token file override
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Log an activity
    Log {
        /// Activity type (default: 8 for running)
        #[arg(long = "type", default_value_t = 8)]
        activity_type: i64,

        /// Duration in minutes
        #[arg(long, default_value_t = 30)]
        duration: i64,

        /// Calories burned (optional)
        #[arg(long)]
        calories: Option<f64>,

        /// Number of steps (optional)
        #[arg(long)]
        steps: Option<i64>,

        /// How many hours ago the activity ended
        #[arg(long, default_value_t = 1.0)]
        hours_ago: f64,
    },

    /// Clean up today's activities
    Cleanup,
}

fn log_request(
    activity_type: i64,
    duration_minutes: i64,
    calories: Option<f64>,
    steps: Option<i64>,
    hours_ago: f64,
) -> LogRequest {
    let end_time = Local::now() - Duration::milliseconds((hours_ago * 3_600_000.0) as i64);
    LogRequest {
        activity_type,
        start_time: end_time - Duration::minutes(duration_minutes),
        end_time,
        calories,
        steps,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `GFIT_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("GFIT_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.secrets_file {
        config.secrets_file = path;
    }
    if let Some(path) = cli.token_file {
        config.token_file = path;
    }

    let secrets = ClientSecrets::load(&config.secrets_file)
        .with_context(|| format!("loading {}", config.secrets_file.display()))?;
    let project_number = secrets
        .project_number()
        .map(str::to_string)
        .context("client_id carries no leading numeric project number")?;

    let manager = CredentialManager::new(secrets, config.token_file.clone());
    let token = manager.obtain().await.context("obtaining credentials")?;
    let client = ReqwestFitnessClient::new(
        &config.base_url,
        secrecy::SecretString::new(token.token.into()),
    );

    match cli.command {
        Some(Command::Cleanup) => {
            cleanup::clean_up_day(&client, &project_number, Local::now()).await;
        }
        Some(Command::Log {
            activity_type,
            duration,
            calories,
            steps,
            hours_ago,
        }) => {
            let request = log_request(activity_type, duration, calories, steps, hours_ago);
            report(logger::log_activity(&client, &project_number, &request).await);
        }
        None => {
            // Sample activity: a 30-minute run that ended an hour ago.
            let request = log_request(8, 30, Some(250.0), Some(3500), 1.0);
            report(logger::log_activity(&client, &project_number, &request).await);
        }
    }

    Ok(())
}

fn report(ok: bool) {
    if ok {
        println!("Activity logged successfully!");
    } else {
        println!("Failed to log activity.");
        std::process::exit(1);
    }
}
