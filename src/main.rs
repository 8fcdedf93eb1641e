//! `rolegate` command-line front end.
//!
//! ```text
//! rolegate inspect <TOKEN>
//! rolegate route --token <TOKEN> --now 1000000000
//! rolegate login <TOKEN>
//! rolegate route
//! rolegate status
//! rolegate logout
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use rolegate::configuration::{get_configuration_from, Settings};
use rolegate::session::SessionManager;
use rolegate::telemetry::{get_subscriber, init_subscriber};
use rolegate::{auth, routing};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rolegate",
    version,
    about = "Decide where a bearer token may go",
    long_about = "Reads the role and expiry claims of a bearer token (without verifying\n\
        its signature) and prints the application area the bearer belongs in:\n\
        admin, instructor, or the default area."
)]
struct Cli {
    /// Configuration file (default: ./configuration.{yaml,toml,json})
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the decoded claims of a token as JSON
    Inspect {
        token: String,
    },
    /// Print the destination path for a token
    Route {
        /// Token to route (default: the stored session token)
        #[arg(long, env = "ROLEGATE_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Current time as Unix seconds (default: system clock)
        #[arg(long, value_name = "SECS")]
        now: Option<i64>,
        /// Print destination, path and token state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a token as the current session
    Login {
        token: String,
    },
    /// Clear the current session
    Logout,
    /// Show the state of the stored session token
    Status {
        /// Current time as Unix seconds (default: system clock)
        #[arg(long, value_name = "SECS")]
        now: Option<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = get_configuration_from(cli.config.as_deref())
        .context("Failed to read configuration")?;

    let subscriber = get_subscriber("rolegate".into(), settings.log_level.clone(), std::io::stderr);
    init_subscriber(subscriber).map_err(|e| anyhow::anyhow!(e))?;

    run(cli.command, &settings)
}

fn run(command: Commands, settings: &Settings) -> Result<()> {
    let sessions = SessionManager::with_file(settings.session.resolved_path());

    match command {
        Commands::Inspect { token } => {
            let claims = auth::decode(bare(&token)).context("Failed to decode token")?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::Route { token, now, json } => {
            let now = instant(now)?;
            let (state, destination) = match token.as_deref().map(bare) {
                Some(token) => routing::decide(Some(token), now),
                None => sessions.resolve(now)?,
            };
            let path = settings.routes.path(destination);

            if json {
                let out = json!({
                    "destination": destination,
                    "path": path,
                    "token": state,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{path}");
            }
        }
        Commands::Login { token } => {
            let token = bare(&token);
            sessions.login(token)?;
            let role = auth::token_role(token);
            println!("Session stored (role: {role})");
        }
        Commands::Logout => {
            sessions.logout()?;
            println!("Session cleared");
        }
        Commands::Status { now } => {
            let state = sessions.state(instant(now)?)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }

    Ok(())
}

/// Accept either a raw token or an `Authorization` header value.
fn bare(token: &str) -> &str {
    auth::extract_bearer_token(token).unwrap_or(token)
}

fn instant(secs: Option<i64>) -> Result<DateTime<Utc>> {
    match secs {
        Some(secs) => Utc
            .timestamp_opt(secs, 0)
            .single()
            .with_context(|| format!("--now {secs} is out of range")),
        None => Ok(Utc::now()),
    }
}
