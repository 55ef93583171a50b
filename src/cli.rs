//! CLI definitions for the kiosk launcher.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kiosk_protocols::SessionRequest;

/// Kiosk launcher CLI.
#[derive(Parser)]
#[command(name = "kiosk")]
#[command(about = "Run pre-filled, full-screen kiosk browser sessions")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Open a kiosk session and wait for it to finish
    Open(OpenArgs),

    /// Hide the host window while an external program runs
    Launch {
        /// Program to run
        program: String,

        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
pub(crate) struct OpenArgs {
    /// Page to open (defaults to session.target_url)
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub date_of_birth: Option<String>,

    /// Extra prefill value as key=value (repeatable)
    #[arg(long = "data", value_parser = parse_key_value)]
    pub data: Vec<(String, String)>,

    /// Print the session result as JSON
    #[arg(long)]
    pub json: bool,
}

impl OpenArgs {
    /// Build the session request; named flags win over `--data` entries.
    pub fn into_request(self, default_url: &str) -> SessionRequest {
        let mut prefill: HashMap<String, String> = self.data.into_iter().collect();

        let named = [
            ("firstName", self.first_name),
            ("lastName", self.last_name),
            ("email", self.email),
            ("dateOfBirth", self.date_of_birth),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                prefill.insert(key.to_string(), value);
            }
        }

        let url = self.url.unwrap_or_else(|| default_url.to_string());
        SessionRequest::new(url).with_prefill(prefill)
    }
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Validate the configuration file
    Check,

    /// Print the effective configuration
    Show,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
