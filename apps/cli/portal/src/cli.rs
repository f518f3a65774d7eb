//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "portal", about = "Sign in to the portal API and manage your session")]
pub struct Args {
    /// Directory holding config.json (default: platform config dir)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Directory holding tokens.json and portal.log (default: PORTAL_DATA_DIR or platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Print debug logs to the terminal
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account (it must be verified before signing in)
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        password_confirm: Option<String>,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        user_type: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        organization: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Me,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Update profile fields
    Profile {
        /// `key=value`; values that parse as JSON are sent as JSON
        #[arg(short, long = "field", value_parser = parse_field, required = true)]
        fields: Vec<(String, String)>,
    },

    /// Change the account password
    ChangePassword {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },

    /// Upload a new avatar image
    Avatar {
        file: PathBuf,
        /// MIME type (default: guessed from the file extension)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Resolve a path through the navigation guard
    Navigate { path: String },

    /// Show whether a session is held
    Status,

    /// Show the saved settings, or change and save them
    Config {
        /// API base URL, e.g. https://portal.example.org/api/v1/
        #[arg(long)]
        api_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Expected key=value, got '{s}'")),
    }
}
