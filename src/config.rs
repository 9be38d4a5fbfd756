use clap::Parser;
use intra_client::SlotWindow;
use intra_oauth::{DEFAULT_API_URL, DEFAULT_REDIRECT_URI, DEFAULT_TOKEN_PATH, OAuthConfig};
use std::path::PathBuf;

/// 42 Correction Slot - Finds a correction slot for a project awaiting correction
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// OAuth client ID
    #[arg(long)]
    pub client_id: String,

    /// OAuth client secret
    #[arg(long)]
    pub client_secret: String,

    /// Optional comma separated scopes
    #[arg(long, value_delimiter = ',')]
    pub scopes: Vec<String>,

    /// Path of the token file
    #[arg(long, default_value = DEFAULT_TOKEN_PATH)]
    pub token_path: PathBuf,

    /// Redirect URI registered for the application
    #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
    pub redirect_uri: String,

    /// Earliest accepted hour of a slot's end time
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..24))]
    pub first_hour: u32,

    /// Latest accepted hour of a slot's end time
    #[arg(long, default_value_t = 18, value_parser = clap::value_parser!(u32).range(0..24))]
    pub last_hour: u32,

    /// Latest accepted minute of a slot's end time
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..60))]
    pub max_minute: u32,
}

/// Run configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub token_path: PathBuf,
    pub redirect_uri: String,
    pub api_url: String,
    pub window: SlotWindow,
}

impl Config {
    /// `api_url` comes from the environment; `None` selects the public intra API
    pub fn from_args(args: Args, api_url: Option<String>) -> Self {
        Self {
            client_id: args.client_id,
            client_secret: args.client_secret,
            scopes: args.scopes.into_iter().filter(|s| !s.is_empty()).collect(),
            token_path: args.token_path,
            redirect_uri: args.redirect_uri,
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            window: SlotWindow {
                first_hour: args.first_hour,
                last_hour: args.last_hour,
                max_minute: args.max_minute,
            },
        }
    }

    pub fn oauth(&self) -> OAuthConfig {
        OAuthConfig::new(self.client_id.clone(), self.client_secret.clone())
            .with_api_url(&self.api_url)
            .with_scopes(self.scopes.clone())
            .with_redirect_uri(self.redirect_uri.clone())
    }
}
