use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, info, warn};

mod error;
mod store;

pub use error::OAuthError;
pub use store::{DEFAULT_TOKEN_PATH, TokenStore};

/// Default base URL of the 42 intra API
pub const DEFAULT_API_URL: &str = "https://api.intra.42.fr";

/// Redirect URI registered for the application
pub const DEFAULT_REDIRECT_URI: &str = "https://github.com/D4ryl00/42-correction-slot";

/// OAuth 2.0 token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token for API requests
    pub access_token: String,
    /// Token type (usually "bearer")
    #[serde(default)]
    pub token_type: String,
    /// Refresh token for getting new access tokens
    #[serde(default)]
    pub refresh_token: String,
    /// Expiry time of the access token
    pub expiry: DateTime<Utc>,
}

impl OAuthToken {
    /// Check if the token is expired or will expire soon (within 60 seconds)
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(60) >= self.expiry
    }
}

/// OAuth configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URI the consent page sends the code to
    pub redirect_uri: String,
    /// Requested scopes, sent space separated
    pub scopes: Vec<String>,
    /// Authorization endpoint
    pub auth_url: String,
    /// Token endpoint
    pub token_url: String,
}

impl OAuthConfig {
    /// Create new OAuth configuration with intra defaults
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: Vec::new(),
            auth_url: format!("{}/oauth/authorize", DEFAULT_API_URL),
            token_url: format!("{}/oauth/token", DEFAULT_API_URL),
        }
    }

    /// Point both OAuth endpoints at another API base URL
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        let base = api_url.trim_end_matches('/');
        self.auth_url = format!("{}/oauth/authorize", base);
        self.token_url = format!("{}/oauth/token", base);
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes.into_iter().filter(|s| !s.is_empty()).collect();
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: String) -> Self {
        self.redirect_uri = redirect_uri;
        self
    }
}

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

impl TokenResponse {
    /// Build a token, keeping `previous_refresh` when the response carries none
    fn into_token(self, previous_refresh: Option<&str>) -> Result<OAuthToken, OAuthError> {
        let refresh_token = match (self.refresh_token, previous_refresh) {
            (Some(token), _) if !token.is_empty() => token,
            (_, Some(previous)) => previous.to_string(),
            _ => String::new(),
        };

        let expiry = Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or(OAuthError::InvalidExpiry(self.expires_in))?;

        Ok(OAuthToken {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token,
            expiry,
        })
    }
}

/// Generate a random `state` value for the authorization request
pub fn generate_state() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Generate authorization URL, returned with the `state` it embeds
pub fn generate_auth_url(config: &OAuthConfig) -> (String, String) {
    let state = generate_state();

    let mut auth_url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&state={}",
        config.auth_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&state),
    );

    if !config.scopes.is_empty() {
        auth_url.push_str("&scope=");
        auth_url.push_str(&urlencoding::encode(&config.scopes.join(" ")));
    }

    (auth_url, state)
}

async fn request_token(
    http: &reqwest::Client,
    config: &OAuthConfig,
    params: &[(&str, &str)],
) -> Result<TokenResponse, OAuthError> {
    let response = http.post(&config.token_url).form(params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await?;
        return Err(OAuthError::TokenEndpoint { status, body });
    }

    Ok(response.json().await?)
}

/// Exchange authorization code for tokens
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
) -> Result<OAuthToken, OAuthError> {
    info!("Exchanging authorization code for tokens");

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let token = request_token(http, config, &params)
        .await?
        .into_token(None)?;

    info!("Obtained OAuth tokens");
    Ok(token)
}

/// Refresh the access token using the refresh token
pub async fn refresh_token(
    http: &reqwest::Client,
    config: &OAuthConfig,
    token: &OAuthToken,
) -> Result<OAuthToken, OAuthError> {
    debug!("Refreshing OAuth token");

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", token.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    request_token(http, config, &params)
        .await?
        .into_token(Some(&token.refresh_token))
}

/// Source of the authorization code the user copies from the consent page
pub trait CodePrompt {
    fn read_code(&mut self, auth_url: &str) -> Result<String, OAuthError>;
}

/// Prints the authorization URL and reads the code from standard input.
///
/// Blocks until a line is entered; there is no timeout.
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn read_code(&mut self, auth_url: &str) -> Result<String, OAuthError> {
        eprintln!("\n=================================================");
        eprintln!("OAuth 2.0 Authorization Required");
        eprintln!("=================================================");
        eprintln!("\nGo to the following link in your browser, then type the authorization code:\n");
        eprintln!("{}\n", auth_url);

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(OAuthError::Prompt)?;
        Ok(line)
    }
}

/// Run the interactive authorization-code flow
pub async fn start_auth_flow(
    http: &reqwest::Client,
    config: &OAuthConfig,
    prompt: &mut dyn CodePrompt,
) -> Result<OAuthToken, OAuthError> {
    let (auth_url, _state) = generate_auth_url(config);

    let code = prompt.read_code(&auth_url)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(OAuthError::EmptyCode);
    }

    exchange_code(http, config, code).await
}

/// Return a usable token, authorizing interactively only when none is stored.
///
/// A refresh is attempted on every call. A successful refresh is persisted;
/// a failed one is logged and the current token is returned unchanged.
pub async fn ensure_token(
    http: &reqwest::Client,
    config: &OAuthConfig,
    store: &TokenStore,
    prompt: &mut dyn CodePrompt,
) -> Result<OAuthToken, OAuthError> {
    let token = match store.load() {
        Some(token) => {
            debug!(path = %store.path().display(), "Loaded stored token");
            token
        }
        None => {
            info!("No usable stored token, starting authorization flow");
            let token = start_auth_flow(http, config, prompt).await?;
            info!(path = %store.path().display(), "Saving credential file");
            store.save(&token)?;
            token
        }
    };

    if token.is_expired() {
        info!("Access token expired");
    }

    match refresh_token(http, config, &token).await {
        Ok(refreshed) => {
            store.save(&refreshed)?;
            info!("OAuth token refreshed");
            Ok(refreshed)
        }
        Err(e) => {
            warn!(error = %e, "Token refresh failed, keeping current token");
            Ok(token)
        }
    }
}
