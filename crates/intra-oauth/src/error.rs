use thiserror::Error;

/// Errors raised while obtaining, refreshing or persisting an OAuth token
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("failed to write token file '{path}': {source}")]
    TokenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode token: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to read authorization code: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("authorization code is empty")]
    EmptyCode,

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("token lifetime out of range: {0} seconds")]
    InvalidExpiry(i64),
}
