use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{OAuthError, OAuthToken};

/// Default token file, relative to the working directory
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Token persistence backed by a single JSON file
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token.
    ///
    /// A missing or unparsable file is reported as `None` so the caller can
    /// fall back to the interactive authorization flow.
    pub fn load(&self) -> Option<OAuthToken> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No stored token");
                return None;
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable token file");
                None
            }
        }
    }

    /// Save token to file with owner-only permissions, replacing any previous content
    pub fn save(&self, token: &OAuthToken) -> Result<(), OAuthError> {
        let file_error = |source| OAuthError::TokenFile {
            path: self.path.display().to_string(),
            source,
        };

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut content = serde_json::to_vec_pretty(token)?;
        content.push(b'\n');

        let mut file = options.open(&self.path).map_err(file_error)?;
        file.write_all(&content).map_err(file_error)?;

        // The creation mode is ignored when the file already existed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(file_error)?;
        }

        debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }
}
