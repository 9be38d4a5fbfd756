//! Client for the 42 intra REST API: authenticated requests, the records
//! it returns, and the correction slot search built on top of them.

mod error;
mod models;
mod queries;

pub use error::ClientError;
pub use models::{AWAITING_CORRECTION, Me, Project, ProjectUser, Slot};
pub use queries::{
    SLOT_HORIZON_DAYS, SlotWindow, correction_project_ids, list_correction_projects, list_slots,
    parse_slots, select_slot, slot_horizon,
};

use tracing::{debug, warn};

/// HTTP client bound to an access token
#[derive(Debug, Clone)]
pub struct IntraClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl IntraClient {
    pub fn new(http: reqwest::Client, base_url: &str, access_token: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// Issue a GET request and return the fully buffered body.
    ///
    /// A non-success status is logged but its body is still returned.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Request returned a non-success status");
        }

        Ok(response.bytes().await?.to_vec())
    }
}
