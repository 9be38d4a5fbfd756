use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::fmt;

/// Enrollment status of a submitted project that still needs a correction
pub const AWAITING_CORRECTION: &str = "waiting_for_correction";

/// Authenticated user, as returned by `/v2/me`
#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    #[serde(default)]
    pub login: String,
    pub projects_users: Vec<ProjectUser>,
}

/// One project enrollment of the user
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectUser {
    pub status: String,
    pub project: Project,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Correction time slot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slot {
    pub id: u64,
    pub begin_at: DateTime<FixedOffset>,
    pub end_at: DateTime<FixedOffset>,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slot {}: {} -> {}",
            self.id,
            self.begin_at.to_rfc3339(),
            self.end_at.to_rfc3339()
        )
    }
}
