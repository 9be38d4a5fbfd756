use chrono::{DateTime, Duration, FixedOffset, SecondsFormat, Timelike, Utc};
use tracing::{debug, warn};

use crate::{AWAITING_CORRECTION, ClientError, IntraClient, Me, ProjectUser, Slot};

/// How far ahead slots are searched
pub const SLOT_HORIZON_DAYS: i64 = 5;

/// End of the slot search window starting at `now`
pub fn slot_horizon(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(SLOT_HORIZON_DAYS)
}

/// Ids of the enrollments awaiting correction, in response order
pub fn correction_project_ids(enrollments: &[ProjectUser]) -> Vec<u64> {
    enrollments
        .iter()
        .filter(|enrollment| enrollment.status == AWAITING_CORRECTION)
        .map(|enrollment| enrollment.project.id)
        .collect()
}

/// Fetch `/v2/me` and return the projects awaiting correction
pub async fn list_correction_projects(client: &IntraClient) -> Result<Vec<u64>, ClientError> {
    let body = client.get("/v2/me", &[]).await?;
    let me: Me = serde_json::from_slice(&body)?;
    debug!(login = %me.login, enrollments = me.projects_users.len(), "Fetched profile");

    Ok(correction_project_ids(&me.projects_users))
}

/// Decode a slot list. An empty or malformed body yields no slots.
pub fn parse_slots(body: &[u8]) -> Vec<Slot> {
    if body.iter().all(u8::is_ascii_whitespace) {
        warn!("Empty slot response");
        return Vec::new();
    }

    match serde_json::from_slice(body) {
        Ok(slots) => slots,
        Err(e) => {
            warn!(error = %e, "Unparsable slot response");
            Vec::new()
        }
    }
}

/// Fetch the slots of `project_id` ending within the next five days, sorted
/// by begin time on the server side
pub async fn list_slots(
    client: &IntraClient,
    project_id: u64,
    now: DateTime<Utc>,
) -> Result<Vec<Slot>, ClientError> {
    let from = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let to = slot_horizon(now).to_rfc3339_opts(SecondsFormat::Secs, true);

    let query = [
        ("range[end_at]", format!("{},{}", from, to)),
        ("sort", "begin_at".to_string()),
        ("page[size]", "100".to_string()),
    ];
    let body = client
        .get(&format!("/v2/projects/{}/slots", project_id), &query)
        .await?;

    Ok(parse_slots(&body))
}

/// Hour and minute bounds a slot's end time must fall in.
///
/// Both fields are checked independently, in the slot's own UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub first_hour: u32,
    pub last_hour: u32,
    pub max_minute: u32,
}

impl Default for SlotWindow {
    fn default() -> Self {
        Self {
            first_hour: 9,
            last_hour: 18,
            max_minute: 0,
        }
    }
}

impl SlotWindow {
    pub fn contains(&self, end: &DateTime<FixedOffset>) -> bool {
        (self.first_hour..=self.last_hour).contains(&end.hour()) && end.minute() <= self.max_minute
    }
}

/// First slot, in input order, ending before the horizon and inside `window`
pub fn select_slot(slots: &[Slot], now: DateTime<Utc>, window: SlotWindow) -> Option<&Slot> {
    let horizon = slot_horizon(now);

    slots
        .iter()
        .find(|slot| slot.end_at.with_timezone(&Utc) < horizon && window.contains(&slot.end_at))
}
