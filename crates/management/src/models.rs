//! Request and response bodies for the outreach management API.

use chrono::{DateTime, Utc};
use outreach_core::{ConnectionRecord, ConnectionStatus};
use outreach_delivery::FollowUpCandidate;
use outreach_reporting::{ActivitySeries, DayBuckets};
use serde::{Deserialize, Serialize};

// ─── Campaigns ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub follow_up_days: u32,
    #[serde(default)]
    pub follow_up_hours: Option<u32>,
    #[serde(default)]
    pub second_follow_up_days: Option<u32>,
}

// ─── Connections ───────────────────────────────────────────────────────────

/// Batch of connection rows relayed from the automation service.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConnectionsRequest {
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub stored: usize,
    /// Rows whose status is outside the known vocabulary. Stored, but never counted.
    pub unrecognized_status: usize,
    pub unknown_campaign: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ConnectionStatus,
    /// When the transition happened; defaults to the time of the request.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

// ─── Reporting ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunnelQuery {
    #[serde(default)]
    pub campaign_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    #[serde(default, rename = "timeRange")]
    pub time_range: Option<String>,
    /// IANA timezone name of the viewer, e.g. `Europe/Berlin`.
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartResponse {
    pub timezone: String,
    #[serde(flatten)]
    pub days: DayBuckets,
    pub series: ActivitySeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct DueFollowUpsResponse {
    pub campaign_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub candidates: Vec<FollowUpCandidate>,
}

// ─── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
