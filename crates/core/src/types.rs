use crate::error::OutreachError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ─── Connection status ─────────────────────────────────────────────────────

/// Outreach status of a single profile within a campaign.
///
/// The automation service owns the lifecycle and writes these as plain
/// strings. Anything outside the known vocabulary is kept verbatim as
/// `Unrecognized` so that aggregation can skip it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionStatus {
    Queued,
    Pending,
    Invited,
    Connected,
    FollowupMessageSend,
    SecondFollowupMessageSend,
    Paused,
    Cancelled,
    Unrecognized(String),
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionStatus::Queued => "queued",
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Invited => "invited",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::FollowupMessageSend => "followup_message_send",
            ConnectionStatus::SecondFollowupMessageSend => "second_followup_message_send",
            ConnectionStatus::Paused => "paused",
            ConnectionStatus::Cancelled => "cancelled",
            ConnectionStatus::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// Parse a wire string. Total: unknown values become `Unrecognized`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => ConnectionStatus::Queued,
            "pending" => ConnectionStatus::Pending,
            "invited" => ConnectionStatus::Invited,
            "connected" => ConnectionStatus::Connected,
            "followup_message_send" => ConnectionStatus::FollowupMessageSend,
            "second_followup_message_send" => ConnectionStatus::SecondFollowupMessageSend,
            "paused" => ConnectionStatus::Paused,
            "cancelled" => ConnectionStatus::Cancelled,
            other => ConnectionStatus::Unrecognized(other.to_string()),
        }
    }

    /// An invite has actually been transmitted to LinkedIn.
    pub fn counts_as_sent(&self) -> bool {
        matches!(self, ConnectionStatus::Invited) || self.counts_as_accepted()
    }

    /// LinkedIn accepted the connection request.
    pub fn counts_as_accepted(&self) -> bool {
        matches!(
            self,
            ConnectionStatus::Connected
                | ConnectionStatus::FollowupMessageSend
                | ConnectionStatus::SecondFollowupMessageSend
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConnectionStatus::Cancelled | ConnectionStatus::SecondFollowupMessageSend
        )
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ConnectionStatus::Unrecognized(_))
    }

    /// Whether the automation pipeline may move a record from `self` to `next`.
    ///
    /// Forward path: queued → pending → invited → {connected | cancelled},
    /// connected → followup_message_send → second_followup_message_send, and
    /// connected → cancelled. Any live status can be paused; a paused record
    /// resumes at queued or pending.
    pub fn can_transition_to(&self, next: &ConnectionStatus) -> bool {
        use ConnectionStatus::*;

        if !self.is_recognized() || !next.is_recognized() || self.is_terminal() {
            return false;
        }
        match (self, next) {
            (Queued, Pending)
            | (Pending, Invited)
            | (Invited, Connected)
            | (Invited, Cancelled)
            | (Connected, FollowupMessageSend)
            | (Connected, Cancelled)
            | (FollowupMessageSend, SecondFollowupMessageSend)
            | (Paused, Queued)
            | (Paused, Pending) => true,
            (Paused, Paused) => false,
            (_, Paused) => true,
            _ => false,
        }
    }
}

impl From<String> for ConnectionStatus {
    fn from(raw: String) -> Self {
        match ConnectionStatus::parse(&raw) {
            ConnectionStatus::Unrecognized(_) => ConnectionStatus::Unrecognized(raw),
            known => known,
        }
    }
}

impl From<ConnectionStatus> for String {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Connection records ────────────────────────────────────────────────────

/// One target profile's outreach record within a campaign, as read from
/// the `linkedin_connections` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub campaign_id: String,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
    /// When the record entered `connected`.
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reply_received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub follow_up_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub second_follow_up_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connection_note_sent_at: Option<DateTime<Utc>>,
}

impl ConnectionRecord {
    pub fn new(campaign_id: impl Into<String>, status: ConnectionStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id: campaign_id.into(),
            status,
            profile_url: None,
            requested_at: None,
            accepted_at: None,
            reply_received_at: None,
            follow_up_sent_at: None,
            second_follow_up_sent_at: None,
            connection_note_sent_at: None,
        }
    }
}

/// Minimal `{campaign_id, status}` projection consumed by the funnel aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub campaign_id: String,
    pub status: ConnectionStatus,
}

impl StatusRow {
    pub fn new(campaign_id: impl Into<String>, status: &str) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            status: ConnectionStatus::parse(status),
        }
    }
}

impl From<&ConnectionRecord> for StatusRow {
    fn from(record: &ConnectionRecord) -> Self {
        Self {
            campaign_id: record.campaign_id.clone(),
            status: record.status.clone(),
        }
    }
}

// ─── Campaign ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    /// Whole days to wait after acceptance before the first follow-up.
    pub follow_up_days: u32,
    #[serde(default)]
    pub follow_up_hours: Option<u32>,
    #[serde(default)]
    pub second_follow_up_days: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_profiles: u64,
    #[serde(default)]
    pub processed_profiles: u64,
}

// ─── Time range ────────────────────────────────────────────────────────────

/// Chart window ending today, in whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
}

impl TimeRange {
    pub fn days(self) -> u32 {
        match self {
            TimeRange::SevenDays => 7,
            TimeRange::ThirtyDays => 30,
            TimeRange::NinetyDays => 90,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::SevenDays => "7d",
            TimeRange::ThirtyDays => "30d",
            TimeRange::NinetyDays => "90d",
        }
    }
}

impl FromStr for TimeRange {
    type Err = OutreachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(TimeRange::SevenDays),
            "30d" => Ok(TimeRange::ThirtyDays),
            "90d" => Ok(TimeRange::NinetyDays),
            other => Err(OutreachError::InvalidArgument(format!(
                "unsupported time range '{other}', expected one of 7d, 30d, 90d"
            ))),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
