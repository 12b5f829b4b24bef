//! In-memory outreach store backed by DashMap.
//!
//! Stands in for the `campaigns` and `linkedin_connections` tables so the
//! API can run and be tested without Postgres. Same read surface the
//! route handlers need: owned snapshots, filtered by campaign.

use crate::models::{CreateCampaignRequest, IngestSummary};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use outreach_core::{
    Campaign, ConnectionRecord, ConnectionStatus, OutreachError, OutreachResult, StatusRow,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Thread-safe in-memory store for campaigns and their connection rows.
pub struct OutreachStore {
    campaigns: DashMap<String, Campaign>,
    connections: DashMap<Uuid, ConnectionRecord>,
}

impl OutreachStore {
    pub fn new() -> Self {
        info!("Outreach store initialized (in-memory, development mode)");
        Self {
            campaigns: DashMap::new(),
            connections: DashMap::new(),
        }
    }

    /// Store pre-populated with two campaigns of recent activity ending at `now`.
    pub fn with_demo_data(now: DateTime<Utc>) -> Self {
        let store = Self::new();
        store.seed_demo_data(now);
        store
    }

    // ─── Campaigns ─────────────────────────────────────────────────────────

    pub fn list_campaigns(&self) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> =
            self.campaigns.iter().map(|r| r.value().clone()).collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        campaigns
    }

    pub fn get_campaign(&self, id: &str) -> Option<Campaign> {
        self.campaigns.get(id).map(|r| r.value().clone())
    }

    pub fn create_campaign(&self, req: CreateCampaignRequest, now: DateTime<Utc>) -> Campaign {
        let campaign = Campaign {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            follow_up_days: req.follow_up_days,
            follow_up_hours: req.follow_up_hours,
            second_follow_up_days: req.second_follow_up_days,
            created_at: now,
            total_profiles: 0,
            processed_profiles: 0,
        };
        self.campaigns.insert(campaign.id.clone(), campaign.clone());
        info!(campaign_id = %campaign.id, name = %campaign.name, "Campaign created");
        campaign
    }

    // ─── Connections ───────────────────────────────────────────────────────

    /// Upsert connection rows by id. Rows for unknown campaigns are still
    /// stored; the campaign may be created after its first rows arrive.
    pub fn insert_connections(&self, rows: Vec<ConnectionRecord>) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for row in rows {
            if !row.status.is_recognized() {
                summary.unrecognized_status += 1;
            }
            match self.campaigns.get_mut(&row.campaign_id) {
                Some(mut campaign) => {
                    if !self.connections.contains_key(&row.id) {
                        campaign.total_profiles += 1;
                    }
                }
                None => summary.unknown_campaign += 1,
            }
            self.connections.insert(row.id, row);
            summary.stored += 1;
        }
        debug!(
            stored = summary.stored,
            unrecognized = summary.unrecognized_status,
            "Connection rows ingested"
        );
        summary
    }

    pub fn get_connection(&self, id: Uuid) -> Option<ConnectionRecord> {
        self.connections.get(&id).map(|r| r.value().clone())
    }

    /// Snapshot of connection rows, optionally restricted to one campaign.
    pub fn connections(&self, campaign_id: Option<&str>) -> Vec<ConnectionRecord> {
        self.connections
            .iter()
            .filter(|r| campaign_id.map_or(true, |id| r.value().campaign_id == id))
            .map(|r| r.value().clone())
            .collect()
    }

    /// `{campaign_id, status}` projection for the funnel aggregator.
    pub fn status_rows(&self, campaign_id: Option<&str>) -> Vec<StatusRow> {
        self.connections
            .iter()
            .filter(|r| campaign_id.map_or(true, |id| r.value().campaign_id == id))
            .map(|r| StatusRow::from(r.value()))
            .collect()
    }

    /// Move a connection to `next`, stamping the matching timestamp the
    /// first time that stage is reached.
    pub fn update_status(
        &self,
        id: Uuid,
        next: ConnectionStatus,
        at: DateTime<Utc>,
    ) -> OutreachResult<ConnectionRecord> {
        let mut entry = self
            .connections
            .get_mut(&id)
            .ok_or_else(|| OutreachError::NotFound(format!("connection {id}")))?;
        let record = entry.value_mut();

        if !record.status.can_transition_to(&next) {
            return Err(OutreachError::InvalidTransition {
                from: record.status.to_string(),
                to: next.to_string(),
            });
        }

        let stamp = match next {
            ConnectionStatus::Invited => Some(&mut record.requested_at),
            ConnectionStatus::Connected => Some(&mut record.accepted_at),
            ConnectionStatus::FollowupMessageSend => Some(&mut record.follow_up_sent_at),
            ConnectionStatus::SecondFollowupMessageSend => {
                Some(&mut record.second_follow_up_sent_at)
            }
            _ => None,
        };
        if let Some(slot) = stamp {
            slot.get_or_insert(at);
        }

        debug!(connection_id = %id, from = %record.status, to = %next, "Connection status updated");
        record.status = next;
        Ok(record.clone())
    }

    pub fn record_reply(&self, id: Uuid, at: DateTime<Utc>) -> OutreachResult<ConnectionRecord> {
        let mut entry = self
            .connections
            .get_mut(&id)
            .ok_or_else(|| OutreachError::NotFound(format!("connection {id}")))?;
        let record = entry.value_mut();
        record.reply_received_at.get_or_insert(at);
        Ok(record.clone())
    }

    // ─── Demo data ─────────────────────────────────────────────────────────

    fn seed_demo_data(&self, now: DateTime<Utc>) {
        let campaigns = vec![
            ("Series A Founders", 3, None, Some(5), 48),
            ("DevRel Leads EU", 2, Some(12), None, 30),
        ];

        for (name, follow_up_days, follow_up_hours, second_follow_up_days, profiles) in campaigns {
            let campaign = self.create_campaign(
                CreateCampaignRequest {
                    name: name.to_string(),
                    follow_up_days,
                    follow_up_hours,
                    second_follow_up_days,
                },
                now - Duration::days(45),
            );

            let rows: Vec<ConnectionRecord> = (0..profiles)
                .map(|i: i64| demo_connection(&campaign.id, i, now))
                .collect();
            self.insert_connections(rows);

            if let Some(mut c) = self.campaigns.get_mut(&campaign.id) {
                c.processed_profiles = self
                    .connections
                    .iter()
                    .filter(|r| {
                        r.value().campaign_id == campaign.id
                            && !matches!(r.value().status, ConnectionStatus::Queued)
                    })
                    .count() as u64;
            }
        }
        info!(
            campaigns = self.campaigns.len(),
            connections = self.connections.len(),
            "Demo data seeded"
        );
    }
}

impl Default for OutreachStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic spread over the pipeline: row `i` progresses `i % 8` stages.
fn demo_connection(campaign_id: &str, i: i64, now: DateTime<Utc>) -> ConnectionRecord {
    let mut record = ConnectionRecord::new(campaign_id, ConnectionStatus::Queued);
    record.profile_url = Some(format!("https://www.linkedin.com/in/demo-profile-{i}"));

    let stage = i % 8;
    // Later stages start further back so every timestamp lies before `now`.
    let min_days = match stage {
        5 => 5,
        6 => 10,
        _ => 1,
    };
    let requested = now - Duration::hours(24 * min_days + 6 + (i * 37) % (24 * 10));
    record.status = match stage {
        0 => ConnectionStatus::Queued,
        1 => ConnectionStatus::Pending,
        2 => ConnectionStatus::Invited,
        3 | 4 => ConnectionStatus::Connected,
        5 => ConnectionStatus::FollowupMessageSend,
        6 => ConnectionStatus::SecondFollowupMessageSend,
        _ => ConnectionStatus::Cancelled,
    };

    if stage >= 2 {
        record.requested_at = Some(requested);
        record.connection_note_sent_at = Some(requested);
    }
    if (3..=6).contains(&stage) {
        record.accepted_at = Some(requested + Duration::hours(20));
    }
    if (5..=6).contains(&stage) {
        record.follow_up_sent_at = Some(requested + Duration::days(4));
    }
    if stage == 6 {
        record.second_follow_up_sent_at = Some(requested + Duration::days(9));
    }
    if stage == 4 {
        record.reply_received_at = Some(requested + Duration::hours(22));
    }
    if stage == 6 && i % 3 == 0 {
        record.reply_received_at = Some(requested + Duration::days(2));
    }
    record
}
