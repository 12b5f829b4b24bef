//! Follow-up timing: decides when an accepted connection is owed its
//! first or second follow-up message.
//!
//! Callers pass "now" explicitly; nothing here reads the clock.

use chrono::{DateTime, Duration, Utc};
use outreach_core::{Campaign, ConnectionRecord, ConnectionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MS_PER_DAY: i64 = 86_400_000;

/// Whole days elapsed from `from` to `now`, floored. Negative if `now` is earlier.
pub fn whole_days_between(from: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - from).num_milliseconds().div_euclid(MS_PER_DAY)
}

/// A follow-up is due once at least `follow_up_days` whole days have
/// passed since the connection was accepted. The boundary is inclusive.
pub fn is_follow_up_due(accepted_at: DateTime<Utc>, now: DateTime<Utc>, follow_up_days: u32) -> bool {
    whole_days_between(accepted_at, now) >= i64::from(follow_up_days)
}

/// Campaign follow-up delay: whole days plus optional extra hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPolicy {
    pub days: u32,
    #[serde(default)]
    pub hours: u32,
}

impl FollowUpPolicy {
    pub fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            days: campaign.follow_up_days,
            hours: campaign.follow_up_hours.unwrap_or(0),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::days(i64::from(self.days)) + Duration::hours(i64::from(self.hours))
    }

    pub fn next_due_at(&self, accepted_at: DateTime<Utc>) -> DateTime<Utc> {
        accepted_at + self.delay()
    }

    /// Agrees with [`is_follow_up_due`] when `hours` is zero.
    pub fn is_due(&self, accepted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= self.next_due_at(accepted_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStage {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpCandidate {
    pub connection_id: Uuid,
    pub campaign_id: String,
    pub stage: FollowUpStage,
    /// Instant the follow-up became due.
    pub due_since: DateTime<Utc>,
}

/// Connections of `campaign` owed a follow-up at `now`, oldest first.
///
/// First follow-up: status `connected`, accepted timestamp present, no
/// follow-up sent yet. Second follow-up (only when the campaign sets
/// `second_follow_up_days`): status `followup_message_send`, first
/// follow-up sent, second not sent. A received reply stops the sequence.
pub fn select_due<'a, I>(campaign: &Campaign, records: I, now: DateTime<Utc>) -> Vec<FollowUpCandidate>
where
    I: IntoIterator<Item = &'a ConnectionRecord>,
{
    let policy = FollowUpPolicy::from_campaign(campaign);
    let mut due: Vec<FollowUpCandidate> = records
        .into_iter()
        .filter(|r| r.campaign_id == campaign.id && r.reply_received_at.is_none())
        .filter_map(|r| {
            let (stage, due_since) = match (&r.status, r.follow_up_sent_at) {
                (ConnectionStatus::Connected, None) => {
                    let accepted_at = r.accepted_at?;
                    policy
                        .is_due(accepted_at, now)
                        .then(|| (FollowUpStage::First, policy.next_due_at(accepted_at)))?
                }
                (ConnectionStatus::FollowupMessageSend, Some(sent_at))
                    if r.second_follow_up_sent_at.is_none() =>
                {
                    let days = campaign.second_follow_up_days?;
                    is_follow_up_due(sent_at, now, days).then(|| {
                        (
                            FollowUpStage::Second,
                            sent_at + Duration::days(i64::from(days)),
                        )
                    })?
                }
                _ => return None,
            };
            Some(FollowUpCandidate {
                connection_id: r.id,
                campaign_id: r.campaign_id.clone(),
                stage,
                due_since,
            })
        })
        .collect();

    due.sort_by(|a, b| {
        a.due_since
            .cmp(&b.due_since)
            .then_with(|| a.connection_id.cmp(&b.connection_id))
    });
    due
}
