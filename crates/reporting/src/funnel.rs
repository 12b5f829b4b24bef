//! Funnel analysis: rolls connection snapshots up into per-campaign
//! sent / accepted / invited / cancelled counts.

use outreach_core::{ConnectionRecord, ConnectionStatus, StatusRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Funnel counters for one campaign.
///
/// Categories overlap: a `connected` row is both sent and accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelCounts {
    pub sent: u64,
    pub accepted: u64,
    pub invited: u64,
    pub cancelled: u64,
}

impl FunnelCounts {
    pub fn record(&mut self, status: &ConnectionStatus) {
        match status {
            ConnectionStatus::Invited => {
                self.sent += 1;
                self.invited += 1;
            }
            ConnectionStatus::Connected
            | ConnectionStatus::FollowupMessageSend
            | ConnectionStatus::SecondFollowupMessageSend => {
                self.sent += 1;
                self.accepted += 1;
            }
            ConnectionStatus::Cancelled => self.cancelled += 1,
            ConnectionStatus::Queued | ConnectionStatus::Pending | ConnectionStatus::Paused => {}
            // Unknown statuses are valid rows but never move a counter.
            ConnectionStatus::Unrecognized(_) => {}
        }
    }

    pub fn merge(&mut self, other: &FunnelCounts) {
        self.sent += other.sent;
        self.accepted += other.accepted;
        self.invited += other.invited;
        self.cancelled += other.cancelled;
    }

    /// Accepted as a share of sent, in percent with one decimal.
    pub fn response_rate(&self) -> f64 {
        percent_rate(self.accepted, self.sent)
    }
}

/// `round(numerator / denominator * 1000) / 10`, or 0 when either side is 0.
pub fn percent_rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 || numerator == 0 {
        return 0.0;
    }
    let rate = (numerator as f64 / denominator as f64 * 1000.0).round() / 10.0;
    rate.min(100.0)
}

/// Group rows by campaign and count each funnel category. Single pass.
///
/// Every campaign id that appears in the input is present in the output,
/// including campaigns whose rows all sit in non-counting statuses.
pub fn aggregate_funnels<'a, I>(rows: I) -> BTreeMap<String, FunnelCounts>
where
    I: IntoIterator<Item = &'a StatusRow>,
{
    let mut funnels: BTreeMap<String, FunnelCounts> = BTreeMap::new();
    for row in rows {
        funnels
            .entry(row.campaign_id.clone())
            .or_default()
            .record(&row.status);
    }
    funnels
}

/// Funnel counts plus the derived response rate, as returned over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CampaignFunnel {
    #[serde(flatten)]
    pub counts: FunnelCounts,
    #[serde(rename = "responseRate")]
    pub response_rate: f64,
}

impl From<FunnelCounts> for CampaignFunnel {
    fn from(counts: FunnelCounts) -> Self {
        Self {
            counts,
            response_rate: counts.response_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelReport {
    pub campaigns: BTreeMap<String, CampaignFunnel>,
    pub totals: CampaignFunnel,
}

impl FunnelReport {
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a StatusRow>,
    {
        let funnels = aggregate_funnels(rows);
        let mut totals = FunnelCounts::default();
        for counts in funnels.values() {
            totals.merge(counts);
        }
        Self {
            campaigns: funnels
                .into_iter()
                .map(|(id, counts)| (id, CampaignFunnel::from(counts)))
                .collect(),
            totals: totals.into(),
        }
    }
}

// ─── Engagement summary ────────────────────────────────────────────────────

/// Funnel counts for one campaign together with reply and follow-up activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementSummary {
    pub campaign_id: String,
    #[serde(flatten)]
    pub funnel: FunnelCounts,
    pub replied: u64,
    pub follow_ups_sent: u64,
    pub second_follow_ups_sent: u64,
    pub response_rate: f64,
    pub reply_rate: f64,
}

pub fn summarize_engagement<'a, I>(campaign_id: &str, records: I) -> EngagementSummary
where
    I: IntoIterator<Item = &'a ConnectionRecord>,
{
    let mut funnel = FunnelCounts::default();
    let mut replied = 0;
    let mut follow_ups_sent = 0;
    let mut second_follow_ups_sent = 0;

    for record in records
        .into_iter()
        .filter(|r| r.campaign_id == campaign_id)
    {
        funnel.record(&record.status);
        if record.reply_received_at.is_some() {
            replied += 1;
        }
        if record.follow_up_sent_at.is_some() {
            follow_ups_sent += 1;
        }
        if record.second_follow_up_sent_at.is_some() {
            second_follow_ups_sent += 1;
        }
    }

    EngagementSummary {
        campaign_id: campaign_id.to_string(),
        funnel,
        replied,
        follow_ups_sent,
        second_follow_ups_sent,
        response_rate: funnel.response_rate(),
        reply_rate: percent_rate(replied, funnel.accepted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rows(raw: &[(&str, &str)]) -> Vec<StatusRow> {
        raw.iter().map(|(c, s)| StatusRow::new(*c, s)).collect()
    }

    #[test]
    fn test_aggregate_example_scenario() {
        let input = rows(&[
            ("c1", "invited"),
            ("c1", "connected"),
            ("c1", "cancelled"),
            ("c2", "queued"),
        ]);
        let funnels = aggregate_funnels(&input);

        assert_eq!(
            funnels["c1"],
            FunnelCounts {
                sent: 2,
                accepted: 1,
                invited: 1,
                cancelled: 1
            }
        );
        assert_eq!(funnels["c2"], FunnelCounts::default());
        assert_eq!(funnels["c1"].response_rate(), 50.0);
        assert_eq!(funnels["c2"].response_rate(), 0.0);
    }

    #[test]
    fn test_sent_and_accepted_match_status_sets() {
        let statuses = [
            "queued",
            "pending",
            "invited",
            "connected",
            "followup_message_send",
            "second_followup_message_send",
            "paused",
            "cancelled",
            "definitely_not_a_status",
            "",
        ];
        // Deterministic spread of statuses across two campaigns.
        let input: Vec<StatusRow> = (0..200)
            .map(|i| {
                let campaign = if i % 3 == 0 { "a" } else { "b" };
                StatusRow::new(campaign, statuses[(i * 7) % statuses.len()])
            })
            .collect();

        let funnels = aggregate_funnels(&input);
        for (campaign, counts) in &funnels {
            let of_campaign = input.iter().filter(|r| &r.campaign_id == campaign);
            let expected_sent = of_campaign
                .clone()
                .filter(|r| r.status.counts_as_sent())
                .count() as u64;
            let expected_accepted = of_campaign
                .clone()
                .filter(|r| r.status.counts_as_accepted())
                .count() as u64;
            assert_eq!(counts.sent, expected_sent);
            assert_eq!(counts.accepted, expected_accepted);
            assert!(counts.accepted <= counts.sent);
            let rate = counts.response_rate();
            assert!((0.0..=100.0).contains(&rate));
        }
    }

    #[test]
    fn test_unknown_status_only_registers_campaign() {
        let input = rows(&[("c9", "archived"), ("c9", "INVITED")]);
        let funnels = aggregate_funnels(&input);
        assert_eq!(funnels.len(), 1);
        assert_eq!(funnels["c9"], FunnelCounts::default());
    }

    #[test]
    fn test_response_rate_rounds_to_one_decimal() {
        let counts = FunnelCounts {
            sent: 3,
            accepted: 1,
            invited: 2,
            cancelled: 0,
        };
        assert_eq!(counts.response_rate(), 33.3);
        assert_eq!(percent_rate(2, 3), 66.7);
        assert_eq!(percent_rate(5, 0), 0.0);
        assert_eq!(percent_rate(0, 0), 0.0);
    }

    #[test]
    fn test_report_totals_and_json_shape() {
        let input = rows(&[
            ("c1", "invited"),
            ("c1", "connected"),
            ("c2", "followup_message_send"),
            ("c2", "cancelled"),
        ]);
        let report = FunnelReport::from_rows(&input);
        assert_eq!(report.totals.counts.sent, 3);
        assert_eq!(report.totals.counts.accepted, 2);
        assert_eq!(report.totals.response_rate, 66.7);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["campaigns"]["c2"]["sent"], 1);
        assert_eq!(json["campaigns"]["c2"]["cancelled"], 1);
        assert_eq!(json["campaigns"]["c2"]["responseRate"], 100.0);
    }

    #[test]
    fn test_engagement_summary_counts_replies_and_follow_ups() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut replied = ConnectionRecord::new("c1", ConnectionStatus::FollowupMessageSend);
        replied.follow_up_sent_at = Some(at);
        replied.reply_received_at = Some(at);
        let mut finished = ConnectionRecord::new("c1", ConnectionStatus::SecondFollowupMessageSend);
        finished.follow_up_sent_at = Some(at);
        finished.second_follow_up_sent_at = Some(at);
        let other_campaign = ConnectionRecord::new("c2", ConnectionStatus::Connected);
        let waiting = ConnectionRecord::new("c1", ConnectionStatus::Invited);

        let records = vec![replied, finished, other_campaign, waiting];
        let summary = summarize_engagement("c1", &records);

        assert_eq!(summary.funnel.sent, 3);
        assert_eq!(summary.funnel.accepted, 2);
        assert_eq!(summary.replied, 1);
        assert_eq!(summary.follow_ups_sent, 2);
        assert_eq!(summary.second_follow_ups_sent, 1);
        assert_eq!(summary.response_rate, 66.7);
        assert_eq!(summary.reply_rate, 50.0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["followUpsSent"], 2);
        assert_eq!(json["accepted"], 2);
    }
}
