//! Outreach activity per day bucket: invitations, acceptances, replies and
//! follow-ups, counted by the timestamp each event was recorded at.

use crate::day_buckets::DayBuckets;
use chrono::{DateTime, Utc};
use outreach_core::ConnectionRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    pub date: String,
    pub label: String,
    pub invitations: u64,
    pub acceptances: u64,
    pub replies: u64,
    pub follow_ups: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTotals {
    pub invitations: u64,
    pub acceptances: u64,
    pub replies: u64,
    pub follow_ups: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySeries {
    pub points: Vec<ActivityPoint>,
    pub totals: ActivityTotals,
}

/// Count timestamps per bucket. Instants outside the window are dropped.
pub fn count_in_buckets<I>(days: &DayBuckets, instants: I) -> Vec<u64>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts = vec![0u64; days.buckets.len()];
    for at in instants {
        if let Some(idx) = days.index_of(at) {
            counts[idx] += 1;
        }
    }
    counts
}

pub fn build_activity_series<'a, I>(days: &DayBuckets, records: I) -> ActivitySeries
where
    I: IntoIterator<Item = &'a ConnectionRecord>,
{
    let mut points: Vec<ActivityPoint> = days
        .buckets
        .iter()
        .map(|b| ActivityPoint {
            date: b.date.clone(),
            label: b.label.clone(),
            invitations: 0,
            acceptances: 0,
            replies: 0,
            follow_ups: 0,
        })
        .collect();
    let mut totals = ActivityTotals::default();

    for record in records {
        if let Some(idx) = slot(days, record.requested_at) {
            points[idx].invitations += 1;
        }
        if let Some(idx) = slot(days, record.accepted_at) {
            points[idx].acceptances += 1;
        }
        if let Some(idx) = slot(days, record.reply_received_at) {
            points[idx].replies += 1;
        }
        for sent_at in [record.follow_up_sent_at, record.second_follow_up_sent_at] {
            if let Some(idx) = slot(days, sent_at) {
                points[idx].follow_ups += 1;
            }
        }
    }

    for point in &points {
        totals.invitations += point.invitations;
        totals.acceptances += point.acceptances;
        totals.replies += point.replies;
        totals.follow_ups += point.follow_ups;
    }

    ActivitySeries { points, totals }
}

fn slot(days: &DayBuckets, at: Option<DateTime<Utc>>) -> Option<usize> {
    at.and_then(|at| days.index_of(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_buckets::build_day_buckets;
    use chrono::{Duration, TimeZone};
    use outreach_core::{ConnectionStatus, TimeRange};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_count_in_buckets_drops_out_of_window() {
        let days = build_day_buckets(TimeRange::SevenDays, utc(2024, 3, 15, 12), &Utc);
        let counts = count_in_buckets(
            &days,
            [
                utc(2024, 3, 9, 0),
                utc(2024, 3, 9, 23),
                utc(2024, 3, 12, 8),
                utc(2024, 3, 16, 0),
                utc(2024, 3, 1, 8),
            ],
        );
        assert_eq!(counts, vec![2, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_series_counts_each_event_kind() {
        let now = utc(2024, 3, 15, 12);
        let days = build_day_buckets(TimeRange::SevenDays, now, &Utc);

        let mut full = ConnectionRecord::new("c1", ConnectionStatus::SecondFollowupMessageSend);
        full.requested_at = Some(utc(2024, 3, 9, 10));
        full.accepted_at = Some(utc(2024, 3, 10, 10));
        full.follow_up_sent_at = Some(utc(2024, 3, 13, 10));
        full.second_follow_up_sent_at = Some(utc(2024, 3, 15, 10));
        full.reply_received_at = Some(utc(2024, 3, 15, 11));

        let mut old = ConnectionRecord::new("c1", ConnectionStatus::Invited);
        old.requested_at = Some(now - Duration::days(30));

        let mut fresh = ConnectionRecord::new("c2", ConnectionStatus::Invited);
        fresh.requested_at = Some(utc(2024, 3, 9, 1));

        let series = build_activity_series(&days, &[full, old, fresh]);

        assert_eq!(series.points.len(), 7);
        assert_eq!(series.points[0].invitations, 2);
        assert_eq!(series.points[1].acceptances, 1);
        assert_eq!(series.points[4].follow_ups, 1);
        assert_eq!(series.points[6].follow_ups, 1);
        assert_eq!(series.points[6].replies, 1);
        assert_eq!(
            series.totals,
            ActivityTotals {
                invitations: 2,
                acceptances: 1,
                replies: 1,
                follow_ups: 2,
            }
        );
    }
}
