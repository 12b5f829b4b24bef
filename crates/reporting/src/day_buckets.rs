//! Calendar-day buckets for time-series charts.
//!
//! Buckets follow the caller's local calendar, so a day may be 23 or 25
//! hours long across DST changes. The UTC bounds are what the event
//! queries filter on; the `date` string is always formatted from local
//! calendar fields.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use outreach_core::TimeRange;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub label: String,
    #[serde(rename = "startUTC")]
    pub start_utc: DateTime<Utc>,
    #[serde(rename = "endUTC")]
    pub end_utc: DateTime<Utc>,
}

impl DayBucket {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_utc <= at && at < self.end_utc
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBuckets {
    pub time_range: TimeRange,
    pub buckets: Vec<DayBucket>,
    #[serde(rename = "rangeStartUTC")]
    pub range_start_utc: DateTime<Utc>,
    #[serde(rename = "rangeEndUTC")]
    pub range_end_utc: DateTime<Utc>,
}

impl DayBuckets {
    /// Index of the bucket holding `at`, if it falls inside the window.
    pub fn index_of(&self, at: DateTime<Utc>) -> Option<usize> {
        let idx = self.buckets.partition_point(|b| b.start_utc <= at);
        if idx == 0 {
            return None;
        }
        self.buckets[idx - 1].contains(at).then_some(idx - 1)
    }
}

/// Build `range.days()` contiguous day buckets ending with the local day
/// that contains `now`.
pub fn build_day_buckets<Tz: TimeZone>(range: TimeRange, now: DateTime<Utc>, tz: &Tz) -> DayBuckets {
    let days_ago = i64::from(range.days()) - 1;
    let today = now.with_timezone(tz).date_naive();

    let buckets: Vec<DayBucket> = (0..=days_ago)
        .rev()
        .map(|i| {
            let date = today - Duration::days(i);
            let next = date + Duration::days(1);
            DayBucket {
                date: date.format("%Y-%m-%d").to_string(),
                label: day_label(range, date),
                start_utc: local_midnight(tz, date),
                end_utc: local_midnight(tz, next),
            }
        })
        .collect();

    DayBuckets {
        time_range: range,
        range_start_utc: local_midnight(tz, today - Duration::days(days_ago)),
        range_end_utc: local_midnight(tz, today + Duration::days(1)),
        buckets,
    }
}

fn day_label(range: TimeRange, date: NaiveDate) -> String {
    match range {
        TimeRange::SevenDays => date.format("%a").to_string(),
        TimeRange::ThirtyDays | TimeRange::NinetyDays => date.format("%b %-d").to_string(),
    }
}

/// First instant of `date` in `tz`, as UTC.
///
/// When midnight is repeated the earlier instant wins. When a DST jump
/// skips midnight the day starts at the first local time that exists.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => (1..=96)
            .map(|quarter| midnight + Duration::minutes(15 * quarter))
            .find_map(|local| tz.from_local_datetime(&local).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use chrono_tz::America::{New_York, Santiago};
    use chrono_tz::Asia::Tokyo;
    use chrono_tz::Tz;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn assert_contiguous(days: &DayBuckets) {
        assert_eq!(days.buckets.first().unwrap().start_utc, days.range_start_utc);
        assert_eq!(days.buckets.last().unwrap().end_utc, days.range_end_utc);
        for pair in days.buckets.windows(2) {
            assert_eq!(pair[0].end_utc, pair[1].start_utc);
            assert!(pair[0].start_utc < pair[1].start_utc);
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_bucket_counts_per_range() {
        let now = utc(2024, 3, 15, 16, 0);
        for (range, n) in [
            (TimeRange::SevenDays, 7),
            (TimeRange::ThirtyDays, 30),
            (TimeRange::NinetyDays, 90),
        ] {
            let days = build_day_buckets(range, now, &New_York);
            assert_eq!(days.buckets.len(), n);
            assert_contiguous(&days);
        }
    }

    #[test]
    fn test_seven_day_example_in_new_york() {
        // 12:00 local (EDT, UTC-4) on 2024-03-15.
        let now = utc(2024, 3, 15, 16, 0);
        let days = build_day_buckets(TimeRange::SevenDays, now, &New_York);

        assert_eq!(days.buckets[0].date, "2024-03-09");
        assert_eq!(days.buckets[6].date, "2024-03-15");
        assert_eq!(days.buckets[6].label, "Fri");
        assert_eq!(days.buckets[0].label, "Sat");
        // 2024-03-09 is still EST (UTC-5); the 16th starts in EDT.
        assert_eq!(days.range_start_utc, utc(2024, 3, 9, 5, 0));
        assert_eq!(days.range_end_utc, utc(2024, 3, 16, 4, 0));

        // DST starts on the 10th: that bucket is 23 hours long.
        let dst_day = &days.buckets[1];
        assert_eq!(dst_day.date, "2024-03-10");
        assert_eq!(dst_day.end_utc - dst_day.start_utc, Duration::hours(23));
    }

    #[test]
    fn test_local_date_differs_from_utc_date() {
        // 23:30 UTC on the 15th is already the 16th in Tokyo.
        let now = utc(2024, 3, 15, 23, 30);
        let days = build_day_buckets(TimeRange::SevenDays, now, &Tokyo);
        assert_eq!(days.buckets.last().unwrap().date, "2024-03-16");
        assert_eq!(days.range_end_utc, utc(2024, 3, 16, 15, 0));

        // And 02:00 UTC on the 16th is still the 15th in New York.
        let now = utc(2024, 3, 16, 2, 0);
        let days = build_day_buckets(TimeRange::SevenDays, now, &New_York);
        assert_eq!(days.buckets.last().unwrap().date, "2024-03-15");
    }

    #[test]
    fn test_utc_bounds_map_back_to_bucket_date() {
        let zones: [Tz; 3] = [New_York, Tokyo, Santiago];
        let now = utc(2024, 11, 5, 12, 0);
        for tz in zones {
            let days = build_day_buckets(TimeRange::NinetyDays, now, &tz);
            assert_contiguous(&days);
            for bucket in &days.buckets {
                let local_start = bucket.start_utc.with_timezone(&tz);
                assert_eq!(local_start.format("%Y-%m-%d").to_string(), bucket.date);
                let last_instant = bucket.end_utc - Duration::seconds(1);
                assert_eq!(
                    last_instant.with_timezone(&tz).format("%Y-%m-%d").to_string(),
                    bucket.date
                );
            }
        }
    }

    #[test]
    fn test_midnight_skipped_by_dst() {
        // Chile moved clocks from 00:00 to 01:00 on 2024-09-08.
        let now = utc(2024, 9, 10, 15, 0);
        let days = build_day_buckets(TimeRange::SevenDays, now, &Santiago);
        let jump = days.buckets.iter().find(|b| b.date == "2024-09-08").unwrap();
        assert_eq!(jump.start_utc, utc(2024, 9, 8, 4, 0));
        assert_contiguous(&days);
    }

    #[test]
    fn test_long_range_labels_and_fixed_offsets() {
        let now = utc(2024, 3, 15, 12, 0);
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let days = build_day_buckets(TimeRange::ThirtyDays, now, &offset);
        assert_eq!(days.buckets.last().unwrap().label, "Mar 15");
        assert_eq!(days.buckets[0].label, "Feb 15");
        assert_eq!(days.buckets[0].start_utc, utc(2024, 2, 14, 18, 30));
    }

    #[test]
    fn test_index_of_respects_half_open_bounds() {
        let now = utc(2024, 3, 15, 12, 0);
        let days = build_day_buckets(TimeRange::SevenDays, now, &Utc);
        assert_eq!(days.index_of(utc(2024, 3, 9, 0, 0)), Some(0));
        assert_eq!(days.index_of(utc(2024, 3, 15, 23, 59)), Some(6));
        assert_eq!(days.index_of(utc(2024, 3, 16, 0, 0)), None);
        assert_eq!(days.index_of(utc(2024, 3, 8, 23, 59)), None);
    }

    #[test]
    fn test_json_field_names() {
        let days = build_day_buckets(TimeRange::SevenDays, utc(2024, 3, 15, 12, 0), &Utc);
        let json = serde_json::to_value(&days).unwrap();
        assert_eq!(json["timeRange"], "7d");
        assert_eq!(json["rangeStartUTC"], "2024-03-09T00:00:00Z");
        assert_eq!(json["buckets"][0]["startUTC"], "2024-03-09T00:00:00Z");
        assert_eq!(json["buckets"][0]["endUTC"], "2024-03-10T00:00:00Z");
        assert_eq!(json["buckets"][0]["date"], "2024-03-09");
    }
}
