//! Campaign reporting: funnel roll-ups, calendar-day buckets and the
//! activity series charted over them.
//!
//! Everything here is a pure function of already-fetched rows and an
//! explicit "now"; nothing reads the clock or touches storage.

pub mod activity;
pub mod day_buckets;
pub mod funnel;

pub use activity::{build_activity_series, count_in_buckets, ActivitySeries};
pub use day_buckets::{build_day_buckets, DayBucket, DayBuckets};
pub use funnel::{
    aggregate_funnels, percent_rate, summarize_engagement, CampaignFunnel, EngagementSummary,
    FunnelCounts, FunnelReport,
};
