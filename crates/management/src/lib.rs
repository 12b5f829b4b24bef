//! Outreach management backend: campaigns, connection rows, funnel
//! metrics, dashboard charts and follow-up scheduling views.
//!
//! Data stored in DashMap (development); the production deployment reads
//! the same shapes from Postgres.

pub mod handlers;
pub mod models;
pub mod router;
pub mod store;

pub use handlers::{ManagementState, ReportingDefaults};
pub use router::management_router;
pub use store::OutreachStore;
