//! Management API router: mounts campaign, connection, metrics and chart
//! endpoints under /api/v1.

use crate::handlers::{self, ManagementState};
use axum::routing::{get, patch, post};
use axum::Router;

/// Build the management router. The result is merged into the main app.
pub fn management_router(state: ManagementState) -> Router {
    Router::new()
        // Campaigns
        .route("/api/v1/campaigns", get(handlers::list_campaigns).post(handlers::create_campaign))
        .route("/api/v1/campaigns/:id", get(handlers::get_campaign))
        .route("/api/v1/campaigns/:id/follow-ups/due", get(handlers::due_follow_ups))
        // Connections
        .route("/api/v1/connections", post(handlers::ingest_connections))
        .route("/api/v1/connections/:id", get(handlers::get_connection))
        .route("/api/v1/connections/:id/status", patch(handlers::update_connection_status))
        .route("/api/v1/connections/:id/reply", post(handlers::record_reply))
        // Metrics
        .route("/api/v1/metrics/campaigns", get(handlers::campaign_funnels))
        .route("/api/v1/metrics/campaigns/:id", get(handlers::campaign_engagement))
        // Charts
        .route("/api/v1/dashboard/chart", get(handlers::dashboard_chart))
        .with_state(state)
}
