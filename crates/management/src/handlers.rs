//! Axum REST handlers for the outreach management API.
//!
//! Handlers take "now" from the clock once, at the boundary, and hand
//! store snapshots to the pure reporting and delivery functions.

use crate::models::*;
use crate::store::OutreachStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use chrono_tz::Tz;
use outreach_core::{Campaign, ConnectionRecord, OutreachError, TimeRange};
use outreach_delivery::select_due;
use outreach_reporting::{
    build_activity_series, build_day_buckets, summarize_engagement, EngagementSummary,
    FunnelReport,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Reporting fallbacks applied when a request leaves them out.
#[derive(Debug, Clone, Copy)]
pub struct ReportingDefaults {
    pub timezone: Tz,
    pub time_range: TimeRange,
}

impl Default for ReportingDefaults {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            time_range: TimeRange::SevenDays,
        }
    }
}

/// Shared management state.
#[derive(Clone)]
pub struct ManagementState {
    pub store: Arc<OutreachStore>,
    pub reporting: ReportingDefaults,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error to an HTTP status and JSON error body.
pub fn api_error(err: OutreachError) -> ApiError {
    let (status, code) = match &err {
        OutreachError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
        OutreachError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        OutreachError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else {
        warn!(error = %err, code, "Request rejected");
    }
    metrics::counter!("outreach.api.errors", "code" => code).increment(1);
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

fn campaign_or_404(state: &ManagementState, id: &str) -> Result<Campaign, ApiError> {
    state
        .store
        .get_campaign(id)
        .ok_or_else(|| api_error(OutreachError::NotFound(format!("campaign {id}"))))
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn list_campaigns(State(state): State<ManagementState>) -> Json<Vec<Campaign>> {
    Json(state.store.list_campaigns())
}

pub async fn get_campaign(
    State(state): State<ManagementState>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    campaign_or_404(&state, &id).map(Json)
}

pub async fn create_campaign(
    State(state): State<ManagementState>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(api_error(OutreachError::InvalidArgument(
            "campaign 'name' must not be empty".to_string(),
        )));
    }
    let campaign = state.store.create_campaign(req, Utc::now());
    metrics::counter!("outreach.campaigns.created").increment(1);
    Ok((StatusCode::CREATED, Json(campaign)))
}

// ─── Connections ───────────────────────────────────────────────────────────

pub async fn ingest_connections(
    State(state): State<ManagementState>,
    Json(req): Json<IngestConnectionsRequest>,
) -> (StatusCode, Json<IngestSummary>) {
    let summary = state.store.insert_connections(req.connections);
    if summary.unrecognized_status > 0 {
        warn!(
            count = summary.unrecognized_status,
            "Ingested rows with unrecognized status; they will not be counted"
        );
    }
    metrics::counter!("outreach.connections.ingested").increment(summary.stored as u64);
    (StatusCode::ACCEPTED, Json(summary))
}

pub async fn get_connection(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionRecord>, ApiError> {
    state
        .store
        .get_connection(id)
        .map(Json)
        .ok_or_else(|| api_error(OutreachError::NotFound(format!("connection {id}"))))
}

pub async fn update_connection_status(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<ConnectionRecord>, ApiError> {
    let at = req.at.unwrap_or_else(Utc::now);
    let record = state
        .store
        .update_status(id, req.status, at)
        .map_err(api_error)?;
    metrics::counter!("outreach.connections.transitions", "to" => record.status.to_string())
        .increment(1);
    Ok(Json(record))
}

pub async fn record_reply(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<ConnectionRecord>, ApiError> {
    let at = req.at.unwrap_or_else(Utc::now);
    state.store.record_reply(id, at).map(Json).map_err(api_error)
}

// ─── Metrics ───────────────────────────────────────────────────────────────

/// GET /api/v1/metrics/campaigns: funnel counts and response rate per campaign.
pub async fn campaign_funnels(
    State(state): State<ManagementState>,
    Query(query): Query<FunnelQuery>,
) -> Json<FunnelReport> {
    let rows = state.store.status_rows(query.campaign_id.as_deref());
    Json(FunnelReport::from_rows(&rows))
}

/// GET /api/v1/metrics/campaigns/:id: funnel plus reply and follow-up activity.
pub async fn campaign_engagement(
    State(state): State<ManagementState>,
    Path(id): Path<String>,
) -> Result<Json<EngagementSummary>, ApiError> {
    let campaign = campaign_or_404(&state, &id)?;
    let records = state.store.connections(Some(&campaign.id));
    Ok(Json(summarize_engagement(&campaign.id, &records)))
}

/// GET /api/v1/dashboard/chart: day buckets for the viewer's calendar and
/// the activity counted into them.
pub async fn dashboard_chart(
    State(state): State<ManagementState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let time_range = match query.time_range.as_deref() {
        Some(raw) => raw.parse::<TimeRange>().map_err(api_error)?,
        None => state.reporting.time_range,
    };
    let timezone = match query.tz.as_deref() {
        Some(name) => name.parse::<Tz>().map_err(|_| {
            api_error(OutreachError::InvalidArgument(format!(
                "unknown timezone '{name}'"
            )))
        })?,
        None => state.reporting.timezone,
    };

    let days = build_day_buckets(time_range, Utc::now(), &timezone);
    let records = state.store.connections(query.campaign_id.as_deref());
    let series = build_activity_series(&days, &records);

    Ok(Json(ChartResponse {
        timezone: timezone.name().to_string(),
        days,
        series,
    }))
}

// ─── Follow-ups ────────────────────────────────────────────────────────────

/// GET /api/v1/campaigns/:id/follow-ups/due: connections owed a follow-up now.
pub async fn due_follow_ups(
    State(state): State<ManagementState>,
    Path(id): Path<String>,
) -> Result<Json<DueFollowUpsResponse>, ApiError> {
    let campaign = campaign_or_404(&state, &id)?;
    let now = Utc::now();
    let records = state.store.connections(Some(&campaign.id));
    let candidates = select_due(&campaign, &records, now);
    info!(campaign_id = %campaign.id, due = candidates.len(), "Evaluated due follow-ups");
    Ok(Json(DueFollowUpsResponse {
        campaign_id: campaign.id,
        evaluated_at: now,
        candidates,
    }))
}
