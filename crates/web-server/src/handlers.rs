use crate::{AppState, stats};
use axum::{
    extract::{Query, State},
    Json,
};
use core_types::{Filters, Overview, RankingEntry, TimeSeriesPoint};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// The envelope every statistics endpoint answers with.
///
/// `success` is always `true`: failures are logged and reported as empty data.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
            message: None,
        }
    }
}

// A query string that does not even parse is treated as "no filters".
fn filters_or_default(query: Option<Query<Filters>>) -> Filters {
    let filters = query.map(|Query(filters)| filters).unwrap_or_default();
    if let Some(manufacturer) = filters.manufacturer() {
        tracing::debug!(manufacturer, "Manufacturer filter is accepted but not applied.");
    }
    filters
}

/// # GET /overview
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    query: Option<Query<Filters>>,
) -> Json<ApiResponse<Overview>> {
    let filters = filters_or_default(query);
    let overview = stats::overview(state.source.as_ref(), &filters)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Overview query failed, answering with zeros.");
            Overview::default()
        });
    Json(ApiResponse::ok(overview))
}

/// # GET /timeseries
/// Monthly points for `ano` (default 2021) and `uf` (default BR).
pub async fn get_timeseries(
    State(state): State<Arc<AppState>>,
    query: Option<Query<Filters>>,
) -> Json<ApiResponse<Vec<TimeSeriesPoint>>> {
    let filters = filters_or_default(query);
    let series = stats::time_series(state.source.as_ref(), &filters)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Time series query failed, answering with an empty list.");
            Vec::new()
        });
    Json(ApiResponse::ok(series))
}

/// # GET /ranking/ufs
pub async fn get_ranking_ufs(
    State(state): State<Arc<AppState>>,
    query: Option<Query<Filters>>,
) -> Json<ApiResponse<Vec<RankingEntry>>> {
    let filters = filters_or_default(query);
    let ranking = stats::ranking(state.source.as_ref(), &filters)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Ranking query failed, answering with an empty list.");
            Vec::new()
        });
    Json(ApiResponse::ok(ranking))
}

/// # GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
