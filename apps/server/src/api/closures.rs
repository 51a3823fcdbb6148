use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::schedule::CountQuery;
use super::shared::split_ids;
use crate::{error::ApiResult, main_lib::AppState};
use hearth_core::closures::{CloseCycleRequest, ClosureDraft, CycleClosure, CycleStatus};
use hearth_core::goals::GoalAllocation;
use hearth_core::schedule::PayCycle;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenCycleBody {
    cycle_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloseCycleBody {
    user_id: String,
    cycle_key: String,
    net_cents: i64,
    #[serde(default)]
    allocations: Vec<GoalAllocation>,
}

#[derive(Deserialize)]
struct KeysQuery {
    keys: Option<String>,
}

async fn list_closures(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<KeysQuery>,
) -> ApiResult<Json<HashMap<String, CycleClosure>>> {
    let keys = split_ids(query.keys.as_deref());
    let closures = state
        .closure_service
        .list_closures(&household_id, &keys)
        .await?;
    Ok(Json(closures))
}

async fn get_statuses(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<Vec<CycleStatus>>> {
    let count = query.count.unwrap_or(state.past_cycle_count);
    let statuses = state
        .closure_service
        .past_cycle_statuses(&household_id, count)
        .await?;
    Ok(Json(statuses))
}

async fn open_cycle(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<OpenCycleBody>,
) -> ApiResult<Json<ClosureDraft>> {
    let cycle = PayCycle::parse_key(&body.cycle_key)?;
    let draft = state.closure_service.open_cycle(&household_id, &cycle).await?;
    Ok(Json(draft))
}

async fn close_cycle(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CloseCycleBody>,
) -> ApiResult<Json<CycleClosure>> {
    let cycle = PayCycle::parse_key(&body.cycle_key)?;
    let closure = state
        .closure_service
        .close_cycle(CloseCycleRequest {
            household_id,
            user_id: body.user_id,
            cycle,
            net_cents: body.net_cents,
            allocations: body.allocations,
        })
        .await?;
    Ok(Json(closure))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/closures", get(list_closures).post(close_cycle))
        .route("/closures/status", get(get_statuses))
        .route("/closures/open", post(open_cycle))
}
