use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use hearth_core::schedule::{
    CyclePair, PayCycle, PaySchedule, PayScheduleInfo, PayScheduleMode, PayScheduleUpdate,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleBody {
    user_id: String,
    mode: PayScheduleMode,
    start_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserBody {
    pub(super) user_id: String,
}

#[derive(Deserialize)]
pub(super) struct CountQuery {
    pub(super) count: Option<usize>,
}

async fn get_schedule(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PayScheduleInfo>> {
    let info = state.schedule_service.get_schedule_info(&household_id).await?;
    Ok(Json(info))
}

async fn put_schedule(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScheduleBody>,
) -> ApiResult<Json<PaySchedule>> {
    let schedule = state
        .schedule_service
        .set_schedule(PayScheduleUpdate {
            household_id,
            user_id: body.user_id,
            mode: body.mode,
            start_date: body.start_date,
        })
        .await?;
    Ok(Json(schedule))
}

async fn move_start_back(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UserBody>,
) -> ApiResult<Json<PaySchedule>> {
    let schedule = state
        .schedule_service
        .move_start_back_one_month(&household_id, &body.user_id)
        .await?;
    Ok(Json(schedule))
}

async fn get_cycles(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CyclePair>> {
    let cycles = state.schedule_service.current_cycles(&household_id).await?;
    Ok(Json(cycles))
}

async fn get_past_cycles(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<Vec<PayCycle>>> {
    let count = query.count.unwrap_or(state.past_cycle_count);
    let cycles = state
        .schedule_service
        .past_cycles(&household_id, count)
        .await?;
    Ok(Json(cycles))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schedule", get(get_schedule).put(put_schedule))
        .route("/schedule/move-start-back", post(move_start_back))
        .route("/cycles", get(get_cycles))
        .route("/cycles/past", get(get_past_cycles))
}
