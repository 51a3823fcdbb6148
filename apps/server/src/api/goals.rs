use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::shared::resolve_cents;
use crate::{error::ApiResult, main_lib::AppState};
use hearth_core::goals::{Goal, NewGoal};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewGoalBody {
    user_id: String,
    title: String,
    target_cents: Option<i64>,
    target: Option<String>,
    desired_date: NaiveDate,
}

#[derive(Deserialize)]
struct ContributionsQuery {
    cycle_key: String,
}

async fn list_goals(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state.goal_service.list_goals(&household_id).await?;
    Ok(Json(goals))
}

async fn create_goal(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewGoalBody>,
) -> ApiResult<Json<Goal>> {
    let target_cents = resolve_cents(body.target_cents, body.target.as_deref(), "target")?;
    let goal = state
        .goal_service
        .create_goal(NewGoal {
            household_id,
            created_by: body.user_id,
            title: body.title,
            target_cents,
            desired_date: body.desired_date,
        })
        .await?;
    Ok(Json(goal))
}

async fn get_contributions(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContributionsQuery>,
) -> ApiResult<Json<HashMap<String, i64>>> {
    let contributions = state
        .goal_service
        .contributions_for_cycle(&household_id, &query.cycle_key)
        .await?;
    Ok(Json(contributions))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/contributions", get(get_contributions))
}
