use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::shared::resolve_cents;
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use hearth_core::ledger::{
    Category, CategoryKind, MonthBreakdown, NetCashFlow, NewCategory, NewTransaction, Transaction,
    TransactionType,
};
use hearth_core::utils::calendar::{month_start, parse_month_key, parse_ymd};

#[derive(Deserialize)]
struct TransactionsQuery {
    month: Option<String>,
    days: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewTransactionBody {
    user_id: String,
    #[serde(rename = "type")]
    tx_type: TransactionType,
    amount_cents: Option<i64>,
    amount: Option<String>,
    note: Option<String>,
    category_id: Option<String>,
    occurred_on: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct RangeQuery {
    start: String,
    end: String,
}

#[derive(Deserialize)]
struct MonthQuery {
    month: Option<String>,
}

#[derive(Deserialize)]
struct FlowQuery {
    flow: Option<TransactionType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewCategoryBody {
    flow: TransactionType,
    #[serde(default)]
    kind: CategoryKind,
    name: String,
    icon: Option<String>,
    sort: Option<u32>,
}

#[derive(Serialize)]
struct SeedResponse {
    inserted: usize,
}

/// `YYYY-MM` from the query, or the current month.
fn resolve_month(state: &AppState, month: Option<&str>) -> ApiResult<NaiveDate> {
    match month {
        Some(text) => Ok(parse_month_key(text)?),
        None => Ok(month_start(state.clock.today())),
    }
}

async fn list_transactions(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionsQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let transactions = match (query.month.as_deref(), query.days) {
        (Some(_), Some(_)) => {
            return Err(ApiError::BadRequest(
                "month and days cannot be combined".to_string(),
            ))
        }
        (None, Some(days)) => {
            state
                .ledger_service
                .list_recent_transactions(&household_id, days)
                .await?
        }
        (month, None) => {
            let month = resolve_month(&state, month)?;
            state
                .ledger_service
                .list_transactions_by_month(&household_id, month)
                .await?
        }
    };
    Ok(Json(transactions))
}

async fn add_transaction(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewTransactionBody>,
) -> ApiResult<Json<Transaction>> {
    let amount_cents = resolve_cents(body.amount_cents, body.amount.as_deref(), "amount")?;
    let transaction = state
        .ledger_service
        .add_transaction(NewTransaction {
            household_id,
            created_by: body.user_id,
            tx_type: body.tx_type,
            amount_cents,
            note: body.note,
            category_id: body.category_id,
            occurred_on: body.occurred_on,
        })
        .await?;
    Ok(Json(transaction))
}

async fn get_net(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<NetCashFlow>> {
    let start = parse_ymd(&query.start)?;
    let end = parse_ymd(&query.end)?;
    let net = state
        .ledger_service
        .net_between(&household_id, start, end)
        .await?;
    Ok(Json(net))
}

async fn get_breakdown(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<MonthBreakdown>> {
    let month = resolve_month(&state, query.month.as_deref())?;
    let breakdown = state
        .ledger_service
        .month_breakdown(&household_id, month)
        .await?;
    Ok(Json(breakdown))
}

async fn list_categories(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlowQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state
        .ledger_service
        .list_categories(&household_id, query.flow)
        .await?;
    Ok(Json(categories))
}

async fn create_category(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewCategoryBody>,
) -> ApiResult<Json<Category>> {
    let category = state
        .ledger_service
        .create_category(NewCategory {
            household_id,
            flow: body.flow,
            kind: body.kind,
            name: body.name,
            icon: body.icon,
            sort: body.sort,
        })
        .await?;
    Ok(Json(category))
}

async fn seed_categories(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SeedResponse>> {
    let inserted = state
        .ledger_service
        .seed_default_categories(&household_id)
        .await?;
    Ok(Json(SeedResponse { inserted }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transactions", get(list_transactions).post(add_transaction))
        .route("/net", get(get_net))
        .route("/breakdown", get(get_breakdown))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/seed", post(seed_categories))
}
