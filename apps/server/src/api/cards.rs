use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::shared::{resolve_cents, split_ids};
use crate::{error::ApiResult, main_lib::AppState};
use hearth_core::cards::{
    CardInstallment, CardUpdate, ChargeWithInstallments, InstallmentForecast, InstallmentQuery,
    LimitBehavior, NewCard, NewCardCharge, PaymentMethod,
};
use hearth_core::utils::calendar::parse_ymd;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewCardBody {
    user_id: String,
    name: String,
    credit_limit_cents: Option<i64>,
    credit_limit: Option<String>,
    due_day: Option<u32>,
    closing_day: Option<u32>,
    limit_behavior: Option<LimitBehavior>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewChargeBody {
    user_id: String,
    card_id: String,
    purchased_on: NaiveDate,
    description: Option<String>,
    total_cents: Option<i64>,
    total: Option<String>,
    installments_total: u32,
    due_day: Option<u32>,
}

#[derive(Deserialize)]
struct InstallmentsQuery {
    card_ids: Option<String>,
    from: Option<String>,
    to: Option<String>,
    #[serde(default)]
    include_paid: bool,
}

#[derive(Deserialize)]
struct PaidBody {
    paid: bool,
}

#[derive(Deserialize)]
struct ForecastQuery {
    card_ids: Option<String>,
    months: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UsedLimitResponse {
    card_id: String,
    used_limit_cents: i64,
}

async fn list_payment_methods(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PaymentMethod>>> {
    let methods = state.card_service.list_payment_methods(&household_id).await?;
    Ok(Json(methods))
}

async fn list_cards(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PaymentMethod>>> {
    let cards = state.card_service.list_cards(&household_id).await?;
    Ok(Json(cards))
}

async fn add_card(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewCardBody>,
) -> ApiResult<Json<PaymentMethod>> {
    let credit_limit_cents = resolve_cents(
        body.credit_limit_cents,
        body.credit_limit.as_deref(),
        "creditLimit",
    )?;
    let card = state
        .card_service
        .add_card(NewCard {
            household_id,
            created_by: body.user_id,
            name: body.name,
            credit_limit_cents,
            due_day: body.due_day,
            closing_day: body.closing_day,
            limit_behavior: body.limit_behavior,
        })
        .await?;
    Ok(Json(card))
}

async fn update_card(
    Path((household_id, card_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(mut update): Json<CardUpdate>,
) -> ApiResult<Json<PaymentMethod>> {
    update.id = card_id;
    update.household_id = household_id;
    let card = state.card_service.update_card(update).await?;
    Ok(Json(card))
}

async fn get_used_limit(
    Path((household_id, card_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<UsedLimitResponse>> {
    let used_limit_cents = state
        .card_service
        .used_limit_cents(&household_id, &card_id)
        .await?;
    Ok(Json(UsedLimitResponse {
        card_id,
        used_limit_cents,
    }))
}

async fn add_charge(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewChargeBody>,
) -> ApiResult<Json<ChargeWithInstallments>> {
    let total_cents = resolve_cents(body.total_cents, body.total.as_deref(), "total")?;
    let created = state
        .card_service
        .add_charge_with_installments(NewCardCharge {
            household_id,
            created_by: body.user_id,
            card_id: body.card_id,
            purchased_on: body.purchased_on,
            description: body.description,
            total_cents,
            installments_total: body.installments_total,
            due_day: body.due_day,
        })
        .await?;
    Ok(Json(created))
}

async fn list_installments(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<InstallmentsQuery>,
) -> ApiResult<Json<Vec<CardInstallment>>> {
    let from = query.from.as_deref().map(parse_ymd).transpose()?;
    let to = query.to.as_deref().map(parse_ymd).transpose()?;
    let installments = state
        .card_service
        .list_installments(InstallmentQuery {
            household_id,
            card_ids: split_ids(query.card_ids.as_deref()),
            from,
            to,
            include_paid: query.include_paid,
        })
        .await?;
    Ok(Json(installments))
}

async fn set_installment_paid(
    Path((household_id, installment_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaidBody>,
) -> ApiResult<Json<CardInstallment>> {
    let installment = state
        .card_service
        .set_installment_paid(&household_id, &installment_id, body.paid)
        .await?;
    Ok(Json(installment))
}

async fn get_forecast(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> ApiResult<Json<InstallmentForecast>> {
    let card_ids = split_ids(query.card_ids.as_deref());
    let months = query.months.unwrap_or(state.forecast_months);
    let forecast = state
        .card_service
        .forecast(&household_id, &card_ids, months)
        .await?;
    Ok(Json(forecast))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payment-methods", get(list_payment_methods))
        .route("/cards", get(list_cards).post(add_card))
        .route("/cards/{card_id}", put(update_card))
        .route("/cards/{card_id}/used-limit", get(get_used_limit))
        .route("/charges", post(add_charge))
        .route("/installments", get(list_installments))
        .route("/installments/{installment_id}/paid", put(set_installment_paid))
        .route("/forecast", get(get_forecast))
}
