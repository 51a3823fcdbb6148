use std::sync::Arc;

use hearth_core::{
    cards::{CardService, CardServiceTrait},
    closures::{ClosureService, ClosureServiceTrait},
    events::{DomainEventSink, HouseholdEventHub},
    goals::{GoalService, GoalServiceTrait},
    ledger::{LedgerService, LedgerServiceTrait},
    schedule::{PayScheduleService, PayScheduleServiceTrait},
    utils::{Clock, SystemClock},
};
use hearth_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, CardRepository, ClosureRepository,
    GoalRepository, LedgerRepository, PayScheduleRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    /// Household-scoped fan-out of domain events; also the services' sink.
    pub event_hub: Arc<HouseholdEventHub>,
    pub clock: Arc<dyn Clock>,
    pub schedule_service: Arc<dyn PayScheduleServiceTrait>,
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub closure_service: Arc<dyn ClosureServiceTrait>,
    pub card_service: Arc<dyn CardServiceTrait>,
    pub past_cycle_count: usize,
    pub forecast_months: u32,
}

/// Installs the global subscriber. `log` records from the library crates are
/// forwarded into it.
pub fn init_tracing() {
    let log_format = std::env::var("HEARTH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with_clock(config, Arc::new(SystemClock))
}

pub fn build_state_with_clock(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let event_hub = Arc::new(HouseholdEventHub::default());
    let sink: Arc<dyn DomainEventSink> = event_hub.clone();

    let schedule_service = Arc::new(PayScheduleService::new(
        Arc::new(PayScheduleRepository::new(pool.clone(), writer.clone())),
        clock.clone(),
        sink.clone(),
    ));
    let ledger_service = Arc::new(LedgerService::new(
        Arc::new(LedgerRepository::new(pool.clone(), writer.clone())),
        clock.clone(),
        sink.clone(),
    ));

    let goal_repo = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let goal_service = Arc::new(GoalService::new(goal_repo.clone(), sink.clone()));
    let closure_service = Arc::new(ClosureService::new(
        Arc::new(ClosureRepository::new(pool.clone(), writer.clone())),
        goal_repo,
        goal_service.clone(),
        ledger_service.clone(),
        schedule_service.clone(),
        clock.clone(),
        sink.clone(),
    ));
    let card_service = Arc::new(CardService::new(
        Arc::new(CardRepository::new(pool, writer)),
        clock.clone(),
        sink,
    ));

    tracing::info!(
        "State ready (past cycles: {}, forecast months: {})",
        config.past_cycle_count,
        config.forecast_months
    );

    Ok(Arc::new(AppState {
        event_hub,
        clock,
        schedule_service,
        ledger_service,
        goal_service,
        closure_service,
        card_service,
        past_cycle_count: config.past_cycle_count,
        forecast_months: config.forecast_months,
    }))
}
