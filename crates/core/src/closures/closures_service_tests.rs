//! Unit tests for the closure workflow and the status loader.

use super::*;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, MockDomainEventSink};
use crate::goals::{
    Goal, GoalAllocation, GoalContribution, GoalRepositoryTrait, GoalService, NewGoal,
};
use crate::ledger::{
    Category, LedgerServiceTrait, MonthBreakdown, NetCashFlow, NewCategory, NewTransaction,
    Transaction, TransactionType,
};
use crate::schedule::{
    CyclePair, PayCycle, PaySchedule, PayScheduleInfo, PayScheduleMode, PayScheduleServiceTrait,
    PayScheduleUpdate,
};
use crate::utils::FixedClock;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// ============================================================================
// Mock Implementations
// ============================================================================

#[derive(Default)]
struct MockClosureRepository {
    rows: Mutex<Vec<CycleClosure>>,
    list_calls: AtomicUsize,
}

#[async_trait]
impl ClosureRepositoryTrait for MockClosureRepository {
    async fn list_closures(
        &self,
        household_id: &str,
        cycle_keys: &[String],
    ) -> Result<Vec<CycleClosure>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.household_id == household_id && cycle_keys.contains(&c.cycle_key))
            .cloned()
            .collect())
    }

    async fn upsert_closure(&self, closure: CycleClosure) -> Result<CycleClosure> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|c| {
            !(c.household_id == closure.household_id && c.cycle_key == closure.cycle_key)
        });
        rows.push(closure.clone());
        Ok(closure)
    }
}

#[derive(Default)]
struct MockGoalRepository {
    goals: Mutex<Vec<Goal>>,
    contributions: Mutex<Vec<GoalContribution>>,
}

#[async_trait]
impl GoalRepositoryTrait for MockGoalRepository {
    async fn list_goals(&self, household_id: &str) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.household_id == household_id)
            .cloned()
            .collect())
    }

    async fn insert_goal(&self, _new_goal: NewGoal) -> Result<Goal> {
        unimplemented!()
    }

    async fn list_contributions(&self, household_id: &str) -> Result<Vec<GoalContribution>> {
        Ok(self
            .contributions
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.household_id == household_id)
            .cloned()
            .collect())
    }

    async fn list_contributions_for_cycle(
        &self,
        household_id: &str,
        cycle_key: &str,
    ) -> Result<Vec<GoalContribution>> {
        Ok(self
            .list_contributions(household_id)
            .await?
            .into_iter()
            .filter(|c| c.cycle_key == cycle_key)
            .collect())
    }

    async fn upsert_contributions(&self, contributions: Vec<GoalContribution>) -> Result<usize> {
        let mut rows = self.contributions.lock().unwrap();
        let count = contributions.len();
        for contribution in contributions {
            rows.retain(|c| {
                !(c.household_id == contribution.household_id
                    && c.goal_id == contribution.goal_id
                    && c.cycle_key == contribution.cycle_key)
            });
            rows.push(contribution);
        }
        Ok(count)
    }
}

struct MockLedgerService {
    net_cents: Mutex<i64>,
}

#[async_trait]
impl LedgerServiceTrait for MockLedgerService {
    async fn add_transaction(&self, _new_transaction: NewTransaction) -> Result<Transaction> {
        unimplemented!()
    }

    async fn list_transactions_by_month(
        &self,
        _household_id: &str,
        _month: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        unimplemented!()
    }

    async fn list_recent_transactions(
        &self,
        _household_id: &str,
        _days: u32,
    ) -> Result<Vec<Transaction>> {
        unimplemented!()
    }

    async fn net_between(
        &self,
        _household_id: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<NetCashFlow> {
        let net_cents = *self.net_cents.lock().unwrap();
        Ok(NetCashFlow {
            income_cents: net_cents.max(0),
            expense_cents: (-net_cents).max(0),
            net_cents,
        })
    }

    async fn monthly_net(&self, _household_id: &str, _month: NaiveDate) -> Result<NetCashFlow> {
        unimplemented!()
    }

    async fn month_breakdown(
        &self,
        _household_id: &str,
        _month: NaiveDate,
    ) -> Result<MonthBreakdown> {
        unimplemented!()
    }

    async fn list_categories(
        &self,
        _household_id: &str,
        _flow: Option<TransactionType>,
    ) -> Result<Vec<Category>> {
        unimplemented!()
    }

    async fn create_category(&self, _new_category: NewCategory) -> Result<Category> {
        unimplemented!()
    }

    async fn seed_default_categories(&self, _household_id: &str) -> Result<usize> {
        unimplemented!()
    }
}

struct MockScheduleService {
    past: Vec<PayCycle>,
}

#[async_trait]
impl PayScheduleServiceTrait for MockScheduleService {
    async fn get_schedule_info(&self, _household_id: &str) -> Result<PayScheduleInfo> {
        unimplemented!()
    }

    async fn set_schedule(&self, _update: PayScheduleUpdate) -> Result<PaySchedule> {
        unimplemented!()
    }

    async fn move_start_back_one_month(
        &self,
        _household_id: &str,
        _user_id: &str,
    ) -> Result<PaySchedule> {
        unimplemented!()
    }

    async fn current_cycles(&self, _household_id: &str) -> Result<CyclePair> {
        unimplemented!()
    }

    async fn past_cycles(&self, _household_id: &str, count: usize) -> Result<Vec<PayCycle>> {
        Ok(self.past.iter().take(count).cloned().collect())
    }
}

/// Closure service whose responses are released by the test, in any order.
#[derive(Default)]
struct GatedClosureService {
    pending: Mutex<VecDeque<oneshot::Receiver<Result<HashMap<String, CycleClosure>>>>>,
}

#[async_trait]
impl ClosureServiceTrait for GatedClosureService {
    async fn list_closures(
        &self,
        _household_id: &str,
        _cycle_keys: &[String],
    ) -> Result<HashMap<String, CycleClosure>> {
        let gate = self.pending.lock().unwrap().pop_front().unwrap();
        gate.await.unwrap()
    }

    async fn cycle_statuses(
        &self,
        _household_id: &str,
        _cycles: &[PayCycle],
    ) -> Result<Vec<CycleStatus>> {
        unimplemented!()
    }

    async fn past_cycle_statuses(
        &self,
        _household_id: &str,
        _count: usize,
    ) -> Result<Vec<CycleStatus>> {
        unimplemented!()
    }

    async fn open_cycle(&self, _household_id: &str, _cycle: &PayCycle) -> Result<ClosureDraft> {
        unimplemented!()
    }

    async fn close_cycle(&self, _request: CloseCycleRequest) -> Result<CycleClosure> {
        unimplemented!()
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Fixture {
    service: ClosureService,
    closures: Arc<MockClosureRepository>,
    goals: Arc<MockGoalRepository>,
    ledger: Arc<MockLedgerService>,
    sink: MockDomainEventSink,
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn goal(id: &str, target_cents: i64, desired: NaiveDate) -> Goal {
    Goal {
        id: id.to_string(),
        household_id: "hh".to_string(),
        created_by: None,
        title: id.to_string(),
        target_cents,
        desired_date: desired,
        created_at: None,
        current_cents: 0,
    }
}

fn february() -> PayCycle {
    PayCycle::new(PayScheduleMode::Month, d(2026, 2, 1), d(2026, 3, 1))
}

fn january() -> PayCycle {
    PayCycle::new(PayScheduleMode::Month, d(2026, 1, 1), d(2026, 2, 1))
}

fn fixture(net_cents: i64) -> Fixture {
    let closures = Arc::new(MockClosureRepository::default());
    let goals = Arc::new(MockGoalRepository::default());
    goals.goals.lock().unwrap().extend([
        goal("trip", 100_000, d(2026, 6, 1)),
        goal("car", 500_000, d(2027, 1, 1)),
    ]);
    let ledger = Arc::new(MockLedgerService {
        net_cents: Mutex::new(net_cents),
    });
    let sink = MockDomainEventSink::new();
    let goal_service = Arc::new(GoalService::new(goals.clone(), Arc::new(sink.clone())));
    let service = ClosureService::new(
        closures.clone(),
        goals.clone(),
        goal_service,
        ledger.clone(),
        Arc::new(MockScheduleService {
            past: vec![february(), january()],
        }),
        Arc::new(FixedClock::on(d(2026, 3, 15))),
        Arc::new(sink.clone()),
    );
    Fixture {
        service,
        closures,
        goals,
        ledger,
        sink,
    }
}

fn close_request(net_cents: i64, allocations: Vec<GoalAllocation>) -> CloseCycleRequest {
    CloseCycleRequest {
        household_id: "hh".into(),
        user_id: "u1".into(),
        cycle: february(),
        net_cents,
        allocations,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_open_cycle_suggests_from_ledger_net() {
    let f = fixture(120_000);
    let draft = f.service.open_cycle("hh", &february()).await.unwrap();
    assert!(!draft.is_closed);
    assert_eq!(draft.net_cents, 120_000);
    assert_eq!(
        draft.allocations,
        vec![
            GoalAllocation::new("trip", 100_000),
            GoalAllocation::new("car", 20_000),
        ]
    );
    assert!(draft.existing.is_empty());
}

#[tokio::test]
async fn test_closed_cycle_reopens_with_frozen_snapshot() {
    let f = fixture(80_000);
    f.service
        .close_cycle(close_request(80_000, vec![GoalAllocation::new("car", 30_000)]))
        .await
        .unwrap();

    // The ledger moves on, the snapshot does not.
    *f.ledger.net_cents.lock().unwrap() = 5_000;
    let draft = f.service.open_cycle("hh", &february()).await.unwrap();
    assert!(draft.is_closed);
    assert_eq!(draft.net_cents, 80_000);
    assert_eq!(
        draft.allocations,
        vec![GoalAllocation::new("trip", 0), GoalAllocation::new("car", 30_000)]
    );
    assert_eq!(draft.existing.get("car"), Some(&30_000));
    let car = draft.goals.iter().find(|g| g.id == "car").unwrap();
    assert_eq!(car.current_cents, 30_000);
}

#[tokio::test]
async fn test_reclose_overwrites_instead_of_accumulating() {
    let f = fixture(100_000);
    f.service
        .close_cycle(close_request(
            100_000,
            vec![GoalAllocation::new("trip", 60_000), GoalAllocation::new("car", 40_000)],
        ))
        .await
        .unwrap();
    let closure = f
        .service
        .close_cycle(close_request(
            100_000,
            vec![GoalAllocation::new("trip", 0), GoalAllocation::new("car", 25_000)],
        ))
        .await
        .unwrap();

    assert_eq!(closure.allocated_cents, 25_000);
    assert_eq!(f.closures.rows.lock().unwrap().len(), 1);

    let contributions = f.goals.contributions.lock().unwrap().clone();
    assert_eq!(contributions.len(), 2);
    let amount = |goal_id: &str| {
        contributions
            .iter()
            .find(|c| c.goal_id == goal_id)
            .map(|c| c.amount_cents)
    };
    assert_eq!(amount("trip"), Some(0));
    assert_eq!(amount("car"), Some(25_000));
    assert!(contributions.iter().all(|c| c.updated_by.as_deref() == Some("u1")));
}

#[tokio::test]
async fn test_close_emits_cycle_and_goal_events() {
    let f = fixture(10_000);
    f.service
        .close_cycle(close_request(10_000, vec![GoalAllocation::new("trip", 10_000)]))
        .await
        .unwrap();
    assert_eq!(
        f.sink.events(),
        vec![
            DomainEvent::cycle_closed("hh", "month:2026-02-01->2026-03-01"),
            DomainEvent::goals_changed("hh"),
        ]
    );
}

#[tokio::test]
async fn test_invalid_close_writes_nothing() {
    let f = fixture(10_000);
    let cases = vec![
        close_request(10_000, vec![GoalAllocation::new("trip", 0)]),
        close_request(10_000, vec![GoalAllocation::new("trip", 10_001)]),
    ];
    for request in cases {
        let err = f.service.close_cycle(request).await.unwrap_err();
        assert!(err.is_validation());
    }

    let mut tampered = close_request(10_000, vec![GoalAllocation::new("trip", 100)]);
    tampered.cycle.end_date = d(2026, 3, 2);
    assert!(matches!(
        f.service.close_cycle(tampered).await,
        Err(Error::Validation(ValidationError::InvalidInput(_)))
    ));

    assert!(f.closures.rows.lock().unwrap().is_empty());
    assert!(f.goals.contributions.lock().unwrap().is_empty());
    assert!(f.sink.is_empty());
}

#[tokio::test]
async fn test_close_rejects_net_that_differs_from_ledger() {
    let f = fixture(10_000);
    let forged = close_request(9_000_000, vec![GoalAllocation::new("trip", 9_000_000)]);
    assert!(matches!(
        f.service.close_cycle(forged).await,
        Err(Error::Validation(ValidationError::NetMismatch {
            submitted_cents: 9_000_000,
            expected_cents: 10_000,
        }))
    ));
    assert!(f.closures.rows.lock().unwrap().is_empty());
    assert!(f.goals.contributions.lock().unwrap().is_empty());
    assert!(f.sink.is_empty());
}

#[tokio::test]
async fn test_close_with_no_positive_ledger_net_is_rejected() {
    let f = fixture(0);
    assert!(matches!(
        f.service
            .close_cycle(close_request(0, vec![GoalAllocation::new("trip", 1)]))
            .await,
        Err(Error::Validation(ValidationError::NonPositiveNet { net_cents: 0 }))
    ));
}

#[tokio::test]
async fn test_reclose_is_checked_against_the_stored_snapshot() {
    let f = fixture(10_000);
    f.service
        .close_cycle(close_request(10_000, vec![GoalAllocation::new("trip", 4_000)]))
        .await
        .unwrap();

    *f.ledger.net_cents.lock().unwrap() = 5_000;
    let err = f
        .service
        .close_cycle(close_request(5_000, vec![GoalAllocation::new("trip", 5_000)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::NetMismatch {
            expected_cents: 10_000,
            ..
        })
    ));

    let closure = f
        .service
        .close_cycle(close_request(10_000, vec![GoalAllocation::new("trip", 7_000)]))
        .await
        .unwrap();
    assert_eq!(closure.net_cents, 10_000);
    assert_eq!(closure.allocated_cents, 7_000);
    let rows = f.closures.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].net_cents, 10_000);
}

#[tokio::test]
async fn test_list_closures_with_no_keys_skips_repository() {
    let f = fixture(0);
    let map = f.service.list_closures("hh", &[]).await.unwrap();
    assert!(map.is_empty());
    assert_eq!(f.closures.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_past_cycle_statuses_mark_closed_cycles() {
    let f = fixture(50_000);
    f.service
        .close_cycle(close_request(50_000, vec![GoalAllocation::new("trip", 50_000)]))
        .await
        .unwrap();
    let statuses = f.service.past_cycle_statuses("hh", 12).await.unwrap();
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].is_closed());
    assert_eq!(statuses[0].cycle, february());
    assert!(!statuses[1].is_closed());
}

#[tokio::test]
async fn test_status_loader_drops_stale_response() {
    let gated = Arc::new(GatedClosureService::default());
    let (old_tx, old_rx) = oneshot::channel();
    let (new_tx, new_rx) = oneshot::channel();
    gated.pending.lock().unwrap().extend([old_rx, new_rx]);
    let loader = ClosureStatusLoader::new(gated.clone());
    let keys = vec![february().cycle_key];

    let closure = CycleClosure {
        household_id: "hh".into(),
        cycle_key: february().cycle_key,
        mode: PayScheduleMode::Month,
        cycle_start: d(2026, 2, 1),
        cycle_end: d(2026, 3, 1),
        net_cents: 1_000,
        allocated_cents: 1_000,
        created_at: None,
        updated_by: None,
        updated_at: None,
    };
    let fresh = HashMap::from([(closure.cycle_key.clone(), closure)]);

    let (old, new, _) = tokio::join!(
        loader.refresh("hh", &keys),
        loader.refresh("hh", &keys),
        async {
            new_tx.send(Ok(fresh.clone())).unwrap();
            tokio::task::yield_now().await;
            old_tx.send(Ok(HashMap::new())).unwrap();
        }
    );
    assert!(new.unwrap());
    assert!(!old.unwrap());
    assert_eq!(loader.snapshot(), fresh);
    assert!(loader.is_closed(&february().cycle_key));
}

#[tokio::test]
async fn test_status_loader_keeps_previous_map_on_failure() {
    let gated = Arc::new(GatedClosureService::default());
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    gated.pending.lock().unwrap().extend([first_rx, second_rx]);
    let loader = ClosureStatusLoader::new(gated.clone());
    let keys = vec![january().cycle_key];

    let closure = CycleClosure {
        household_id: "hh".into(),
        cycle_key: january().cycle_key,
        mode: PayScheduleMode::Month,
        cycle_start: d(2026, 1, 1),
        cycle_end: d(2026, 2, 1),
        net_cents: 500,
        allocated_cents: 200,
        created_at: None,
        updated_by: None,
        updated_at: None,
    };
    first_tx
        .send(Ok(HashMap::from([(closure.cycle_key.clone(), closure.clone())])))
        .unwrap();
    assert!(loader.refresh("hh", &keys).await.unwrap());

    second_tx
        .send(Err(Error::Repository("backend unavailable".into())))
        .unwrap();
    assert!(loader.refresh("hh", &keys).await.is_err());
    assert_eq!(loader.closure(&january().cycle_key), Some(closure));
}
