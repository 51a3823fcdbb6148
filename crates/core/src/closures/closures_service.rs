use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::closures_model::{CloseCycleRequest, ClosureDraft, CycleClosure, CycleStatus};
use super::closures_traits::{ClosureRepositoryTrait, ClosureServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::goals::{
    suggested_allocations, validate_allocations, GoalAllocation, GoalContribution,
    GoalRepositoryTrait, GoalServiceTrait,
};
use crate::ledger::LedgerServiceTrait;
use crate::schedule::{PayCycle, PayScheduleServiceTrait};
use crate::utils::Clock;

/// Service for the cycle closure workflow.
pub struct ClosureService {
    closure_repo: Arc<dyn ClosureRepositoryTrait>,
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    goal_service: Arc<dyn GoalServiceTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
    schedule_service: Arc<dyn PayScheduleServiceTrait>,
    clock: Arc<dyn Clock>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl ClosureService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        closure_repo: Arc<dyn ClosureRepositoryTrait>,
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        goal_service: Arc<dyn GoalServiceTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
        schedule_service: Arc<dyn PayScheduleServiceTrait>,
        clock: Arc<dyn Clock>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            closure_repo,
            goal_repo,
            goal_service,
            ledger_service,
            schedule_service,
            clock,
            event_sink,
        }
    }

    fn check_cycle(cycle: &PayCycle) -> Result<()> {
        let expected = PayCycle::key_for(cycle.mode, cycle.start_date, cycle.end_date);
        if cycle.end_date <= cycle.start_date || cycle.cycle_key != expected {
            return Err(ValidationError::InvalidInput(format!(
                "Cycle key '{}' does not match its dates",
                cycle.cycle_key
            ))
            .into());
        }
        Ok(())
    }

    /// Net cash flow a close must distribute: the frozen snapshot once the
    /// cycle is closed, the ledger net over the cycle otherwise.
    async fn settled_net(&self, household_id: &str, cycle: &PayCycle) -> Result<i64> {
        let keys = [cycle.cycle_key.clone()];
        let mut closures = self.list_closures(household_id, &keys).await?;
        if let Some(closure) = closures.remove(&cycle.cycle_key) {
            return Ok(closure.net_cents);
        }
        let net = self
            .ledger_service
            .net_between(household_id, cycle.start_date, cycle.end_date)
            .await?;
        Ok(net.net_cents)
    }
}

#[async_trait]
impl ClosureServiceTrait for ClosureService {
    async fn list_closures(
        &self,
        household_id: &str,
        cycle_keys: &[String],
    ) -> Result<HashMap<String, CycleClosure>> {
        if cycle_keys.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self
            .closure_repo
            .list_closures(household_id, cycle_keys)
            .await?;
        Ok(rows
            .into_iter()
            .map(|closure| (closure.cycle_key.clone(), closure))
            .collect())
    }

    async fn cycle_statuses(
        &self,
        household_id: &str,
        cycles: &[PayCycle],
    ) -> Result<Vec<CycleStatus>> {
        let keys: Vec<String> = cycles.iter().map(|c| c.cycle_key.clone()).collect();
        let mut closures = self.list_closures(household_id, &keys).await?;
        Ok(cycles
            .iter()
            .map(|cycle| CycleStatus {
                cycle: cycle.clone(),
                closure: closures.remove(&cycle.cycle_key),
            })
            .collect())
    }

    async fn past_cycle_statuses(
        &self,
        household_id: &str,
        count: usize,
    ) -> Result<Vec<CycleStatus>> {
        let cycles = self.schedule_service.past_cycles(household_id, count).await?;
        self.cycle_statuses(household_id, &cycles).await
    }

    async fn open_cycle(&self, household_id: &str, cycle: &PayCycle) -> Result<ClosureDraft> {
        Self::check_cycle(cycle)?;
        let keys = [cycle.cycle_key.clone()];
        let (goals, mut closures) = futures::try_join!(
            self.goal_service.list_goals(household_id),
            self.list_closures(household_id, &keys)
        )?;

        let draft = match closures.remove(&cycle.cycle_key) {
            Some(closure) => {
                let existing = self
                    .goal_service
                    .contributions_for_cycle(household_id, &cycle.cycle_key)
                    .await?;
                let allocations = goals
                    .iter()
                    .map(|g| {
                        let amount = existing.get(&g.id).copied().unwrap_or(0);
                        GoalAllocation::new(g.id.clone(), amount)
                    })
                    .collect();
                ClosureDraft {
                    cycle: cycle.clone(),
                    is_closed: true,
                    net_cents: closure.net_cents,
                    goals,
                    allocations,
                    existing,
                }
            }
            None => {
                let net = self
                    .ledger_service
                    .net_between(household_id, cycle.start_date, cycle.end_date)
                    .await?;
                let allocations = suggested_allocations(net.net_cents, &goals);
                ClosureDraft {
                    cycle: cycle.clone(),
                    is_closed: false,
                    net_cents: net.net_cents,
                    goals,
                    allocations,
                    existing: HashMap::new(),
                }
            }
        };
        debug!(
            "Opened cycle {} for household {} (closed: {}, net: {})",
            cycle.cycle_key, household_id, draft.is_closed, draft.net_cents
        );
        Ok(draft)
    }

    async fn close_cycle(&self, request: CloseCycleRequest) -> Result<CycleClosure> {
        Self::check_cycle(&request.cycle)?;
        let net_cents = self
            .settled_net(&request.household_id, &request.cycle)
            .await?;
        if request.net_cents != net_cents {
            return Err(ValidationError::NetMismatch {
                submitted_cents: request.net_cents,
                expected_cents: net_cents,
            }
            .into());
        }
        let allocated_cents = validate_allocations(net_cents, &request.allocations)?;

        let now = self.clock.now();
        let cycle = &request.cycle;
        let contributions: Vec<GoalContribution> = request
            .allocations
            .iter()
            .map(|allocation| GoalContribution {
                household_id: request.household_id.clone(),
                goal_id: allocation.goal_id.clone(),
                cycle_key: cycle.cycle_key.clone(),
                cycle_start: cycle.start_date,
                cycle_end: cycle.end_date,
                amount_cents: allocation.amount_cents,
                updated_by: Some(request.user_id.clone()),
                updated_at: Some(now),
            })
            .collect();
        self.goal_repo.upsert_contributions(contributions).await?;

        let closure = self
            .closure_repo
            .upsert_closure(CycleClosure {
                household_id: request.household_id.clone(),
                cycle_key: cycle.cycle_key.clone(),
                mode: cycle.mode,
                cycle_start: cycle.start_date,
                cycle_end: cycle.end_date,
                net_cents,
                allocated_cents,
                created_at: None,
                updated_by: Some(request.user_id.clone()),
                updated_at: Some(now),
            })
            .await?;

        info!(
            "Closed cycle {} for household {}: net {} cents, allocated {} cents",
            closure.cycle_key, closure.household_id, closure.net_cents, closure.allocated_cents
        );
        self.event_sink.emit_batch(vec![
            DomainEvent::cycle_closed(&request.household_id, &cycle.cycle_key),
            DomainEvent::goals_changed(&request.household_id),
        ]);
        Ok(closure)
    }
}
