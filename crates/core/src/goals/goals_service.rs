use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::goals_model::{Goal, NewGoal};
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};

/// Service for managing goals
pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl GoalService {
    pub fn new(
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        GoalService {
            goal_repo,
            event_sink,
        }
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    async fn list_goals(&self, household_id: &str) -> Result<Vec<Goal>> {
        let (mut goals, contributions) = futures::try_join!(
            self.goal_repo.list_goals(household_id),
            self.goal_repo.list_contributions(household_id)
        )?;

        let mut progress: HashMap<String, i64> = HashMap::new();
        for contribution in contributions {
            *progress.entry(contribution.goal_id).or_insert(0) += contribution.amount_cents;
        }
        for goal in &mut goals {
            goal.current_cents = progress.get(&goal.id).copied().unwrap_or(0);
        }
        Ok(goals)
    }

    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        let title = new_goal.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title".to_string()).into());
        }
        if new_goal.target_cents <= 0 {
            return Err(ValidationError::InvalidAmount(
                "Goal target must be positive".to_string(),
            )
            .into());
        }
        let household_id = new_goal.household_id.clone();
        let goal = self
            .goal_repo
            .insert_goal(NewGoal { title, ..new_goal })
            .await?;
        debug!("Created goal {} for household {}", goal.id, household_id);
        self.event_sink.emit(DomainEvent::goals_changed(household_id));
        Ok(goal)
    }

    async fn contributions_for_cycle(
        &self,
        household_id: &str,
        cycle_key: &str,
    ) -> Result<HashMap<String, i64>> {
        let rows = self
            .goal_repo
            .list_contributions_for_cycle(household_id, cycle_key)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.goal_id, row.amount_cents))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MockDomainEventSink;
    use crate::goals::goals_model::GoalContribution;
    use chrono::NaiveDate;
    use std::sync::Mutex;

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

        async fn insert_goal(&self, new_goal: NewGoal) -> Result<Goal> {
            let mut goals = self.goals.lock().unwrap();
            let goal = Goal {
                id: format!("goal-{}", goals.len() + 1),
                household_id: new_goal.household_id,
                created_by: Some(new_goal.created_by),
                title: new_goal.title,
                target_cents: new_goal.target_cents,
                desired_date: new_goal.desired_date,
                created_at: None,
                current_cents: 0,
            };
            goals.push(goal.clone());
            Ok(goal)
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

        async fn upsert_contributions(&self, _contributions: Vec<GoalContribution>) -> Result<usize> {
            unimplemented!()
        }
    }

    fn contribution(goal_id: &str, cycle_key: &str, amount_cents: i64) -> GoalContribution {
        GoalContribution {
            household_id: "hh".into(),
            goal_id: goal_id.into(),
            cycle_key: cycle_key.into(),
            cycle_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            cycle_end: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            amount_cents,
            updated_by: None,
            updated_at: None,
        }
    }

    fn new_goal(title: &str, target_cents: i64) -> NewGoal {
        NewGoal {
            household_id: "hh".into(),
            created_by: "u1".into(),
            title: title.into(),
            target_cents,
            desired_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_current_cents_is_sum_of_contributions() {
        let repo = Arc::new(MockGoalRepository::default());
        let service = GoalService::new(repo.clone(), Arc::new(MockDomainEventSink::new()));
        let trip = service.create_goal(new_goal("Trip", 100_000)).await.unwrap();
        let car = service.create_goal(new_goal("Car", 900_000)).await.unwrap();

        repo.contributions.lock().unwrap().extend([
            contribution(&trip.id, "month:2026-01-01->2026-02-01", 10_000),
            contribution(&trip.id, "month:2026-02-01->2026-03-01", 5_000),
            contribution(&car.id, "month:2026-02-01->2026-03-01", 0),
        ]);

        let goals = service.list_goals("hh").await.unwrap();
        assert_eq!(goals[0].current_cents, 15_000);
        assert_eq!(goals[1].current_cents, 0);

        let cycle = service
            .contributions_for_cycle("hh", "month:2026-02-01->2026-03-01")
            .await
            .unwrap();
        assert_eq!(cycle.get(&trip.id), Some(&5_000));
        assert_eq!(cycle.get(&car.id), Some(&0));
    }

    #[tokio::test]
    async fn test_create_goal_validates_and_emits() {
        let sink = MockDomainEventSink::new();
        let service = GoalService::new(
            Arc::new(MockGoalRepository::default()),
            Arc::new(sink.clone()),
        );
        assert!(service
            .create_goal(new_goal("   ", 100))
            .await
            .unwrap_err()
            .is_validation());
        assert!(service
            .create_goal(new_goal("Trip", 0))
            .await
            .unwrap_err()
            .is_validation());
        assert!(sink.is_empty());

        let goal = service.create_goal(new_goal("  Trip ", 100)).await.unwrap();
        assert_eq!(goal.title, "Trip");
        assert_eq!(sink.events(), vec![DomainEvent::goals_changed("hh")]);
    }
}
