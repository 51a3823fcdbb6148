use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use hearth_core::goals::{Goal, GoalContribution, GoalRepositoryTrait, NewGoal};
use hearth_core::Result;

use super::model::{GoalContributionDB, GoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{goal_contributions, goals};

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    async fn list_goals(&self, household_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::household_id.eq(household_id))
            .order((goals::desired_date.asc(), goals::created_at.desc()))
            .select(GoalDB::as_select())
            .load(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }

    async fn insert_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        let row = GoalDB::from_new(new_goal, Uuid::new_v4().to_string(), Utc::now().naive_utc());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                diesel::insert_into(goals::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(Goal::from(row))
            })
            .await
    }

    async fn list_contributions(&self, household_id: &str) -> Result<Vec<GoalContribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goal_contributions::table
            .filter(goal_contributions::household_id.eq(household_id))
            .select(GoalContributionDB::as_select())
            .load(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(GoalContribution::from).collect())
    }

    async fn list_contributions_for_cycle(
        &self,
        household_id: &str,
        cycle_key: &str,
    ) -> Result<Vec<GoalContribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goal_contributions::table
            .filter(goal_contributions::household_id.eq(household_id))
            .filter(goal_contributions::cycle_key.eq(cycle_key))
            .select(GoalContributionDB::as_select())
            .load(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(GoalContribution::from).collect())
    }

    async fn upsert_contributions(&self, contributions: Vec<GoalContribution>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected_rows = 0;
                for contribution in contributions {
                    let row = GoalContributionDB::from(contribution);
                    affected_rows += diesel::insert_into(goal_contributions::table)
                        .values(&row)
                        .on_conflict((
                            goal_contributions::household_id,
                            goal_contributions::goal_id,
                            goal_contributions::cycle_key,
                        ))
                        .do_update()
                        .set(&row.changes())
                        .execute(conn)
                        .into_core()?;
                }
                Ok(affected_rows)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn insert(repo: &GoalRepository, title: &str, desired_date: NaiveDate) -> Goal {
        repo.insert_goal(NewGoal {
            household_id: "hh".to_string(),
            created_by: "u1".to_string(),
            title: title.to_string(),
            target_cents: 10_000,
            desired_date,
        })
        .await
        .unwrap()
    }

    fn contribution(goal_id: &str, amount_cents: i64) -> GoalContribution {
        GoalContribution {
            household_id: "hh".to_string(),
            goal_id: goal_id.to_string(),
            cycle_key: "month:2026-02-01->2026-03-01".to_string(),
            cycle_start: d(2026, 2, 1),
            cycle_end: d(2026, 3, 1),
            amount_cents,
            updated_by: Some("u1".to_string()),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_contributions_upsert_per_goal_and_cycle() {
        let (pool, writer, _dir) = test_database();
        let repo = GoalRepository::new(pool, writer);
        let g1 = insert(&repo, "Trip", d(2026, 12, 1)).await.id;
        let g2 = insert(&repo, "Sofa", d(2026, 12, 1)).await.id;

        repo.upsert_contributions(vec![contribution(&g1, 100), contribution(&g2, 50)])
            .await
            .unwrap();
        repo.upsert_contributions(vec![contribution(&g1, 70)])
            .await
            .unwrap();

        let stored = repo
            .list_contributions_for_cycle("hh", "month:2026-02-01->2026-03-01")
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        let amount = |goal_id: &str| {
            stored
                .iter()
                .find(|c| c.goal_id == goal_id)
                .map(|c| c.amount_cents)
        };
        assert_eq!(amount(&g1), Some(70));
        assert_eq!(amount(&g2), Some(50));
        assert!(repo
            .list_contributions_for_cycle("hh", "month:2026-03-01->2026-04-01")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_contribution_batch_is_all_or_nothing() {
        let (pool, writer, _dir) = test_database();
        let repo = GoalRepository::new(pool, writer);
        let g1 = insert(&repo, "Trip", d(2026, 12, 1)).await.id;

        let result = repo
            .upsert_contributions(vec![
                contribution(&g1, 100),
                contribution("missing-goal", 50),
            ])
            .await;
        assert!(result.is_err());
        assert!(repo.list_contributions("hh").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_goals_ordered_by_desired_date() {
        let (pool, writer, _dir) = test_database();
        let repo = GoalRepository::new(pool, writer);
        insert(&repo, "Trip", d(2027, 6, 1)).await;
        insert(&repo, "Sofa", d(2026, 12, 1)).await;

        let titles: Vec<String> = repo
            .list_goals("hh")
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, vec!["Sofa", "Trip"]);
    }
}
