use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use hearth_core::cards::{
    CardCharge, CardInstallment, CardRepositoryTrait, CardUpdate, InstallmentQuery, NewCard,
    NewCardCharge, NewCardInstallment, PaymentMethod, PaymentMethodType,
};
use hearth_core::errors::{DatabaseError, Error};
use hearth_core::Result;

use super::model::{
    installment_from_row, CardChargeDB, CardInstallmentDB, InstallmentRow, PaymentMethodChangesDB,
    PaymentMethodDB,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{card_charges, card_installments, payment_methods};

pub struct CardRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CardRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CardRepository { pool, writer }
    }
}

fn load_installment(
    conn: &mut SqliteConnection,
    household_id: &str,
    installment_id: &str,
) -> Result<Option<CardInstallment>> {
    let row = card_installments::table
        .inner_join(card_charges::table)
        .filter(card_installments::household_id.eq(household_id))
        .filter(card_installments::id.eq(installment_id))
        .select((
            CardInstallmentDB::as_select(),
            card_charges::description,
            card_charges::installments_total,
        ))
        .first::<InstallmentRow>(conn)
        .optional()
        .into_core()?;
    Ok(row.map(installment_from_row))
}

#[async_trait]
impl CardRepositoryTrait for CardRepository {
    async fn list_payment_methods(&self, household_id: &str) -> Result<Vec<PaymentMethod>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = payment_methods::table
            .filter(payment_methods::household_id.eq(household_id))
            .order((
                payment_methods::method_type.asc(),
                payment_methods::name.asc(),
            ))
            .select(PaymentMethodDB::as_select())
            .load(&mut conn)
            .into_core()?;
        rows.into_iter().map(PaymentMethod::try_from).collect()
    }

    async fn get_payment_method(
        &self,
        household_id: &str,
        id: &str,
    ) -> Result<Option<PaymentMethod>> {
        let mut conn = get_connection(&self.pool)?;
        payment_methods::table
            .filter(payment_methods::household_id.eq(household_id))
            .filter(payment_methods::id.eq(id))
            .select(PaymentMethodDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(PaymentMethod::try_from)
            .transpose()
    }

    async fn insert_card(&self, new_card: NewCard) -> Result<PaymentMethod> {
        let row = PaymentMethodDB::from_new_card(
            new_card,
            Uuid::new_v4().to_string(),
            Utc::now().naive_utc(),
        );
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<PaymentMethod> {
                    diesel::insert_into(payment_methods::table)
                        .values(&row)
                        .execute(conn)
                        .into_core()?;
                    PaymentMethod::try_from(row)
                },
            )
            .await
    }

    async fn update_card(&self, update: CardUpdate) -> Result<PaymentMethod> {
        let changes = PaymentMethodChangesDB::from_update(&update, Utc::now().naive_utc());
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<PaymentMethod> {
                    let target = payment_methods::table
                        .filter(payment_methods::household_id.eq(&update.household_id))
                        .filter(payment_methods::id.eq(&update.id))
                        .filter(payment_methods::method_type.eq(PaymentMethodType::Card.as_str()));
                    let affected = diesel::update(target)
                        .set(&changes)
                        .execute(conn)
                        .into_core()?;
                    if affected == 0 {
                        return Err(Error::Database(DatabaseError::NotFound(format!(
                            "Card {} not found",
                            update.id
                        ))));
                    }
                    let row = payment_methods::table
                        .find(&update.id)
                        .select(PaymentMethodDB::as_select())
                        .first(conn)
                        .into_core()?;
                    PaymentMethod::try_from(row)
                },
            )
            .await
    }

    async fn insert_charge(&self, new_charge: NewCardCharge) -> Result<CardCharge> {
        let row = CardChargeDB::from_new(
            new_charge,
            Uuid::new_v4().to_string(),
            Utc::now().naive_utc(),
        );
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CardCharge> {
                diesel::insert_into(card_charges::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(CardCharge::from(row))
            })
            .await
    }

    async fn delete_charge(&self, household_id: &str, charge_id: &str) -> Result<usize> {
        let household_id = household_id.to_string();
        let charge_id = charge_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(
                    card_installments::table
                        .filter(card_installments::household_id.eq(&household_id))
                        .filter(card_installments::charge_id.eq(&charge_id)),
                )
                .execute(conn)
                .into_core()?;
                diesel::delete(
                    card_charges::table
                        .filter(card_charges::household_id.eq(&household_id))
                        .filter(card_charges::id.eq(&charge_id)),
                )
                .execute(conn)
                .into_core()
            })
            .await
    }

    async fn insert_installments(
        &self,
        installments: Vec<NewCardInstallment>,
    ) -> Result<Vec<CardInstallment>> {
        let now = Utc::now().naive_utc();
        let rows: Vec<CardInstallmentDB> = installments
            .into_iter()
            .map(|installment| {
                CardInstallmentDB::from_new(installment, Uuid::new_v4().to_string(), now)
            })
            .collect();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<Vec<CardInstallment>> {
                    diesel::insert_into(card_installments::table)
                        .values(&rows)
                        .execute(conn)
                        .into_core()?;
                    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
                    let joined = card_installments::table
                        .inner_join(card_charges::table)
                        .filter(card_installments::id.eq_any(ids))
                        .select((
                            CardInstallmentDB::as_select(),
                            card_charges::description,
                            card_charges::installments_total,
                        ))
                        .order((card_installments::due_on.asc(), card_installments::n.asc()))
                        .load::<InstallmentRow>(conn)
                        .into_core()?;
                    Ok(joined.into_iter().map(installment_from_row).collect())
                },
            )
            .await
    }

    async fn list_installments(&self, query: InstallmentQuery) -> Result<Vec<CardInstallment>> {
        if query.card_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&self.pool)?;
        let mut installments = card_installments::table
            .inner_join(card_charges::table)
            .filter(card_installments::household_id.eq(&query.household_id))
            .filter(card_installments::card_id.eq_any(&query.card_ids))
            .into_boxed();
        if !query.include_paid {
            installments = installments.filter(card_installments::paid_at.is_null());
        }
        if let Some(from) = query.from {
            installments = installments.filter(card_installments::due_on.ge(from));
        }
        if let Some(to) = query.to {
            installments = installments.filter(card_installments::due_on.lt(to));
        }
        let rows = installments
            .select((
                CardInstallmentDB::as_select(),
                card_charges::description,
                card_charges::installments_total,
            ))
            .order((card_installments::due_on.asc(), card_installments::n.asc()))
            .load::<InstallmentRow>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(installment_from_row).collect())
    }

    async fn set_installment_paid_at(
        &self,
        household_id: &str,
        installment_id: &str,
        paid_at: Option<NaiveDateTime>,
    ) -> Result<CardInstallment> {
        let household_id = household_id.to_string();
        let installment_id = installment_id.to_string();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<CardInstallment> {
                    diesel::update(
                        card_installments::table
                            .filter(card_installments::household_id.eq(&household_id))
                            .filter(card_installments::id.eq(&installment_id)),
                    )
                    .set(card_installments::paid_at.eq(paid_at))
                    .execute(conn)
                    .into_core()?;
                    load_installment(conn, &household_id, &installment_id)?.ok_or_else(|| {
                        Error::Database(DatabaseError::NotFound(format!(
                            "Installment {} not found",
                            installment_id
                        )))
                    })
                },
            )
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

    async fn seeded() -> (CardRepository, PaymentMethod, CardCharge, tempfile::TempDir) {
        let (pool, writer, dir) = test_database();
        let repo = CardRepository::new(pool, writer);
        let card = repo
            .insert_card(NewCard {
                household_id: "hh".to_string(),
                created_by: "u1".to_string(),
                name: "Visa".to_string(),
                credit_limit_cents: 500_000,
                due_day: Some(10),
                closing_day: Some(3),
                limit_behavior: None,
            })
            .await
            .unwrap();
        let charge = repo
            .insert_charge(NewCardCharge {
                household_id: "hh".to_string(),
                created_by: "u1".to_string(),
                card_id: card.id.clone(),
                purchased_on: d(2026, 3, 5),
                description: Some("Laptop".to_string()),
                total_cents: 300_000,
                installments_total: 3,
                due_day: None,
            })
            .await
            .unwrap();
        let rows = (1..=3u32)
            .map(|n| NewCardInstallment {
                household_id: "hh".to_string(),
                created_by: "u1".to_string(),
                card_id: card.id.clone(),
                charge_id: charge.id.clone(),
                n,
                due_on: d(2026, 3 + n, 10),
                amount_cents: 100_000,
            })
            .collect();
        repo.insert_installments(rows).await.unwrap();
        (repo, card, charge, dir)
    }

    fn query(card_id: &str) -> InstallmentQuery {
        InstallmentQuery {
            household_id: "hh".to_string(),
            card_ids: vec![card_id.to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_installments_join_their_charge() {
        let (repo, card, _, _dir) = seeded().await;
        let listed = repo.list_installments(query(&card.id)).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].n, 1);
        assert_eq!(listed[0].description.as_deref(), Some("Laptop"));
        assert_eq!(listed[0].installments_total, Some(3));
        assert!(repo
            .list_installments(InstallmentQuery {
                card_ids: Vec::new(),
                ..query(&card.id)
            })
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_query_filters_paid_and_date_window() {
        let (repo, card, _, _dir) = seeded().await;
        let first = repo
            .list_installments(query(&card.id))
            .await
            .unwrap()
            .remove(0);
        let paid = repo
            .set_installment_paid_at("hh", &first.id, d(2026, 4, 9).and_hms_opt(8, 0, 0))
            .await
            .unwrap();
        assert!(paid.is_paid());
        assert_eq!(paid.description.as_deref(), Some("Laptop"));

        assert_eq!(
            repo.list_installments(query(&card.id)).await.unwrap().len(),
            2
        );
        let windowed = repo
            .list_installments(InstallmentQuery {
                from: Some(d(2026, 4, 1)),
                to: Some(d(2026, 6, 1)),
                include_paid: true,
                ..query(&card.id)
            })
            .await
            .unwrap();
        assert_eq!(windowed.len(), 2);

        let missing = repo.set_installment_paid_at("hh", "nope", None).await;
        assert!(matches!(
            missing,
            Err(Error::Database(DatabaseError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_delete_charge_removes_its_installments() {
        let (repo, card, charge, _dir) = seeded().await;
        assert_eq!(repo.delete_charge("hh", &charge.id).await.unwrap(), 1);
        assert!(repo
            .list_installments(query(&card.id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_card_clears_explicit_null_day() {
        let (repo, card, _, _dir) = seeded().await;
        let updated = repo
            .update_card(CardUpdate {
                id: card.id.clone(),
                household_id: "hh".to_string(),
                due_day: Some(None),
                name: Some("Visa Gold".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.due_day, None);
        assert_eq!(updated.closing_day, Some(3));
        assert_eq!(updated.name, "Visa Gold");
        assert_eq!(updated.credit_limit_cents, Some(500_000));

        let missing = repo
            .update_card(CardUpdate {
                id: "nope".to_string(),
                household_id: "hh".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(
            missing,
            Err(Error::Database(DatabaseError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_installment_for_unknown_charge_is_rejected() {
        let (repo, card, _, _dir) = seeded().await;
        let result = repo
            .insert_installments(vec![NewCardInstallment {
                household_id: "hh".to_string(),
                created_by: "u1".to_string(),
                card_id: card.id.clone(),
                charge_id: "missing-charge".to_string(),
                n: 1,
                due_on: d(2026, 4, 10),
                amount_cents: 1_000,
            }])
            .await;
        assert!(matches!(
            result,
            Err(Error::Database(DatabaseError::ForeignKeyViolation(_)))
        ));
        assert_eq!(
            repo.list_installments(query(&card.id)).await.unwrap().len(),
            3
        );
    }
}
