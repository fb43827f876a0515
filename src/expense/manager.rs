use chrono::Utc;

use crate::database::{Database, Paged};
use crate::error::Error;
use crate::utils::Page;

use super::schema::{CreateExpense, UpdateExpense};
use super::{Expense, ExpenseFilter, ExpenseId};

#[tracing::instrument(skip(db))]
pub async fn create_expense(db: &dyn Database, body: CreateExpense) -> Result<Expense, Error> {
    let now = Utc::now();
    let expense = Expense {
        id: ExpenseId::new(),
        plan_id: body.plan_id,
        type_id: body.type_id,
        vendor_id: body.vendor_id,
        occurred_at: body.occurred_at,
        amount: body.amount,
        notes: body.notes,
        attachment_url: body.attachment_url,
        created_at: now,
        modified_at: now,
    };

    db.expenses().insert_expense(&expense).await?;

    Ok(expense)
}

#[tracing::instrument(skip(db))]
pub async fn get_expenses(
    db: &dyn Database,
    filter: &ExpenseFilter,
    page: Page,
) -> Result<Paged<Expense>, Error> {
    let expenses = db.expenses().fetch_expenses(filter, page).await?;

    Ok(expenses)
}

#[tracing::instrument(skip(db))]
pub async fn expect_expense_by_id(
    db: &dyn Database,
    expense_id: ExpenseId,
) -> Result<Expense, Error> {
    let expense = db
        .expenses()
        .fetch_expense_by_id(expense_id)
        .await?
        .ok_or(Error::ExpenseNotFound { expense_id })?;

    Ok(expense)
}

#[tracing::instrument(skip(db))]
pub async fn update_expense(
    db: &dyn Database,
    expense_id: ExpenseId,
    changes: UpdateExpense,
) -> Result<Expense, Error> {
    let mut expense = expect_expense_by_id(db, expense_id).await?;
    let expected_modified_at = expense.modified_at;

    changes.apply(&mut expense);
    expense.modified_at = Utc::now();

    db.expenses()
        .replace_expense(&expense, expected_modified_at)
        .await?;

    Ok(expense)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone};

    use super::*;
    use crate::database::memory::MemoryDatabase;
    use crate::plan::PlanId;
    use crate::schema::Patch;
    use crate::utils::DateRange;
    use crate::vendor::VendorId;

    fn day(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    fn create_body(plan_id: PlanId, occurred_at: DateTime<Utc>, amount: f64) -> CreateExpense {
        CreateExpense {
            plan_id,
            type_id: None,
            vendor_id: Some(VendorId::new()),
            occurred_at,
            amount,
            notes: Some("invoice #12".into()),
            attachment_url: None,
        }
    }

    #[tokio::test]
    async fn expenses_are_listed_most_recent_first() {
        let db = MemoryDatabase::new();
        let plan_id = PlanId::new();
        create_expense(&db, create_body(plan_id, day(3), 30.0))
            .await
            .unwrap();
        create_expense(&db, create_body(plan_id, day(9), 90.0))
            .await
            .unwrap();
        create_expense(&db, create_body(PlanId::new(), day(5), 50.0))
            .await
            .unwrap();

        let filter = ExpenseFilter {
            plan_id: Some(plan_id),
            ..ExpenseFilter::default()
        };
        let expenses = get_expenses(&db, &filter, Page::new(None, None).unwrap())
            .await
            .unwrap();

        let amounts: Vec<f64> = expenses.items.iter().map(|expense| expense.amount).collect();
        assert_eq!(expenses.total, 2);
        assert_eq!(amounts, vec![90.0, 30.0]);
    }

    #[tokio::test]
    async fn expenses_can_be_filtered_by_occurrence() {
        let db = MemoryDatabase::new();
        let plan_id = PlanId::new();
        for date in 1..=6 {
            create_expense(&db, create_body(plan_id, day(date), 10.0))
                .await
                .unwrap();
        }

        let filter = ExpenseFilter {
            occurred: DateRange::new(Some(day(2)), Some(day(4))).unwrap(),
            ..ExpenseFilter::default()
        };
        let expenses = get_expenses(&db, &filter, Page::new(None, None).unwrap())
            .await
            .unwrap();

        assert_eq!(expenses.total, 3);
    }

    #[tokio::test]
    async fn update_can_detach_the_vendor() {
        let db = MemoryDatabase::new();
        let expense = create_expense(&db, create_body(PlanId::new(), day(1), 12.5))
            .await
            .unwrap();

        let changes = UpdateExpense {
            vendor_id: Patch::Null,
            amount: Some(15.0),
            ..UpdateExpense::default()
        };
        let updated = update_expense(&db, expense.id, changes).await.unwrap();

        assert_eq!(updated.vendor_id, None);
        assert_eq!(updated.amount, 15.0);
        assert_eq!(updated.notes, expense.notes);
    }

    #[tokio::test]
    async fn update_detects_concurrent_modification() {
        let db = MemoryDatabase::new();
        let expense = create_expense(&db, create_body(PlanId::new(), day(1), 12.5))
            .await
            .unwrap();
        let stale = expense.modified_at;

        let mut first = expense.clone();
        first.amount = 20.0;
        first.modified_at = stale + Duration::seconds(1);
        db.expenses().replace_expense(&first, stale).await.unwrap();

        let mut second = expense.clone();
        second.amount = 1.0;
        let result = db.expenses().replace_expense(&second, stale).await;

        assert_eq!(result.unwrap_err(), Error::ConcurrentModificationDetected);
    }
}
