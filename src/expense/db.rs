use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::database::memory::MemoryCollection;
use crate::database::{MongoExpenseStore, Paged};
use crate::error::Error;
use crate::utils::Page;

use super::{Expense, ExpenseFilter, ExpenseId};

pub const EXPENSES: &str = "expenses";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": EXPENSES,
            "indexes": [
                { "key": { "plan_id": 1, "occurred_at": -1 }, "name": "by_plan_id" },
                { "key": { "vendor_id": 1 }, "name": "by_vendor_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn insert_expense(&self, expense: &Expense) -> Result<(), Error>;

    async fn fetch_expenses(
        &self,
        filter: &ExpenseFilter,
        page: Page,
    ) -> Result<Paged<Expense>, Error>;

    async fn fetch_expense_by_id(&self, expense_id: ExpenseId) -> Result<Option<Expense>, Error>;

    async fn replace_expense(
        &self,
        expense: &Expense,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error>;
}

fn filter_document(filter: &ExpenseFilter) -> bson::Document {
    let mut document = bson::doc! {};
    if let Some(plan_id) = filter.plan_id {
        document.insert("plan_id", plan_id);
    }
    if let Some(type_id) = filter.type_id {
        document.insert("type_id", type_id);
    }
    if let Some(vendor_id) = filter.vendor_id {
        document.insert("vendor_id", vendor_id);
    }
    if let Some(condition) = filter.occurred.to_bson() {
        document.insert("occurred_at", condition);
    }

    document
}

#[async_trait]
impl ExpenseStore for MongoExpenseStore {
    #[tracing::instrument(skip(self))]
    async fn insert_expense(&self, expense: &Expense) -> Result<(), Error> {
        self.insert_one(expense, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_expenses(
        &self,
        filter: &ExpenseFilter,
        page: Page,
    ) -> Result<Paged<Expense>, Error> {
        let filter = filter_document(filter);
        let options = FindOptions::builder()
            .sort(bson::doc! { "occurred_at": -1, "created_at": -1 })
            .skip(page.offset)
            .limit(i64::from(page.limit))
            .build();

        let total = self.count_documents(filter.clone(), None).await?;
        let items: Vec<Expense> = self.find(filter, options).await?.try_collect().await?;

        Ok(Paged { items, total })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_expense_by_id(&self, expense_id: ExpenseId) -> Result<Option<Expense>, Error> {
        let expense: Option<Expense> = self
            .find_one(bson::doc! { "_id": expense_id }, None)
            .await?;

        Ok(expense)
    }

    #[tracing::instrument(skip(self))]
    async fn replace_expense(
        &self,
        expense: &Expense,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let old_modified_at = bson::DateTime::from_chrono(expected_modified_at);

        let result = self
            .replace_one(
                bson::doc! { "_id": expense.id, "modified_at": old_modified_at },
                expense,
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for MemoryCollection<Expense> {
    async fn insert_expense(&self, expense: &Expense) -> Result<(), Error> {
        self.lock()?.push(expense.clone());

        Ok(())
    }

    async fn fetch_expenses(
        &self,
        filter: &ExpenseFilter,
        page: Page,
    ) -> Result<Paged<Expense>, Error> {
        let mut expenses: Vec<Expense> = self
            .lock()?
            .iter()
            .filter(|expense| filter.matches(expense))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = expenses.len() as u64;
        Ok(Paged {
            items: page.slice(expenses),
            total,
        })
    }

    async fn fetch_expense_by_id(&self, expense_id: ExpenseId) -> Result<Option<Expense>, Error> {
        let expense = self
            .lock()?
            .iter()
            .find(|expense| expense.id == expense_id)
            .cloned();

        Ok(expense)
    }

    async fn replace_expense(
        &self,
        expense: &Expense,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut expenses = self.lock()?;
        let stored = expenses
            .iter_mut()
            .find(|stored| stored.id == expense.id && stored.modified_at == expected_modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        *stored = expense.clone();

        Ok(())
    }
}
