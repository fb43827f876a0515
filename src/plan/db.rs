use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Client, Collection, Database};

use crate::database::memory::MemoryCollection;
use crate::database::{MongoPlanStore, Paged};
use crate::error::Error;
use crate::utils::Page;

use super::{Plan, PlanFilter, PlanId, TypeBudget};

pub const PLANS: &str = "plans";
pub const TYPE_BUDGETS: &str = "type_budgets";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": PLANS,
            "indexes": [
                { "key": { "type_id": 1, "start_date": -1 }, "name": "by_type_id" },
                { "key": { "is_archived": 1 }, "name": "by_is_archived" },
            ]
        },
        None,
    )
    .await?;

    db.run_command(
        bson::doc! {
            "createIndexes": TYPE_BUDGETS,
            "indexes": [
                { "key": { "plan_id": 1, "position": 1 }, "name": "by_plan_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn insert_plan(&self, plan: &Plan) -> Result<(), Error>;

    async fn fetch_plans(&self, filter: &PlanFilter, page: Page) -> Result<Paged<Plan>, Error>;

    async fn fetch_plan_by_id(&self, plan_id: PlanId) -> Result<Option<Plan>, Error>;

    async fn replace_plan(
        &self,
        plan: &Plan,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait TypeBudgetStore: Send + Sync {
    async fn fetch_type_budgets(&self, plan_id: PlanId) -> Result<Vec<TypeBudget>, Error>;

    /// Swaps the plan's whole set of allocations for `budgets` in one step.
    async fn replace_type_budgets(
        &self,
        plan_id: PlanId,
        budgets: &[TypeBudget],
    ) -> Result<(), Error>;
}

fn filter_document(filter: &PlanFilter) -> bson::Document {
    let mut document = bson::doc! {};
    if let Some(type_id) = filter.type_id {
        document.insert("type_id", type_id);
    }
    if let Some(is_archived) = filter.is_archived {
        document.insert("is_archived", is_archived);
    }
    if let Some(condition) = filter.starting.to_bson() {
        document.insert("start_date", condition);
    }

    document
}

#[async_trait]
impl PlanStore for MongoPlanStore {
    #[tracing::instrument(skip(self))]
    async fn insert_plan(&self, plan: &Plan) -> Result<(), Error> {
        self.insert_one(plan, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_plans(&self, filter: &PlanFilter, page: Page) -> Result<Paged<Plan>, Error> {
        let filter = filter_document(filter);
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .skip(page.offset)
            .limit(i64::from(page.limit))
            .build();

        let total = self.count_documents(filter.clone(), None).await?;
        let items: Vec<Plan> = self.find(filter, options).await?.try_collect().await?;

        Ok(Paged { items, total })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_plan_by_id(&self, plan_id: PlanId) -> Result<Option<Plan>, Error> {
        let plan: Option<Plan> = self.find_one(bson::doc! { "_id": plan_id }, None).await?;

        Ok(plan)
    }

    #[tracing::instrument(skip(self))]
    async fn replace_plan(
        &self,
        plan: &Plan,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let old_modified_at = bson::DateTime::from_chrono(expected_modified_at);

        let result = self
            .replace_one(
                bson::doc! { "_id": plan.id, "modified_at": old_modified_at },
                plan,
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MongoTypeBudgetStore {
    budgets: Collection<TypeBudget>,
    client: Client,
}

impl MongoTypeBudgetStore {
    pub fn new(client: Client, db: &Database) -> MongoTypeBudgetStore {
        MongoTypeBudgetStore {
            budgets: db.collection(TYPE_BUDGETS),
            client,
        }
    }
}

#[async_trait]
impl TypeBudgetStore for MongoTypeBudgetStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_type_budgets(&self, plan_id: PlanId) -> Result<Vec<TypeBudget>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "position": 1 })
            .build();

        let budgets: Vec<TypeBudget> = self
            .budgets
            .find(bson::doc! { "plan_id": plan_id }, options)
            .await?
            .try_collect()
            .await?;

        Ok(budgets)
    }

    #[tracing::instrument(skip(self))]
    async fn replace_type_budgets(
        &self,
        plan_id: PlanId,
        budgets: &[TypeBudget],
    ) -> Result<(), Error> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        self.budgets
            .delete_many_with_session(bson::doc! { "plan_id": plan_id }, None, &mut session)
            .await?;

        if !budgets.is_empty() {
            self.budgets
                .insert_many_with_session(budgets, None, &mut session)
                .await?;
        }

        session.commit_transaction().await?;

        Ok(())
    }
}

#[async_trait]
impl PlanStore for MemoryCollection<Plan> {
    async fn insert_plan(&self, plan: &Plan) -> Result<(), Error> {
        self.lock()?.push(plan.clone());

        Ok(())
    }

    async fn fetch_plans(&self, filter: &PlanFilter, page: Page) -> Result<Paged<Plan>, Error> {
        let mut plans: Vec<Plan> = self
            .lock()?
            .iter()
            .filter(|plan| filter.matches(plan))
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = plans.len() as u64;
        Ok(Paged {
            items: page.slice(plans),
            total,
        })
    }

    async fn fetch_plan_by_id(&self, plan_id: PlanId) -> Result<Option<Plan>, Error> {
        let plan = self.lock()?.iter().find(|plan| plan.id == plan_id).cloned();

        Ok(plan)
    }

    async fn replace_plan(
        &self,
        plan: &Plan,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut plans = self.lock()?;
        let stored = plans
            .iter_mut()
            .find(|stored| stored.id == plan.id && stored.modified_at == expected_modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        *stored = plan.clone();

        Ok(())
    }
}

#[async_trait]
impl TypeBudgetStore for MemoryCollection<TypeBudget> {
    async fn fetch_type_budgets(&self, plan_id: PlanId) -> Result<Vec<TypeBudget>, Error> {
        let mut budgets: Vec<TypeBudget> = self
            .lock()?
            .iter()
            .filter(|budget| budget.plan_id == plan_id)
            .cloned()
            .collect();
        budgets.sort_by_key(|budget| budget.position);

        Ok(budgets)
    }

    async fn replace_type_budgets(
        &self,
        plan_id: PlanId,
        budgets: &[TypeBudget],
    ) -> Result<(), Error> {
        let mut stored = self.lock()?;
        stored.retain(|budget| budget.plan_id != plan_id);
        stored.extend(budgets.iter().cloned());

        Ok(())
    }
}
