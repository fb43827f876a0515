use chrono::Utc;

use crate::database::{Database, Paged};
use crate::error::Error;
use crate::utils::Page;

use super::schema::{CreatePlan, TypeBudgets, UpdatePlan};
use super::{Plan, PlanFilter, PlanId, TypeBudget, TypeBudgetId};

#[tracing::instrument(skip(db))]
pub async fn create_plan(db: &dyn Database, body: CreatePlan) -> Result<Plan, Error> {
    let now = Utc::now();
    let plan = Plan {
        id: PlanId::new(),
        title: body.title,
        type_id: body.type_id,
        budget_amount: body.budget_amount,
        start_date: body.start_date,
        end_date: body.end_date,
        allocate_by_type: body.allocate_by_type,
        is_archived: body.is_archived,
        created_at: now,
        modified_at: now,
    };

    db.plans().insert_plan(&plan).await?;

    Ok(plan)
}

#[tracing::instrument(skip(db))]
pub async fn get_plans(
    db: &dyn Database,
    filter: &PlanFilter,
    page: Page,
) -> Result<Paged<Plan>, Error> {
    let plans = db.plans().fetch_plans(filter, page).await?;

    Ok(plans)
}

#[tracing::instrument(skip(db))]
pub async fn expect_plan_by_id(db: &dyn Database, plan_id: PlanId) -> Result<Plan, Error> {
    let plan = db
        .plans()
        .fetch_plan_by_id(plan_id)
        .await?
        .ok_or(Error::PlanNotFound { plan_id })?;

    Ok(plan)
}

#[tracing::instrument(skip(db))]
pub async fn update_plan(
    db: &dyn Database,
    plan_id: PlanId,
    changes: UpdatePlan,
) -> Result<Plan, Error> {
    let mut plan = expect_plan_by_id(db, plan_id).await?;
    let expected_modified_at = plan.modified_at;

    changes.apply(&mut plan);
    plan.modified_at = Utc::now();

    db.plans().replace_plan(&plan, expected_modified_at).await?;

    Ok(plan)
}

#[tracing::instrument(skip(db))]
pub async fn get_type_budgets(db: &dyn Database, plan_id: PlanId) -> Result<Vec<TypeBudget>, Error> {
    expect_plan_by_id(db, plan_id).await?;

    let budgets = db.type_budgets().fetch_type_budgets(plan_id).await?;

    Ok(budgets)
}

#[tracing::instrument(skip(db))]
pub async fn replace_type_budgets(
    db: &dyn Database,
    plan_id: PlanId,
    body: TypeBudgets,
) -> Result<Vec<TypeBudget>, Error> {
    expect_plan_by_id(db, plan_id).await?;

    let now = Utc::now();
    let budgets: Vec<TypeBudget> = body
        .items
        .into_iter()
        .enumerate()
        .map(|(position, item)| TypeBudget {
            id: TypeBudgetId::new(),
            plan_id,
            activity_type_id: item.activity_type_id,
            type_id: item.type_id,
            planned_amount: item.planned_amount,
            position: position as u32,
            created_at: now,
        })
        .collect();

    db.type_budgets()
        .replace_type_budgets(plan_id, &budgets)
        .await?;

    Ok(budgets)
}
