use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, put, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::CatalogEntryId;
use crate::database::Database;
use crate::error::Error;
use crate::schema;
use crate::utils::{DateRange, ListBody, Page};

use super::schema::{CreatePlan, TypeBudgets, UpdatePlan};
use super::{manager, Plan, PlanFilter, PlanId, TypeBudget, TypeBudgetId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBody {
    pub id: PlanId,
    pub title: String,
    pub type_id: CatalogEntryId,
    pub budget_amount: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub allocate_by_type: bool,
    pub is_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_budgets: Option<Vec<TypeBudgetBody>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl PlanBody {
    pub fn render(plan: Plan) -> PlanBody {
        PlanBody {
            id: plan.id,
            title: plan.title,
            type_id: plan.type_id,
            budget_amount: plan.budget_amount,
            start_date: plan.start_date,
            end_date: plan.end_date,
            allocate_by_type: plan.allocate_by_type,
            is_archived: plan.is_archived,
            type_budgets: None,
            created_at: plan.created_at,
            modified_at: plan.modified_at,
        }
    }

    pub fn render_with_budgets(plan: Plan, budgets: Vec<TypeBudget>) -> PlanBody {
        PlanBody {
            type_budgets: Some(budgets.into_iter().map(TypeBudgetBody::render).collect()),
            ..PlanBody::render(plan)
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBudgetBody {
    pub id: TypeBudgetId,
    pub plan_id: PlanId,
    pub activity_type_id: CatalogEntryId,
    pub type_id: Option<CatalogEntryId>,
    pub planned_amount: f64,
    pub created_at: DateTime<Utc>,
}

impl TypeBudgetBody {
    pub fn render(budget: TypeBudget) -> TypeBudgetBody {
        TypeBudgetBody {
            id: budget.id,
            plan_id: budget.plan_id,
            activity_type_id: budget.activity_type_id,
            type_id: budget.type_id,
            planned_amount: budget.planned_amount,
            created_at: budget.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuery {
    pub type_id: Option<CatalogEntryId>,
    pub is_archived: Option<bool>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

#[post("/plans")]
#[tracing::instrument(skip(db))]
pub async fn create_plan(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<HttpResponse, Error> {
    let body: CreatePlan = schema::validate(&body)?;

    let plan = manager::create_plan(&***db, body).await?;

    Ok(HttpResponse::Created().json(PlanBody::render(plan)))
}

#[get("/plans")]
#[tracing::instrument(skip(db))]
pub async fn get_plans(
    db: Data<Box<dyn Database>>,
    query: Query<PlanQuery>,
) -> Result<Json<ListBody<PlanBody>>, Error> {
    let query = query.into_inner();
    let page = Page::new(query.limit, query.offset)?;
    let filter = PlanFilter {
        type_id: query.type_id,
        is_archived: query.is_archived,
        starting: DateRange::new(query.from, query.to)?,
    };

    let plans = manager::get_plans(&***db, &filter, page).await?;

    let items = plans.items.into_iter().map(PlanBody::render).collect();

    Ok(Json(ListBody::page(items, plans.total, page)))
}

#[get("/plans/{plan_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_plan_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<PlanId>,
) -> Result<Json<PlanBody>, Error> {
    let plan_id = params.into_inner();

    let plan = manager::expect_plan_by_id(&***db, plan_id).await?;
    let budgets = manager::get_type_budgets(&***db, plan_id).await?;

    Ok(Json(PlanBody::render_with_budgets(plan, budgets)))
}

#[put("/plans/{plan_id}")]
#[tracing::instrument(skip(db))]
pub async fn update_plan(
    db: Data<Box<dyn Database>>,
    params: Path<PlanId>,
    body: Json<Value>,
) -> Result<Json<PlanBody>, Error> {
    let plan_id = params.into_inner();
    let changes: UpdatePlan = schema::validate(&body)?;

    let plan = manager::update_plan(&***db, plan_id, changes).await?;

    Ok(Json(PlanBody::render(plan)))
}

#[get("/plans/{plan_id}/type-budgets")]
#[tracing::instrument(skip(db))]
pub async fn get_type_budgets(
    db: Data<Box<dyn Database>>,
    params: Path<PlanId>,
) -> Result<Json<ListBody<TypeBudgetBody>>, Error> {
    let plan_id = params.into_inner();

    let budgets = manager::get_type_budgets(&***db, plan_id).await?;

    let items = budgets.into_iter().map(TypeBudgetBody::render).collect();

    Ok(Json(ListBody::items(items)))
}

#[post("/plans/{plan_id}/type-budgets")]
#[tracing::instrument(skip(db))]
pub async fn replace_type_budgets(
    db: Data<Box<dyn Database>>,
    params: Path<PlanId>,
    body: Json<Value>,
) -> Result<Json<ListBody<TypeBudgetBody>>, Error> {
    let plan_id = params.into_inner();
    let body: TypeBudgets = schema::validate(&body)?;

    let budgets = manager::replace_type_budgets(&***db, plan_id, body).await?;

    let items = budgets.into_iter().map(TypeBudgetBody::render).collect();

    Ok(Json(ListBody::items(items)))
}
