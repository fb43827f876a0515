use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, put, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::CatalogEntryId;
use crate::database::Database;
use crate::error::Error;
use crate::plan::PlanId;
use crate::schema;
use crate::utils::{DateRange, ListBody, Page};
use crate::vendor::VendorId;

use super::schema::{CreateExpense, UpdateExpense};
use super::{manager, Expense, ExpenseFilter, ExpenseId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBody {
    pub id: ExpenseId,
    pub plan_id: PlanId,
    pub type_id: Option<CatalogEntryId>,
    pub vendor_id: Option<VendorId>,
    pub occurred_at: DateTime<Utc>,
    pub amount: f64,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ExpenseBody {
    pub fn render(expense: Expense) -> ExpenseBody {
        ExpenseBody {
            id: expense.id,
            plan_id: expense.plan_id,
            type_id: expense.type_id,
            vendor_id: expense.vendor_id,
            occurred_at: expense.occurred_at,
            amount: expense.amount,
            notes: expense.notes,
            attachment_url: expense.attachment_url,
            created_at: expense.created_at,
            modified_at: expense.modified_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
    pub plan_id: Option<PlanId>,
    pub type_id: Option<CatalogEntryId>,
    pub vendor_id: Option<VendorId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

#[post("/expenses")]
#[tracing::instrument(skip(db))]
pub async fn create_expense(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<HttpResponse, Error> {
    let body: CreateExpense = schema::validate(&body)?;

    let expense = manager::create_expense(&***db, body).await?;

    Ok(HttpResponse::Created().json(ExpenseBody::render(expense)))
}

#[get("/expenses")]
#[tracing::instrument(skip(db))]
pub async fn get_expenses(
    db: Data<Box<dyn Database>>,
    query: Query<ExpenseQuery>,
) -> Result<Json<ListBody<ExpenseBody>>, Error> {
    let query = query.into_inner();
    let page = Page::new(query.limit, query.offset)?;
    let filter = ExpenseFilter {
        plan_id: query.plan_id,
        type_id: query.type_id,
        vendor_id: query.vendor_id,
        occurred: DateRange::new(query.from, query.to)?,
    };

    let expenses = manager::get_expenses(&***db, &filter, page).await?;

    let items = expenses
        .items
        .into_iter()
        .map(ExpenseBody::render)
        .collect();

    Ok(Json(ListBody::page(items, expenses.total, page)))
}

#[get("/expenses/{expense_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_expense_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<ExpenseId>,
) -> Result<Json<ExpenseBody>, Error> {
    let expense_id = params.into_inner();

    let expense = manager::expect_expense_by_id(&***db, expense_id).await?;

    Ok(Json(ExpenseBody::render(expense)))
}

#[put("/expenses/{expense_id}")]
#[tracing::instrument(skip(db))]
pub async fn update_expense(
    db: Data<Box<dyn Database>>,
    params: Path<ExpenseId>,
    body: Json<Value>,
) -> Result<Json<ExpenseBody>, Error> {
    let expense_id = params.into_inner();
    let changes: UpdateExpense = schema::validate(&body)?;

    let expense = manager::update_expense(&***db, expense_id, changes).await?;

    Ok(Json(ExpenseBody::render(expense)))
}
