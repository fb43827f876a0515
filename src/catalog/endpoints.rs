use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, put, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::Database;
use crate::error::Error;
use crate::permission::{self, PermissionChecker};
use crate::schema;
use crate::utils::ListBody;

use super::schema::{CreateCatalogEntry, ReorderCatalog, UpdateCatalogEntry};
use super::{manager, CatalogEntry, CatalogEntryId, CatalogKind};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryBody {
    pub id: CatalogEntryId,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CatalogEntryBody {
    pub fn render(entry: CatalogEntry) -> CatalogEntryBody {
        CatalogEntryBody {
            id: entry.id,
            key: entry.key,
            name: entry.name,
            description: entry.description,
            color: entry.color,
            icon: entry.icon,
            sort_order: entry.sort_order,
            is_active: entry.is_active,
            created_at: entry.created_at,
            modified_at: entry.modified_at,
        }
    }

    fn render_all(entries: Vec<CatalogEntry>) -> ListBody<CatalogEntryBody> {
        ListBody::items(entries.into_iter().map(CatalogEntryBody::render).collect())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

async fn authorize(
    kind: CatalogKind,
    permissions: &dyn PermissionChecker,
    request: &HttpRequest,
) -> Result<(), Error> {
    if let Some(action) = kind.write_permission() {
        permission::require_permission(permissions, request, action).await?;
    }

    Ok(())
}

async fn list(
    db: &dyn Database,
    kind: CatalogKind,
    query: CatalogQuery,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    let entries = manager::get_entries(db, kind, query.include_inactive).await?;

    Ok(Json(CatalogEntryBody::render_all(entries)))
}

async fn create(
    db: &dyn Database,
    permissions: &dyn PermissionChecker,
    request: &HttpRequest,
    kind: CatalogKind,
    body: &Value,
) -> Result<HttpResponse, Error> {
    authorize(kind, permissions, request).await?;
    let body: CreateCatalogEntry = schema::validate(body)?;

    let entry = manager::create_entry(db, kind, body).await?;

    Ok(HttpResponse::Created().json(CatalogEntryBody::render(entry)))
}

async fn update(
    db: &dyn Database,
    permissions: &dyn PermissionChecker,
    request: &HttpRequest,
    kind: CatalogKind,
    entry_id: CatalogEntryId,
    body: &Value,
) -> Result<Json<CatalogEntryBody>, Error> {
    authorize(kind, permissions, request).await?;
    let changes: UpdateCatalogEntry = schema::validate(body)?;

    let entry = manager::update_entry(db, kind, entry_id, changes).await?;

    Ok(Json(CatalogEntryBody::render(entry)))
}

async fn reorder(
    db: &dyn Database,
    permissions: &dyn PermissionChecker,
    request: &HttpRequest,
    kind: CatalogKind,
    body: &Value,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    authorize(kind, permissions, request).await?;
    let body: ReorderCatalog = schema::validate(body)?;

    let entries = manager::reorder_entries(db, kind, body).await?;

    Ok(Json(CatalogEntryBody::render_all(entries)))
}

#[get("/plan-types")]
#[tracing::instrument(skip(db))]
pub async fn get_plan_types(
    db: Data<Box<dyn Database>>,
    query: Query<CatalogQuery>,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    list(&***db, CatalogKind::PlanType, query.into_inner()).await
}

#[post("/plan-types")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn create_plan_type(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    body: Json<Value>,
) -> Result<HttpResponse, Error> {
    create(&***db, &***permissions, &request, CatalogKind::PlanType, &body).await
}

#[put("/plan-types/reorder")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn reorder_plan_types(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    body: Json<Value>,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    reorder(&***db, &***permissions, &request, CatalogKind::PlanType, &body).await
}

#[put("/plan-types/{entry_id}")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn update_plan_type(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    params: Path<CatalogEntryId>,
    body: Json<Value>,
) -> Result<Json<CatalogEntryBody>, Error> {
    let entry_id = params.into_inner();

    update(
        &***db,
        &***permissions,
        &request,
        CatalogKind::PlanType,
        entry_id,
        &body,
    )
    .await
}

#[get("/activity-types")]
#[tracing::instrument(skip(db))]
pub async fn get_activity_types(
    db: Data<Box<dyn Database>>,
    query: Query<CatalogQuery>,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    list(&***db, CatalogKind::ActivityType, query.into_inner()).await
}

#[post("/activity-types")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn create_activity_type(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    body: Json<Value>,
) -> Result<HttpResponse, Error> {
    create(
        &***db,
        &***permissions,
        &request,
        CatalogKind::ActivityType,
        &body,
    )
    .await
}

#[put("/activity-types/reorder")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn reorder_activity_types(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    body: Json<Value>,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    reorder(
        &***db,
        &***permissions,
        &request,
        CatalogKind::ActivityType,
        &body,
    )
    .await
}

#[put("/activity-types/{entry_id}")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn update_activity_type(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    params: Path<CatalogEntryId>,
    body: Json<Value>,
) -> Result<Json<CatalogEntryBody>, Error> {
    let entry_id = params.into_inner();

    update(
        &***db,
        &***permissions,
        &request,
        CatalogKind::ActivityType,
        entry_id,
        &body,
    )
    .await
}

#[get("/campaign-types")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_types(
    db: Data<Box<dyn Database>>,
    query: Query<CatalogQuery>,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    list(&***db, CatalogKind::CampaignType, query.into_inner()).await
}

#[post("/campaign-types")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn create_campaign_type(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    body: Json<Value>,
) -> Result<HttpResponse, Error> {
    create(
        &***db,
        &***permissions,
        &request,
        CatalogKind::CampaignType,
        &body,
    )
    .await
}

#[put("/campaign-types/reorder")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn reorder_campaign_types(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    body: Json<Value>,
) -> Result<Json<ListBody<CatalogEntryBody>>, Error> {
    reorder(
        &***db,
        &***permissions,
        &request,
        CatalogKind::CampaignType,
        &body,
    )
    .await
}

#[put("/campaign-types/{entry_id}")]
#[tracing::instrument(skip(db, permissions, request))]
pub async fn update_campaign_type(
    db: Data<Box<dyn Database>>,
    permissions: Data<Box<dyn PermissionChecker>>,
    request: HttpRequest,
    params: Path<CatalogEntryId>,
    body: Json<Value>,
) -> Result<Json<CatalogEntryBody>, Error> {
    let entry_id = params.into_inner();

    update(
        &***db,
        &***permissions,
        &request,
        CatalogKind::CampaignType,
        entry_id,
        &body,
    )
    .await
}
