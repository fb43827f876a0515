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

use super::schema::{CreateCampaign, UpdateCampaign};
use super::{manager, Campaign, CampaignFilter, CampaignId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBody {
    pub id: CampaignId,
    pub title: String,
    pub type_id: Option<CatalogEntryId>,
    pub budget: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            title: campaign.title,
            type_id: campaign.type_id,
            budget: campaign.budget,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            description: campaign.description,
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignQuery {
    pub type_id: Option<CatalogEntryId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

#[post("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<HttpResponse, Error> {
    let body: CreateCampaign = schema::validate(&body)?;

    let campaign = manager::create_campaign(&***db, body).await?;

    Ok(HttpResponse::Created().json(CampaignBody::render(campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: Data<Box<dyn Database>>,
    query: Query<CampaignQuery>,
) -> Result<Json<ListBody<CampaignBody>>, Error> {
    let query = query.into_inner();
    let page = Page::new(query.limit, query.offset)?;
    let filter = CampaignFilter {
        type_id: query.type_id,
        starting: DateRange::new(query.from, query.to)?,
    };

    let campaigns = manager::get_campaigns(&***db, &filter, page).await?;

    let items = campaigns
        .items
        .into_iter()
        .map(CampaignBody::render)
        .collect();

    Ok(Json(ListBody::page(items, campaigns.total, page)))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::expect_campaign_by_id(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[put("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn update_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<Value>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let changes: UpdateCampaign = schema::validate(&body)?;

    let campaign = manager::update_campaign(&***db, campaign_id, changes).await?;

    Ok(Json(CampaignBody::render(campaign)))
}
