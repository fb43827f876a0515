use actix_web::web::{Data, Json, Query};
use actix_web::{get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Error;
use crate::schema;
use crate::utils::ListBody;

use super::schema::CreateLink;
use super::{manager, Link, LinkFilter, LinkId, MarketingEntityType};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBody {
    pub id: LinkId,
    pub marketing_entity_type: MarketingEntityType,
    pub marketing_entity_id: String,
    pub linked_entity_kind: String,
    pub linked_entity_id: String,
    pub created_at: DateTime<Utc>,
}

impl LinkBody {
    pub fn render(link: Link) -> LinkBody {
        LinkBody {
            id: link.id,
            marketing_entity_type: link.marketing_entity_type,
            marketing_entity_id: link.marketing_entity_id,
            linked_entity_kind: link.linked_entity_kind,
            linked_entity_id: link.linked_entity_id,
            created_at: link.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkQuery {
    pub marketing_entity_type: Option<MarketingEntityType>,
    pub marketing_entity_id: Option<Uuid>,
    pub linked_entity_kind: Option<String>,
}

#[post("/links")]
#[tracing::instrument(skip(db))]
pub async fn create_link(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<HttpResponse, Error> {
    let body: CreateLink = schema::validate(&body)?;

    let link = manager::create_link(&***db, body).await?;

    Ok(HttpResponse::Created().json(LinkBody::render(link)))
}

#[get("/links")]
#[tracing::instrument(skip(db))]
pub async fn get_links(
    db: Data<Box<dyn Database>>,
    query: Query<LinkQuery>,
) -> Result<Json<ListBody<LinkBody>>, Error> {
    let query = query.into_inner();
    let filter = LinkFilter {
        marketing_entity_type: query.marketing_entity_type,
        marketing_entity_id: query
            .marketing_entity_id
            .map(|id| id.hyphenated().to_string()),
        linked_entity_kind: query.linked_entity_kind,
    };

    let links = manager::get_links(&***db, &filter).await?;

    let items = links.into_iter().map(LinkBody::render).collect();

    Ok(Json(ListBody::items(items)))
}
