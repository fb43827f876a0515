use chrono::Utc;

use crate::database::Database;
use crate::error::Error;

use super::schema::CreateLink;
use super::{Link, LinkFilter, LinkId};

#[tracing::instrument(skip(db))]
pub async fn create_link(db: &dyn Database, body: CreateLink) -> Result<Link, Error> {
    let link = Link {
        id: LinkId::new(),
        marketing_entity_type: body.marketing_entity_type,
        marketing_entity_id: body.marketing_entity_id.hyphenated().to_string(),
        linked_entity_kind: body.linked_entity_kind,
        linked_entity_id: body.linked_entity_id.hyphenated().to_string(),
        created_at: Utc::now(),
    };

    db.links().insert_link(&link).await?;

    Ok(link)
}

#[tracing::instrument(skip(db))]
pub async fn get_links(db: &dyn Database, filter: &LinkFilter) -> Result<Vec<Link>, Error> {
    let links = db.links().fetch_links(filter).await?;

    Ok(links)
}
