use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::database::memory::MemoryCollection;
use crate::database::{is_duplicate_key, MongoLinkStore};
use crate::error::Error;

use super::{Link, LinkFilter};

pub const LINKS: &str = "links";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": LINKS,
            "indexes": [
                {
                    "key": {
                        "marketing_entity_type": 1,
                        "marketing_entity_id": 1,
                        "linked_entity_kind": 1,
                        "linked_entity_id": 1,
                    },
                    "name": "unique_edge",
                    "unique": true,
                },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Fails with [`Error::LinkAlreadyExists`] if the same edge is stored.
    async fn insert_link(&self, link: &Link) -> Result<(), Error>;

    async fn fetch_links(&self, filter: &LinkFilter) -> Result<Vec<Link>, Error>;
}

fn already_exists(link: &Link) -> Error {
    Error::LinkAlreadyExists {
        marketing_entity_type: link.marketing_entity_type,
        marketing_entity_id: link.marketing_entity_id.clone(),
        linked_entity_kind: link.linked_entity_kind.clone(),
        linked_entity_id: link.linked_entity_id.clone(),
    }
}

#[async_trait]
impl LinkStore for MongoLinkStore {
    #[tracing::instrument(skip(self))]
    async fn insert_link(&self, link: &Link) -> Result<(), Error> {
        self.insert_one(link, None).await.map_err(|err| {
            if is_duplicate_key(&err) {
                already_exists(link)
            } else {
                Error::from(err)
            }
        })?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_links(&self, filter: &LinkFilter) -> Result<Vec<Link>, Error> {
        let mut document = bson::doc! {};
        if let Some(entity_type) = filter.marketing_entity_type {
            document.insert("marketing_entity_type", entity_type);
        }
        if let Some(entity_id) = &filter.marketing_entity_id {
            document.insert("marketing_entity_id", entity_id.as_str());
        }
        if let Some(kind) = &filter.linked_entity_kind {
            document.insert("linked_entity_kind", kind.as_str());
        }

        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": 1 })
            .build();

        let links: Vec<Link> = self.find(document, options).await?.try_collect().await?;

        Ok(links)
    }
}

#[async_trait]
impl LinkStore for MemoryCollection<Link> {
    async fn insert_link(&self, link: &Link) -> Result<(), Error> {
        let mut links = self.lock()?;
        if links.iter().any(|stored| stored.same_edge(link)) {
            return Err(already_exists(link));
        }

        links.push(link.clone());

        Ok(())
    }

    async fn fetch_links(&self, filter: &LinkFilter) -> Result<Vec<Link>, Error> {
        let links = self
            .lock()?
            .iter()
            .filter(|link| filter.matches(link))
            .cloned()
            .collect();

        Ok(links)
    }
}
