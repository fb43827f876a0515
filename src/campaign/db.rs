use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{bson, Database};

use crate::database::memory::MemoryCollection;
use crate::database::{MongoCampaignStore, Paged};
use crate::error::Error;
use crate::utils::Page;

use super::{Campaign, CampaignFilter, CampaignId};

pub const CAMPAIGNS: &str = "campaigns";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": CAMPAIGNS,
            "indexes": [
                { "key": { "type_id": 1, "start_date": -1 }, "name": "by_type_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaigns(
        &self,
        filter: &CampaignFilter,
        page: Page,
    ) -> Result<Paged<Campaign>, Error>;

    async fn fetch_campaign_by_id(&self, campaign_id: CampaignId)
        -> Result<Option<Campaign>, Error>;

    /// Overwrites the stored campaign, provided nobody else modified it
    /// since `expected_modified_at`.
    async fn replace_campaign(
        &self,
        campaign: &Campaign,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error>;
}

fn filter_document(filter: &CampaignFilter) -> bson::Document {
    let mut document = bson::doc! {};
    if let Some(type_id) = filter.type_id {
        document.insert("type_id", type_id);
    }
    if let Some(condition) = filter.starting.to_bson() {
        document.insert("start_date", condition);
    }

    document
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(
        &self,
        filter: &CampaignFilter,
        page: Page,
    ) -> Result<Paged<Campaign>, Error> {
        let filter = filter_document(filter);
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .skip(page.offset)
            .limit(i64::from(page.limit))
            .build();

        let total = self.count_documents(filter.clone(), None).await?;
        let items: Vec<Campaign> = self.find(filter, options).await?.try_collect().await?;

        Ok(Paged { items, total })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn replace_campaign(
        &self,
        campaign: &Campaign,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let old_modified_at = bson::DateTime::from_chrono(expected_modified_at);

        let result = self
            .replace_one(
                bson::doc! { "_id": campaign.id, "modified_at": old_modified_at },
                campaign,
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
impl CampaignStore for MemoryCollection<Campaign> {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.lock()?.push(campaign.clone());

        Ok(())
    }

    async fn fetch_campaigns(
        &self,
        filter: &CampaignFilter,
        page: Page,
    ) -> Result<Paged<Campaign>, Error> {
        let mut campaigns: Vec<Campaign> = self
            .lock()?
            .iter()
            .filter(|campaign| filter.matches(campaign))
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = campaigns.len() as u64;
        Ok(Paged {
            items: page.slice(campaigns),
            total,
        })
    }

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign = self
            .lock()?
            .iter()
            .find(|campaign| campaign.id == campaign_id)
            .cloned();

        Ok(campaign)
    }

    async fn replace_campaign(
        &self,
        campaign: &Campaign,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut campaigns = self.lock()?;
        let stored = campaigns
            .iter_mut()
            .find(|stored| stored.id == campaign.id && stored.modified_at == expected_modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        *stored = campaign.clone();

        Ok(())
    }
}
