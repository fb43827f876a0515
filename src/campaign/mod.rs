use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntryId;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::utils::{optional_bson_datetime, DateRange};

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod schema;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub title: String,
    pub type_id: Option<CatalogEntryId>,
    pub budget: Option<f64>,
    #[serde(with = "optional_bson_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(with = "optional_bson_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

#[derive(Clone, Debug, Default)]
pub struct CampaignFilter {
    pub type_id: Option<CatalogEntryId>,
    /// Applied to the start date.
    pub starting: DateRange,
}

impl CampaignFilter {
    pub fn matches(&self, campaign: &Campaign) -> bool {
        self.type_id.map_or(true, |type_id| campaign.type_id == Some(type_id))
            && self.starting.contains(campaign.start_date)
    }
}
