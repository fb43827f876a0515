//! Generic edges from a marketing record to a record of some other part of
//! the system. Neither end is checked for existence.

use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::schema::Choice;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod schema;
pub use endpoints::*;

pub type LinkId = TypedId<Link>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketingEntityType {
    Campaign,
    Plan,
    Expense,
    Vendor,
}

impl MarketingEntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketingEntityType::Campaign => "campaign",
            MarketingEntityType::Plan => "plan",
            MarketingEntityType::Expense => "expense",
            MarketingEntityType::Vendor => "vendor",
        }
    }
}

impl Choice for MarketingEntityType {
    fn choices() -> &'static [(&'static str, MarketingEntityType)] {
        &[
            ("campaign", MarketingEntityType::Campaign),
            ("plan", MarketingEntityType::Plan),
            ("expense", MarketingEntityType::Expense),
            ("vendor", MarketingEntityType::Vendor),
        ]
    }
}

impl From<MarketingEntityType> for Bson {
    fn from(entity_type: MarketingEntityType) -> Bson {
        entity_type.as_str().into()
    }
}

/// Ids are kept as hyphenated uuid strings since the linked side can be
/// any kind of record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Link {
    #[serde(rename = "_id")]
    pub id: LinkId,
    pub marketing_entity_type: MarketingEntityType,
    pub marketing_entity_id: String,
    pub linked_entity_kind: String,
    pub linked_entity_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Link {
    fn tag() -> &'static str {
        "LNK"
    }
}

impl Link {
    pub fn same_edge(&self, other: &Link) -> bool {
        self.marketing_entity_type == other.marketing_entity_type
            && self.marketing_entity_id == other.marketing_entity_id
            && self.linked_entity_kind == other.linked_entity_kind
            && self.linked_entity_id == other.linked_entity_id
    }
}

#[derive(Clone, Debug, Default)]
pub struct LinkFilter {
    pub marketing_entity_type: Option<MarketingEntityType>,
    pub marketing_entity_id: Option<String>,
    pub linked_entity_kind: Option<String>,
}

impl LinkFilter {
    pub fn matches(&self, link: &Link) -> bool {
        self.marketing_entity_type
            .map_or(true, |entity_type| link.marketing_entity_type == entity_type)
            && self
                .marketing_entity_id
                .as_ref()
                .map_or(true, |id| &link.marketing_entity_id == id)
            && self
                .linked_entity_kind
                .as_ref()
                .map_or(true, |kind| &link.linked_entity_kind == kind)
    }
}
