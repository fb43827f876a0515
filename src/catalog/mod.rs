//! The three reorderable catalogs of types: plan types, activity types and
//! campaign types. They share one record shape and one store, told apart
//! by their [`CatalogKind`].

use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod schema;
pub use endpoints::*;

pub type CatalogEntryId = TypedId<CatalogEntry>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    PlanType,
    ActivityType,
    CampaignType,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 3] = [
        CatalogKind::PlanType,
        CatalogKind::ActivityType,
        CatalogKind::CampaignType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogKind::PlanType => "plan-type",
            CatalogKind::ActivityType => "activity-type",
            CatalogKind::CampaignType => "campaign-type",
        }
    }

    /// The permission a caller needs to change this catalog. Campaign types
    /// are open to any caller.
    pub fn write_permission(self) -> Option<&'static str> {
        match self {
            CatalogKind::PlanType => Some("plan-types:write"),
            CatalogKind::ActivityType => Some("activity-types:write"),
            CatalogKind::CampaignType => None,
        }
    }
}

impl From<CatalogKind> for Bson {
    fn from(kind: CatalogKind) -> Bson {
        kind.as_str().into()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CatalogEntry {
    #[serde(rename = "_id")]
    pub id: CatalogEntryId,
    pub kind: CatalogKind,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: u32,
    pub is_active: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for CatalogEntry {
    fn tag() -> &'static str {
        "TYP"
    }
}

/// Catalog listing order: by sort order, ties broken by name.
pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}
