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

pub type PlanId = TypedId<Plan>;
pub type TypeBudgetId = TypedId<TypeBudget>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Plan {
    #[serde(rename = "_id")]
    pub id: PlanId,
    pub title: String,
    pub type_id: CatalogEntryId,
    pub budget_amount: f64,
    #[serde(with = "optional_bson_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(with = "optional_bson_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    pub allocate_by_type: bool,
    pub is_archived: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Plan {
    fn tag() -> &'static str {
        "PLN"
    }
}

/// The share of a plan's budget set aside for one activity type.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TypeBudget {
    #[serde(rename = "_id")]
    pub id: TypeBudgetId,
    pub plan_id: PlanId,
    pub activity_type_id: CatalogEntryId,
    pub type_id: Option<CatalogEntryId>,
    pub planned_amount: f64,
    /// Index within the submission that created it.
    pub position: u32,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for TypeBudget {
    fn tag() -> &'static str {
        "TBG"
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlanFilter {
    pub type_id: Option<CatalogEntryId>,
    pub is_archived: Option<bool>,
    pub starting: DateRange,
}

impl PlanFilter {
    pub fn matches(&self, plan: &Plan) -> bool {
        self.type_id.map_or(true, |type_id| plan.type_id == type_id)
            && self.is_archived.map_or(true, |archived| plan.is_archived == archived)
            && self.starting.contains(plan.start_date)
    }
}
