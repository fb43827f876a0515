use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntryId;
use crate::plan::PlanId;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::utils::DateRange;
use crate::vendor::VendorId;

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod schema;
pub use endpoints::*;

pub type ExpenseId = TypedId<Expense>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Expense {
    #[serde(rename = "_id")]
    pub id: ExpenseId,
    pub plan_id: PlanId,
    /// An activity type.
    pub type_id: Option<CatalogEntryId>,
    pub vendor_id: Option<VendorId>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub occurred_at: DateTime<Utc>,
    pub amount: f64,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Expense {
    fn tag() -> &'static str {
        "EXP"
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    pub plan_id: Option<PlanId>,
    pub type_id: Option<CatalogEntryId>,
    pub vendor_id: Option<VendorId>,
    pub occurred: DateRange,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        self.plan_id.map_or(true, |plan_id| expense.plan_id == plan_id)
            && self.type_id.map_or(true, |type_id| expense.type_id == Some(type_id))
            && self
                .vendor_id
                .map_or(true, |vendor_id| expense.vendor_id == Some(vendor_id))
            && self.occurred.contains(Some(expense.occurred_at))
    }
}
