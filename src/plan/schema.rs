use chrono::{DateTime, Utc};

use crate::catalog::CatalogEntryId;
use crate::schema::{
    first_duplicate, id, Flag, NonEmptyText, NonNegativeNumber, ObjectReader, Patch, Schema,
    Timestamp,
};

use super::Plan;

#[derive(Clone, Debug, PartialEq)]
pub struct CreatePlan {
    pub title: String,
    pub type_id: CatalogEntryId,
    pub budget_amount: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub allocate_by_type: bool,
    pub is_archived: bool,
}

impl Schema for CreatePlan {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<CreatePlan> {
        let title = reader.required("title", NonEmptyText);
        let type_id = reader.required("typeId", id());
        let budget_amount = reader.required("budgetAmount", NonNegativeNumber);
        let start_date = reader.nullable("startDate", Timestamp);
        let end_date = reader.nullable("endDate", Timestamp);
        let allocate_by_type = reader.optional("allocateByType", Flag);
        let is_archived = reader.optional("isArchived", Flag);

        Some(CreatePlan {
            title: title?,
            type_id: type_id?,
            budget_amount: budget_amount?,
            start_date: start_date.into_option(),
            end_date: end_date.into_option(),
            allocate_by_type: allocate_by_type.unwrap_or(false),
            is_archived: is_archived.unwrap_or(false),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdatePlan {
    pub title: Option<String>,
    pub type_id: Option<CatalogEntryId>,
    pub budget_amount: Option<f64>,
    pub start_date: Patch<DateTime<Utc>>,
    pub end_date: Patch<DateTime<Utc>>,
    pub allocate_by_type: Option<bool>,
    pub is_archived: Option<bool>,
}

impl Schema for UpdatePlan {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<UpdatePlan> {
        Some(UpdatePlan {
            title: reader.optional("title", NonEmptyText),
            type_id: reader.optional("typeId", id()),
            budget_amount: reader.optional("budgetAmount", NonNegativeNumber),
            start_date: reader.nullable("startDate", Timestamp),
            end_date: reader.nullable("endDate", Timestamp),
            allocate_by_type: reader.optional("allocateByType", Flag),
            is_archived: reader.optional("isArchived", Flag),
        })
    }
}

impl UpdatePlan {
    pub fn apply(self, plan: &mut Plan) {
        if let Some(title) = self.title {
            plan.title = title;
        }
        if let Some(type_id) = self.type_id {
            plan.type_id = type_id;
        }
        if let Some(budget_amount) = self.budget_amount {
            plan.budget_amount = budget_amount;
        }
        self.start_date.apply_to(&mut plan.start_date);
        self.end_date.apply_to(&mut plan.end_date);
        if let Some(allocate_by_type) = self.allocate_by_type {
            plan.allocate_by_type = allocate_by_type;
        }
        if let Some(is_archived) = self.is_archived {
            plan.is_archived = is_archived;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeBudgetItem {
    pub activity_type_id: CatalogEntryId,
    pub type_id: Option<CatalogEntryId>,
    pub planned_amount: f64,
}

/// The full set of allocations for a plan, replacing whatever it had.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeBudgets {
    pub items: Vec<TypeBudgetItem>,
}

impl Schema for TypeBudgets {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<TypeBudgets> {
        let items = reader.objects("items", 1, |item| {
            let activity_type_id = item.required("activityTypeId", id());
            let type_id = item.nullable("typeId", id());
            let planned_amount = item.required("plannedAmount", NonNegativeNumber);

            Some(TypeBudgetItem {
                activity_type_id: activity_type_id?,
                type_id: type_id.into_option(),
                planned_amount: planned_amount?,
            })
        })?;

        let activity_types = items.iter().map(|item| item.activity_type_id);
        if let Some(index) = first_duplicate(activity_types) {
            reader.reject(
                &format!("items[{}].activityTypeId", index),
                "must not repeat an earlier activity type",
            );
            return None;
        }

        Some(TypeBudgets { items })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::schema::{validate, FieldError};

    const BRAND: &str = "9b2f7a0c-1d1e-4f7a-8c55-3a9e2d6b4c01";
    const EVENTS: &str = "9b2f7a0c-1d1e-4f7a-8c55-3a9e2d6b4c02";

    #[test]
    fn create_accepts_a_zero_budget() {
        let plan: CreatePlan = validate(&json!({
            "title": "Q3",
            "typeId": BRAND,
            "budgetAmount": 0,
        }))
        .unwrap();

        assert_eq!(plan.budget_amount, 0.0);
        assert!(!plan.allocate_by_type);
        assert!(!plan.is_archived);
    }

    #[test]
    fn create_rejects_a_negative_budget() {
        let error = validate::<CreatePlan>(&json!({
            "title": "Q3",
            "typeId": BRAND,
            "budgetAmount": -1,
        }))
        .unwrap_err();

        assert_eq!(
            error,
            Error::ValidationFailed {
                errors: vec![FieldError::new(
                    "budgetAmount",
                    "must be greater than or equal to 0"
                )],
            }
        );
    }

    #[test]
    fn update_clears_end_date_on_null() {
        let update: UpdatePlan = validate(&json!({ "endDate": null })).unwrap();

        assert_eq!(
            update,
            UpdatePlan {
                end_date: Patch::Null,
                ..UpdatePlan::default()
            }
        );
    }

    #[test]
    fn type_budgets_must_not_be_empty() {
        let error = validate::<TypeBudgets>(&json!({ "items": [] })).unwrap_err();

        assert_eq!(
            error,
            Error::ValidationFailed {
                errors: vec![FieldError::new(
                    "items",
                    "must contain at least 1 element(s)"
                )],
            }
        );
    }

    #[test]
    fn type_budgets_report_item_errors_by_index() {
        let error = validate::<TypeBudgets>(&json!({
            "items": [
                { "activityTypeId": BRAND, "plannedAmount": 100 },
                { "plannedAmount": -5 },
            ]
        }))
        .unwrap_err();

        assert_eq!(
            error,
            Error::ValidationFailed {
                errors: vec![
                    FieldError::new("items[1].activityTypeId", "is required"),
                    FieldError::new(
                        "items[1].plannedAmount",
                        "must be greater than or equal to 0"
                    ),
                ],
            }
        );
    }

    #[test]
    fn type_budgets_reject_a_repeated_activity_type() {
        let error = validate::<TypeBudgets>(&json!({
            "items": [
                { "activityTypeId": BRAND, "plannedAmount": 100 },
                { "activityTypeId": EVENTS, "plannedAmount": 50, "typeId": null },
                { "activityTypeId": BRAND, "plannedAmount": 25 },
            ]
        }))
        .unwrap_err();

        assert_eq!(
            error,
            Error::ValidationFailed {
                errors: vec![FieldError::new(
                    "items[2].activityTypeId",
                    "must not repeat an earlier activity type"
                )],
            }
        );
    }
}
