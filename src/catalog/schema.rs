use crate::schema::{
    first_duplicate, id, Flag, NonEmptyText, NonNegativeInteger, ObjectReader, Patch, Schema, Text,
};

use super::{CatalogEntry, CatalogEntryId};

#[derive(Clone, Debug, PartialEq)]
pub struct CreateCatalogEntry {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<u32>,
    pub is_active: bool,
}

impl Schema for CreateCatalogEntry {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<CreateCatalogEntry> {
        let key = reader.required("key", NonEmptyText);
        let name = reader.required("name", NonEmptyText);
        let description = reader.nullable("description", Text);
        let color = reader.nullable("color", Text);
        let icon = reader.nullable("icon", Text);
        let sort_order = reader.optional("sortOrder", NonNegativeInteger);
        let is_active = reader.optional("isActive", Flag);

        Some(CreateCatalogEntry {
            key: key?,
            name: name?,
            description: description.into_option(),
            color: color.into_option(),
            icon: icon.into_option(),
            sort_order,
            is_active: is_active.unwrap_or(true),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateCatalogEntry {
    pub key: Option<String>,
    pub name: Option<String>,
    pub description: Patch<String>,
    pub color: Patch<String>,
    pub icon: Patch<String>,
    pub sort_order: Option<u32>,
    pub is_active: Option<bool>,
}

impl Schema for UpdateCatalogEntry {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<UpdateCatalogEntry> {
        Some(UpdateCatalogEntry {
            key: reader.optional("key", NonEmptyText),
            name: reader.optional("name", NonEmptyText),
            description: reader.nullable("description", Text),
            color: reader.nullable("color", Text),
            icon: reader.nullable("icon", Text),
            sort_order: reader.optional("sortOrder", NonNegativeInteger),
            is_active: reader.optional("isActive", Flag),
        })
    }
}

impl UpdateCatalogEntry {
    pub fn apply(self, entry: &mut CatalogEntry) {
        if let Some(key) = self.key {
            entry.key = key;
        }
        if let Some(name) = self.name {
            entry.name = name;
        }
        self.description.apply_to(&mut entry.description);
        self.color.apply_to(&mut entry.color);
        self.icon.apply_to(&mut entry.icon);
        if let Some(sort_order) = self.sort_order {
            entry.sort_order = sort_order;
        }
        if let Some(is_active) = self.is_active {
            entry.is_active = is_active;
        }
    }
}

/// A complete new order for one catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct ReorderCatalog {
    pub ids: Vec<CatalogEntryId>,
}

impl Schema for ReorderCatalog {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<ReorderCatalog> {
        let ids: Vec<CatalogEntryId> = reader.values("ids", 1, id())?;

        if let Some(index) = first_duplicate(ids.iter().copied()) {
            reader.reject(&format!("ids[{}]", index), "must not repeat an earlier id");
            return None;
        }

        Some(ReorderCatalog { ids })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::schema::{validate, FieldError};

    #[test]
    fn create_fills_in_defaults() {
        let entry: CreateCatalogEntry = validate(&json!({
            "key": "paid-social",
            "name": "Paid social",
            "sortOrder": 3,
        }))
        .unwrap();

        assert_eq!(entry.sort_order, Some(3));
        assert!(entry.is_active);
        assert_eq!(entry.color, None);
    }

    #[test]
    fn create_rejects_fractional_and_negative_sort_orders() {
        for sort_order in &[json!(1.5), json!(-1)] {
            let error = validate::<CreateCatalogEntry>(&json!({
                "key": "events",
                "name": "Events",
                "sortOrder": sort_order,
            }))
            .unwrap_err();

            assert_eq!(
                error,
                Error::ValidationFailed {
                    errors: vec![FieldError::new(
                        "sortOrder",
                        "must be a non-negative integer"
                    )],
                }
            );
        }
    }

    #[test]
    fn reorder_requires_at_least_one_id() {
        let error = validate::<ReorderCatalog>(&json!({ "ids": [] })).unwrap_err();

        assert_eq!(
            error,
            Error::ValidationFailed {
                errors: vec![FieldError::new(
                    "ids",
                    "must contain at least 1 element(s)"
                )],
            }
        );
    }

    #[test]
    fn reorder_rejects_repeated_ids() {
        let a = "6f1c1f8e-5b0e-4d4a-9d61-2b7c5e0e8a01";
        let b = "6f1c1f8e-5b0e-4d4a-9d61-2b7c5e0e8a02";

        let error = validate::<ReorderCatalog>(&json!({ "ids": [a, b, a] })).unwrap_err();

        assert_eq!(
            error,
            Error::ValidationFailed {
                errors: vec![FieldError::new("ids[2]", "must not repeat an earlier id")],
            }
        );
    }

    #[test]
    fn reorder_reports_malformed_ids_by_index() {
        let error = validate::<ReorderCatalog>(&json!({
            "ids": ["6f1c1f8e-5b0e-4d4a-9d61-2b7c5e0e8a01", "not-a-uuid"]
        }))
        .unwrap_err();

        assert_eq!(
            error,
            Error::ValidationFailed {
                errors: vec![FieldError::new("ids[1]", "must be a valid uuid")],
            }
        );
    }
}
