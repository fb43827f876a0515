use chrono::Utc;

use crate::database::Database;
use crate::error::Error;

use super::schema::{CreateCatalogEntry, ReorderCatalog, UpdateCatalogEntry};
use super::{CatalogEntry, CatalogEntryId, CatalogKind};

#[tracing::instrument(skip(db))]
pub async fn create_entry(
    db: &dyn Database,
    kind: CatalogKind,
    body: CreateCatalogEntry,
) -> Result<CatalogEntry, Error> {
    let sort_order = match body.sort_order {
        Some(sort_order) => sort_order,
        None => next_sort_order(db, kind).await?,
    };

    let now = Utc::now();
    let entry = CatalogEntry {
        id: CatalogEntryId::new(),
        kind,
        key: body.key,
        name: body.name,
        description: body.description,
        color: body.color,
        icon: body.icon,
        sort_order,
        is_active: body.is_active,
        created_at: now,
        modified_at: now,
    };

    db.catalog().insert_entry(&entry).await?;

    Ok(entry)
}

async fn next_sort_order(db: &dyn Database, kind: CatalogKind) -> Result<u32, Error> {
    let entries = db.catalog().fetch_entries(kind, true).await?;

    let next = entries
        .iter()
        .map(|entry| entry.sort_order.saturating_add(1))
        .max()
        .unwrap_or(0);

    Ok(next)
}

#[tracing::instrument(skip(db))]
pub async fn get_entries(
    db: &dyn Database,
    kind: CatalogKind,
    include_inactive: bool,
) -> Result<Vec<CatalogEntry>, Error> {
    let entries = db.catalog().fetch_entries(kind, include_inactive).await?;

    Ok(entries)
}

#[tracing::instrument(skip(db))]
pub async fn expect_entry_by_id(
    db: &dyn Database,
    kind: CatalogKind,
    entry_id: CatalogEntryId,
) -> Result<CatalogEntry, Error> {
    let entry = db
        .catalog()
        .fetch_entry_by_id(kind, entry_id)
        .await?
        .ok_or(Error::CatalogEntryNotFound { kind, entry_id })?;

    Ok(entry)
}

#[tracing::instrument(skip(db))]
pub async fn update_entry(
    db: &dyn Database,
    kind: CatalogKind,
    entry_id: CatalogEntryId,
    changes: UpdateCatalogEntry,
) -> Result<CatalogEntry, Error> {
    let mut entry = expect_entry_by_id(db, kind, entry_id).await?;
    let expected_modified_at = entry.modified_at;

    changes.apply(&mut entry);
    entry.modified_at = Utc::now();

    db.catalog()
        .replace_entry(&entry, expected_modified_at)
        .await?;

    Ok(entry)
}

#[tracing::instrument(skip(db))]
pub async fn reorder_entries(
    db: &dyn Database,
    kind: CatalogKind,
    body: ReorderCatalog,
) -> Result<Vec<CatalogEntry>, Error> {
    let entries = db.catalog().update_sort_orders(kind, &body.ids).await?;

    Ok(entries)
}
