use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::error::Error as DatabaseError;
use mongodb::options::FindOptions;
use mongodb::{bson, Client, Collection, Database};

use crate::database::is_duplicate_key;
use crate::database::memory::MemoryCollection;
use crate::error::Error;

use super::{sort_entries, CatalogEntry, CatalogEntryId, CatalogKind};

pub const CATALOG: &str = "catalog";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": CATALOG,
            "indexes": [
                { "key": { "kind": 1, "key": 1 }, "name": "unique_key_per_kind", "unique": true },
                { "key": { "kind": 1, "sort_order": 1 }, "name": "by_sort_order" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fails with [`Error::CatalogKeyAlreadyExists`] if the catalog already
    /// holds the entry's key.
    async fn insert_entry(&self, entry: &CatalogEntry) -> Result<(), Error>;

    /// Entries of one catalog in listing order.
    async fn fetch_entries(
        &self,
        kind: CatalogKind,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntry>, Error>;

    async fn fetch_entry_by_id(
        &self,
        kind: CatalogKind,
        entry_id: CatalogEntryId,
    ) -> Result<Option<CatalogEntry>, Error>;

    async fn replace_entry(
        &self,
        entry: &CatalogEntry,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error>;

    /// Gives every entry of the catalog the sort order of its position in
    /// `ids`. Either all entries move or none do.
    async fn update_sort_orders(
        &self,
        kind: CatalogKind,
        ids: &[CatalogEntryId],
    ) -> Result<Vec<CatalogEntry>, Error>;
}

/// Checks that `ids` names every current entry of the catalog and nothing
/// else.
pub fn check_reorder(
    kind: CatalogKind,
    current: &[CatalogEntryId],
    ids: &[CatalogEntryId],
) -> Result<(), Error> {
    let unknown_ids: Vec<CatalogEntryId> = ids
        .iter()
        .filter(|id| !current.contains(id))
        .copied()
        .collect();
    let missing_ids: Vec<CatalogEntryId> = current
        .iter()
        .filter(|id| !ids.contains(id))
        .copied()
        .collect();

    if !unknown_ids.is_empty() || !missing_ids.is_empty() {
        return Err(Error::ReorderDoesNotMatchCatalog {
            kind,
            unknown_ids,
            missing_ids,
        });
    }

    Ok(())
}

fn key_conflict(error: DatabaseError, entry: &CatalogEntry) -> Error {
    if is_duplicate_key(&error) {
        Error::CatalogKeyAlreadyExists {
            kind: entry.kind,
            key: entry.key.clone(),
        }
    } else {
        Error::from(error)
    }
}

#[derive(Debug, Clone)]
pub struct MongoCatalogStore {
    entries: Collection<CatalogEntry>,
    client: Client,
}

impl MongoCatalogStore {
    pub fn new(client: Client, db: &Database) -> MongoCatalogStore {
        MongoCatalogStore {
            entries: db.collection(CATALOG),
            client,
        }
    }
}

#[async_trait]
impl CatalogStore for MongoCatalogStore {
    #[tracing::instrument(skip(self))]
    async fn insert_entry(&self, entry: &CatalogEntry) -> Result<(), Error> {
        self.entries
            .insert_one(entry, None)
            .await
            .map_err(|err| key_conflict(err, entry))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_entries(
        &self,
        kind: CatalogKind,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntry>, Error> {
        let mut filter = bson::doc! { "kind": kind };
        if !include_inactive {
            filter.insert("is_active", true);
        }

        let options = FindOptions::builder()
            .sort(bson::doc! { "sort_order": 1, "name": 1 })
            .build();

        let entries: Vec<CatalogEntry> = self
            .entries
            .find(filter, options)
            .await?
            .try_collect()
            .await?;

        Ok(entries)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_entry_by_id(
        &self,
        kind: CatalogKind,
        entry_id: CatalogEntryId,
    ) -> Result<Option<CatalogEntry>, Error> {
        let entry = self
            .entries
            .find_one(bson::doc! { "_id": entry_id, "kind": kind }, None)
            .await?;

        Ok(entry)
    }

    #[tracing::instrument(skip(self))]
    async fn replace_entry(
        &self,
        entry: &CatalogEntry,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let old_modified_at = bson::DateTime::from_chrono(expected_modified_at);

        let result = self
            .entries
            .replace_one(
                bson::doc! { "_id": entry.id, "modified_at": old_modified_at },
                entry,
                None,
            )
            .await
            .map_err(|err| key_conflict(err, entry))?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn update_sort_orders(
        &self,
        kind: CatalogKind,
        ids: &[CatalogEntryId],
    ) -> Result<Vec<CatalogEntry>, Error> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let mut entries: Vec<CatalogEntry> = self
            .entries
            .find_with_session(bson::doc! { "kind": kind }, None, &mut session)
            .await?
            .stream(&mut session)
            .try_collect()
            .await?;

        let current: Vec<CatalogEntryId> = entries.iter().map(|entry| entry.id).collect();
        if let Err(error) = check_reorder(kind, &current, ids) {
            session.abort_transaction().await?;
            return Err(error);
        }

        let now = Utc::now();
        let modified_at = bson::DateTime::from_chrono(now);
        for (position, entry_id) in ids.iter().copied().enumerate() {
            let sort_order = position as i64;
            self.entries
                .update_one_with_session(
                    bson::doc! { "_id": entry_id, "kind": kind },
                    bson::doc! { "$set": { "sort_order": sort_order, "modified_at": modified_at } },
                    None,
                    &mut session,
                )
                .await?;
        }

        session.commit_transaction().await?;

        apply_positions(&mut entries, ids, now);
        sort_entries(&mut entries);

        Ok(entries)
    }
}

fn apply_positions(entries: &mut [CatalogEntry], ids: &[CatalogEntryId], now: DateTime<Utc>) {
    for entry in entries.iter_mut() {
        if let Some(position) = ids.iter().position(|id| *id == entry.id) {
            entry.sort_order = position as u32;
            entry.modified_at = now;
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCollection<CatalogEntry> {
    async fn insert_entry(&self, entry: &CatalogEntry) -> Result<(), Error> {
        let mut entries = self.lock()?;
        if entries
            .iter()
            .any(|stored| stored.kind == entry.kind && stored.key == entry.key)
        {
            return Err(Error::CatalogKeyAlreadyExists {
                kind: entry.kind,
                key: entry.key.clone(),
            });
        }

        entries.push(entry.clone());

        Ok(())
    }

    async fn fetch_entries(
        &self,
        kind: CatalogKind,
        include_inactive: bool,
    ) -> Result<Vec<CatalogEntry>, Error> {
        let mut entries: Vec<CatalogEntry> = self
            .lock()?
            .iter()
            .filter(|entry| entry.kind == kind && (include_inactive || entry.is_active))
            .cloned()
            .collect();
        sort_entries(&mut entries);

        Ok(entries)
    }

    async fn fetch_entry_by_id(
        &self,
        kind: CatalogKind,
        entry_id: CatalogEntryId,
    ) -> Result<Option<CatalogEntry>, Error> {
        let entry = self
            .lock()?
            .iter()
            .find(|entry| entry.kind == kind && entry.id == entry_id)
            .cloned();

        Ok(entry)
    }

    async fn replace_entry(
        &self,
        entry: &CatalogEntry,
        expected_modified_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut entries = self.lock()?;
        if entries.iter().any(|stored| {
            stored.id != entry.id && stored.kind == entry.kind && stored.key == entry.key
        }) {
            return Err(Error::CatalogKeyAlreadyExists {
                kind: entry.kind,
                key: entry.key.clone(),
            });
        }

        let stored = entries
            .iter_mut()
            .find(|stored| stored.id == entry.id && stored.modified_at == expected_modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        *stored = entry.clone();

        Ok(())
    }

    async fn update_sort_orders(
        &self,
        kind: CatalogKind,
        ids: &[CatalogEntryId],
    ) -> Result<Vec<CatalogEntry>, Error> {
        let mut entries = self.lock()?;

        let current: Vec<CatalogEntryId> = entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.id)
            .collect();
        check_reorder(kind, &current, ids)?;

        let now = Utc::now();
        apply_positions(&mut entries, ids, now);

        let mut reordered: Vec<CatalogEntry> = entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect();
        sort_entries(&mut reordered);

        Ok(reordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_check_reports_both_directions() {
        let a = CatalogEntryId::new();
        let b = CatalogEntryId::new();
        let stranger = CatalogEntryId::new();

        assert!(check_reorder(CatalogKind::CampaignType, &[a, b], &[b, a]).is_ok());

        let error = check_reorder(CatalogKind::CampaignType, &[a, b], &[a, stranger]).unwrap_err();

        assert_eq!(
            error,
            Error::ReorderDoesNotMatchCatalog {
                kind: CatalogKind::CampaignType,
                unknown_ids: vec![stranger],
                missing_ids: vec![b],
            }
        );
    }
}
