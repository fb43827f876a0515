use std::sync::{Mutex, MutexGuard};

use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::catalog::db::CatalogStore;
use crate::catalog::CatalogEntry;
use crate::error::Error;
use crate::expense::db::ExpenseStore;
use crate::expense::Expense;
use crate::link::db::LinkStore;
use crate::link::Link;
use crate::plan::db::{PlanStore, TypeBudgetStore};
use crate::plan::{Plan, TypeBudget};
use crate::vendor::db::VendorStore;
use crate::vendor::Vendor;

use super::Database;

/// A vector of records behind a lock. Each store operation holds the lock
/// for its whole duration, which makes multi-record writes atomic.
#[derive(Debug)]
pub struct MemoryCollection<T> {
    records: Mutex<Vec<T>>,
}

impl<T> MemoryCollection<T> {
    pub fn new() -> MemoryCollection<T> {
        MemoryCollection {
            records: Mutex::new(vec![]),
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>, Error> {
        self.records
            .lock()
            .map_err(|_| Error::ExistentialState("memory store lock was poisoned".into()))
    }
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> MemoryCollection<T> {
        MemoryCollection::new()
    }
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    campaigns: MemoryCollection<Campaign>,
    plans: MemoryCollection<Plan>,
    type_budgets: MemoryCollection<TypeBudget>,
    expenses: MemoryCollection<Expense>,
    vendors: MemoryCollection<Vendor>,
    catalog: MemoryCollection<CatalogEntry>,
    links: MemoryCollection<Link>,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

impl Database for MemoryDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn plans(&self) -> &dyn PlanStore {
        &self.plans
    }

    fn type_budgets(&self) -> &dyn TypeBudgetStore {
        &self.type_budgets
    }

    fn expenses(&self) -> &dyn ExpenseStore {
        &self.expenses
    }

    fn vendors(&self) -> &dyn VendorStore {
        &self.vendors
    }

    fn catalog(&self) -> &dyn CatalogStore {
        &self.catalog
    }

    fn links(&self) -> &dyn LinkStore {
        &self.links
    }
}
