use mongodb::error::{Error as DatabaseError, ErrorKind, WriteFailure};
use mongodb::{bson, Client, Collection};
use tracing::info;

use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::catalog::db::{CatalogStore, MongoCatalogStore};
use crate::catalog::CatalogEntry;
use crate::error::Error;
use crate::expense::db::ExpenseStore;
use crate::expense::Expense;
use crate::link::db::LinkStore;
use crate::link::Link;
use crate::plan::db::{MongoTypeBudgetStore, PlanStore, TypeBudgetStore};
use crate::plan::Plan;
use crate::vendor::db::VendorStore;
use crate::vendor::Vendor;
use crate::{campaign, catalog, expense, link, plan, vendor};

pub mod memory;

pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoPlanStore = Collection<Plan>;
pub type MongoExpenseStore = Collection<Expense>;
pub type MongoVendorStore = Collection<Vendor>;
pub type MongoLinkStore = Collection<Link>;

/// One page of a filtered listing along with the number of records that
/// matched the filter overall.
#[derive(Clone, Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Whether a write was refused by a unique index.
pub fn is_duplicate_key(error: &DatabaseError) -> bool {
    matches!(
        *error.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref failure)) if failure.code == DUPLICATE_KEY_CODE
    )
}

pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;
    fn plans(&self) -> &dyn PlanStore;
    fn type_budgets(&self) -> &dyn TypeBudgetStore;
    fn expenses(&self) -> &dyn ExpenseStore;
    fn vendors(&self) -> &dyn VendorStore;
    fn catalog(&self) -> &dyn CatalogStore;
    fn links(&self) -> &dyn LinkStore;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    campaigns: MongoCampaignStore,
    plans: MongoPlanStore,
    type_budgets: MongoTypeBudgetStore,
    expenses: MongoExpenseStore,
    vendors: MongoVendorStore,
    catalog: MongoCatalogStore,
    links: MongoLinkStore,
}

impl MongoDatabase {
    pub async fn connect(uri: &str, name: &str) -> Result<MongoDatabase, Error> {
        info!("connecting to db: {}", uri);
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(name);

        // ping the database to ensure connection is established
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        MongoDatabase::initialize(client, db).await
    }

    pub async fn initialize(client: Client, db: mongodb::Database) -> Result<MongoDatabase, Error> {
        campaign::db::initialize(&db).await?;
        plan::db::initialize(&db).await?;
        expense::db::initialize(&db).await?;
        vendor::db::initialize(&db).await?;
        catalog::db::initialize(&db).await?;
        link::db::initialize(&db).await?;

        Ok(MongoDatabase::new(client, db))
    }

    pub fn new(client: Client, db: mongodb::Database) -> MongoDatabase {
        MongoDatabase {
            campaigns: db.collection(campaign::db::CAMPAIGNS),
            plans: db.collection(plan::db::PLANS),
            type_budgets: MongoTypeBudgetStore::new(client.clone(), &db),
            expenses: db.collection(expense::db::EXPENSES),
            vendors: db.collection(vendor::db::VENDORS),
            catalog: MongoCatalogStore::new(client, &db),
            links: db.collection(link::db::LINKS),
        }
    }
}

impl Database for MongoDatabase {
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
