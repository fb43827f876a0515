use tracing::info;

use crate::catalog::manager;
use crate::catalog::schema::CreateCatalogEntry;
use crate::catalog::CatalogKind;
use crate::database::Database;
use crate::error::Error;

fn defaults(kind: CatalogKind) -> &'static [(&'static str, &'static str, &'static str)] {
    match kind {
        CatalogKind::PlanType => &[
            ("brand", "Brand", "#4f46e5"),
            ("performance", "Performance", "#059669"),
            ("product-launch", "Product launch", "#d97706"),
        ],
        CatalogKind::ActivityType => &[
            ("paid-social", "Paid social", "#2563eb"),
            ("search", "Search", "#16a34a"),
            ("content", "Content", "#9333ea"),
            ("events", "Events", "#ea580c"),
            ("sponsorship", "Sponsorship", "#db2777"),
        ],
        CatalogKind::CampaignType => &[
            ("seasonal", "Seasonal", "#0891b2"),
            ("always-on", "Always on", "#65a30d"),
            ("promotion", "Promotion", "#dc2626"),
        ],
    }
}

/// Adds the default entries to every catalog that has none yet.
pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    for kind in CatalogKind::ALL {
        let existing = manager::get_entries(db, kind, true).await?;
        if !existing.is_empty() {
            continue;
        }

        for (sort_order, (key, name, color)) in defaults(kind).iter().enumerate() {
            let body = CreateCatalogEntry {
                key: (*key).to_owned(),
                name: (*name).to_owned(),
                description: None,
                color: Some((*color).to_owned()),
                icon: None,
                sort_order: Some(sort_order as u32),
                is_active: true,
            };
            manager::create_entry(db, kind, body).await?;
        }

        info!(kind = kind.as_str(), "seeded catalog");
    }

    Ok(())
}
