use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web::{self, Data, JsonConfig, PathConfig, QueryConfig, ServiceConfig};
use actix_web::{App, HttpResponse, HttpServer};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

pub mod campaign;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod expense;
pub mod link;
pub mod permission;
pub mod plan;
pub mod schema;
pub mod seed;
pub mod typedid;
pub mod utils;
pub mod vendor;

pub use config::{Config, StoreKind};
pub use error::Error;

use crate::database::memory::MemoryDatabase;
use crate::database::{Database, MongoDatabase};
use crate::permission::{PermissionChecker, TokenPermissionChecker};

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(campaign::create_campaign)
        .service(campaign::get_campaigns)
        .service(campaign::get_campaign_by_id)
        .service(campaign::update_campaign)
        .service(plan::create_plan)
        .service(plan::get_plans)
        .service(plan::get_plan_by_id)
        .service(plan::update_plan)
        .service(plan::get_type_budgets)
        .service(plan::replace_type_budgets)
        .service(expense::create_expense)
        .service(expense::get_expenses)
        .service(expense::get_expense_by_id)
        .service(expense::update_expense)
        .service(vendor::create_vendor)
        .service(vendor::get_vendors)
        .service(vendor::get_vendor_by_id)
        .service(vendor::update_vendor)
        // reorder routes go ahead of the `{entry_id}` ones they overlap with
        .service(catalog::get_plan_types)
        .service(catalog::create_plan_type)
        .service(catalog::reorder_plan_types)
        .service(catalog::update_plan_type)
        .service(catalog::get_activity_types)
        .service(catalog::create_activity_type)
        .service(catalog::reorder_activity_types)
        .service(catalog::update_activity_type)
        .service(catalog::get_campaign_types)
        .service(catalog::create_campaign_type)
        .service(catalog::reorder_campaign_types)
        .service(catalog::update_campaign_type)
        .service(link::create_link)
        .service(link::get_links);
}

async fn path_not_found() -> Result<HttpResponse, Error> {
    Err(Error::PathNotFound)
}

/// Builds the HTTP server on an already bound listener. The server does
/// nothing until awaited.
pub fn server(
    db: Box<dyn Database>,
    permissions: Box<dyn PermissionChecker>,
    listener: TcpListener,
) -> Result<Server, Error> {
    let db = Data::new(db);
    let permissions = Data::new(permissions);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(JsonConfig::default().error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(QueryConfig::default().error_handler(|err, _req| {
                // format query errors with custom format
                Error::InvalidQuery(err).into()
            }))
            .app_data(db.clone())
            .app_data(permissions.clone())
            .wrap(TracingLogger::default())
            .configure(routes)
            .default_service(web::to(path_not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub async fn run(config: Config) -> Result<(), Error> {
    let db: Box<dyn Database> = match config.store {
        StoreKind::Mongo => {
            Box::new(MongoDatabase::connect(&config.mongodb_uri, &config.database).await?)
        }
        StoreKind::Memory => {
            info!("using in-memory store");
            Box::new(MemoryDatabase::new())
        }
    };

    if config.seed {
        seed::seed(&*db).await?;
    }

    if config.admin_tokens.is_empty() {
        warn!("no admin tokens configured, plan and activity types cannot be changed");
    }
    let permissions = Box::new(TokenPermissionChecker::new(config.admin_tokens));

    let listener = TcpListener::bind(&config.bind)?;
    info!("listening on {}", listener.local_addr()?);

    server(db, permissions, listener)?.await?;

    Ok(())
}
