use clap::Parser;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use marketing_server::{Config, Error};

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    marketing_server::run(config).await
}
