use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// MongoDB; reorders and type-budget writes need a replica set.
    Mongo,
    /// Process memory, lost on exit.
    Memory,
}

/// Marketing management API server
#[derive(Clone, Debug, Parser)]
#[command(name = "marketing_server", version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "MARKETING_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Where records are kept
    #[arg(long, env = "MARKETING_STORE", value_enum, default_value_t = StoreKind::Mongo)]
    pub store: StoreKind,

    #[arg(
        long,
        env = "MARKETING_MONGODB_URI",
        default_value = "mongodb://localhost:27017"
    )]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MARKETING_DATABASE", default_value = "marketing")]
    pub database: String,

    /// Bearer token granted every permission. May be repeated.
    #[arg(
        long = "admin-token",
        env = "MARKETING_ADMIN_TOKENS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    pub admin_tokens: Vec<String>,

    /// Log filter directives, e.g. `info,marketing_server=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,

    /// Fill empty type catalogs with a default set of entries on startup
    #[arg(long, env = "MARKETING_SEED")]
    pub seed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_for_local_development() {
        let config = Config::try_parse_from(["marketing_server"]).unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.store, StoreKind::Mongo);
        assert_eq!(config.database, "marketing");
        assert!(config.admin_tokens.is_empty());
        assert!(!config.seed);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "marketing_server",
            "--store",
            "memory",
            "--bind",
            "0.0.0.0:9000",
            "--admin-token",
            "alpha,beta",
            "--admin-token",
            "gamma",
            "--seed",
        ])
        .unwrap();

        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.admin_tokens, vec!["alpha", "beta", "gamma"]);
        assert!(config.seed);
    }

    #[test]
    fn unknown_store_is_rejected() {
        assert!(Config::try_parse_from(["marketing_server", "--store", "redis"]).is_err());
    }
}
