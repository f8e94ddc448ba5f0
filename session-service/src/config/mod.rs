use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub signature_secret: Secret<String>,
    pub duplicate_policy: DuplicatePolicy,
    pub otlp_endpoint: Option<String>,
}

/// Which backing store the session items are read from.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    MongoDb(MongoConfig),
    Postgres(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: Secret<String>,
    pub table: String,
    pub max_connections: u32,
}

/// What happens when two items share a discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    LastWins,
    FirstWins,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last_wins" | "last" => Ok(DuplicatePolicy::LastWins),
            "first_wins" | "first" => Ok(DuplicatePolicy::FirstWins),
            _ => Err(format!("Invalid duplicate policy: {}", s)),
        }
    }
}

impl SessionConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let store = match get_env("SESSION_STORE", Some("mongodb"), is_prod)?
            .to_lowercase()
            .as_str()
        {
            "mongodb" | "mongo" => StoreConfig::MongoDb(MongoConfig {
                uri: Secret::new(get_env(
                    "MONGODB_URI",
                    Some("mongodb://localhost:27017"),
                    is_prod,
                )?),
                database: get_env("MONGODB_DATABASE", Some("session_db"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("sessions"), is_prod)?,
            }),
            "postgres" | "postgresql" => StoreConfig::Postgres(PostgresConfig {
                url: Secret::new(get_env("POSTGRES_URL", None, is_prod)?),
                table: get_env("POSTGRES_TABLE", Some("sessions"), is_prod)?,
                max_connections: get_env("POSTGRES_MAX_CONNECTIONS", Some("10"), false)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "POSTGRES_MAX_CONNECTIONS is not a number: {}",
                            e
                        ))
                    })?,
            }),
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Invalid session store backend: {}",
                    other
                )))
            }
        };

        Ok(SessionConfig {
            common: common_config,
            store,
            signature_secret: Secret::new(get_env("SECRET_SIGNATURE", None, is_prod)?),
            duplicate_policy: get_env("DUPLICATE_POLICY", Some("last_wins"), false)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duplicate_policy() {
        assert_eq!(
            "last_wins".parse::<DuplicatePolicy>(),
            Ok(DuplicatePolicy::LastWins)
        );
        assert_eq!(
            "First-Wins".parse::<DuplicatePolicy>(),
            Ok(DuplicatePolicy::FirstWins)
        );
        assert!("newest".parse::<DuplicatePolicy>().is_err());
    }
}
