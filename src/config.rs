use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Where `OrderCreated` events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherKind {
    /// Rows in `store_order_outbox`, relayed by Debezium.
    Outbox,
    /// The in-process notification worker.
    Channel,
}

impl FromStr for PublisherKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "outbox" => Ok(PublisherKind::Outbox),
            "channel" => Ok(PublisherKind::Channel),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub publisher: PublisherKind,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };
        let publisher = match lookup("EVENT_PUBLISHER") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "EVENT_PUBLISHER",
                value: raw,
            })?,
            None => PublisherKind::Outbox,
        };

        Ok(Settings {
            database_url,
            host,
            port,
            publisher,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/store")]).expect("valid");
        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 8080);
        assert_eq!(s.publisher, PublisherKind::Outbox);
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(
            settings(&[]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = settings(&[("DATABASE_URL", "x"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn publisher_kind_is_case_insensitive() {
        let s = settings(&[("DATABASE_URL", "x"), ("EVENT_PUBLISHER", "Channel")]).expect("valid");
        assert_eq!(s.publisher, PublisherKind::Channel);
        assert!(settings(&[("DATABASE_URL", "x"), ("EVENT_PUBLISHER", "kafka")]).is_err());
    }
}
