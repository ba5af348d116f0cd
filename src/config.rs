//! Process configuration.
//!
//! The entry point reads a small set of enable flags and key/secret pairs
//! from an opaque key-value provider — the environment by default. The
//! library itself never touches the environment; clients take explicit
//! [`Credentials`].

use crate::auth::Credentials;
use crate::error::ConfigError;
use crate::shared::Network;

const BITMEX_ENABLED: &str = "BITMEX_ENABLED";
const BINANCE_ENABLED: &str = "BINANCE_ENABLED";
const TESTNET: &str = "TESTNET";
const BITMEX_API_KEY: &str = "BITMEX_API_KEY";
const BITMEX_API_SECRET: &str = "BITMEX_API_SECRET";
const BINANCE_API_KEY: &str = "BINANCE_API_KEY";
const BINANCE_API_SECRET: &str = "BINANCE_API_SECRET";

/// Static configuration for one process run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bitmex_enabled: bool,
    pub binance_enabled: bool,
    pub testnet: bool,
    pub bitmex: Option<Credentials>,
    pub binance: Option<Credentials>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from an arbitrary key-value provider.
    ///
    /// Credentials are required only for the exchanges that are enabled.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bitmex_enabled = flag(&lookup, BITMEX_ENABLED, false)?;
        let binance_enabled = flag(&lookup, BINANCE_ENABLED, false)?;
        let testnet = flag(&lookup, TESTNET, true)?;

        let bitmex = if bitmex_enabled {
            Some(credentials(&lookup, BITMEX_API_KEY, BITMEX_API_SECRET)?)
        } else {
            None
        };
        let binance = if binance_enabled {
            Some(credentials(&lookup, BINANCE_API_KEY, BINANCE_API_SECRET)?)
        } else {
            None
        };

        Ok(Self {
            bitmex_enabled,
            binance_enabled,
            testnet,
            bitmex,
            binance,
        })
    }

    pub fn network(&self) -> Network {
        if self.testnet {
            Network::Testnet
        } else {
            Network::Production
        }
    }
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue { var, value: raw }),
        },
    }
}

fn credentials(
    lookup: &impl Fn(&str) -> Option<String>,
    key_var: &'static str,
    secret_var: &'static str,
) -> Result<Credentials, ConfigError> {
    let key = lookup(key_var).ok_or(ConfigError::MissingVar(key_var))?;
    let secret = lookup(secret_var).ok_or(ConfigError::MissingVar(secret_var))?;
    Ok(Credentials::new(key, secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn provider(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(provider(&[])).unwrap();
        assert!(!config.bitmex_enabled);
        assert!(!config.binance_enabled);
        assert!(config.testnet);
        assert_eq!(config.network(), Network::Testnet);
    }

    #[test]
    fn test_enabled_exchange_requires_credentials() {
        let err = AppConfig::from_lookup(provider(&[("BITMEX_ENABLED", "true")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("BITMEX_API_KEY")));
    }

    #[test]
    fn test_full_configuration() {
        let config = AppConfig::from_lookup(provider(&[
            ("BITMEX_ENABLED", "true"),
            ("BITMEX_API_KEY", "k1"),
            ("BITMEX_API_SECRET", "s1"),
            ("BINANCE_ENABLED", "1"),
            ("BINANCE_API_KEY", "k2"),
            ("BINANCE_API_SECRET", "s2"),
            ("TESTNET", "false"),
        ]))
        .unwrap();

        assert!(config.bitmex_enabled);
        assert!(config.binance_enabled);
        assert_eq!(config.network(), Network::Production);
        assert_eq!(config.bitmex.as_ref().unwrap().api_key, "k1");
        assert_eq!(config.binance.as_ref().unwrap().api_key, "k2");
    }

    #[test]
    fn test_disabled_exchange_needs_no_credentials() {
        let config = AppConfig::from_lookup(provider(&[("BINANCE_ENABLED", "false")])).unwrap();
        assert!(config.binance.is_none());
    }

    #[test]
    fn test_invalid_flag_value_is_rejected() {
        let err = AppConfig::from_lookup(provider(&[("TESTNET", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "TESTNET", .. }));
    }
}
