// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`Config`](crate::config::Config).
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserialises a TOML file
//!    directly into a [`Config`]. Every field has a default, so a partial
//!    file (even an empty one) is valid — unset sections fall back to
//!    [`Config::default`].
//! 2. **Environment variables** — [`load_config_from_env`] starts from
//!    [`Config::default`] and overrides a handful of the most commonly
//!    tuned knobs from `WARDEN_`-prefixed environment variables.
//!
//! Both loaders are only available when the `config-loader` feature is
//! enabled, which implies `std`.
//!
//! # File format
//!
//! ```toml
//! [trustDynamics]
//! gainRate = 0.01
//! lossRate = 0.10
//! cooldownHours = 168
//!
//! [gate]
//! verificationThreshold = "HIGH"
//! humanApprovalThreshold = "CRITICAL"
//!
//! [policy]
//! defaultEffect = "deny"
//! ```
//!
//! # Environment variables
//!
//! | Variable                              | Type    | Overrides                          |
//! |----------------------------------------|---------|-------------------------------------|
//! | `WARDEN_TRUST_GAIN_RATE`               | float   | `trustDynamics.gainRate`            |
//! | `WARDEN_TRUST_LOSS_RATE`               | float   | `trustDynamics.lossRate`            |
//! | `WARDEN_TRUST_COOLDOWN_HOURS`          | integer | `trustDynamics.cooldownHours`       |
//! | `WARDEN_CIRCUIT_BREAKER_THRESHOLD`     | float   | `trustDynamics.circuitBreakerThreshold` |
//! | `WARDEN_GATE_VERIFICATION_VALIDITY_MS` | integer | `gate.verificationValidityMs`       |
//! | `WARDEN_POLICY_DEFAULT_EFFECT`         | string  | `policy.defaultEffect` (`permit`\|`deny`) |
//! | `WARDEN_AUDIT_REQUIRE_SIGNING`         | boolean | `audit.requireSigning`              |

// Only compile this module when the "config-loader" feature is enabled.
// "config-loader" implies "std", so std facilities are always available here.
#![cfg(feature = "config-loader")]

use std::fmt;
use std::fs;
use std::num::{ParseFloatError, ParseIntError};

use crate::config::Config;
use crate::types::Effect;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or parsing governance configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required file could not be opened.
    FileRead { path: String, source: std::io::Error },
    /// The TOML content could not be deserialised.
    TomlParse { source: toml::de::Error },
    /// An environment variable could not be parsed to its expected type.
    ParseField { field: String, value: String, reason: String },
    /// A field value is outside the permitted range.
    InvalidRange { field: String, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead { path, source } =>
                write!(f, "failed to read config file \"{path}\": {source}"),
            ConfigError::TomlParse { source } =>
                write!(f, "failed to parse TOML config: {source}"),
            ConfigError::ParseField { field, value, reason } =>
                write!(f, "field \"{field}\": cannot parse \"{value}\" — {reason}"),
            ConfigError::InvalidRange { field, value, reason } =>
                write!(f, "field \"{field}\": value \"{value}\" out of range — {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            ConfigError::TomlParse { source } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load a [`Config`] from a TOML file. Missing sections and fields fall
/// back to their defaults — a deployment only needs to list the knobs it
/// actually wants to change.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or if the TOML
/// content does not match the expected schema.
///
/// # Example
///
/// ```rust,no_run
/// use warden_governance_core::config_loader::load_config;
///
/// let config = load_config("/etc/warden/governance.toml").unwrap();
/// println!("gain rate: {}", config.trust_dynamics.gain_rate);
/// ```
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_owned(),
        source,
    })?;

    toml::from_str::<Config>(&content).map_err(|source| ConfigError::TomlParse { source })
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Build a [`Config`] starting from [`Config::default`] and overriding the
/// knobs operators most commonly tune per-deployment from `WARDEN_`-prefixed
/// environment variables. Unset variables leave the default untouched.
///
/// # Errors
///
/// Returns a [`ConfigError::ParseField`] if a set variable cannot be parsed,
/// or [`ConfigError::InvalidRange`] if it parses but is out of range.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(v) = read_env_f64_opt("WARDEN_TRUST_GAIN_RATE")? {
        config.trust_dynamics.gain_rate = v;
    }
    if let Some(v) = read_env_f64_opt("WARDEN_TRUST_LOSS_RATE")? {
        config.trust_dynamics.loss_rate = v;
    }
    if let Some(v) = read_env_u64_opt("WARDEN_TRUST_COOLDOWN_HOURS")? {
        config.trust_dynamics.cooldown_hours = v;
    }
    if let Some(v) = read_env_f64_opt("WARDEN_CIRCUIT_BREAKER_THRESHOLD")? {
        if v < 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "WARDEN_CIRCUIT_BREAKER_THRESHOLD".into(),
                value: v.to_string(),
                reason: "must be >= 0.0".into(),
            });
        }
        config.trust_dynamics.circuit_breaker_threshold = v;
    }
    if let Some(v) = read_env_u64_opt("WARDEN_GATE_VERIFICATION_VALIDITY_MS")? {
        config.gate.verification_validity_ms = v;
    }
    if let Ok(val) = std::env::var("WARDEN_POLICY_DEFAULT_EFFECT") {
        config.policy.default_effect = match val.to_ascii_lowercase().as_str() {
            "permit" => Effect::Permit,
            "deny" => Effect::Deny,
            other => {
                return Err(ConfigError::ParseField {
                    field: "WARDEN_POLICY_DEFAULT_EFFECT".into(),
                    value: other.into(),
                    reason: "expected one of: permit, deny".into(),
                })
            }
        };
    }
    if let Some(v) = read_env_bool_opt("WARDEN_AUDIT_REQUIRE_SIGNING")? {
        config.audit.require_signing = v;
    }

    Ok(config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_env_f64_opt(key: &str) -> Result<Option<f64>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|source: ParseFloatError| ConfigError::ParseField {
                field: key.to_owned(),
                value: val,
                reason: source.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn read_env_u64_opt(key: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|source: ParseIntError| ConfigError::ParseField {
                field: key.to_owned(),
                value: val,
                reason: source.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn read_env_bool_opt(key: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            other => Err(ConfigError::ParseField {
                field: key.to_owned(),
                value: other.to_owned(),
                reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
            }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_load_falls_back_to_defaults_for_missing_sections() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("warden-config-loader-test-{}.toml", std::process::id()));
        std::fs::write(&path, "[policy]\ndefaultEffect = \"permit\"\n").unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.policy.default_effect, Effect::Permit);
        assert_eq!(config.trust_dynamics.gain_rate, Config::default().trust_dynamics.gain_rate);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn toml_load_missing_file_surfaces_file_read_error() {
        let err = load_config("/nonexistent/path/warden.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn env_override_invalid_effect_is_rejected() {
        std::env::set_var("WARDEN_POLICY_DEFAULT_EFFECT", "maybe");
        let err = load_config_from_env().unwrap_err();
        std::env::remove_var("WARDEN_POLICY_DEFAULT_EFFECT");
        assert!(matches!(err, ConfigError::ParseField { .. }));
    }

    #[test]
    fn env_override_applies_only_set_variables() {
        std::env::set_var("WARDEN_TRUST_GAIN_RATE", "0.05");
        let config = load_config_from_env().unwrap();
        std::env::remove_var("WARDEN_TRUST_GAIN_RATE");
        assert_eq!(config.trust_dynamics.gain_rate, 0.05);
        assert_eq!(config.trust_dynamics.loss_rate, Config::default().trust_dynamics.loss_rate);
    }
}
