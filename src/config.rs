use std::{net::SocketAddr, time::Duration};

use crate::{domain::error::DomainError, usecase::register_driver_usecase::RegistrationConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Process configuration, read from the environment (and `.env` if present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub registration: RegistrationConfig,
    /// Emit a step-by-step trace of every registration attempt.
    pub trace_registrations: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| DomainError::Config(format!("{} must be set", key)))
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| DomainError::Config(format!("BIND_ADDR: {}", e)))?;

        let defaults = RegistrationConfig::default();
        let registration = RegistrationConfig {
            identity_propagation_delay: millis(
                &lookup,
                "IDENTITY_PROPAGATION_DELAY_MS",
                defaults.identity_propagation_delay,
            )?,
            login_redirect_delay: millis(
                &lookup,
                "LOGIN_REDIRECT_DELAY_MS",
                defaults.login_redirect_delay,
            )?,
        };

        let trace_registrations = match lookup("REGISTRATION_TRACE") {
            None => false,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "" | "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(DomainError::Config(format!(
                        "REGISTRATION_TRACE: expected a boolean, got {:?}",
                        other
                    )));
                }
            },
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr,
            registration,
            trace_registrations,
        })
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, DomainError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| DomainError::Config(format!("{}: {}", key, e))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/drivers"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.registration, RegistrationConfig::default());
        assert!(!config.trace_registrations);
        assert_eq!(
            config.registration.identity_propagation_delay,
            Duration::from_millis(1000)
        );
        assert_eq!(
            config.registration.login_redirect_delay,
            Duration::from_millis(3000)
        );
    }

    #[test]
    fn delays_can_be_overridden() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/drivers"),
            ("JWT_SECRET", "secret"),
            ("IDENTITY_PROPAGATION_DELAY_MS", "0"),
            ("LOGIN_REDIRECT_DELAY_MS", " 250 "),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ]))
        .unwrap();

        assert_eq!(config.registration.identity_propagation_delay, Duration::ZERO);
        assert_eq!(
            config.registration.login_redirect_delay,
            Duration::from_millis(250)
        );
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn registration_trace_flag() {
        let with_trace = |value: &str| {
            AppConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://localhost/drivers"),
                ("JWT_SECRET", "secret"),
                ("REGISTRATION_TRACE", value),
            ]))
        };

        assert!(with_trace("true").unwrap().trace_registrations);
        assert!(with_trace(" 1 ").unwrap().trace_registrations);
        assert!(!with_trace("off").unwrap().trace_registrations);
        assert!(matches!(with_trace("loud"), Err(DomainError::Config(_))));
    }

    #[test]
    fn missing_database_url_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn malformed_delay_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/drivers"),
            ("JWT_SECRET", "secret"),
            ("LOGIN_REDIRECT_DELAY_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
        assert!(err.to_string().contains("LOGIN_REDIRECT_DELAY_MS"));
    }
}
