use crate::errors::ConfigError;
use common::constants::{DEFAULT_LATENCY_MILLIS, LATENCY_ENV_VAR};
use common::types::dtos::OrderId;
use common::types::user_role::UserRole;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub order_id: OrderId,
    pub role: UserRole,
    /// Email the demo viewer logs in with.
    pub email: String,
    /// Simulated API round trip.
    pub latency: Duration,
}

impl ClientConfig {
    /// Reads `<order_id> <role> [email]` plus the environment.
    pub fn from_env_args(args: &[String]) -> Result<Self, ConfigError> {
        Self::parse(args, std::env::var(LATENCY_ENV_VAR).ok())
    }

    pub fn parse(args: &[String], latency_var: Option<String>) -> Result<Self, ConfigError> {
        let program = args.first().cloned().unwrap_or_else(|| "client".to_string());
        if args.len() < 3 || args.len() > 4 {
            return Err(ConfigError::Usage { program });
        }

        let order_id = args[1]
            .parse::<OrderId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ConfigError::InvalidOrderId(args[1].clone()))?;
        let role = args[2].parse::<UserRole>().map_err(ConfigError::InvalidRole)?;
        let email = args
            .get(3)
            .cloned()
            .unwrap_or_else(|| default_email(role).to_string());

        let latency_ms = match latency_var {
            None => DEFAULT_LATENCY_MILLIS,
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                var: LATENCY_ENV_VAR.to_string(),
                value: raw.clone(),
            })?,
        };

        Ok(Self {
            order_id,
            role,
            email,
            latency: Duration::from_millis(latency_ms),
        })
    }
}

pub fn default_email(role: UserRole) -> &'static str {
    match role {
        UserRole::Client => "client@food.dev",
        UserRole::Owner => "owner@food.dev",
        UserRole::Delivery => "driver@food.dev",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_order_and_role_with_defaults() {
        let config = ClientConfig::parse(&args(&["client", "42", "owner"]), None).unwrap();
        assert_eq!(config.order_id, 42);
        assert_eq!(config.role, UserRole::Owner);
        assert_eq!(config.email, "owner@food.dev");
        assert_eq!(config.latency, Duration::from_millis(DEFAULT_LATENCY_MILLIS));
    }

    #[test]
    fn latency_comes_from_the_environment() {
        let config = ClientConfig::parse(
            &args(&["client", "1", "Delivery", "rider@food.dev"]),
            Some("0".to_string()),
        )
        .unwrap();
        assert_eq!(config.latency, Duration::ZERO);
        assert_eq!(config.email, "rider@food.dev");

        let err = ClientConfig::parse(&args(&["client", "1", "Client"]), Some("soon".into()));
        assert!(matches!(err, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            ClientConfig::parse(&args(&["client"]), None),
            Err(ConfigError::Usage { .. })
        ));
        assert_eq!(
            ClientConfig::parse(&args(&["client", "0", "Client"]), None),
            Err(ConfigError::InvalidOrderId("0".to_string()))
        );
        assert!(matches!(
            ClientConfig::parse(&args(&["client", "3", "admin"]), None),
            Err(ConfigError::InvalidRole(_))
        ));
    }
}
