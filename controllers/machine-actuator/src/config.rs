//! Actuator configuration from environment variables.

use crate::error::ActuatorError;
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_REQUEUE_SECS: u64 = 300;
pub const DEFAULT_BACKOFF_MIN_MINUTES: u64 = 1;
pub const DEFAULT_BACKOFF_MAX_MINUTES: u64 = 10;
pub const DEFAULT_NODE_LIST_PAGE_SIZE: u32 = 100;

/// Runtime settings for the controller shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorConfig {
    /// Namespace whose Machines are reconciled
    pub namespace: String,
    /// Cluster name for Machines without the cluster-name label
    pub cluster_name: Option<String>,
    /// Periodic re-check interval after a successful pass
    pub requeue_interval: Duration,
    pub backoff_min_minutes: u64,
    pub backoff_max_minutes: u64,
    /// Page size for workload-cluster node listings
    pub node_list_page_size: u32,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            cluster_name: None,
            requeue_interval: Duration::from_secs(DEFAULT_REQUEUE_SECS),
            backoff_min_minutes: DEFAULT_BACKOFF_MIN_MINUTES,
            backoff_max_minutes: DEFAULT_BACKOFF_MAX_MINUTES,
            node_list_page_size: DEFAULT_NODE_LIST_PAGE_SIZE,
        }
    }
}

impl ActuatorConfig {
    /// Reads `WATCH_NAMESPACE`, `CLUSTER_NAME`, `RECONCILE_REQUEUE_SECS`,
    /// `BACKOFF_MIN_MINUTES`, `BACKOFF_MAX_MINUTES` and `NODE_LIST_PAGE_SIZE`.
    pub fn from_env() -> Result<Self, ActuatorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ActuatorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            namespace: non_empty("WATCH_NAMESPACE").unwrap_or(defaults.namespace),
            cluster_name: non_empty("CLUSTER_NAME"),
            requeue_interval: Duration::from_secs(parse_or(
                "RECONCILE_REQUEUE_SECS",
                non_empty("RECONCILE_REQUEUE_SECS"),
                DEFAULT_REQUEUE_SECS,
            )?),
            backoff_min_minutes: parse_or(
                "BACKOFF_MIN_MINUTES",
                non_empty("BACKOFF_MIN_MINUTES"),
                defaults.backoff_min_minutes,
            )?,
            backoff_max_minutes: parse_or(
                "BACKOFF_MAX_MINUTES",
                non_empty("BACKOFF_MAX_MINUTES"),
                defaults.backoff_max_minutes,
            )?,
            node_list_page_size: parse_or(
                "NODE_LIST_PAGE_SIZE",
                non_empty("NODE_LIST_PAGE_SIZE"),
                defaults.node_list_page_size,
            )?,
        };

        if config.backoff_min_minutes == 0 || config.backoff_min_minutes > config.backoff_max_minutes {
            return Err(ActuatorError::Configuration(format!(
                "backoff range {}..{} minutes is invalid",
                config.backoff_min_minutes, config.backoff_max_minutes
            )));
        }
        if config.node_list_page_size == 0 {
            return Err(ActuatorError::Configuration(
                "NODE_LIST_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, ActuatorError>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ActuatorError::Configuration(format!("{key}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ActuatorConfig, ActuatorError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ActuatorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]).unwrap(), ActuatorConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = config_from(&[
            ("WATCH_NAMESPACE", "capz-system"),
            ("CLUSTER_NAME", "demo"),
            ("RECONCILE_REQUEUE_SECS", "60"),
            ("BACKOFF_MIN_MINUTES", "2"),
            ("BACKOFF_MAX_MINUTES", "20"),
            ("NODE_LIST_PAGE_SIZE", "25"),
        ])
        .unwrap();
        assert_eq!(config.namespace, "capz-system");
        assert_eq!(config.cluster_name.as_deref(), Some("demo"));
        assert_eq!(config.requeue_interval, Duration::from_secs(60));
        assert_eq!((config.backoff_min_minutes, config.backoff_max_minutes), (2, 20));
        assert_eq!(config.node_list_page_size, 25);
    }

    #[test]
    fn test_malformed_number_is_configuration_error() {
        let err = config_from(&[("RECONCILE_REQUEUE_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ActuatorError::Configuration(ref m) if m.contains("RECONCILE_REQUEUE_SECS")));
    }

    #[test]
    fn test_inverted_backoff_range_is_rejected() {
        let err = config_from(&[("BACKOFF_MIN_MINUTES", "5"), ("BACKOFF_MAX_MINUTES", "2")]).unwrap_err();
        assert!(err.is_terminal());
    }

    #[test]
    fn test_blank_namespace_falls_back_to_default() {
        let config = config_from(&[("WATCH_NAMESPACE", "  ")]).unwrap();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
    }
}
