use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use tracing::warn;

/// What dispatch does when a subscriber panics
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and keep delivering to the remaining subscribers
    #[default]
    Isolate,
    /// Stop delivering and resume the panic out of `publish`
    FailFast,
}

/// Configuration for an [`EventBus`](crate::EventBus)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    pub failure_policy: FailurePolicy,
    /// Log a warning when publishing to an event nobody subscribed to
    pub warn_unrouted: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Isolate,
            warn_unrouted: true,
        }
    }
}

impl BusConfig {
    pub const FAILURE_POLICY_VAR: &'static str = "EVENTBUS_FAILURE_POLICY";
    pub const WARN_UNROUTED_VAR: &'static str = "EVENTBUS_WARN_UNROUTED";

    /// Reads the configuration from the environment, defaulting anything unset or invalid
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            failure_policy: parse_or(
                Self::FAILURE_POLICY_VAR,
                lookup(Self::FAILURE_POLICY_VAR),
                defaults.failure_policy,
            ),
            warn_unrouted: parse_or(
                Self::WARN_UNROUTED_VAR,
                lookup(Self::WARN_UNROUTED_VAR),
                defaults.warn_unrouted,
            ),
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_warn_unrouted(mut self, warn_unrouted: bool) -> Self {
        self.warn_unrouted = warn_unrouted;
        self
    }
}

fn parse_or<V: FromStr>(key: &str, raw: Option<String>, default: V) -> V {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring invalid configuration value");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_isolate_and_warn() {
        let config = BusConfig::from_lookup(|_| None);
        assert_eq!(config, BusConfig::default());
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert!(config.warn_unrouted);
    }

    #[rstest]
    #[case("isolate", FailurePolicy::Isolate)]
    #[case("fail_fast", FailurePolicy::FailFast)]
    #[case(" fail_fast ", FailurePolicy::FailFast)]
    #[case("explode", FailurePolicy::Isolate)]
    fn test_parses_failure_policy(#[case] raw: &str, #[case] expected: FailurePolicy) {
        let config = BusConfig::from_lookup(lookup_from(&[(BusConfig::FAILURE_POLICY_VAR, raw)]));
        assert_eq!(config.failure_policy, expected);
    }

    #[rstest]
    #[case("false", false)]
    #[case("true", true)]
    #[case("nope", true)]
    fn test_parses_warn_unrouted(#[case] raw: &str, #[case] expected: bool) {
        let config = BusConfig::from_lookup(lookup_from(&[(BusConfig::WARN_UNROUTED_VAR, raw)]));
        assert_eq!(config.warn_unrouted, expected);
    }

    #[test]
    fn test_policy_display_matches_env_spelling() {
        assert_eq!(FailurePolicy::FailFast.to_string(), "fail_fast");
        assert_eq!(FailurePolicy::Isolate.to_string(), "isolate");
    }

    #[test]
    fn test_config_serializes_snake_case() {
        let config = BusConfig::default().with_failure_policy(FailurePolicy::FailFast);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "failure_policy": "fail_fast", "warn_unrouted": true })
        );
    }
}
