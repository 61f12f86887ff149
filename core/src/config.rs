//! Handler configuration: where todos live and how errors map to statuses.

use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_COLLECTION: &str = "/todo/list";
pub const DEFAULT_KEY_PREFIX: &str = "/todo/";

pub const ENV_COLLECTION: &str = "TODO_COLLECTION";
pub const ENV_KEY_PREFIX: &str = "TODO_KEY_PREFIX";
pub const ENV_STATUS_POLICY: &str = "TODO_STATUS_POLICY";

/// How an undecodable create body is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// 500, matching the deployed functions.
    #[default]
    Observed,
    /// 400, treating bad input as a client error everywhere.
    Strict,
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "observed" => Ok(StatusPolicy::Observed),
            "strict" => Ok(StatusPolicy::Strict),
            other => Err(format!("unknown status policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Logical path of the collection opened on every request.
    pub collection: String,
    /// Prepended to a todo's id to form its storage key.
    pub key_prefix: String,
    pub status_policy: StatusPolicy,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            status_policy: StatusPolicy::default(),
        }
    }
}

impl HandlerConfig {
    /// Defaults overridden by `TODO_COLLECTION`, `TODO_KEY_PREFIX` and
    /// `TODO_STATUS_POLICY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(collection) = lookup(ENV_COLLECTION).filter(|v| !v.is_empty()) {
            config.collection = collection;
        }
        if let Some(prefix) = lookup(ENV_KEY_PREFIX).filter(|v| !v.is_empty()) {
            config.key_prefix = prefix;
        }
        if let Some(policy) = lookup(ENV_STATUS_POLICY) {
            match policy.parse() {
                Ok(policy) => config.status_policy = policy,
                Err(e) => warn!(error = %e, var = ENV_STATUS_POLICY, "ignoring status policy"),
            }
        }
        config
    }

    pub fn key_for(&self, id: &str) -> String {
        format!("{}{id}", self.key_prefix)
    }
}
