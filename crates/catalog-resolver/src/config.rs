//! Resolver configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable for [`ResolverConfig::count_prefetch`]
pub const ENV_COUNT_PREFETCH: &str = "CATALOG_COUNT_PREFETCH";
/// Environment variable for [`ResolverConfig::missing_policy`]
pub const ENV_MISSING_POLICY: &str = "CATALOG_MISSING_POLICY";
/// Environment variable for [`ResolverConfig::max_page_size`]
pub const ENV_MAX_PAGE_SIZE: &str = "CATALOG_MAX_PAGE_SIZE";

/// What to do when a definition's contract policy cannot be found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicyBehavior {
    /// End the stream with [`ResolveError::MissingPolicy`](crate::ResolveError::MissingPolicy)
    #[default]
    Fail,
    /// Drop the dataset and continue
    ///
    /// Dropped datasets still occupy their position in the global window,
    /// so a page may come back short and adjacent pages no longer concatenate
    /// to the larger page.
    Skip,
}

impl fmt::Display for MissingPolicyBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPolicyBehavior::Fail => write!(f, "fail"),
            MissingPolicyBehavior::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for MissingPolicyBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(MissingPolicyBehavior::Fail),
            "skip" => Ok(MissingPolicyBehavior::Skip),
            other => Err(format!("unknown missing-policy behavior: {other}")),
        }
    }
}

/// Configuration for [`DatasetResolver`](crate::DatasetResolver)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Number of definition count calls allowed in flight ahead of the accumulator
    ///
    /// `1` counts strictly one definition at a time, so no definition past the
    /// one that fills the page is ever touched. Larger values overlap count
    /// latency but may count up to `count_prefetch - 1` definitions that are
    /// never fetched.
    pub count_prefetch: usize,
    /// Behavior when a contract policy is missing
    pub missing_policy: MissingPolicyBehavior,
    /// Upper bound on the number of datasets a single request may ask for
    pub max_page_size: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            count_prefetch: 1,
            missing_policy: MissingPolicyBehavior::Fail,
            max_page_size: None,
        }
    }
}

impl ResolverConfig {
    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_COUNT_PREFETCH) {
            match raw.trim().parse::<usize>() {
                Ok(n) => config = config.with_count_prefetch(n),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_COUNT_PREFETCH),
            }
        }

        if let Some(raw) = lookup(ENV_MISSING_POLICY) {
            match raw.parse() {
                Ok(behavior) => config.missing_policy = behavior,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_MISSING_POLICY),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_PAGE_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.max_page_size = Some(n),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_MAX_PAGE_SIZE),
            }
        }

        config
    }

    /// Set the count prefetch depth (at least 1)
    pub fn with_count_prefetch(mut self, n: usize) -> Self {
        self.count_prefetch = n.max(1);
        self
    }

    /// Set the missing-policy behavior
    pub fn with_missing_policy(mut self, behavior: MissingPolicyBehavior) -> Self {
        self.missing_policy = behavior;
        self
    }

    /// Set the maximum page size
    pub fn with_max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = Some(max);
        self
    }
}
