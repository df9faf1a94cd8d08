//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for the binary
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureFlags {
    /// Emit logs as JSON lines
    pub json_logs: bool,

    /// Print full error details to the console
    pub verbose_errors: bool,
}
