//! Session timer configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Session timers. Zero disables a timer.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub listen_timeout_secs: u64,
    pub max_duration_secs: u64,
    /// Final stretch in which the assistant is told to wrap up
    pub expiring_window_secs: u64,
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn expiring_window(&self) -> Duration {
        Duration::from_secs(self.expiring_window_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_duration_secs > 0 && self.expiring_window_secs >= self.max_duration_secs {
            return Err(ValidationError::ExpiringWindowTooLong);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 60,
            listen_timeout_secs: 15,
            max_duration_secs: 600,
            expiring_window_secs: 30,
        }
    }
}
