//! Resource limits configuration module.
//!
//! Bounds on what a single transport call may carry.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_message_size`.
const MAX_MESSAGE_SIZE_CEILING: usize = 1024 * 1024 * 1024;

/// Resource limits configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum size of a request body in bytes
    pub max_message_size: usize,

    /// Maximum number of members of a batch, `0` for no limit
    pub max_batch_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_size: 10 * 1024 * 1024, // 10 MiB
            max_batch_size: 1000,
        }
    }
}

impl Validate for LimitsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_message_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_message_size must be greater than 0".to_string(),
            ));
        }

        if self.max_message_size > MAX_MESSAGE_SIZE_CEILING {
            return Err(ConfigError::ValueOutOfRange {
                key: "max_message_size".to_string(),
                message: format!("must not exceed {MAX_MESSAGE_SIZE_CEILING} bytes"),
            });
        }

        Ok(())
    }
}
