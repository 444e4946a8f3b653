//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// How a failure is surfaced and whether its detail may leave the process
///
/// - `NotFound`: referenced entity missing or filtered out by status / owner
/// - `Validation`: bad input or business-rule violation, message returned verbatim
/// - `Consistency`: an invariant the system itself guarantees was broken
/// - `System`: infrastructure failure (database, configuration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Consistency,
    System,
}

impl ErrorCategory {
    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Consistency => "consistency",
            Self::System => "system",
        }
    }

    /// Internal detail of these errors is logged, never returned to callers
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Consistency | Self::System)
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound
            | Self::OrderNotFound
            | Self::CommandNotFound
            | Self::PackageNotFound
            | Self::AddonNotFound => ErrorCategory::NotFound,

            Self::ConsistencyFailure | Self::OrderInvalidTransition | Self::PaymentAccountNotFound => {
                ErrorCategory::Consistency
            }

            Self::DatabaseError | Self::ConfigError => ErrorCategory::System,

            _ => ErrorCategory::Validation,
        }
    }
}
