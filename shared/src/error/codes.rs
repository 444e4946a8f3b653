//! Unified error codes for the laundry platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors (41xx: commands / subscriptions)
//! - 5xxx: Invoice and payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// No order matches the code / status / owner filter
    OrderNotFound = 4001,
    /// Recomputed unit price differs from the contracted one
    OrderPriceMismatch = 4002,
    /// Overweight fees do not cover the additional cost
    OrderNegativeMargin = 4003,
    /// Fees requested on a subscription order without overage
    OrderNoOverage = 4004,
    /// Reported weight is not a positive amount
    OrderInvalidWeight = 4005,
    /// Addon selection cannot price an order
    OrderInvalidAddons = 4006,
    /// Status transition not allowed by the order state machine
    OrderInvalidTransition = 4007,

    // ==================== 41xx: Command ====================
    /// Command not found
    CommandNotFound = 4101,
    /// Command lacks its execution start date or pickup rules
    CommandNotSchedulable = 4102,
    /// Pickup rule is malformed
    InvalidPickupRule = 4103,
    /// Package not found
    PackageNotFound = 4104,
    /// Service addon not found
    AddonNotFound = 4105,

    // ==================== 5xxx: Invoice ====================
    /// No default payment account for the operating country
    PaymentAccountNotFound = 5002,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
    /// An invariant the system guarantees was violated
    ConsistencyFailure = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Short client-facing message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderPriceMismatch => "Order unit price differs from the subscription price",
            ErrorCode::OrderNegativeMargin => "Overweight fees do not cover the additional costs",
            ErrorCode::OrderNoOverage => "No overweight detected",
            ErrorCode::OrderInvalidWeight => "Reported weight must be positive",
            ErrorCode::OrderInvalidAddons => "Invalid service addons",
            ErrorCode::OrderInvalidTransition => "Order status transition not allowed",

            // Command
            ErrorCode::CommandNotFound => "Command not found",
            ErrorCode::CommandNotSchedulable => "Command has no execution date or pickup schedule",
            ErrorCode::InvalidPickupRule => "Invalid pickup schedule",
            ErrorCode::PackageNotFound => "Package not found",
            ErrorCode::AddonNotFound => "Service addon not found",

            // Invoice
            ErrorCode::PaymentAccountNotFound => "Payment account not found",

            // System
            ErrorCode::DatabaseError => "An error occurred, please retry",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConsistencyFailure => "An error occurred, please retry",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderPriceMismatch),
            4003 => Ok(ErrorCode::OrderNegativeMargin),
            4004 => Ok(ErrorCode::OrderNoOverage),
            4005 => Ok(ErrorCode::OrderInvalidWeight),
            4006 => Ok(ErrorCode::OrderInvalidAddons),
            4007 => Ok(ErrorCode::OrderInvalidTransition),

            // Command
            4101 => Ok(ErrorCode::CommandNotFound),
            4102 => Ok(ErrorCode::CommandNotSchedulable),
            4103 => Ok(ErrorCode::InvalidPickupRule),
            4104 => Ok(ErrorCode::PackageNotFound),
            4105 => Ok(ErrorCode::AddonNotFound),

            // Invoice
            5002 => Ok(ErrorCode::PaymentAccountNotFound),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ConsistencyFailure),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
