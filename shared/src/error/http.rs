//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound
            | Self::OrderNotFound
            | Self::CommandNotFound
            | Self::PackageNotFound
            | Self::AddonNotFound => StatusCode::NOT_FOUND,

            // Business rules that reject well-formed input
            Self::OrderPriceMismatch | Self::OrderNegativeMargin | Self::OrderNoOverage => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            Self::DatabaseError
            | Self::ConfigError
            | Self::ConsistencyFailure
            | Self::OrderInvalidTransition
            | Self::PaymentAccountNotFound => StatusCode::INTERNAL_SERVER_ERROR,

            _ => StatusCode::BAD_REQUEST,
        }
    }
}
