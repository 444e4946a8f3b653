//! Shared types for the laundry platform
//!
//! Domain models, error types and response structures used by the server
//! and by API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
