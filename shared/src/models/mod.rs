//! Data models
//!
//! Shared between laundry-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL); money and weights are `Decimal`.

pub mod catalog;
pub mod command;
pub mod invoice;
pub mod order;
pub mod schedule;

// Re-exports
pub use catalog::*;
pub use command::*;
pub use invoice::*;
pub use order::*;
pub use schedule::*;
