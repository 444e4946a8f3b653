//! Caller identity extractors
//!
//! Authentication happens upstream; the gateway forwards the resolved
//! merchant or customer id as a header.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::utils::AppError;

pub const MERCHANT_HEADER: &str = "x-merchant-id";
pub const USER_HEADER: &str = "x-user-id";

/// Merchant acting on an order (`X-Merchant-Id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerchantId(pub i64);

/// Customer owning an order (`X-User-Id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerId(pub i64);

fn header_id(parts: &Parts, name: &str) -> Result<i64, AppError> {
    let Some(raw) = parts.headers.get(name) else {
        tracing::warn!(header = name, uri = %parts.uri, "Missing caller header");
        return Err(AppError::invalid_request(format!("Missing {} header", name)));
    };

    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid_request(format!("Invalid {} header", name)))
}

impl<St: Send + Sync> FromRequestParts<St> for MerchantId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        header_id(parts, MERCHANT_HEADER).map(Self)
    }
}

impl<St: Send + Sync> FromRequestParts<St> for CustomerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        header_id(parts, USER_HEADER).map(Self)
    }
}
