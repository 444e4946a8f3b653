//! Input validation helpers
//!
//! Request DTOs derive `validator::Validate`; this module turns the
//! collected field errors into a single `AppError`.

use shared::error::AppError;
use validator::{Validate, ValidationErrors};

/// Validate a request body and map failures to `ValidationFailed`
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(into_app_error)
}

fn into_app_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "invalid value".to_string());
            format!("{field}: {reason}")
        })
        .collect();
    fields.sort();
    AppError::validation(fields.join("; "))
}

/// Normalize a merchant-typed order code: trim, drop a leading `#`, uppercase
pub fn normalize_order_code(raw: &str) -> Option<String> {
    let code = raw.trim();
    let code = code.strip_prefix('#').unwrap_or(code).trim();
    if code.is_empty() {
        return None;
    }
    Some(code.to_ascii_uppercase())
}
