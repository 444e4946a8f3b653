//! Public order codes
//!
//! Merchants type a short code instead of the internal id. The code is the
//! first six hex characters of `SHA-256(app_key + id)`, uppercased.

use sha2::{Digest, Sha256};

pub const ORDER_CODE_LEN: usize = 6;

pub fn order_code(app_key: &str, id: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app_key.as_bytes());
    hasher.update(id.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..ORDER_CODE_LEN].to_ascii_uppercase()
}
