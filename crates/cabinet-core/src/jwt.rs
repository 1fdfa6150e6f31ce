//! Local JWT expiry inspection.
//!
//! Only the `exp` claim of the payload segment is read. The signature is never
//! verified: a forged token with a future `exp` passes this check, and the
//! backend remains the only authority on whether a token is genuine.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Returns true if the token's `exp` claim is strictly in the future.
///
/// Any decode failure (empty token, missing payload segment, non-base64 or
/// non-JSON payload, missing `exp`) yields false.
pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, Utc::now().timestamp())
}

/// [`is_token_valid`] against an explicit clock, in seconds since the epoch.
pub fn is_token_valid_at(token: &str, now_secs: i64) -> bool {
    expiry_secs(token).is_some_and(|exp| exp > now_secs)
}

/// Expiry of the token as a timestamp, if it can be decoded.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(expiry_secs(token)?, 0)
}

fn expiry_secs(token: &str) -> Option<i64> {
    let claims = decode_payload(token)?;
    match claims.get("exp")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

fn decode_payload(token: &str) -> Option<Value> {
    let mut segments = token.split('.');
    let _header = segments.next().filter(|s| !s.is_empty())?;
    let payload = segments.next()?.trim_end_matches('=');
    if payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let json: Value = serde_json::from_slice(&bytes).ok()?;
    json.is_object().then_some(json)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for minting unsigned tokens in tests.

    use super::*;

    pub fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.signature")
    }

    pub fn token_expiring_at(exp: i64) -> String {
        token_with_payload(&format!(r#"{{"sub":"1","exp":{exp}}}"#))
    }
}
