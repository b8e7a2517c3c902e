//! Session token decoding.
//!
//! Tokens are JWTs issued by the backend at login. The client only needs the
//! claims to pick the navigation affordances, so decoding is structural:
//! the payload segment is base64url-decoded and parsed as a JSON object.
//! Signatures are NOT verified here.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use cartify_core::{Role, UserId};

/// Errors from decoding a session token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("token payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("token payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("token payload is not a JSON object")]
    NotAnObject,
}

/// Decoded token claims, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Look up a raw claim.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string claim.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Role derived from the `role` claim.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_claim(self.get_str("role"))
    }

    /// Numeric user ID from the `id` or `userId` claim.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        ["id", "userId"]
            .iter()
            .filter_map(|key| self.get(key))
            .find_map(|value| match value {
                Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .map(UserId::new)
    }

    /// Label for the user menu: name, username, email or subject.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        ["name", "username", "email", "sub"]
            .iter()
            .find_map(|key| self.get_str(key))
    }
}

/// Decode the claims of a JWT without verifying its signature.
///
/// Accepts both the URL-safe and standard base64 alphabets, with or without
/// padding.
///
/// # Errors
///
/// Returns an error if the token has no second segment, the segment is not
/// base64, or it does not hold a JSON object.
pub fn decode(token: &str) -> Result<Claims, TokenError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or(TokenError::MissingPayload)?;

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = STANDARD_NO_PAD.decode(normalized)?;
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(Claims(map)),
        _ => Err(TokenError::NotAnObject),
    }
}

/// Build an unsigned token carrying `claims`.
///
/// Useful for fixtures and the headless shell; never accepted by a backend.
#[must_use]
pub fn encode_unsigned(claims: &Value) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.")
}
