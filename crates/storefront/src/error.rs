//! Unified error handling with Sentry integration.
//!
//! Nothing in the storefront core is fatal: failures degrade to an anonymous
//! session or an unchanged cart. Errors worth investigating are handed to
//! [`report`], which captures them to Sentry and logs them.

use thiserror::Error;

use crate::storage::StorageError;
use crate::token::TokenError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Persisted storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session token could not be decoded.
    #[error("Invalid token: {0}")]
    Token(#[from] TokenError),

    /// Persisted cart snapshot could not be read or written.
    #[error("Cart snapshot error: {0}")]
    CartSnapshot(#[from] serde_json::Error),

    /// Unrecognised shell input.
    #[error("Bad command: {0}")]
    BadCommand(String),
}

/// Capture a non-fatal error to Sentry and log it.
///
/// Without an initialised Sentry client the capture is a no-op and only the
/// log line remains.
pub fn report(err: &AppError) {
    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        sentry_event_id = %event_id,
        "Storefront error"
    );
}

/// Set the Sentry user context from a user ID.
///
/// Call this after a session resolves to an identity.
pub fn set_sentry_user(user_id: Option<String>, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: user_id,
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout or when the session turns anonymous.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Quantity limit reached", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
