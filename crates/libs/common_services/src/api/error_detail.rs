//! Whether internal error messages may be shown to API clients.
//! Only enabled when the server runs in development mode.

use serde_json::{Value, json};
use std::fmt::Display;
use std::sync::OnceLock;

static EXPOSE_ERROR_DETAILS: OnceLock<bool> = OnceLock::new();

/// Set once at startup. Later calls are ignored.
pub fn set_expose_error_details(expose: bool) {
    EXPOSE_ERROR_DETAILS.set(expose).ok();
}

#[must_use]
pub fn error_details_exposed() -> bool {
    EXPOSE_ERROR_DETAILS.get().copied().unwrap_or(false)
}

/// JSON body for a 500 response, with the detail attached in development.
pub fn internal_error_body(error: &str, detail: &impl Display) -> Value {
    if error_details_exposed() {
        json!({ "error": error, "message": detail.to_string() })
    } else {
        json!({ "error": error })
    }
}
