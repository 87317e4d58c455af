pub mod contact;

use serde::Serialize;

/// Generic failure payload; carries no transport internals.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: &'static str,
}
