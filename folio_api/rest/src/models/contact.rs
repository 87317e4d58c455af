use folio_models::contact::ContactFieldError;
use serde::Serialize;

pub const MESSAGE_SENT: &str = "Message sent successfully";
pub const RATE_LIMITED: &str = "Too many contact requests, please try again later";
pub const SEND_FAILED: &str = "Failed to send message";

/// Confirmation payload for accepted submissions and rate-limit
/// rejections; distinguishable from validation failures by shape.
#[derive(Debug, Serialize)]
pub struct ApiConfirmation {
    pub message: &'static str,
}

/// One entry per failing field, all failures reported together.
#[derive(Debug, Serialize)]
pub struct ApiValidationErrors {
    pub errors: Vec<ContactFieldError>,
}
