//! Shared validation helpers for inbound HTTP adapters.

use actix_web::web;
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

/// Build a `400` naming the offending form field.
pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// Form extractor configuration turning malformed bodies into domain errors.
///
/// Without it Actix answers with a plain-text body; this keeps every `400`
/// in the JSON error shape.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "rejected malformed form body");
        Error::invalid_request(format!("malformed form body: {err}")).into()
    })
}
