use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::FulfillmentResponse;

/// Parse whatever the fulfillment route answered.
///
/// The backend contract is loose: `status` only counts when it is a string,
/// `error` counts whenever it is truthy. Non-string error values are kept in
/// their JSON form so the toast still says something. A JSON value that is
/// not an object yields an empty response; a body that is not JSON at all is
/// an error.
pub fn parse_fulfillment_response(body: &str) -> Result<FulfillmentResponse> {
    let value: Value =
        serde_json::from_str(body).context("Fulfillment response is not valid JSON")?;

    let Value::Object(fields) = value else {
        return Ok(FulfillmentResponse::default());
    };

    let status = fields
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string);
    let error = fields.get("error").and_then(error_text);

    Ok(FulfillmentResponse { status, error })
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
