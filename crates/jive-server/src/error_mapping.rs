//! Renders every tool outcome as a structured result (spec §7): no error
//! escapes the tool-call boundary, and every response carries a top-level
//! `status`, a machine-readable `code`, and a human `message`.

use jive_domain::error::Error;
use rmcp::model::{CallToolResult, Content};
use serde_json::{json, Value};

/// `status` discriminant for a tool response (spec §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Conflict,
    NotFound,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
        }
    }
}

/// Wrap a successful payload with `status = "success"`.
pub fn ok(payload: Value) -> CallToolResult {
    envelope(Status::Success, payload)
}

/// Wrap a sync conflict payload with `status = "conflict"` (spec §7).
pub fn conflict(payload: Value) -> CallToolResult {
    envelope(Status::Conflict, payload)
}

/// Render an [`Error`] as a structured, non-throwing tool result (spec §7:
/// "No exceptions escape the tool-call boundary").
pub fn from_error(error: &Error) -> CallToolResult {
    let status = if matches!(error, Error::NotFound { .. }) { Status::NotFound } else { Status::Error };
    envelope(
        status,
        json!({
            "code": error.code(),
            "message": error.to_string(),
        }),
    )
}

fn envelope(status: Status, mut payload: Value) -> CallToolResult {
    if let Some(object) = payload.as_object_mut() {
        object.insert("status".to_owned(), json!(status.as_str()));
    } else {
        payload = json!({ "status": status.as_str(), "value": payload });
    }
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    let content = vec![Content::text(text)];
    match status {
        Status::Success | Status::Conflict | Status::NotFound => CallToolResult::success(content),
        Status::Error => CallToolResult::error(content),
    }
}
