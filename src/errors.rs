//! Error taxonomy and the reduction of heterogeneous failures into one
//! human-readable line.
//!
//! Collaborators report failures as `anyhow::Error`. When the failure carries
//! a structured payload from a remote endpoint (a page-level error list, a DML
//! error with a `message`, an HTTP response with only `statusText`) the payload
//! travels as a [`RemotePayload`] inside the `anyhow` chain and is reduced by
//! shape.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Listing labels or assignments failed; the list view is cleared.
    #[error("{0}")]
    RemoteList(String),
    /// A delete failed; existing data stays on screen.
    #[error("{0}")]
    RemoteMutation(String),
    /// Refused locally before reaching the data service.
    #[error("{0}")]
    Validation(String),
}

impl EngineError {
    pub fn message(&self) -> &str {
        match self {
            EngineError::RemoteList(msg)
            | EngineError::RemoteMutation(msg)
            | EngineError::Validation(msg) => msg,
        }
    }
}

/// Raw error body returned by a remote endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePayload(pub Value);

impl fmt::Display for RemotePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&reduce_payload(&self.0))
    }
}

impl std::error::Error for RemotePayload {}

/// Reduce one or more collaborator errors to a single message.
pub fn reduce_errors(errors: &[anyhow::Error]) -> String {
    errors
        .iter()
        .map(reduce_error)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn reduce_error(error: &anyhow::Error) -> String {
    if let Some(payload) = error.downcast_ref::<RemotePayload>() {
        return reduce_payload(&payload.0);
    }

    let message = format!("{error:#}");
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

/// Reduce raw payloads; `null` entries are skipped.
pub fn reduce_payloads(payloads: &[Value]) -> String {
    payloads
        .iter()
        .filter(|payload| !payload.is_null())
        .map(reduce_payload)
        .collect::<Vec<_>>()
        .join(", ")
}

fn reduce_payload(payload: &Value) -> String {
    if let Some(Value::Array(entries)) = payload.get("body") {
        return entries
            .iter()
            .map(|entry| {
                entry
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(UNKNOWN_ERROR)
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(", ");
    }

    if let Some(message) = payload
        .get("body")
        .and_then(|body| body.get("message"))
        .and_then(Value::as_str)
    {
        return message.to_string();
    }

    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return message.to_string();
    }

    if let Some(status) = payload.get("statusText").and_then(Value::as_str) {
        if !status.is_empty() {
            return status.to_string();
        }
    }

    match payload {
        Value::String(text) if !text.is_empty() => text.clone(),
        _ => UNKNOWN_ERROR.to_string(),
    }
}
