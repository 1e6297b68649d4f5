//! Normalisation of the three response shapes the backend produces.

use lexicon_api_models::is_success_code;
use serde_json::Value;
use thiserror::Error;

use super::transport::HttpResponse;

/// Any gateway failure: transport, HTTP status, application flag or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    /// Human-readable message, preferring the server's own wording.
    pub message: String,
    /// HTTP or envelope status when one was received.
    pub status: Option<u16>,
}

impl RequestError {
    /// Error with an optional status.
    #[must_use]
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// The body could not be decoded into the expected shape.
    #[must_use]
    pub fn malformed(detail: impl std::fmt::Display, status: Option<u16>) -> Self {
        Self::new(format!("malformed response: {detail}"), status)
    }
}

/// Reduce a raw response to its payload or a [`RequestError`].
///
/// - v1 envelope `{code, message?, data}`: success iff `200 <= code < 300`, payload is `data`.
/// - legacy `{status: "ok" | "error", msg?}`: payload is the whole object.
/// - anything else (bare arrays, plain objects): payload is the document.
///
/// # Errors
///
/// Fails on non-2xx status, an envelope error code, a legacy `error` status, or
/// a body that is not JSON.
pub fn normalize(response: &HttpResponse) -> Result<Value, RequestError> {
    let status = Some(response.status);
    let document = if response.body.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        serde_json::from_slice::<Value>(&response.body)
    };

    if !response.is_success() {
        let server_message = document.as_ref().ok().and_then(server_message);
        return Err(RequestError::new(
            server_message.unwrap_or_else(|| fallback_message(response)),
            status,
        ));
    }

    let document = document.map_err(|err| RequestError::malformed(err, status))?;
    if let Some(code) = document.get("code").and_then(Value::as_i64) {
        if is_success_code(code) {
            return Ok(document.get("data").cloned().unwrap_or(Value::Null));
        }
        let message = server_message(&document)
            .unwrap_or_else(|| format!("request failed with code {code}"));
        return Err(RequestError::new(message, u16::try_from(code).ok()));
    }
    if let Some(flag) = document.get("status").and_then(Value::as_str) {
        return match flag {
            "ok" | "success" => Ok(document),
            _ => Err(RequestError::new(
                server_message(&document).unwrap_or_else(|| "request failed".to_string()),
                status,
            )),
        };
    }
    Ok(document)
}

fn server_message(document: &Value) -> Option<String> {
    ["message", "msg", "error"]
        .iter()
        .filter_map(|key| document.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn fallback_message(response: &HttpResponse) -> String {
    let text = response.status_text.trim();
    if text.is_empty() {
        format!("request failed with status {}", response.status)
    } else {
        text.to_string()
    }
}
