//! Shared HTTP response helpers.
//!
//! Centralizes status-code classification (429 rate limiting with
//! `Retry-After` parsing, each error class → its [`ApiError`] variant) so the
//! resource modules stay focused on request construction and response mapping.

use serde::Deserialize;

use crate::error::ApiError;

/// Check an HTTP response for error conditions.
///
/// Returns the response unchanged on success. Otherwise:
/// - **429** → [`ApiError::RateLimited`] (falls back to 60 s if
///   `Retry-After` is absent or unparseable)
/// - **404** → [`ApiError::NotFound`]
/// - **400 / 422** → [`ApiError::BadRequest`]
/// - **409** → [`ApiError::Conflict`]
/// - **401 / 403** → [`ApiError::Unauthorized`]
/// - **5xx** → [`ApiError::Server`]
/// - anything else → [`ApiError::Unclassified`]
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status.as_u16() == 429 {
        return Err(ApiError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }

    let message = error_message(&resp.text().await.unwrap_or_default());
    let status = status.as_u16();
    Err(match status {
        404 => ApiError::NotFound { message },
        400 | 422 => ApiError::BadRequest { status, message },
        409 => ApiError::Conflict { message },
        401 | 403 => ApiError::Unauthorized { status, message },
        500..=599 => ApiError::Server { status, message },
        _ => ApiError::Unclassified { status, message },
    })
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[derive(Deserialize)]
struct ErrorDocument {
    errors: Vec<ErrorObject>,
}

/// Error entries come either as JSON:API objects or as bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorObject {
    Detailed {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        detail: Option<String>,
    },
    Plain(String),
}

/// Flatten a JSON:API error body into one line; fall back to the raw body.
fn error_message(body: &str) -> String {
    let Ok(doc) = serde_json::from_str::<ErrorDocument>(body) else {
        return body.trim().to_string();
    };
    doc.errors
        .into_iter()
        .map(|error| match error {
            ErrorObject::Detailed { title, detail } => match (title, detail) {
                (Some(title), Some(detail)) => format!("{title}: {detail}"),
                (Some(text), None) | (None, Some(text)) => text,
                (None, None) => String::from("unknown error"),
            },
            ErrorObject::Plain(text) => text,
        })
        .collect::<Vec<_>>()
        .join("; ")
}
