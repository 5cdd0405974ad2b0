use serde::Deserialize;
use thiserror::Error;

use crate::traits::Diagnostic;

/// Fallback text when the store gave no usable diagnostic.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Errors from the remote watchlist store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR))]
    Api {
        status: u16,
        message: Option<String>,
        details: Option<String>,
        hint: Option<String>,
        code: Option<String>,
    },

    #[error("parse error: {0}")]
    Parse(String),
}

/// PostgREST error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    code: Option<String>,
}

impl StoreError {
    /// Build an API error from a non-success response body.
    ///
    /// PostgREST answers with `{message, details, hint, code}`; anything else
    /// is kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_else(|_| ErrorBody {
            message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
            ..Default::default()
        });
        Self::Api {
            status,
            message: parsed.message,
            details: parsed.details,
            hint: parsed.hint,
            code: parsed.code,
        }
    }
}

impl Diagnostic for StoreError {
    /// Best-available diagnostic text for a user-facing message.
    ///
    /// For API errors: `message`, then `details`, then `hint`, then
    /// [`UNKNOWN_ERROR`]. Transport and parse errors report themselves.
    fn diagnostic(&self) -> String {
        match self {
            Self::Api {
                message,
                details,
                hint,
                ..
            } => [message, details, hint]
                .into_iter()
                .flatten()
                .find(|s| !s.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            Self::Http(e) => e.to_string(),
            Self::Url(e) => e.to_string(),
            Self::Parse(msg) if !msg.is_empty() => msg.clone(),
            Self::Parse(_) => UNKNOWN_ERROR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_postgrest_body() {
        let body = r#"{
            "code": "23505",
            "details": "Key (anilist_id, user_id)=(1, u) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint"
        }"#;
        let err = StoreError::from_response(409, body);
        match &err {
            StoreError::Api { status, code, .. } => {
                assert_eq!(*status, 409);
                assert_eq!(code.as_deref(), Some("23505"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.diagnostic(),
            "duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn test_diagnostic_falls_back_to_details_then_hint() {
        let err = StoreError::from_response(400, r#"{"details": "bad column"}"#);
        assert_eq!(err.diagnostic(), "bad column");

        let err = StoreError::from_response(400, r#"{"message": "", "hint": "check RLS"}"#);
        assert_eq!(err.diagnostic(), "check RLS");
    }

    #[test]
    fn test_diagnostic_unknown() {
        let err = StoreError::from_response(500, "{}");
        assert_eq!(err.diagnostic(), UNKNOWN_ERROR);

        let err = StoreError::from_response(502, "   ");
        assert_eq!(err.diagnostic(), UNKNOWN_ERROR);
    }

    #[test]
    fn test_non_json_body_becomes_message() {
        let err = StoreError::from_response(503, "Service Unavailable");
        assert_eq!(err.diagnostic(), "Service Unavailable");
        assert_eq!(
            err.to_string(),
            "API error (status 503): Service Unavailable"
        );
    }
}
