//! Request and response bodies for the scrape endpoint

use crate::logs::LogEntry;
use crate::product::EnrichedProduct;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Body of `POST /scrape`
///
/// Both fields are kept loosely typed so validation can report the
/// endpoint's own error messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<Value>,

    #[serde(default)]
    pub limit: Option<Value>,
}

/// Validation failures, reported as 400
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing 'url' in request body")]
    MissingUrl,

    #[error("'limit' must be a positive integer")]
    InvalidLimit,

    #[error("{0}")]
    InvalidBody(String),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            logs: None,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl ScrapeRequest {
    /// Returns the target URL and the number of products to enrich
    pub fn validate(&self, default_limit: usize) -> Result<(String, usize), RequestError> {
        let url = match &self.url {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {
                return Err(RequestError::MissingUrl)
            }
            Some(Value::String(s)) if s.is_empty() => return Err(RequestError::MissingUrl),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
                return Err(RequestError::MissingUrl)
            }
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let limit = match &self.limit {
            None => default_limit,
            Some(value) => parse_limit(value).ok_or(RequestError::InvalidLimit)?,
        };

        Ok((url, limit))
    }
}

/// Reads a positive integer the way a lenient integer parse would
///
/// Integers are taken as-is, fractions are truncated, and strings are read up
/// to the first non-digit after an optional sign. Anything below 1 is None.
pub fn parse_limit(value: &Value) -> Option<usize> {
    let parsed = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i as i128,
            None => {
                let f = n.as_f64()?;
                if !f.is_finite() {
                    return None;
                }
                f.trunc() as i128
            }
        },
        Value::String(s) => parse_int_prefix(s)?,
        _ => return None,
    };

    if parsed < 1 {
        return None;
    }
    Some(usize::try_from(parsed).unwrap_or(usize::MAX))
}

fn parse_int_prefix(text: &str) -> Option<i128> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i128>().unwrap_or(i128::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Successful scrape response
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub products: Vec<EnrichedProduct>,
    pub logs: Vec<LogEntry>,
}

/// Error response; `logs` is present only when a scrape had started
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub logs: Option<Vec<LogEntry>>,
}
