//! JSON envelopes returned by every tool.
//!
//! Success responses are `{"status": "ok", ...fields}` and failures are
//! `{"status": "error", "error": "<text>"}`. Rendering is always pretty JSON
//! with a two-space indent and `status` as the first key. Encoding never
//! fails: values that refuse to serialize degrade to their `Debug` text.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Key carrying the envelope status.
pub const STATUS_KEY: &str = "status";
/// Key carrying the failure text of an error envelope.
pub const ERROR_KEY: &str = "error";

const STATUS_OK: &str = "ok";
const STATUS_ERROR: &str = "error";

/// Builder for a success envelope.
///
/// Fields keep their insertion order. `status` is reserved; a field with that
/// name is ignored so the envelope shape cannot be forged.
///
/// # Example
///
/// ```rust
/// use netmcp_common::envelope::OkResponse;
///
/// let text = OkResponse::new()
///     .field("device", "sw01")
///     .field("output", "Cisco IOS XE")
///     .render();
/// assert!(text.starts_with("{\n  \"status\": \"ok\",\n  \"device\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OkResponse {
    fields: Map<String, Value>,
}

impl OkResponse {
    /// Starts an empty success envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a serializable field.
    #[must_use]
    pub fn field<T>(mut self, key: impl Into<String>, value: &T) -> Self
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        let encoded =
            serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{value:?}")));
        self.insert(key.into(), encoded);
        self
    }

    /// Adds a field holding the `Display` text of `value`.
    #[must_use]
    pub fn display_field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key.into(), Value::String(value.to_string()));
        self
    }

    /// Adds an already-encoded JSON value.
    #[must_use]
    pub fn value_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key.into(), value);
        self
    }

    /// Caller fields in insertion order.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Renders the envelope as pretty JSON.
    #[must_use]
    pub fn render(&self) -> String {
        Envelope::Ok(self.fields.clone()).render()
    }

    fn insert(&mut self, key: String, value: Value) {
        if key != STATUS_KEY {
            self.fields.insert(key, value);
        }
    }
}

/// Renders a success envelope from `(key, value)` pairs.
#[must_use]
pub fn ok_response<I, K>(fields: I) -> String
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    fields
        .into_iter()
        .fold(OkResponse::new(), |response, (key, value)| {
            response.value_field(key, value)
        })
        .render()
}

/// Renders an error envelope carrying the `Display` text of `error`.
///
/// Plain messages and error values produce the same shape:
/// `error_response("x")` and `error_response(err)` where `err` displays as
/// `x` are identical.
#[must_use]
pub fn error_response(error: impl fmt::Display) -> String {
    Envelope::Error(error.to_string()).render()
}

/// Pretty-prints any serializable value with a two-space indent.
///
/// Serialization failures are rendered as a JSON string holding the error
/// text rather than propagated.
#[must_use]
pub fn to_pretty_json<T>(value: &T) -> String
where
    T: Serialize + ?Sized,
{
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| Value::String(error.to_string()).to_string())
}

/// Decoded form of a tool response.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{"status": "ok", ...}` with the caller fields.
    Ok(Map<String, Value>),
    /// `{"status": "error", "error": ...}` with the failure text.
    Error(String),
}

impl Envelope {
    /// Decodes an envelope from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] when the text is not JSON, is not an object,
    /// lacks a known `status`, or is an error envelope without a string
    /// `error` field.
    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        let Value::Object(mut object) = serde_json::from_str::<Value>(text)? else {
            return Err(EnvelopeError::NotAnObject);
        };

        let status = match object.remove(STATUS_KEY) {
            Some(Value::String(status)) => status,
            Some(_) | None => return Err(EnvelopeError::MissingStatus),
        };

        match status.as_str() {
            STATUS_OK => Ok(Self::Ok(object)),
            STATUS_ERROR => match object.remove(ERROR_KEY) {
                Some(Value::String(message)) => Ok(Self::Error(message)),
                Some(_) | None => Err(EnvelopeError::MissingError),
            },
            _ => Err(EnvelopeError::UnknownStatus { status }),
        }
    }

    /// Whether this is a success envelope.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Failure text of an error envelope.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Error(message) => Some(message.as_str()),
        }
    }

    /// JSON object with `status` first.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        match self {
            Self::Ok(fields) => {
                object.insert(STATUS_KEY.to_owned(), Value::from(STATUS_OK));
                for (key, value) in fields {
                    if key != STATUS_KEY {
                        object.insert(key.clone(), value.clone());
                    }
                }
            }
            Self::Error(message) => {
                object.insert(STATUS_KEY.to_owned(), Value::from(STATUS_ERROR));
                object.insert(ERROR_KEY.to_owned(), Value::from(message.as_str()));
            }
        }
        Value::Object(object)
    }

    /// Renders the envelope as pretty JSON.
    #[must_use]
    pub fn render(&self) -> String {
        to_pretty_json(&self.to_value())
    }
}

impl From<OkResponse> for Envelope {
    fn from(response: OkResponse) -> Self {
        Self::Ok(response.fields)
    }
}

/// Errors raised while decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The text is not valid JSON.
    #[error("envelope is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON value is not an object.
    #[error("envelope is not a JSON object")]
    NotAnObject,
    /// The object has no string `status`.
    #[error("envelope has no status")]
    MissingStatus,
    /// The status is neither `ok` nor `error`.
    #[error("unknown envelope status '{status}'")]
    UnknownStatus {
        /// Status found in the object.
        status: String,
    },
    /// An error envelope has no string `error` field.
    #[error("error envelope has no error message")]
    MissingError,
}
