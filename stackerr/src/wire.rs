//! JSON representation of [`Error`]
//!
//! Errors travel as a flat record:
//!
//! ```text
//! {"code","message","operation","error","file_line","additional","internal"}
//! ```
//!
//! The cause is flattened to its `Display` string under `"error"` and the
//! origin is only written alongside a cause. Decoding rebuilds the cause as an
//! opaque leaf, so everything below the first link of the chain (codes,
//! operations, frames) is lost in transit. Consumers that need the whole
//! chain must transmit the errors individually.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::code::Code;
use crate::trace::StackTrace;
use crate::Error;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("scan not supported for stackerr::Error from {found} value")]
    UnsupportedScan { found: &'static str },

    #[error("invalid error record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireError {
    code: String,
    message: String,
    operation: String,
    #[serde(rename = "error")]
    cause: String,
    file_line: String,
    #[serde(deserialize_with = "null_as_default")]
    additional: StackTrace,
    internal: bool,
}

/// Older producers write `null` for an empty frame list.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<&Error> for WireError {
    fn from(err: &Error) -> Self {
        let (cause, file_line) = match &err.cause {
            Some(cause) => (cause.to_string(), err.origin.clone()),
            None => (String::new(), String::new()),
        };
        Self {
            code: err.code.map(|code| code.as_str().to_string()).unwrap_or_default(),
            message: err.message.clone(),
            operation: err.operation.clone(),
            cause,
            file_line,
            additional: err.frames.clone(),
            internal: err.internal,
        }
    }
}

impl From<WireError> for Error {
    fn from(wire: WireError) -> Self {
        Self {
            code: wire.code.parse::<Code>().ok(),
            message: wire.message,
            operation: wire.operation,
            cause: (!wire.cause.is_empty()).then(|| anyhow::Error::msg(wire.cause)),
            internal: wire.internal,
            origin: wire.file_line,
            frames: wire.additional,
            backtrace: None,
        }
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireError::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Error {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireError::deserialize(deserializer).map(Error::from)
    }
}

impl Error {
    /// Encode as a JSON string.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        serde_json::from_str(json).map_err(|e| {
            tracing::debug!(error = %e, "failed to decode error record");
            CodecError::from(e)
        })
    }
}
