//! Storing errors as a single column value
//!
//! [`Scanner`] and [`Valuer`] are the two halves of a generic database
//! driver contract: reading a column value into a Rust value and producing a
//! column value from one. [`Error`] is stored as its JSON record in a bytes
//! column.

use tracing::{debug, warn};

use crate::wire::CodecError;
use crate::Error;

/// A value as handed over by a database driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl ScalarValue {
    /// Name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int(_) => "int",
            ScalarValue::Float(_) => "float",
            ScalarValue::Text(_) => "text",
            ScalarValue::Bytes(_) => "bytes",
        }
    }
}

/// Read a driver value into `self`.
pub trait Scanner {
    fn scan(&mut self, value: ScalarValue) -> Result<(), CodecError>;
}

/// Produce a driver value from `self`.
pub trait Valuer {
    fn value(&self) -> Result<ScalarValue, CodecError>;
}

impl Scanner for Error {
    /// `Null` leaves `self` untouched. `Bytes` are decoded as a JSON record
    /// and replace `self` entirely. Any other value is rejected.
    fn scan(&mut self, value: ScalarValue) -> Result<(), CodecError> {
        match value {
            ScalarValue::Null => Ok(()),
            ScalarValue::Bytes(buf) => {
                *self = serde_json::from_slice(&buf).map_err(|e| {
                    debug!(error = %e, len = buf.len(), "failed to decode scanned error record");
                    CodecError::from(e)
                })?;
                Ok(())
            }
            other => {
                warn!(found = other.kind(), "refusing to scan error from non-bytes value");
                Err(CodecError::UnsupportedScan { found: other.kind() })
            }
        }
    }
}

impl Valuer for Error {
    fn value(&self) -> Result<ScalarValue, CodecError> {
        Ok(ScalarValue::Bytes(serde_json::to_vec(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Code;

    #[test]
    fn test_value_is_json_bytes() {
        let err = Error::conflict("email taken", "Users.Create");
        let ScalarValue::Bytes(buf) = err.value().unwrap() else {
            panic!("expected bytes");
        };
        let decoded: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(decoded["code"], "conflict");
    }

    #[test]
    fn test_scan_null_is_noop() {
        let mut err = Error::invalid("keep me", "Form");
        err.scan(ScalarValue::Null).unwrap();
        assert_eq!(err.message(), "keep me");
        assert_eq!(err.code(), Some(Code::Invalid));
    }

    #[test]
    fn test_scan_overwrites_receiver() {
        let stored = Error::not_found("gone", "Repo.Find").value().unwrap();

        let mut err = Error::invalid("stale", "Form");
        err.scan(stored).unwrap();
        assert_eq!(err.code(), Some(Code::NotFound));
        assert_eq!(err.message(), "gone");
        assert!(err.program_counters().is_empty());
    }

    #[test]
    fn test_scan_rejects_non_bytes() {
        let mut err = Error::default();
        let result = err.scan(ScalarValue::Text("{}".to_string()));
        assert!(matches!(
            result,
            Err(CodecError::UnsupportedScan { found: "text" })
        ));
        assert!(matches!(
            err.scan(ScalarValue::Int(7)),
            Err(CodecError::UnsupportedScan { found: "int" })
        ));
    }

    #[test]
    fn test_scan_rejects_invalid_bytes() {
        let mut err = Error::default();
        let result = err.scan(ScalarValue::Bytes(b"{oops".to_vec()));
        assert!(matches!(result, Err(CodecError::Json(_))));
    }
}
