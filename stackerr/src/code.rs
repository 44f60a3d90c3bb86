//! Error codes and their HTTP mapping

use std::fmt;
use std::str::FromStr;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// The category of failure an [`Error`](crate::Error) reports.
///
/// The set is closed. Anything that does not parse into one of these is
/// treated as "unset", which every reader collapses to [`Code::Internal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    /// An action cannot be performed in the current state
    Conflict,

    /// Failure within the application itself
    Internal,

    /// Validation failed
    Invalid,

    /// The entity does not exist
    NotFound,

    /// Failure of unknown origin
    Unknown,

    /// More attempts than allowed
    MaximumAttempts,

    /// A subscription or grant has expired
    Expired,
}

impl Code {
    /// Every code, in declaration order.
    pub const ALL: [Code; 7] = [
        Code::Conflict,
        Code::Internal,
        Code::Invalid,
        Code::NotFound,
        Code::Unknown,
        Code::MaximumAttempts,
        Code::Expired,
    ];

    /// Returns the code as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Conflict => "conflict",
            Code::Internal => "internal",
            Code::Invalid => "invalid",
            Code::NotFound => "not_found",
            Code::Unknown => "unknown",
            Code::MaximumAttempts => "maximum_attempts",
            Code::Expired => "expired",
        }
    }

    /// HTTP response status for this code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Code::Conflict => StatusCode::CONFLICT,
            Code::Invalid => StatusCode::BAD_REQUEST,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Expired => StatusCode::PAYMENT_REQUIRED,
            Code::MaximumAttempts => StatusCode::TOO_MANY_REQUESTS,
            Code::Internal | Code::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP status for a possibly unset code. Unset maps to 500.
pub fn http_status(code: Option<Code>) -> StatusCode {
    code.map_or(StatusCode::INTERNAL_SERVER_ERROR, |code| code.http_status())
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a string is not one of the known codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code '{0}'")]
pub struct ParseCodeError(pub String);

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Code::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ParseCodeError(s.to_string()))
    }
}
