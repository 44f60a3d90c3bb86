//! # stackerr
//!
//! Structured application errors that keep their cause and the place they
//! were raised.
//!
//! ## Design Philosophy
//!
//! - **Code**: Know what category of failure occurred (NotFound, Conflict, ...)
//!   and map it to an HTTP status
//! - **Operation**: Name the logical operation that failed
//! - **Cause**: Wrap the lower-level error instead of replacing it
//! - **Origin**: Record `file:line` and a short stack slice at construction
//!
//! ## Usage
//!
//! ```rust
//! use stackerr::{Code, Error, ResultExt};
//!
//! fn find_user(id: u64) -> stackerr::Result<String> {
//!     Err(Error::not_found(format!("user {} missing", id), "UserRepo.Find"))
//! }
//!
//! fn handler() -> stackerr::Result<String> {
//!     find_user(7).wrap_err("loading profile", "ProfileHandler.Get")
//! }
//!
//! let err = handler().unwrap_err();
//! assert_eq!(err.effective_code(), Code::Internal);
//! assert_eq!(err.cause_error().unwrap().code(), Some(Code::NotFound));
//! ```
//!
//! ## Configuration
//!
//! The default code and fallback message are process-wide. Call
//! [`config::install`] at startup, before constructing or reading any error:
//! the first read locks in [`Config::default`] and a later install fails
//! with [`ConfigError::AlreadyInstalled`].
//!
//! ```rust
//! use stackerr::{config, Code, Config};
//!
//! config::install(Config::new().with_default_code(Code::Unknown)).unwrap();
//! ```
//!
//! ## Principles
//!
//! - Lower layers wrap with their own operation and message
//! - Unset codes are read as [`Code::Internal`], never guessed
//! - Serialization keeps only the first link of the chain, as text

mod code;
mod error;
mod ext;
#[macro_use]
mod macros;
mod wire;

pub mod chain;
pub mod config;
pub mod scalar;
pub mod trace;

pub use code::{http_status, Code, ParseCodeError};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use ext::ResultExt;
pub use scalar::{ScalarValue, Scanner, Valuer};
pub use trace::{StackTrace, Trace};
pub use wire::CodecError;

/// Result type alias using stackerr Error
pub type Result<T> = std::result::Result<T, Error>;

/// Annotate an optional cause.
///
/// `None` stays `None`; otherwise the cause is wrapped with the configured
/// default code, recording the location of this call.
#[track_caller]
pub fn wrap<E>(
    cause: Option<E>,
    message: impl Into<String>,
    operation: impl Into<String>,
) -> Option<Error>
where
    E: Into<anyhow::Error>,
{
    let cause = cause?;
    Some(Error::wrap(cause, message, operation))
}
