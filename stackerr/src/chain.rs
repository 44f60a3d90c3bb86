//! Walking error chains for their effective code and message

use std::any::Any;
use std::error::Error as StdError;

use crate::config;
use crate::{Code, Error};

/// The effective code of `err`.
///
/// Returns `None` for `None`. An [`Error`] with a code reports it; one
/// without a code defers to its cause. A foreign error, or a chain that ends
/// without any code, reports [`Code::Internal`]. Foreign errors are not
/// unwrapped further.
pub fn code(err: Option<&(dyn StdError + 'static)>) -> Option<Code> {
    let err = err?;
    Some(match err.downcast_ref::<Error>() {
        Some(err) => err.effective_code(),
        None => Code::Internal,
    })
}

/// The effective human-readable message of `err`.
///
/// Returns `""` for `None`, otherwise the first non-empty message along the
/// chain of [`Error`]s, or the configured fallback message.
pub fn message(err: Option<&(dyn StdError + 'static)>) -> String {
    match err {
        None => String::new(),
        Some(err) => match err.downcast_ref::<Error>() {
            Some(err) => err.effective_message(),
            None => config::current().fallback_message.clone(),
        },
    }
}

/// The last error in the `source()` chain of `err`.
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

/// Normalize an arbitrary value into an [`Error`].
///
/// - an [`Error`] passes through unchanged
/// - an `anyhow::Error` or boxed std error holding an [`Error`] is unwrapped
///   to it
/// - any other such error, a `String` or a `&'static str` becomes a codeless
///   leaf whose cause holds the original text
///
/// Anything else yields `None`. Useful for panic payloads from
/// `std::panic::catch_unwind`.
pub fn to_error(value: Box<dyn Any + Send>) -> Option<Error> {
    let value = match value.downcast::<Error>() {
        Ok(err) => return Some(*err),
        Err(value) => value,
    };
    let value = match value.downcast::<anyhow::Error>() {
        Ok(err) => {
            return Some(
                (*err)
                    .downcast::<Error>()
                    .unwrap_or_else(|other| Error::leaf(other.to_string())),
            )
        }
        Err(value) => value,
    };
    let value = match value.downcast::<Box<dyn StdError + Send + Sync>>() {
        Ok(err) => {
            let err: Box<dyn StdError + Send + Sync> = *err;
            return Some(match err.downcast::<Error>() {
                Ok(err) => *err,
                Err(other) => Error::leaf(other.to_string()),
            })
        }
        Err(value) => value,
    };
    let value = match value.downcast::<String>() {
        Ok(text) => return Some(Error::leaf(*text)),
        Err(value) => value,
    };
    value
        .downcast::<&'static str>()
        .ok()
        .map(|text| Error::leaf(*text))
}

impl Error {
    /// This error's code, or the first code found down the chain, or
    /// [`Code::Internal`].
    pub fn effective_code(&self) -> Code {
        if let Some(code) = self.code {
            return code;
        }
        code(self.cause_ref()).unwrap_or(Code::Internal)
    }

    /// This error's message, or the first message found down the chain, or
    /// the configured fallback.
    pub fn effective_message(&self) -> String {
        if !self.message.is_empty() {
            return self.message.clone();
        }
        match self.cause_ref() {
            Some(cause) => message(Some(cause)),
            None => config::current().fallback_message.clone(),
        }
    }

    /// The last error in this error's chain, or `self` for a leaf.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        root_cause(self)
    }
}
