//! Annotating `Result`s on their way up

use crate::Error;

/// Extension trait for wrapping the error of any `Result` into an [`Error`].
///
/// The wrapper uses the configured default code and records the location of
/// the `wrap_err` call, not of the code that produced the original error.
///
/// ```rust
/// use stackerr::ResultExt;
///
/// fn read_config() -> stackerr::Result<String> {
///     std::fs::read_to_string("/definitely/not/here.toml")
///         .wrap_err("reading config", "Config.Load")
/// }
///
/// let err = read_config().unwrap_err();
/// assert_eq!(err.operation(), "Config.Load");
/// assert!(err.cause().is_some());
/// ```
pub trait ResultExt<T> {
    /// Wrap the error with a message and operation.
    fn wrap_err(self, message: impl Into<String>, operation: impl Into<String>) -> Result<T, Error>;

    /// Like [`wrap_err`](Self::wrap_err), computing the message and
    /// operation only on failure.
    fn wrap_err_with<F, M, O>(self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> (M, O),
        M: Into<String>,
        O: Into<String>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    #[track_caller]
    fn wrap_err(
        self,
        message: impl Into<String>,
        operation: impl Into<String>,
    ) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(cause) => Err(Error::wrap(cause, message, operation)),
        }
    }

    #[track_caller]
    fn wrap_err_with<F, M, O>(self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> (M, O),
        M: Into<String>,
        O: Into<String>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(cause) => {
                let (message, operation) = f();
                Err(Error::wrap(cause, message, operation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config, Code};
    use std::io;

    fn failing() -> Result<(), io::Error> {
        Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
    }

    #[test]
    fn test_wrap_err() {
        let line = line!() + 1;
        let err = failing().wrap_err("loading config", "Config.Load").unwrap_err();

        assert_eq!(err.code(), Some(config::current().default_code));
        assert_eq!(err.message(), "loading config");
        assert_eq!(err.cause().unwrap().to_string(), "missing");
        assert_eq!(err.file_line(), format!("{}:{}", file!(), line));
    }

    #[test]
    fn test_wrap_err_keeps_ok() {
        let value: Result<u8, io::Error> = Ok(3);
        assert_eq!(value.wrap_err("unused", "Op").unwrap(), 3);
    }

    #[test]
    fn test_wrap_err_with_is_lazy() {
        let mut called = false;
        let ok: Result<(), io::Error> = Ok(());
        ok.wrap_err_with(|| {
            called = true;
            ("never", "Never")
        })
        .unwrap();
        assert!(!called);

        let err = failing()
            .wrap_err_with(|| (format!("attempt {}", 3), "Job.Run"))
            .unwrap_err();
        assert_eq!(err.message(), "attempt 3");
    }

    #[test]
    fn test_wrap_err_on_app_error_keeps_chain() {
        let inner: Result<(), Error> = Err(Error::not_found("row missing", "Repo.Find"));
        let err = inner.wrap_err("", "Service.Get").unwrap_err();
        assert_eq!(err.cause_error().unwrap().code(), Some(Code::NotFound));
    }
}
