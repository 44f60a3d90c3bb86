//! The main Error type

use std::fmt;
use std::panic::Location;

use backtrace::Backtrace;
use http::StatusCode;

use crate::code::{self, Code};
use crate::config;
use crate::trace::{self, StackTrace, Trace};

/// A structured application error.
///
/// This error type provides:
/// - `code`: What category of failure occurred
/// - `message`: Human-readable description
/// - `operation`: The logical operation that failed
/// - `cause`: The lower-level error being annotated (if any)
/// - `internal`: Whether the detail is unsafe to show end users
/// - `origin`: The `file:line` where the error was constructed
/// - `frames`: A short stack slice captured at construction
///
/// # Example
///
/// ```rust
/// use stackerr::{Code, Error};
///
/// let err = Error::not_found("user missing", "UserService.Get");
///
/// assert_eq!(err.code(), Some(Code::NotFound));
/// assert_eq!(err.http_status_code(), 404);
/// assert!(err.to_string().starts_with("<not_found> "));
/// assert!(err.to_string().ends_with("UserService.Get: user missing"));
/// ```
#[derive(Default)]
pub struct Error {
    pub(crate) code: Option<Code>,
    pub(crate) message: String,
    pub(crate) operation: String,
    pub(crate) cause: Option<anyhow::Error>,
    pub(crate) internal: bool,
    pub(crate) origin: String,
    pub(crate) frames: StackTrace,
    pub(crate) backtrace: Option<Backtrace>,
}

impl Error {
    /// Create a new error with the given code, message and operation.
    ///
    /// Records the caller's location and a short stack slice.
    #[track_caller]
    pub fn new(code: Code, message: impl Into<String>, operation: impl Into<String>) -> Self {
        let location = Location::caller();
        let capture = trace::capture(location);

        let error = Self {
            code: Some(code),
            message: message.into(),
            operation: operation.into(),
            cause: None,
            internal: code == Code::Internal,
            origin: format!("{}:{}", location.file(), location.line()),
            frames: capture.frames,
            backtrace: Some(capture.backtrace),
        };
        tracing::trace!(
            code = %code,
            operation = %error.operation,
            origin = %error.origin,
            "error constructed"
        );
        error
    }

    /// A codeless leaf whose cause is `text`. Carries no location.
    pub(crate) fn leaf(text: impl Into<String>) -> Self {
        Self {
            cause: Some(anyhow::Error::msg(text.into())),
            ..Default::default()
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// The code set at construction, `None` if unset
    pub fn code(&self) -> Option<Code> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Whether message and cause may be unsafe to show to end users.
    ///
    /// Derived from the code at construction only; wrapping does not
    /// re-derive it.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// The `file:line` where this error was constructed
    pub fn file_line(&self) -> &str {
        &self.origin
    }

    /// The frames captured at construction
    pub fn frames(&self) -> &StackTrace {
        &self.frames
    }

    /// The wrapped error (if any)
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    /// Consume the error, returning the wrapped error
    pub fn into_cause(self) -> Option<anyhow::Error> {
        self.cause
    }

    /// The cause as a std error, for chain walking
    pub(crate) fn cause_ref(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }

    /// The cause, if it is itself an [`Error`]
    pub fn cause_error(&self) -> Option<&Error> {
        self.cause.as_ref().and_then(|cause| cause.downcast_ref::<Error>())
    }

    // =========================================================================
    // Builders (chainable)
    // =========================================================================

    /// Set the cause.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if a cause was already set.
    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.cause.is_none(), "cause already set");
        self.cause = Some(cause.into());
        self
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// HTTP response status for this error's own code.
    ///
    /// Only the receiver's code is consulted, not the chain. Unset maps to
    /// 500.
    pub fn http_status(&self) -> StatusCode {
        code::http_status(self.code)
    }

    pub fn http_status_code(&self) -> u16 {
        self.http_status().as_u16()
    }

    // =========================================================================
    // Stack walking
    // =========================================================================

    /// Program counters of the full stack, starting at the origin.
    ///
    /// Empty for errors that were decoded rather than constructed.
    pub fn program_counters(&self) -> Vec<usize> {
        self.backtrace
            .as_ref()
            .map(|bt| bt.frames().iter().map(|frame| frame.ip() as usize).collect())
            .unwrap_or_default()
    }

    /// The full stack, resolved now.
    ///
    /// Symbols are looked up against the running binary, so this is only
    /// meaningful inside the process that constructed the error.
    pub fn runtime_frames(&self) -> Option<Backtrace> {
        self.backtrace.clone().map(|mut bt| {
            bt.resolve();
            bt
        })
    }

    /// The full stack as text: `function(): message` followed by one
    /// tab-indented `file:line` per frame.
    pub fn stack_trace(&self) -> String {
        let mut lines = self.stack_trace_lines();
        for line in lines.iter_mut().skip(1) {
            line.insert(0, '\t');
        }
        lines.join("\n")
    }

    /// Like [`stack_trace`](Self::stack_trace), one entry per line and
    /// without indentation.
    pub fn stack_trace_lines(&self) -> Vec<String> {
        let traces = match &self.backtrace {
            Some(bt) => trace::walk(bt, self.frames.as_slice().first()),
            None => self.frames.as_slice().to_vec(),
        };

        let head = traces
            .first()
            .map(|trace| trace.function.as_str())
            .unwrap_or_default();
        let mut lines = Vec::with_capacity(traces.len() + 1);
        lines.push(format!("{}(): {}", head, self.message));
        lines.extend(
            traces
                .iter()
                .map(|trace: &Trace| format!("{}:{}", trace.file, trace.line)),
        );
        lines
    }

    /// Verbose multi-line rendering, including captured frames and the
    /// verbose rendering of every [`Error`] in the chain.
    pub fn to_string_with_trace(&self) -> String {
        format!("{:?}", self)
    }
}

// =============================================================================
// Display - compact, single-line format for logs
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();

        if let Some(code) = self.code {
            buf.push_str(&format!("<{}> ", code));
        }
        if !self.origin.is_empty() {
            buf.push_str(&format!("{} - ", self.origin));
        }
        if !self.operation.is_empty() {
            buf.push_str(&format!("{}: ", self.operation));
        }
        if let Some(cause) = &self.cause {
            buf.push_str(&format!("{}, ", cause));
        }
        buf.push_str(&self.message);

        let line = buf.trim();
        write!(f, "{}", line.strip_suffix(',').unwrap_or(line))
    }
}

// =============================================================================
// Debug - verbose, multi-line format for debugging
// =============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Type: {}, Message: {}, Operation: {}",
            self.code.map(|code| code.as_str()).unwrap_or_default(),
            self.message,
            self.operation
        )?;
        write!(f, "{}", self.frames)?;

        if let Some(inner) = self.cause_error() {
            writeln!(f)?;
            writeln!(f, "{:?}", inner)?;
        } else if let Some(cause) = &self.cause {
            writeln!(f)?;
            write!(f, "{}", cause)?;
        }

        Ok(())
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause_ref()
    }
}

// =============================================================================
// Convenience constructors
// =============================================================================

impl Error {
    /// Create an Internal error
    #[track_caller]
    pub fn internal(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(Code::Internal, message, operation)
    }

    /// Create a Conflict error
    #[track_caller]
    pub fn conflict(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(Code::Conflict, message, operation)
    }

    /// Create an Invalid error
    #[track_caller]
    pub fn invalid(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(Code::Invalid, message, operation)
    }

    /// Create a NotFound error
    #[track_caller]
    pub fn not_found(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message, operation)
    }

    /// Create an Unknown error
    #[track_caller]
    pub fn unknown(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(Code::Unknown, message, operation)
    }

    /// Create a MaximumAttempts error
    #[track_caller]
    pub fn maximum_attempts(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(Code::MaximumAttempts, message, operation)
    }

    /// Create an Expired error
    #[track_caller]
    pub fn expired(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(Code::Expired, message, operation)
    }

    /// Create an error with the configured default code
    #[track_caller]
    pub fn with_default_code(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(config::current().default_code, message, operation)
    }

    /// Annotate `cause` with a message and operation, using the configured
    /// default code.
    #[track_caller]
    pub fn wrap(
        cause: impl Into<anyhow::Error>,
        message: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::with_default_code(message, operation).with_cause(cause)
    }
}
