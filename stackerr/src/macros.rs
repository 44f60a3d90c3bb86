/// Build an [`Error`](crate::Error) with the configured default code and a
/// formatted message.
///
/// ```
/// use stackerr::errorf;
///
/// let err = errorf!("Orders.Place", "order {} exceeds limit {}", 42, 10);
/// assert_eq!(err.message(), "order 42 exceeds limit 10");
///
/// let io_err = std::io::Error::new(std::io::ErrorKind::Other, "timeout");
/// let err = errorf!(cause = io_err; "Orders.Place", "gateway call {} failed", 3);
/// assert!(err.cause().is_some());
/// ```
#[macro_export]
macro_rules! errorf {
    (cause = $cause:expr; $op:expr, $($arg:tt)+) => {
        $crate::Error::with_default_code(::std::format!($($arg)+), $op).with_cause($cause)
    };
    ($op:expr, $($arg:tt)+) => {
        $crate::Error::with_default_code(::std::format!($($arg)+), $op)
    };
}
