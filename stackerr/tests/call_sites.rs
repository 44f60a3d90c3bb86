//! Frame 0 of every captured stack is the function that called into the
//! library, whichever constructor it went through.

use std::io;
use std::path::Path;

use stackerr::{errorf, Code, Error, ResultExt};

fn assert_starts_at(err: &Error, site: &str) {
    let first = &err.frames().as_slice()[0];
    assert!(first.function.ends_with(site), "frame 0 is {}", first);

    let (file, line) = err.file_line().rsplit_once(':').unwrap();
    assert_eq!(first.line.to_string(), line, "frame 0 is {}", first);
    assert!(Path::new(&first.file).ends_with(file), "frame 0 is {}", first);
}

fn failing() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::TimedOut, "timeout"))
}

#[inline(never)]
fn site_new() -> Error {
    Error::new(Code::NotFound, "user missing", "UserService.Get")
}

#[inline(never)]
fn site_named() -> Error {
    Error::conflict("email taken", "Users.Create")
}

#[inline(never)]
fn site_wrap() -> Error {
    let cause = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
    Error::wrap(cause, "send failed", "Gateway.Send")
}

#[inline(never)]
fn site_free_wrap() -> Option<Error> {
    let cause = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
    stackerr::wrap(Some(cause), "send failed", "Gateway.Send")
}

#[inline(never)]
fn site_wrap_err() -> stackerr::Result<()> {
    failing().wrap_err("charge failed", "Billing.Charge")
}

#[inline(never)]
fn site_errorf() -> Error {
    errorf!("Orders.Place", "order {} exceeds limit {}", 42, 10)
}

#[test]
fn new_starts_at_caller() {
    assert_starts_at(&site_new(), "site_new");
}

#[test]
fn named_constructor_starts_at_caller() {
    assert_starts_at(&site_named(), "site_named");
}

#[test]
fn wrap_starts_at_caller() {
    assert_starts_at(&site_wrap(), "site_wrap");
}

#[test]
fn free_wrap_starts_at_caller() {
    let err = site_free_wrap().unwrap();
    assert_starts_at(&err, "site_free_wrap");
}

#[test]
fn wrap_err_starts_at_caller() {
    let err = site_wrap_err().unwrap_err();
    assert_starts_at(&err, "site_wrap_err");
}

#[test]
fn errorf_starts_at_caller() {
    assert_starts_at(&site_errorf(), "site_errorf");
}

#[test]
fn stack_trace_lines_have_locations() {
    let err = site_named();
    let lines = err.stack_trace_lines();
    assert!(lines[0].ends_with("(): email taken"), "{:?}", lines);
    assert!(!lines[1].starts_with(":0"), "{:?}", lines);
}
