//! Serialization boundaries through the public API.

use stackerr::{chain, Code, Error, ScalarValue, Scanner, Valuer};

fn assert_same_record(decoded: &Error, original: &Error) {
    assert_eq!(decoded.code(), original.code());
    assert_eq!(decoded.message(), original.message());
    assert_eq!(decoded.operation(), original.operation());
    assert_eq!(decoded.is_internal(), original.is_internal());
    assert_eq!(decoded.frames(), original.frames());
}

#[test]
fn leaf_round_trip_is_exact() {
    for original in [
        Error::internal("db unreachable", "Repo.Connect"),
        Error::conflict("email taken", "Users.Create"),
        Error::maximum_attempts("", "Login.Attempt"),
    ] {
        let json = original.to_json().unwrap();
        let decoded = Error::from_json(&json).unwrap();

        assert_same_record(&decoded, &original);
        assert!(decoded.cause().is_none());
        // origin only travels with a cause
        assert!(decoded.file_line().is_empty());
    }
}

#[test]
fn cause_survives_only_as_text() {
    let root = std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timeout");
    let inner = Error::unknown("fetch failed", "Client.Fetch").with_cause(root);
    let inner_text = inner.to_string();
    let outer = Error::not_found("no quote", "Quotes.Get").with_cause(inner);

    let decoded = Error::from_json(&outer.to_json().unwrap()).unwrap();

    assert_same_record(&decoded, &outer);
    assert_eq!(decoded.file_line(), outer.file_line());
    assert_eq!(decoded.cause().unwrap().to_string(), inner_text);
    assert_eq!(decoded.to_string(), outer.to_string());

    // The decoded cause is an opaque leaf: its code, operation and the
    // rest of the chain are gone.
    assert!(decoded.cause_error().is_none());
    assert!(outer.cause_error().is_some());
    assert!(decoded.root_cause().source().is_none());
    assert_ne!(
        decoded.root_cause().to_string(),
        outer.root_cause().to_string()
    );
}

#[test]
fn decoded_unset_code_defers_to_nothing() {
    let inner = Error::conflict("duplicate", "Repo.Insert");
    let outer_json = serde_json::json!({
        "code": "",
        "message": "",
        "operation": "Service.Create",
        "error": inner.to_string(),
        "file_line": "src/service.rs:10",
        "additional": [],
        "internal": false
    });
    let decoded: Error = serde_json::from_value(outer_json).unwrap();

    // The conflict code lived in the original chain, not in the text.
    assert_eq!(decoded.code(), None);
    assert_eq!(chain::code(Some(&decoded)), Some(Code::Internal));
    assert_eq!(chain::message(Some(&decoded)), "An error has occurred.");
    assert_eq!(decoded.http_status_code(), 500);
}

#[test]
fn scalar_round_trip_matches_json() {
    let inner = Error::invalid("bad email", "Form.Validate");
    let original = Error::expired("trial over", "Billing.Check").with_cause(inner);

    let stored = original.value().unwrap();
    assert!(matches!(stored, ScalarValue::Bytes(_)));

    let mut scanned = Error::default();
    scanned.scan(stored).unwrap();
    let via_json = Error::from_json(&original.to_json().unwrap()).unwrap();

    assert_same_record(&scanned, &via_json);
    assert_eq!(scanned.file_line(), via_json.file_line());
    assert_eq!(scanned.to_string(), via_json.to_string());
}

#[test]
fn scanning_null_keeps_zero_value() {
    let mut scanned = Error::default();
    scanned.scan(ScalarValue::Null).unwrap();
    assert_eq!(scanned.code(), None);
    assert_eq!(scanned.to_string(), "");
}

#[test]
fn scanning_text_fails() {
    let json = Error::invalid("m", "op").to_json().unwrap();
    let mut scanned = Error::default();
    let err = scanned.scan(ScalarValue::Text(json)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "scan not supported for stackerr::Error from text value"
    );
}

#[test]
fn accepts_records_from_existing_producers() {
    let record = r#"{"code":"maximum_attempts","message":"too many tries","operation":"Otp.Verify","error":"","file_line":"","additional":null,"internal":false}"#;
    let decoded = Error::from_json(record).unwrap();
    assert_eq!(decoded.code(), Some(Code::MaximumAttempts));
    assert_eq!(decoded.http_status_code(), 429);
    assert!(decoded.frames().is_empty());
}
