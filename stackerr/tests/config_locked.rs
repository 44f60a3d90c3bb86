//! Reading the configuration before installing one locks in the defaults.
//! Process-wide, so it runs in its own binary.

use stackerr::{config, Code, Config, ConfigError, Error};

#[test]
fn first_error_locks_in_defaults() {
    let err = Error::with_default_code("m", "Op");
    assert_eq!(err.code(), Some(Code::Internal));

    let late = config::install(Config::new().with_default_code(Code::Unknown));
    assert!(matches!(late, Err(ConfigError::AlreadyInstalled)));
    assert_eq!(config::current(), &Config::default());
}
