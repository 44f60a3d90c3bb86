//! Process-wide defaults
//!
//! Two settings affect how errors are built and read: the code used when a
//! constructor does not name one, and the message reported when a chain has
//! none. They are installed once at startup with [`install`]; until then,
//! and in processes that never install anything, [`Config::default`] applies.

use std::env;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::code::{Code, ParseCodeError};

/// Message reported when no message exists anywhere in a chain.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "An error has occurred.";

/// Environment variable read by [`Config::from_env`] for the default code.
pub const DEFAULT_CODE_ENV: &str = "STACKERR_DEFAULT_CODE";

/// Environment variable read by [`Config::from_env`] for the fallback message.
pub const FALLBACK_MESSAGE_ENV: &str = "STACKERR_FALLBACK_MESSAGE";

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error configuration already installed")]
    AlreadyInstalled,

    #[error(transparent)]
    UnknownCode(#[from] ParseCodeError),

    #[error("environment variable {var}: {reason}")]
    Env { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code used by [`Error::with_default_code`](crate::Error::with_default_code),
    /// [`Error::wrap`](crate::Error::wrap) and [`errorf!`](crate::errorf)
    pub default_code: Code,
    /// Message used by [`chain::message`](crate::chain::message) when the
    /// chain carries none
    pub fallback_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_code: Code::Internal,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_code(mut self, code: Code) -> Self {
        self.default_code = code;
        self
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    /// Build from [`DEFAULT_CODE_ENV`] and [`FALLBACK_MESSAGE_ENV`].
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for var in [DEFAULT_CODE_ENV, FALLBACK_MESSAGE_ENV] {
            let value = match env::var(var) {
                Ok(value) => value,
                Err(env::VarError::NotPresent) => continue,
                Err(e) => {
                    warn!(var, error = %e, "ignoring error configuration");
                    return Err(ConfigError::Env {
                        var,
                        reason: e.to_string(),
                    });
                }
            };
            config.apply(var, value)?;
        }

        Ok(config)
    }

    /// Apply one setting by its environment variable name.
    fn apply(&mut self, var: &'static str, value: String) -> Result<(), ConfigError> {
        match var {
            DEFAULT_CODE_ENV => self.default_code = value.trim().parse()?,
            FALLBACK_MESSAGE_ENV => self.fallback_message = value,
            _ => {
                return Err(ConfigError::Env {
                    var,
                    reason: "not an error setting".to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Install the process-wide configuration.
///
/// Succeeds once. Fails if a configuration was already installed or if
/// errors were already read against the defaults.
pub fn install(config: Config) -> Result<(), ConfigError> {
    let requested = config.clone();
    CONFIG.set(config).map_err(|_| {
        warn!(
            default_code = %requested.default_code,
            "error configuration already installed, keeping the current one"
        );
        ConfigError::AlreadyInstalled
    })?;
    debug!(
        default_code = %requested.default_code,
        fallback_message = %requested.fallback_message,
        "error configuration installed"
    );
    Ok(())
}

/// The active configuration.
///
/// The first call without an installed configuration locks in the defaults
/// for the rest of the process.
pub fn current() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}
