// NexusHealth - util/error.rs
//
// Error types for the shell, one enum per subsystem.
// Errors are grouped by the subsystem that produced them; every variant
// keeps its underlying cause reachable through `source()`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for shell operations that can fail.
///
/// Storage and config problems never reach here: the session store and
/// theme resolver log and swallow `StorageError`, and the config loader
/// turns `ConfigError` into warnings.
#[derive(Debug)]
pub enum ShellError {
    /// Credential verification or token validation failed.
    Auth(AuthError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "Authentication failed: {e}"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auth(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth errors
// ---------------------------------------------------------------------------

/// Failures reported by the external auth API or its transport.
///
/// All variants surface to the caller as "authentication failed"; the
/// session remains unauthenticated.
#[derive(Debug)]
pub enum AuthError {
    /// The API answered with a non-success status (bad credentials,
    /// expired token, duplicate registration).
    Rejected { status: u16, detail: String },

    /// The request never produced a usable response.
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    /// Credentials were rejected locally before any request was made.
    InvalidCredentials { reason: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status, detail } => {
                write!(f, "server rejected request ({status}): {detail}")
            }
            Self::Transport { endpoint, source } => {
                write!(f, "request to '{endpoint}' failed: {source}")
            }
            Self::InvalidCredentials { reason } => write!(f, "invalid credentials: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<AuthError> for ShellError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Errors raised by the durable key-value store.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },

    /// A value could not be encoded for storage.
    Serialise {
        key: String,
        source: serde_json::Error,
    },

    /// A stored value could not be decoded.
    Deserialise {
        key: String,
        source: serde_json::Error,
    },

    /// The key contains characters that cannot form a file name.
    InvalidKey { key: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
            Self::Serialise { key, source } => {
                write!(f, "failed to encode value for '{key}': {source}")
            }
            Self::Deserialise { key, source } => {
                write!(f, "stored value for '{key}' is malformed: {source}")
            }
            Self::InvalidKey { key } => write!(f, "invalid storage key '{key}'"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialise { source, .. } => Some(source),
            Self::Deserialise { source, .. } => Some(source),
            Self::InvalidKey { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Problems with config.toml. Never fatal: the loader turns these into
/// warnings and keeps defaults.
#[derive(Debug)]
pub enum ConfigError {
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Numeric setting outside its accepted range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// config.toml exists but could not be read.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "{} is not valid TOML: {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{field} = {value} is outside {expected}"),
            Self::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::ValueOutOfRange { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_auth_error_display_includes_detail() {
        let err: ShellError = AuthError::Rejected {
            status: 401,
            detail: "Invalid credentials".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("401"), "{msg}");
        assert!(msg.contains("Invalid credentials"), "{msg}");
    }

    #[test]
    fn test_storage_io_error_keeps_source() {
        let err = StorageError::Io {
            path: PathBuf::from("/tmp/theme.json"),
            operation: "write",
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/theme.json"));
    }

    #[test]
    fn test_shell_error_exposes_auth_cause() {
        let err: ShellError = AuthError::InvalidCredentials {
            reason: "password is empty".to_string(),
        }
        .into();
        let auth = err.source().expect("auth cause");
        assert!(auth.to_string().contains("password is empty"));
        assert!(auth.source().is_none());
    }

    #[test]
    fn test_out_of_range_message_names_field() {
        let err = ConfigError::ValueOutOfRange {
            field: "session.history_limit".to_string(),
            value: "0".to_string(),
            expected: "1..=1000".to_string(),
        };
        assert_eq!(err.to_string(), "session.history_limit = 0 is outside 1..=1000");
    }
}
