//! Error types for the edgecache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a server, profiler or engine is
//!   misconfigured (unknown key kind, unknown eviction algorithm, engine
//!   capacity mismatch, layer index out of range).
//! - [`InvariantError`]: Returned when a boundary evaluation observes
//!   histograms that break the monotone miss-ratio assumption.
//! - [`UnsupportedError`]: Returned by hooks that exist but are not implemented.
//! - [`SimError`]: Union of the first two, for operations that can hit either.
//!
//! ## Example Usage
//!
//! ```
//! use edgecache::error::ConfigError;
//! use edgecache::key::KeyKind;
//!
//! let kind: Result<KeyKind, ConfigError> = KeyKind::from_code('l');
//! assert!(kind.is_ok());
//!
//! let bad = KeyKind::from_code('x');
//! assert!(bad.unwrap_err().to_string().contains("key kind"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when boundary evaluation finds both marginal deltas with
/// the same sign.
///
/// Carries a human-readable description including the offending deltas.
/// The caller should skip the shift; no state has been changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced at the point of misconfiguration: server and profiler
/// construction, engine setters, and requests addressed to a layer that
/// does not exist.
///
/// # Example
///
/// ```
/// use edgecache::server::ServerBuilder;
///
/// let err = ServerBuilder::new(1, 100)
///     .boundaries(&[0.5, 0.6])
///     .build()
///     .unwrap_err();
/// assert!(err.to_string().contains("boundaries"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// UnsupportedError
// ---------------------------------------------------------------------------

/// Error returned by operations that are acknowledged but not implemented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedError(String);

impl UnsupportedError {
    /// Creates a new `UnsupportedError` naming the operation.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnsupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not supported: {}", self.0)
    }
}

impl std::error::Error for UnsupportedError {}

// ---------------------------------------------------------------------------
// SimError
// ---------------------------------------------------------------------------

/// Errors from operations that both validate input and run a boundary
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    Config(ConfigError),
    Invariant(InvariantError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(err) => write!(f, "configuration error: {}", err),
            SimError::Invariant(err) => write!(f, "invariant violation: {}", err),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(err) => Some(err),
            SimError::Invariant(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        SimError::Config(err)
    }
}

impl From<InvariantError> for SimError {
    fn from(err: InvariantError) -> Self {
        SimError::Invariant(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
