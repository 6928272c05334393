//! Request keys and the two supported key kinds.
//!
//! A trace is either keyed by text identifiers or by 64-bit integers, never
//! both. Profilers and engines declare a [`KeyKind`] up front and reject keys
//! of the other kind.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;

/// The kind of key a trace carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyKind {
    /// Text identifiers (legacy code `'c'`).
    Text,
    /// 64-bit integer identifiers (legacy code `'l'`).
    #[default]
    Int64,
}

impl KeyKind {
    /// Parses the single-character code used by trace readers.
    ///
    /// # Example
    ///
    /// ```
    /// use edgecache::key::KeyKind;
    ///
    /// assert_eq!(KeyKind::from_code('c').unwrap(), KeyKind::Text);
    /// assert_eq!(KeyKind::from_code('l').unwrap(), KeyKind::Int64);
    /// assert!(KeyKind::from_code('f').is_err());
    /// ```
    pub fn from_code(code: char) -> Result<Self, ConfigError> {
        match code {
            'c' => Ok(KeyKind::Text),
            'l' => Ok(KeyKind::Int64),
            other => Err(ConfigError::new(format!("unknown key kind code {:?}", other))),
        }
    }

    /// Returns the single-character code for this kind.
    pub fn code(self) -> char {
        match self {
            KeyKind::Text => 'c',
            KeyKind::Int64 => 'l',
        }
    }
}

impl FromStr for KeyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "c" => Ok(KeyKind::Text),
            "int64" | "l" => Ok(KeyKind::Int64),
            _ => Err(ConfigError::new(format!("unknown key kind {:?}", s))),
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Text => f.write_str("text"),
            KeyKind::Int64 => f.write_str("int64"),
        }
    }
}

/// An opaque request key.
///
/// Text keys are reference counted so the profiler and the engines can keep
/// their own copies without reallocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Text(Arc<str>),
    Int(u64),
}

impl CacheKey {
    /// Returns the kind of this key.
    #[inline]
    pub fn kind(&self) -> KeyKind {
        match self {
            CacheKey::Text(_) => KeyKind::Text,
            CacheKey::Int(_) => KeyKind::Int64,
        }
    }
}

impl From<u64> for CacheKey {
    fn from(id: u64) -> Self {
        CacheKey::Int(id)
    }
}

impl From<&str> for CacheKey {
    fn from(id: &str) -> Self {
        CacheKey::Text(Arc::from(id))
    }
}

impl From<String> for CacheKey {
    fn from(id: String) -> Self {
        CacheKey::Text(Arc::from(id))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Text(s) => f.write_str(s),
            CacheKey::Int(id) => write!(f, "{}", id),
        }
    }
}

/// A single content request from a trace. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    key: CacheKey,
    size: Option<u64>,
}

impl CacheRequest {
    /// Creates a request for `key` with no size attribute.
    pub fn new(key: impl Into<CacheKey>) -> Self {
        Self {
            key: key.into(),
            size: None,
        }
    }

    /// Creates a request carrying a size (or block-size) attribute.
    pub fn with_size(key: impl Into<CacheKey>, size: u64) -> Self {
        Self {
            key: key.into(),
            size: Some(size),
        }
    }

    #[inline]
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[inline]
    pub fn kind(&self) -> KeyKind {
        self.key.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_kind_parses_names_and_codes() {
        assert_eq!("text".parse::<KeyKind>().unwrap(), KeyKind::Text);
        assert_eq!("INT64".parse::<KeyKind>().unwrap(), KeyKind::Int64);
        assert_eq!("c".parse::<KeyKind>().unwrap(), KeyKind::Text);
        assert!("float".parse::<KeyKind>().is_err());
    }

    #[test]
    fn key_kind_code_round_trips() {
        for kind in [KeyKind::Text, KeyKind::Int64] {
            assert_eq!(KeyKind::from_code(kind.code()).unwrap(), kind);
        }
    }

    #[test]
    fn request_reports_key_kind_and_size() {
        let text = CacheRequest::new("obj-1");
        let int = CacheRequest::with_size(42u64, 512);

        assert_eq!(text.kind(), KeyKind::Text);
        assert_eq!(text.size(), None);
        assert_eq!(int.kind(), KeyKind::Int64);
        assert_eq!(int.size(), Some(512));
        assert_eq!(int.key(), &CacheKey::Int(42));
    }

    #[test]
    fn text_keys_compare_by_content() {
        let a = CacheKey::from("same");
        let b = CacheKey::from(String::from("same"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "same");
    }
}
