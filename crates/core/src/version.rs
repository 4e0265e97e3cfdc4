//! Row version tokens
//!
//! A [`VersionToken`] is the opaque identifier stamped on a row and replaced
//! on every successful write. It is either absent (no version assigned yet)
//! or present with non-empty text. Tokens compare by text only; they carry
//! no notion of recency.
//!
//! ## Encodings
//!
//! | Form | Absent | Present |
//! |------|--------|---------|
//! | Storage ([`Value`]) | `Null` | `Text(s)` |
//! | JSON (serde) | `null` | `"s"` |
//!
//! Generation is delegated to a [`VersionGenerator`] so the id scheme can be
//! swapped (random UUID v4, time-ordered UUID v7) without touching the
//! update protocol.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Source of fresh version text
pub trait VersionGenerator: Send + Sync + std::fmt::Debug {
    /// Produce a new, non-empty, globally unique version string
    fn generate(&self) -> String;
}

/// Random UUID v4 versions
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUuid;

impl VersionGenerator for RandomUuid {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Time-ordered UUID v7 versions
///
/// Sortable by creation time, which keeps index inserts on the version
/// column append-mostly. Ordering is still not exposed on [`VersionToken`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedUuid;

impl VersionGenerator for TimeOrderedUuid {
    fn generate(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Configurable choice of generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStrategy {
    /// UUID v4
    #[default]
    Random,
    /// UUID v7
    TimeOrdered,
}

impl VersionStrategy {
    /// Build the generator for this strategy
    pub fn generator(self) -> Arc<dyn VersionGenerator> {
        match self {
            VersionStrategy::Random => Arc::new(RandomUuid),
            VersionStrategy::TimeOrdered => Arc::new(TimeOrderedUuid),
        }
    }
}

/// Optimistic concurrency version of a row
///
/// `Default` is the absent token, which is what a freshly constructed record
/// carries until its first insert.
///
/// # Examples
///
/// ```
/// use occrow_core::VersionToken;
///
/// let absent = VersionToken::default();
/// assert!(!absent.is_present());
///
/// let v1 = VersionToken::new();
/// let v2 = VersionToken::new();
/// assert!(v1.is_present());
/// assert_ne!(v1, v2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionToken(Option<String>);

impl VersionToken {
    /// Create a present token from the default generator (UUID v4)
    pub fn new() -> Self {
        Self::generate(&RandomUuid)
    }

    /// Create a present token from `generator`
    pub fn generate(generator: &dyn VersionGenerator) -> Self {
        let text = generator.generate();
        debug_assert!(!text.is_empty(), "{:?} produced an empty version", generator);
        VersionToken(Some(text))
    }

    /// The absent token
    pub fn absent() -> Self {
        VersionToken(None)
    }

    /// Whether a version has been assigned
    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Version text, if present
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Rebuild a token from a nullable storage scalar
    ///
    /// `Null` maps to absent. Empty text is rejected since no present token
    /// is ever empty.
    pub fn from_storage(raw: Value) -> Result<Self> {
        match raw {
            Value::Null => Ok(VersionToken(None)),
            Value::Text(s) => s.parse(),
            Value::Bytes(b) => String::from_utf8(b)
                .map_err(|e| Error::InvalidVersion(e.to_string()))?
                .parse(),
            other => Err(Error::InvalidVersion(format!(
                "expected Text or Null, got {}",
                other.type_name()
            ))),
        }
    }

    /// Nullable storage scalar for this token
    pub fn to_storage(&self) -> Value {
        match &self.0 {
            Some(s) => Value::Text(s.clone()),
            None => Value::Null,
        }
    }

    /// Decode from JSON text: `null` or a quoted string
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode to JSON text: `null` or a quoted string
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FromStr for VersionToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidVersion("empty version text".into()));
        }
        Ok(VersionToken(Some(s.to_string())))
    }
}

impl std::fmt::Display for VersionToken {
    /// The version text, or nothing when absent
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(""))
    }
}

impl From<&VersionToken> for Value {
    fn from(v: &VersionToken) -> Self {
        v.to_storage()
    }
}

impl From<VersionToken> for Value {
    fn from(v: VersionToken) -> Self {
        v.to_storage()
    }
}

impl Serialize for VersionToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.0 {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for VersionToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(VersionToken(None)),
            Some(s) if s.is_empty() => Err(D::Error::custom("empty version token")),
            Some(s) => Ok(VersionToken(Some(s))),
        }
    }
}
