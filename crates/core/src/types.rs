//! Core identifier and time types
//!
//! This module defines the fundamental types used throughout the system:
//! - [`RunId`]: Identifier of a run (one trace, many spans)
//! - [`SpanId`]: Identifier of a span, unique within its run
//! - [`ProjectId`]: Owning project/tenant of a span
//! - [`SpanTime`]: A recorded timestamp that may have failed to parse

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier, returning the owned string
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a run (trace)
    ///
    /// A run exists implicitly once at least one span carries its id.
    /// The store shards by RunId, so different runs never contend.
    RunId
);

string_id!(
    /// Identifier of a span, unique within its run
    SpanId
);

string_id!(
    /// Owning project (tenant) of a span
    ProjectId
);

/// A timestamp as recorded on a span
///
/// Span records come from an external document store, so a timestamp field
/// may hold anything. RFC 3339 text and integer epoch milliseconds parse to
/// an instant. Any other value is kept verbatim instead of failing
/// deserialization of the whole span; consumers decide how to treat it (the
/// status resolver downgrades to `Indeterminate`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SpanTime {
    /// A valid instant
    At(DateTime<Utc>),
    /// Raw text that failed to parse as a timestamp
    Unparsed(String),
}

impl SpanTime {
    /// Parse RFC 3339 text, keeping it verbatim on failure
    ///
    /// # Examples
    ///
    /// ```
    /// use runscope_core::SpanTime;
    ///
    /// assert!(SpanTime::parse("2024-05-01T10:00:00Z").instant().is_some());
    /// assert!(SpanTime::parse("yesterday").instant().is_none());
    /// ```
    pub fn parse(text: &str) -> Self {
        match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => SpanTime::At(dt.with_timezone(&Utc)),
            Err(_) => SpanTime::Unparsed(text.to_string()),
        }
    }

    /// Create from milliseconds since the Unix epoch
    ///
    /// Out-of-range values are kept as unparsed text.
    pub fn from_millis(millis: i64) -> Self {
        match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(dt) => SpanTime::At(dt),
            None => SpanTime::Unparsed(millis.to_string()),
        }
    }

    /// The parsed instant, if valid
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            SpanTime::At(dt) => Some(*dt),
            SpanTime::Unparsed(_) => None,
        }
    }

    /// Check if this timestamp failed to parse
    pub fn is_malformed(&self) -> bool {
        matches!(self, SpanTime::Unparsed(_))
    }
}

impl<'de> Deserialize<'de> for SpanTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::String(text) => SpanTime::parse(&text),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(millis) => SpanTime::from_millis(millis),
                None => SpanTime::Unparsed(n.to_string()),
            },
            other => SpanTime::Unparsed(other.to_string()),
        })
    }
}

impl From<DateTime<Utc>> for SpanTime {
    fn from(dt: DateTime<Utc>) -> Self {
        SpanTime::At(dt)
    }
}

impl std::fmt::Display for SpanTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanTime::At(dt) => write!(f, "{}", dt.to_rfc3339()),
            SpanTime::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}
