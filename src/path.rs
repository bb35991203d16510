//! Dotted paths into nested records.
//!
//! A path such as `"person.address.street"` names a location three records
//! deep. Paths are validated once on parse; every segment is non-empty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathError;

/// Separator between path segments.
pub const SEPARATOR: &str = ".";

/// A validated, non-empty sequence of record keys.
///
/// # Examples
///
/// ```
/// use irecord::RecordPath;
///
/// let path: RecordPath = "d.a.b.c".parse().unwrap();
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.to_string(), "d.a.b.c");
///
/// assert!("a..b".parse::<RecordPath>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordPath {
    segments: Vec<String>,
}

impl RecordPath {
    /// Parses a dotted path.
    ///
    /// # Errors
    ///
    /// Returns `PathError::Empty` for `""` and `PathError::EmptySegment` for
    /// leading, trailing or doubled separators.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = path.split(SEPARATOR).map(str::to_string).collect();
        if let Some(index) = segments.iter().position(String::is_empty) {
            return Err(PathError::EmptySegment {
                path: path.to_string(),
                index,
            });
        }
        Ok(Self { segments })
    }

    /// Builds a path from already-split segments.
    ///
    /// Segments may contain the separator character; they are taken verbatim.
    ///
    /// # Errors
    ///
    /// Returns `PathError::Empty` when no segments are given and
    /// `PathError::EmptySegment` when any segment is empty.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(index) = segments.iter().position(String::is_empty) {
            return Err(PathError::EmptySegment {
                path: segments.join(SEPARATOR),
                index,
            });
        }
        Ok(Self { segments })
    }

    /// Single-key path. Fails only when `key` is empty.
    pub fn key(key: impl Into<String>) -> Result<Self, PathError> {
        Self::from_segments([key.into()])
    }

    /// The segments in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the path names a key of the receiver itself.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    /// The first segment.
    #[must_use]
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Splits into the first segment and the remaining sub-path, if any.
    #[must_use]
    pub fn split_first(&self) -> (&str, Option<RecordPath>) {
        let rest = if self.is_single() {
            None
        } else {
            Some(Self {
                segments: self.segments[1..].to_vec(),
            })
        };
        (self.head(), rest)
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for RecordPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for RecordPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for RecordPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl Serialize for RecordPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
