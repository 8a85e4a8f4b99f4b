//! Validated names shared across the panel crates.
//!
//! A [`SegmentName`] checks its invariant once at construction so downstream code can rely on
//! it without re-validating.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input was expected to be a single path segment but was not
    #[error("Not a single path segment: '{0}'")]
    NotASegment(String),
}

/// A single file or directory name.
///
/// The input is **not** trimmed: file names may legitimately carry leading or trailing spaces,
/// and silently changing them would store the entry under a different name than the caller
/// asked for.
///
/// A segment is rejected if it is empty, is `.` or `..`, contains `/` or `\`, or contains a
/// NUL byte. Either separator is rejected on every platform so that a name accepted on one
/// host cannot address a different directory on another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentName(String);

impl SegmentName {
    /// Validates `input` as a single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for an empty or whitespace-only input and
    /// [`TextError::NotASegment`] for anything that is not exactly one segment.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        if input == "." || input == ".." || input.contains(['/', '\\', '\0']) {
            return Err(TextError::NotASegment(input.to_owned()));
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SegmentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SegmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for SegmentName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl serde::Serialize for SegmentName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SegmentName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SegmentName::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_accepts_plain_names() {
        for name in ["a", "cat.png", ".hidden", "with space", "..."] {
            assert_eq!(SegmentName::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn segment_keeps_surrounding_whitespace() {
        assert_eq!(SegmentName::new(" a ").unwrap().as_str(), " a ");
    }

    #[test]
    fn segment_rejects_separators_and_dots() {
        for name in ["a/b", "a\\b", "/", ".", "..", "../x", "nul\0byte"] {
            assert!(
                matches!(SegmentName::new(name), Err(TextError::NotASegment(_))),
                "{name:?} should be rejected"
            );
        }
        assert_eq!(SegmentName::new(""), Err(TextError::Empty));
        assert_eq!(SegmentName::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn segment_deserialize_validates() {
        let ok: SegmentName = serde_json::from_str("\"docs\"").unwrap();
        assert_eq!(ok.as_str(), "docs");
        assert!(serde_json::from_str::<SegmentName>("\"../etc\"").is_err());
    }
}
