//! Internal implementation of the tenant identifier.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Directory under the storage base that holds one subdirectory per tenant.
pub const USERS_DIR_NAME: &str = "users";

/// Positions of the `-` separators in the canonical hyphenated form.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// The panel's canonical tenant identifier (36 lowercase characters, hyphenated).
///
/// Once constructed the contained UUID is guaranteed to render in canonical form, which makes
/// it safe to use directly as a directory name.
///
/// # Construction
/// - [`TenantId::new`] generates a fresh identifier for a new hosting account.
/// - [`TenantId::parse`] validates an externally supplied identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TenantId(Uuid);

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantId {
    /// Generates a new random (v4) tenant identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a tenant identifier that must already be canonical.
    ///
    /// Other common UUID spellings are **not** normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "tenant id must be a lowercase hyphenated UUID, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid tenant id '{}': {}", input, e)))
    }

    /// Returns a copy of the inner UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is a canonical tenant identifier.
    ///
    /// Purely syntactic: 36 bytes, hyphens at positions 8, 13, 18 and 23, and lowercase hex
    /// everywhere else.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 36
            && input.bytes().enumerate().all(|(i, b)| {
                if HYPHEN_POSITIONS.contains(&i) {
                    b == b'-'
                } else {
                    matches!(b, b'0'..=b'9' | b'a'..=b'f')
                }
            })
    }

    /// Returns `storage_base/users/<id>`, the root of this tenant's file store.
    ///
    /// The directory is not created here.
    pub fn root_dir(&self, storage_base: &Path) -> PathBuf {
        storage_base
            .join(USERS_DIR_NAME)
            .join(self.0.hyphenated().to_string())
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TenantId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TenantId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TenantId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TenantId::parse(&s).map_err(serde::de::Error::custom)
    }
}
