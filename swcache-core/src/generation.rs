//! Cache generation names.
//!
//! A generation is a named bucket of cached request/response pairs. Its name
//! embeds the application version, so bumping the version yields a new,
//! empty generation and leaves the old one to be evicted at activation.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// The name of a cache generation, e.g. `catolid-v2` or `catolid-runtime-v2`.
///
/// # Example
/// ```
/// use swcache_core::GenerationName;
///
/// let name = GenerationName::versioned("catolid", 2);
/// assert_eq!(name.as_str(), "catolid-v2");
///
/// let runtime = GenerationName::versioned("catolid-runtime", 2);
/// assert_eq!(runtime.as_str(), "catolid-runtime-v2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationName(SmolStr);

impl GenerationName {
    /// Creates a new generation name.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a generation name from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Builds `{prefix}-v{version}`.
    pub fn versioned(prefix: &str, version: u32) -> Self {
        Self(SmolStr::from(format!("{prefix}-v{version}")))
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenerationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for GenerationName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for GenerationName {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl AsRef<str> for GenerationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_bump_changes_name() {
        let v1 = GenerationName::versioned("catolid", 1);
        let v2 = GenerationName::versioned("catolid", 2);
        assert_ne!(v1, v2);
        assert_eq!(v2.to_string(), "catolid-v2");
    }
}
