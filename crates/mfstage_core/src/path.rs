//! Logical paths in the mutable namespace.

use crate::error::{Result, StageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An absolute, normalized path inside the mutable namespace.
///
/// Always starts with `/`, never ends with one (except the root itself),
/// and contains no empty, `.` or `..` components.
///
/// # Examples
///
/// ```
/// use mfstage_core::MfsPath;
///
/// let path = MfsPath::parse("/data//users/").unwrap();
/// assert_eq!(path.as_str(), "/data/users");
/// assert_eq!(path.join("abc").unwrap().as_str(), "/data/users/abc");
/// assert_eq!(path.parent().unwrap().as_str(), "/data");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MfsPath(String);

impl MfsPath {
    /// The namespace root, `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parses and normalizes a logical path.
    ///
    /// # Errors
    ///
    /// Returns `StageError::InvalidPath` for relative paths and for paths
    /// containing `.` or `..` components or NUL bytes.
    pub fn parse(s: &str) -> Result<Self> {
        if !s.starts_with('/') {
            return Err(StageError::InvalidPath {
                path: s.to_string(),
                reason: "must be absolute",
            });
        }
        if s.contains('\0') {
            return Err(StageError::InvalidPath {
                path: s.to_string(),
                reason: "contains NUL",
            });
        }

        let mut normalized = String::with_capacity(s.len());
        for part in s.split('/').filter(|p| !p.is_empty()) {
            if part == "." || part == ".." {
                return Err(StageError::InvalidPath {
                    path: s.to_string(),
                    reason: "relative components are not allowed",
                });
            }
            normalized.push('/');
            normalized.push_str(part);
        }

        if normalized.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self(normalized))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Appends one or more `/`-separated segments.
    ///
    /// # Errors
    ///
    /// Returns `StageError::InvalidPath` if `segment` is empty or contains
    /// relative components.
    pub fn join(&self, segment: &str) -> Result<Self> {
        if segment.trim_matches('/').is_empty() {
            return Err(StageError::InvalidPath {
                path: segment.to_string(),
                reason: "empty segment",
            });
        }
        Self::parse(&format!("{}/{}", self.0, segment))
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Returns the last component, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Iterates over the components from the root downwards.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|p| !p.is_empty())
    }

    /// True when `self` equals `base` or lies underneath it.
    pub fn starts_with(&self, base: &MfsPath) -> bool {
        if base.is_root() {
            return true;
        }
        self.0 == base.0
            || (self.0.starts_with(&base.0) && self.0.as_bytes().get(base.0.len()) == Some(&b'/'))
    }
}

impl FromStr for MfsPath {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MfsPath {
    type Error = StageError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<MfsPath> for String {
    fn from(path: MfsPath) -> Self {
        path.0
    }
}

impl AsRef<str> for MfsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MfsPath({})", self.0)
    }
}
