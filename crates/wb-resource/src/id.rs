//! Dotted resource identifiers.

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// An id made of `.`-separated segments, e.g. `res.r1`.
///
/// Cloning is cheap: the string is shared between the store's cache key and
/// every resource loaded under it, and stays valid for as long as any of them
/// lives.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Rc<str>);

impl ResourceId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> std::str::Split<'_, char> {
        self.0.split('.')
    }

    /// Relative path of the resource file without its extension:
    /// `res.r1` becomes `res/r1`.
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments().collect()
    }

    /// Inverse of [`to_relative_path`](Self::to_relative_path).
    pub fn from_relative_path(path: &std::path::Path) -> Option<Self> {
        let parts: Option<Vec<&str>> = path.iter().map(|p| p.to_str()).collect();
        let parts = parts?;
        if parts.is_empty() {
            return None;
        }
        Some(Self::new(parts.join(".")))
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ResourceId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ResourceId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
