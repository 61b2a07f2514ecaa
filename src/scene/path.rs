use std::fmt;

use crate::utils::interner::{self, Symbol};

/// Interned hierarchical path naming a scene object.
///
/// Used for task ids, camera ids, and render-target slots (the latter
/// aliased as [`TargetId`]). Copying and comparing is an integer operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScenePath(Option<Symbol>);

/// Stable identifier of a logical render-target slot.
pub type TargetId = ScenePath;

impl ScenePath {
    pub const EMPTY: Self = Self(None);

    /// Interns `path`. An empty string yields [`ScenePath::EMPTY`].
    #[must_use]
    pub fn new(path: &str) -> Self {
        if path.is_empty() {
            Self::EMPTY
        } else {
            Self(Some(interner::intern(path)))
        }
    }

    #[must_use]
    pub fn absolute_root() -> Self {
        Self::new("/")
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0.map_or("", interner::resolve)
    }

    /// Returns `self/name`.
    #[must_use]
    pub fn append_child(&self, name: &str) -> Self {
        let parent = self.as_str();
        if parent.is_empty() {
            Self::new(name)
        } else if parent.ends_with('/') {
            Self::new(&format!("{parent}{name}"))
        } else {
            Self::new(&format!("{parent}/{name}"))
        }
    }

    /// Last path element, or the empty string.
    #[must_use]
    pub fn name(&self) -> &'static str {
        let path = self.as_str();
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Parent path; the root and single-element relative paths have no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let path = self.as_str();
        match path.rfind('/') {
            Some(0) if path.len() > 1 => Some(Self::absolute_root()),
            Some(0) | None => None,
            Some(idx) => Some(Self::new(&path[..idx])),
        }
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScenePath({:?})", self.as_str())
    }
}

impl From<&str> for ScenePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_child_builds_hierarchy() {
        let task = ScenePath::new("/tasks/beginFrame");
        let depth = task.append_child("depthBuffer");

        assert_eq!(depth.as_str(), "/tasks/beginFrame/depthBuffer");
        assert_eq!(depth.name(), "depthBuffer");
        assert_eq!(depth.parent(), Some(task));
        assert_eq!(depth, ScenePath::new("/tasks/beginFrame/depthBuffer"));
    }

    #[test]
    fn root_children() {
        let child = ScenePath::absolute_root().append_child("camera");
        assert_eq!(child.as_str(), "/camera");
        assert_eq!(child.parent(), Some(ScenePath::absolute_root()));
        assert_eq!(ScenePath::absolute_root().parent(), None);
    }

    #[test]
    fn empty_path() {
        assert!(ScenePath::new("").is_empty());
        assert!(ScenePath::default().is_empty());
        assert_eq!(ScenePath::EMPTY.as_str(), "");
        assert!(!ScenePath::new("/a").is_empty());
    }
}
