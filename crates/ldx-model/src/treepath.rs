//! Layer tree paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in the layer tree, as the chain of group names from the
/// invisible root down to the group holding a layer.
///
/// The empty path means "directly at the tree root".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// The root path, containing no group segments.
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from group names, outermost first.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Group names, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Appends an inner group name.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        f.write_str(&self.0.join("/"))
    }
}

impl<S: Into<String>> FromIterator<S> for TreePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_is_empty() {
        assert!(TreePath::root().is_root());
        assert_eq!(TreePath::root().to_string(), "/");
    }

    #[test]
    fn segments_preserve_order() {
        let path = TreePath::new(["Utilities", "Water"]);
        assert_eq!(path.segments(), ["Utilities", "Water"]);
        assert_eq!(path.to_string(), "Utilities/Water");
    }

    #[test]
    fn push_appends_inner_groups() {
        let mut path = TreePath::new(["Utilities"]);
        path.push("Water");
        assert_eq!(path, TreePath::new(["Utilities", "Water"]));
    }
}
