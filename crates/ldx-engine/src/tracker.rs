//! Per-batch dependency tracking.

use std::collections::BTreeSet;

use ldx_model::LayerId;

/// Records which identities a batch has already serialized or loaded.
///
/// The tracker is what keeps recursive walks over the dependency graph from
/// re-emitting shared dependencies and from spinning on relation cycles: an
/// identity is marked before its subtree is walked, so re-entering it is a
/// no-op.
#[derive(Debug, Clone, Default)]
pub struct DependencyTracker {
    visited: BTreeSet<LayerId>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, identity: &LayerId) -> bool {
        self.visited.contains(identity)
    }

    /// Marks an identity as visited; returns whether it was newly marked.
    pub fn mark_visited(&mut self, identity: LayerId) -> bool {
        self.visited.insert(identity)
    }

    /// Visited identities in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerId> {
        self.visited.iter()
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_twice_reports_not_new() {
        let mut tracker = DependencyTracker::new();
        let id = LayerId::new("parcels").unwrap();
        assert!(!tracker.is_visited(&id));
        assert!(tracker.mark_visited(id.clone()));
        assert!(tracker.is_visited(&id));
        assert!(!tracker.mark_visited(id));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn iteration_is_sorted() {
        let mut tracker = DependencyTracker::new();
        for name in ["zoning", "parcels", "owners"] {
            tracker.mark_visited(LayerId::new(name).unwrap());
        }
        let order: Vec<_> = tracker.iter().map(LayerId::as_str).collect();
        assert_eq!(order, ["owners", "parcels", "zoning"]);
    }
}
