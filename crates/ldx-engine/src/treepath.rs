//! Tree position encoding inside layer definition documents.
//!
//! An exported definition remembers where its layer sat in the layer tree as
//! a chain of nested `layer-tree-group` elements, outermost group first. A
//! layer at the tree root carries no chain at all.

use ldx_dom::Element;
use ldx_model::TreePath;
use ldx_project::GroupNode;
use ldx_project::tree::{GROUP_NAME_ATTR, GROUP_TAG};

/// Appends the encoded group chain for `path` to `parent`.
///
/// The root path encodes to nothing.
pub fn encode_tree_path(path: &TreePath, parent: &mut Element) {
    let mut nested: Option<Element> = None;
    for name in path.segments().iter().rev() {
        let mut group = Element::new(GROUP_TAG).with_attr(GROUP_NAME_ATTR, name.as_str());
        if let Some(inner) = nested.take() {
            group.push_child(inner);
        }
        nested = Some(group);
    }
    if let Some(outer) = nested {
        parent.push_child(outer);
    }
}

/// Walks an encoded group chain down from `node`, reusing groups that already
/// exist and creating missing ones, and returns the group the chain ends in.
///
/// Created groups are inserted at the front of their sibling list and start
/// out collapsed; groups found by name are reused as they are.
pub fn decode_tree_path<'a>(element: Option<&Element>, node: &'a mut GroupNode) -> &'a mut GroupNode {
    let Some(group) = element else {
        return node;
    };
    let name = group.attr(GROUP_NAME_ATTR).unwrap_or_default();
    let next = group.first_child(GROUP_TAG);

    let index = match node.child_group_index(name) {
        Some(index) => index,
        None => {
            let created = node.insert_group(0, name);
            created.set_expanded(false);
            0
        }
    };
    decode_tree_path(next, node.group_at_mut(index))
}

#[cfg(test)]
mod tests {
    use ldx_project::LayerTree;

    use super::*;

    #[test]
    fn root_path_encodes_to_nothing() {
        let mut parent = Element::new("maplayer");
        encode_tree_path(&TreePath::root(), &mut parent);
        assert!(parent.first_child(GROUP_TAG).is_none());
    }

    #[test]
    fn nested_path_encodes_outermost_first() {
        let mut parent = Element::new("maplayer");
        encode_tree_path(&TreePath::new(["Utilities", "Water"]), &mut parent);

        let outer = parent.first_child(GROUP_TAG).unwrap();
        assert_eq!(outer.attr(GROUP_NAME_ATTR), Some("Utilities"));
        let inner = outer.first_child(GROUP_TAG).unwrap();
        assert_eq!(inner.attr(GROUP_NAME_ATTR), Some("Water"));
        assert!(inner.first_child(GROUP_TAG).is_none());
    }

    #[test]
    fn decode_creates_collapsed_groups_at_front() {
        let mut parent = Element::new("maplayer");
        encode_tree_path(&TreePath::new(["Utilities", "Water"]), &mut parent);

        let mut tree = LayerTree::new();
        tree.root_mut().push_layer("existing");
        let target = decode_tree_path(parent.first_child(GROUP_TAG), tree.root_mut());
        target.push_layer("water_pipes");

        // The new chain sits in front of the pre-existing layer entry.
        let utilities = match &tree.root().children()[0] {
            ldx_project::TreeNode::Group(group) => group,
            ldx_project::TreeNode::Layer(id) => panic!("expected group, found layer '{id}'"),
        };
        assert_eq!(utilities.name(), "Utilities");
        assert!(!utilities.is_expanded());
        let water = utilities.child_group("Water").unwrap();
        assert!(!water.is_expanded());
        assert_eq!(
            tree.layer_path("water_pipes").unwrap().segments(),
            ["Utilities", "Water"]
        );
    }

    #[test]
    fn decode_reuses_existing_groups() {
        let mut parent = Element::new("maplayer");
        encode_tree_path(&TreePath::new(["Utilities", "Water"]), &mut parent);

        let mut tree = LayerTree::new();
        let utilities = tree.root_mut().push_group("Utilities");
        utilities.push_layer("power_lines");

        let target = decode_tree_path(parent.first_child(GROUP_TAG), tree.root_mut());
        target.push_layer("water_pipes");

        // Still a single Utilities group, expansion state untouched.
        assert_eq!(tree.root().children().len(), 1);
        let utilities = tree.root().child_group("Utilities").unwrap();
        assert!(utilities.is_expanded());
        assert!(utilities.child_group("Water").is_some());
    }

    #[test]
    fn encode_then_decode_lands_in_the_same_group() {
        let path = TreePath::new(["A", "B", "C"]);
        let mut parent = Element::new("maplayer");
        encode_tree_path(&path, &mut parent);

        let mut tree = LayerTree::new();
        let target = decode_tree_path(parent.first_child(GROUP_TAG), tree.root_mut());
        target.push_layer("leaf");
        assert_eq!(tree.layer_path("leaf").unwrap(), path);
    }
}
