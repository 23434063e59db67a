//! The layer tree: nested groups with layer entries.

use ldx_dom::Element;
use ldx_model::TreePath;

/// Element name of a serialized group, shared with the tree-position encoding
/// inside exported layer definitions.
pub const GROUP_TAG: &str = "layer-tree-group";
/// Attribute carrying a group's name.
pub const GROUP_NAME_ATTR: &str = "name";

pub(crate) const TREE_TAG: &str = "layer-tree";
const LAYER_TAG: &str = "layer-tree-layer";
const LAYER_ID_ATTR: &str = "id";
const EXPANDED_ATTR: &str = "expanded";

/// One entry in a group: either a nested group or a layer reference.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Group(GroupNode),
    Layer(String),
}

/// A named group holding an ordered list of children.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    name: String,
    expanded: bool,
    children: Vec<TreeNode>,
}

impl GroupNode {
    /// Creates an empty, expanded group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expanded: true,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// The index of the direct child group with the given name.
    pub fn child_group_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| {
            matches!(child, TreeNode::Group(group) if group.name == name)
        })
    }

    /// The direct child group with the given name.
    pub fn child_group(&self, name: &str) -> Option<&GroupNode> {
        self.children.iter().find_map(|child| match child {
            TreeNode::Group(group) if group.name == name => Some(group),
            _ => None,
        })
    }

    /// Returns the group child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the child at `index` is missing or is a layer entry. Callers
    /// obtain `index` from [`GroupNode::child_group_index`].
    pub fn group_at_mut(&mut self, index: usize) -> &mut GroupNode {
        match &mut self.children[index] {
            TreeNode::Group(group) => group,
            TreeNode::Layer(id) => panic!("tree child {index} is layer '{id}', not a group"),
        }
    }

    /// Inserts a new group at `index` (clamped to the child count) and
    /// returns it.
    pub fn insert_group(&mut self, index: usize, name: impl Into<String>) -> &mut GroupNode {
        let index = index.min(self.children.len());
        self.children
            .insert(index, TreeNode::Group(GroupNode::new(name)));
        self.group_at_mut(index)
    }

    /// Appends a new group and returns it.
    pub fn push_group(&mut self, name: impl Into<String>) -> &mut GroupNode {
        let index = self.children.len();
        self.insert_group(index, name)
    }

    /// Appends a layer entry.
    pub fn push_layer(&mut self, id: impl Into<String>) {
        self.children.push(TreeNode::Layer(id.into()));
    }

    fn contains_layer(&self, id: &str) -> bool {
        self.children.iter().any(|child| match child {
            TreeNode::Layer(layer) => layer == id,
            TreeNode::Group(group) => group.contains_layer(id),
        })
    }

    fn find_layer(&self, id: &str, trail: &mut Vec<String>) -> bool {
        for child in &self.children {
            match child {
                TreeNode::Layer(layer) if layer == id => return true,
                TreeNode::Group(group) => {
                    trail.push(group.name.clone());
                    if group.find_layer(id, trail) {
                        return true;
                    }
                    trail.pop();
                }
                TreeNode::Layer(_) => {}
            }
        }
        false
    }

    fn to_xml(&self) -> Element {
        let mut element = Element::new(GROUP_TAG)
            .with_attr(GROUP_NAME_ATTR, &self.name)
            .with_attr(EXPANDED_ATTR, if self.expanded { "1" } else { "0" });
        append_children_xml(&mut element, &self.children);
        element
    }

    fn from_xml(element: &Element) -> Self {
        let mut group = GroupNode::new(element.attr(GROUP_NAME_ATTR).unwrap_or_default());
        group.expanded = element.attr(EXPANDED_ATTR) != Some("0");
        group.children = children_from_xml(element);
        group
    }
}

impl Default for GroupNode {
    fn default() -> Self {
        Self::new("")
    }
}

/// The project's layer tree. The root group is invisible and unnamed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerTree {
    root: GroupNode,
}

impl LayerTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &GroupNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut GroupNode {
        &mut self.root
    }

    pub fn contains_layer(&self, id: &str) -> bool {
        self.root.contains_layer(id)
    }

    /// The chain of group names above a layer, outermost first.
    ///
    /// Returns `None` when the layer has no tree entry at all, and the root
    /// path when it sits directly under the root.
    pub fn layer_path(&self, id: &str) -> Option<TreePath> {
        let mut trail = Vec::new();
        if self.root.find_layer(id, &mut trail) {
            Some(TreePath::new(trail))
        } else {
            None
        }
    }

    /// Serializes the tree for a project document.
    pub fn to_xml(&self) -> Element {
        let mut element = Element::new(TREE_TAG);
        append_children_xml(&mut element, &self.root.children);
        element
    }

    /// Reads a tree serialized by [`LayerTree::to_xml`].
    pub fn from_xml(element: &Element) -> Self {
        let mut tree = Self::new();
        tree.root.children = children_from_xml(element);
        tree
    }
}

fn append_children_xml(parent: &mut Element, children: &[TreeNode]) {
    for child in children {
        match child {
            TreeNode::Group(group) => parent.push_child(group.to_xml()),
            TreeNode::Layer(id) => {
                parent.push_child(Element::new(LAYER_TAG).with_attr(LAYER_ID_ATTR, id));
            }
        }
    }
}

fn children_from_xml(parent: &Element) -> Vec<TreeNode> {
    let mut children = Vec::new();
    for node in parent.children() {
        match node.tag() {
            GROUP_TAG => children.push(TreeNode::Group(GroupNode::from_xml(node))),
            LAYER_TAG => {
                if let Some(id) = node.attr(LAYER_ID_ATTR) {
                    children.push(TreeNode::Layer(id.to_string()));
                }
            }
            _ => {}
        }
    }
    children
}
