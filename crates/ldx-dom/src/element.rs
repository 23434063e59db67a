//! The owned element tree.

/// An XML element with attributes, text content and child elements.
///
/// The model is deliberately small: attributes keep document order, text is a
/// single run per element (mixed content is concatenated on read), and
/// namespaces are treated as part of the tag name. That covers every document
/// shape this workspace reads or writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn append_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Drops surrounding whitespace from the accumulated text run.
    pub(crate) fn trim_text(&mut self) {
        let trimmed = self.text.trim();
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_string();
        }
    }

    /// The value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value of the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Builder-style attribute assignment.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style text assignment.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    /// The first direct child with the given tag.
    pub fn first_child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.tag == tag)
    }

    pub fn first_child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    /// Direct children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// All descendants with the given tag, in document order (self excluded).
    pub fn descendants_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        let mut stack: Vec<&'a Element> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                stack.extend(node.children.iter().rev());
                if node.tag == tag {
                    return Some(node);
                }
            }
            None
        })
    }

    /// The text of the first direct child with the given tag.
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.first_child(tag).map(Element::text)
    }

    /// Sets the text of the first child with the given tag, appending a new
    /// child when none exists.
    pub fn set_child_text(&mut self, tag: &str, text: impl Into<String>) {
        if let Some(child) = self.first_child_mut(tag) {
            child.set_text(text);
        } else {
            self.children.push(Element::new(tag).with_text(text));
        }
    }

    /// Removes and returns the first direct child with the given tag.
    pub fn remove_child(&mut self, tag: &str) -> Option<Element> {
        let index = self.children.iter().position(|child| child.tag == tag)?;
        Some(self.children.remove(index))
    }
}
