//! Retained visual tree
//!
//! A small HTML/SVG node arena the renderer draws into. Nodes are addressed
//! by [`NodeId`]; removing a node frees its whole subtree, and stale ids are
//! simply ignored afterwards. Serialization produces markup that a browser
//! can display as-is.

use quick_xml::escape::escape;
use std::fmt::Write;

/// Handle to a node in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single element: tag, classes, attributes, inline style, text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder method: add a class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    /// Builder method: set an attribute
    pub fn attr(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder method: set an inline style property
    pub fn style(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        self.set_style(name, value);
        self
    }

    /// Builder method: set the text content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle a class, returning whether it is now present
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.classes.push(class.to_string());
            true
        }
    }

    pub fn set_attr(&mut self, name: &str, value: impl std::fmt::Display) {
        set_pair(&mut self.attrs, name, value.to_string());
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, name: &str, value: impl std::fmt::Display) {
        set_pair(&mut self.styles, name, value.to_string());
    }

    pub fn get_style(&self, name: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute parsed as a number
    pub fn number_attr(&self, name: &str) -> Option<f64> {
        self.get_attr(name).and_then(|v| v.parse().ok())
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == name) {
        Some(pair) => pair.1 = value,
        None => pairs.push((name.to_string(), value)),
    }
}

/// Minimal CSS-like selector: `tag`, `.class`, `tag.class`, `.a.b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    pub fn parse(selector: &str) -> Self {
        let mut parts = selector.trim().split('.');
        let tag = parts
            .next()
            .filter(|t| !t.is_empty() && *t != "*")
            .map(str::to_string);
        let classes = parts.filter(|c| !c.is_empty()).map(str::to_string).collect();
        Self { tag, classes }
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().map_or(true, |t| t == element.tag)
            && self.classes.iter().all(|c| element.has_class(c))
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Selector::parse(s)
    }
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Node arena with a single root
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
}

impl Scene {
    /// Create a scene whose root is `root`
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Some(Node {
                element: root,
                parent: None,
                children: Vec::new(),
            })],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Append `element` as the last child of `parent`
    ///
    /// Appending to a removed parent attaches to the root instead.
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let parent = if self.contains(parent) { parent } else { self.root };
        let node = Node {
            element,
            parent: Some(parent),
            children: Vec::new(),
        };

        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };

        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Detach and free `id` with its whole subtree; the root cannot be removed
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }

        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(node.children);
                self.free.push(current.0);
            }
        }
        true
    }

    /// Remove every node matching `selector`, returning how many were matched
    pub fn remove_all(&mut self, selector: &Selector) -> usize {
        let ids = self.select_all(selector);
        let count = ids.len();
        for id in ids {
            self.remove(id);
        }
        count
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.node(id).map(|n| &n.element)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.node_mut(id).map(|n| &mut n.element)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Remove all children of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    /// All matching nodes in document order
    pub fn select_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.get(*id).map_or(false, |e| selector.matches(e)))
            .collect()
    }

    /// First matching node in document order
    pub fn select(&self, selector: &Selector) -> Option<NodeId> {
        self.select_all(selector).into_iter().next()
    }

    /// Number of matching nodes
    pub fn count(&self, selector: &Selector) -> usize {
        self.select_all(selector).len()
    }

    /// `id` and everything below it, pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Serialize the subtree rooted at `id`
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id, 0);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, depth: usize) {
        let node = match self.node(id) {
            Some(node) => node,
            None => return,
        };
        let element = &node.element;
        let indent = "  ".repeat(depth);

        let _ = write!(out, "{}<{}", indent, element.tag);
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&element.classes.join(" ")));
        }
        for (name, value) in &element.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if !element.styles.is_empty() {
            let style = element
                .styles
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape(&style));
        }
        out.push('>');

        if let Some(text) = &element.text {
            out.push_str(&escape(text));
        }

        if node.children.is_empty() {
            let _ = writeln!(out, "</{}>", element.tag);
        } else {
            out.push('\n');
            for child in &node.children {
                self.write_node(out, *child, depth + 1);
            }
            let _ = writeln!(out, "{}</{}>", indent, element.tag);
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }
}
