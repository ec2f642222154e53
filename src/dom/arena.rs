//! Arena-based DOM for HTML documents.
//!
//! All nodes live in one vector and refer to each other by index. Every node
//! carries two sets of links: node links over all children (text, comments,
//! elements) and element links over element children only. The element links
//! are what the navigation layer reads, so moving between elements never has
//! to skip over whitespace text or comments.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName, ns};
use log::debug;

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    /// Convert to `Option`, mapping the sentinel to `None`.
    pub fn to_option(self) -> Option<ArenaNodeId> {
        if self.is_some() { Some(self) } else { None }
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for fast matching.
        id: Option<String>,
        /// Pre-extracted classes for fast matching.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena DOM.
///
/// Links are only written by [`ArenaDom`]'s mutation methods, which keep
/// both link sets consistent.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
    pub first_element_child: ArenaNodeId,
    pub last_element_child: ArenaNodeId,
    pub prev_element_sibling: ArenaNodeId,
    pub next_element_sibling: ArenaNodeId,
}

impl ArenaNode {
    /// Create a new unlinked node with the given data.
    pub fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
            first_element_child: ArenaNodeId::NONE,
            last_element_child: ArenaNodeId::NONE,
            prev_element_sibling: ArenaNodeId::NONE,
            next_element_sibling: ArenaNodeId::NONE,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, ArenaNodeData::Element { .. })
    }
}

/// Arena-based DOM tree.
///
/// Nodes are never freed: [`detach`](Self::detach) unlinks a subtree but its
/// ids stay valid, so handles to detached nodes keep working.
///
/// Outside the arena nodes are read-only; structure changes go through the
/// mutation methods:
///
/// ```compile_fail
/// let mut dom = domwalk::ArenaDom::new();
/// let doc = dom.document();
/// dom.get_mut(doc);
/// ```
#[derive(Debug)]
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
    /// Map from id attribute to node ID for fast lookup.
    id_map: HashMap<String, ArenaNodeId>,
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
            id_map: HashMap::new(),
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Node known to exist; handles only hold ids this arena handed out.
    pub(crate) fn node(&self, id: ArenaNodeId) -> &ArenaNode {
        &self.nodes[id.0 as usize]
    }

    /// Mutable node access, private to the arena.
    fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new, unattached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        // Pre-extract id and class for fast selector matching
        let (id, classes) = id_and_classes(&attrs);

        let node_id = self.alloc(ArenaNode::new(ArenaNodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        }));

        if let Some(id_str) = id {
            self.id_map.entry(id_str).or_insert(node_id);
        }

        node_id
    }

    /// Add attributes `target` does not already have, keeping existing values.
    ///
    /// The cached id and classes are re-derived, and a newly gained id is
    /// registered for [`get_by_id`](Self::get_by_id).
    pub fn add_attrs_if_missing(&mut self, target: ArenaNodeId, attrs: Vec<Attribute>) {
        let Some(ArenaNode {
            data:
                ArenaNodeData::Element {
                    attrs: existing,
                    id,
                    classes,
                    ..
                },
            ..
        }) = self.get_mut(target)
        else {
            return;
        };

        for attr in attrs {
            if !existing.iter().any(|a| a.name == attr.name) {
                existing.push(attr);
            }
        }

        let (new_id, new_classes) = id_and_classes(existing);
        *id = new_id.clone();
        *classes = new_classes;

        if let Some(id_str) = new_id {
            self.id_map.entry(id_str).or_insert(target);
        }
    }

    /// Create an HTML-namespace element from a tag name and attribute pairs.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> ArenaNodeId {
        let attrs = attrs
            .iter()
            .map(|&(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: value.to_string(),
            })
            .collect();
        self.create_element(QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(
        &mut self,
        name: String,
        public_id: String,
        system_id: String,
    ) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// An attached `child` is moved: it is detached from its current parent
    /// first.
    ///
    /// # Panics
    ///
    /// Panics if `child` is `parent` or one of its ancestors, since that
    /// would make the tree cyclic.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        self.assert_insertable(parent, child);
        self.detach(child);

        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ArenaNodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }

        self.link_element(child);
    }

    /// Insert `new_node` immediately before `sibling`, under the same parent.
    ///
    /// Does nothing if `sibling` has no parent.
    ///
    /// # Panics
    ///
    /// Panics if `new_node` is `sibling`'s parent or one of its ancestors.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        if sibling == new_node {
            return;
        }
        let parent = self
            .get(sibling)
            .map(|n| n.parent)
            .unwrap_or(ArenaNodeId::NONE);
        if parent.is_none() {
            return;
        }
        self.assert_insertable(parent, new_node);
        self.detach(new_node);

        // Read after detaching: new_node may have been sibling's previous sibling
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }

        self.link_element(new_node);
    }

    /// Unlink `node` (and its subtree) from its parent.
    ///
    /// The node keeps its children and its id; it simply becomes the root of
    /// a detached subtree. Detaching an unattached node is a no-op.
    pub fn detach(&mut self, node: ArenaNodeId) {
        let (parent, prev, next) = match self.get(node) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };
        if parent.is_none() {
            return;
        }

        self.unlink_element(node);

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(target) = self.get_mut(node) {
            target.parent = ArenaNodeId::NONE;
            target.prev_sibling = ArenaNodeId::NONE;
            target.next_sibling = ArenaNodeId::NONE;
        }
        debug!("detached node {} from {}", node.0, parent.0);
    }

    /// Move every child of `node` to the end of `new_parent`, keeping order.
    pub fn reparent_children(&mut self, node: ArenaNodeId, new_parent: ArenaNodeId) {
        while let Some(child) = self.get(node).and_then(|n| n.first_child.to_option()) {
            self.append(new_parent, child);
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Whether `ancestor` is `node` or one of its ancestors (over node links).
    pub fn is_inclusive_ancestor(&self, ancestor: ArenaNodeId, node: ArenaNodeId) -> bool {
        let mut current = node;
        while current.is_some() {
            if current == ancestor {
                return true;
            }
            current = self
                .get(current)
                .map(|n| n.parent)
                .unwrap_or(ArenaNodeId::NONE);
        }
        false
    }

    fn assert_insertable(&self, parent: ArenaNodeId, child: ArenaNodeId) {
        assert!(
            self.get(parent).is_some() && self.get(child).is_some(),
            "insertion with unknown node: parent {}, child {}",
            parent.0,
            child.0
        );
        assert!(
            !self.is_inclusive_ancestor(child, parent),
            "cannot insert node {} into its own subtree",
            child.0
        );
    }

    /// Thread a freshly linked element into its parent's element links.
    ///
    /// Node links must already be in place.
    fn link_element(&mut self, child: ArenaNodeId) {
        let (parent, mut prev) = match self.get(child) {
            Some(n) if n.is_element() => (n.parent, n.prev_sibling),
            _ => return,
        };

        // Nearest element before us in node order
        while prev.is_some() && !self.is_element(prev) {
            prev = self
                .get(prev)
                .map(|n| n.prev_sibling)
                .unwrap_or(ArenaNodeId::NONE);
        }

        let next = if prev.is_some() {
            self.get(prev)
                .map(|n| n.next_element_sibling)
                .unwrap_or(ArenaNodeId::NONE)
        } else {
            self.get(parent)
                .map(|n| n.first_element_child)
                .unwrap_or(ArenaNodeId::NONE)
        };

        if let Some(node) = self.get_mut(child) {
            node.prev_element_sibling = prev;
            node.next_element_sibling = next;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_element_sibling = child;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_element_child = child;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_element_sibling = child;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_element_child = child;
        }
    }

    /// Remove an element from its parent's element links.
    fn unlink_element(&mut self, child: ArenaNodeId) {
        let (parent, prev, next) = match self.get(child) {
            Some(n) if n.is_element() => {
                (n.parent, n.prev_element_sibling, n.next_element_sibling)
            }
            _ => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_element_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_element_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_element_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_element_child = prev;
        }

        if let Some(node) = self.get_mut(child) {
            node.prev_element_sibling = ArenaNodeId::NONE;
            node.next_element_sibling = ArenaNodeId::NONE;
        }
    }

    /// Get node by id attribute.
    pub fn get_by_id(&self, id: &str) -> Option<ArenaNodeId> {
        self.id_map.get(id).copied()
    }

    /// Get the number of nodes, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over all children (any node type) of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// First top-level element of the document (normally `<html>`).
    pub fn root_element(&self) -> Option<ArenaNodeId> {
        self.get(self.document)
            .and_then(|n| n.first_element_child.to_option())
    }

    /// Find the first node matching a predicate (DFS, document order).
    pub fn find<F>(&self, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(ArenaNodeId, &ArenaNode) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(id, node) {
                    return Some(id);
                }
                // Push children in reverse order for left-to-right traversal
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.find(|_, node| match &node.data {
            ArenaNodeData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
    }
}

/// The `id` attribute and the whitespace-separated `class` list.
fn id_and_classes(attrs: &[Attribute]) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut classes = Vec::new();

    for attr in attrs {
        if attr.name.local.as_ref() == "id" {
            id = Some(attr.value.clone());
        } else if attr.name.local.as_ref() == "class" {
            classes = attr
                .value
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();
        }
    }
    (id, classes)
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl<'a> Iterator for ChildrenIter<'a> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

/// Convenience methods for element nodes.
impl ArenaDom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: ArenaNodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: ArenaNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                ArenaNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.get(id).is_some_and(ArenaNode::is_element)
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
