//! Relative navigation between elements.
//!
//! [`ElementRef`] is a cheap, copyable handle to one element of an
//! [`ArenaDom`]. From it you can move up to the parent, down to the
//! children, sideways to the siblings, and up to the nearest ancestor that
//! satisfies a predicate. Only element nodes take part: text, comments and
//! doctypes are never returned.
//!
//! Every accessor answers "not there" with `None`. The [`Navigate`] trait is
//! also implemented for `Option<ElementRef>`, so steps can be chained and
//! the chain stops at the first missing link:
//!
//! ```
//! use domwalk::dom::parse_html;
//! use domwalk::nav::{ElementRef, Navigate};
//!
//! let dom = parse_html("<ul><li>a</li><li>b</li></ul>");
//! let first = ElementRef::new(&dom, dom.find_by_tag("li").unwrap());
//!
//! assert_eq!(first.next_sibling().map(|li| li.index()), Some(1));
//! assert!(first.next_sibling().next_sibling().is_none());
//! assert!(first.next_sibling().next_sibling().parent().is_none());
//! ```

mod ancestors;
mod children;
mod path;

pub use ancestors::Ancestors;
pub use children::{ChildList, Children, ChildrenIter, LiveChildren};
pub use path::{Path, Step};

use std::fmt;

use html5ever::LocalName;

use crate::dom::{ArenaDom, ArenaNode, ArenaNodeId};
use crate::select::Selector;

/// Reference to an element in an [`ArenaDom`].
///
/// Two refs are equal when they point at the same node of the same DOM.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a ArenaDom,
    id: ArenaNodeId,
}

impl<'a> ElementRef<'a> {
    /// Wrap an element id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an element of `dom`. Use [`ArenaDom::element`]
    /// when the id may refer to some other kind of node.
    pub fn new(dom: &'a ArenaDom, id: ArenaNodeId) -> Self {
        assert!(
            dom.is_element(id),
            "node {} is not an element of this document",
            id.0
        );
        Self { dom, id }
    }

    /// Build a ref from a link that is known to point at an element, or NONE.
    fn from_link(dom: &'a ArenaDom, id: ArenaNodeId) -> Option<Self> {
        id.to_option().map(|id| Self { dom, id })
    }

    fn node(&self) -> &'a ArenaNode {
        self.dom.node(self.id)
    }

    pub fn id(self) -> ArenaNodeId {
        self.id
    }

    pub fn dom(self) -> &'a ArenaDom {
        self.dom
    }

    /// The parent element, or `None` for the root and for detached nodes.
    ///
    /// The document node is not an element, so the top-level `<html>`
    /// element has no parent.
    pub fn parent(self) -> Option<Self> {
        let parent = self.node().parent;
        if self.dom.is_element(parent) {
            Some(Self {
                dom: self.dom,
                id: parent,
            })
        } else {
            None
        }
    }

    /// Live view of the element children, in document order.
    ///
    /// The view stores no element ids; every access walks the current links.
    pub fn children(self) -> Children<'a> {
        Children::new(self.dom, self.id)
    }

    /// Id-only live handle to the element children, usable across mutation.
    pub fn live_children(self) -> LiveChildren {
        LiveChildren::new(self.id)
    }

    pub fn first_child(self) -> Option<Self> {
        Self::from_link(self.dom, self.node().first_element_child)
    }

    pub fn last_child(self) -> Option<Self> {
        Self::from_link(self.dom, self.node().last_element_child)
    }

    /// The element right after this one under the same parent.
    pub fn next_sibling(self) -> Option<Self> {
        Self::from_link(self.dom, self.node().next_element_sibling)
    }

    /// The element right before this one under the same parent.
    pub fn previous_sibling(self) -> Option<Self> {
        Self::from_link(self.dom, self.node().prev_element_sibling)
    }

    /// This element followed by each ancestor, nearest first.
    pub fn ancestors(self) -> Ancestors<'a> {
        Ancestors::new(self)
    }

    /// Nearest element, starting with this one, for which `predicate` holds.
    ///
    /// The predicate is called at most once per element, from this element
    /// up to the root, and never on siblings.
    pub fn closest<F>(self, predicate: F) -> Option<Self>
    where
        F: FnMut(ElementRef<'a>) -> bool,
    {
        ancestors::closest(self, predicate)
    }

    /// [`closest`](Self::closest) with a selector as the predicate.
    pub fn closest_selector(self, selector: &Selector) -> Option<Self> {
        self.closest(|el| selector.matches(el))
    }

    /// Whether this element matches `selector`.
    pub fn matches(self, selector: &Selector) -> bool {
        selector.matches(self)
    }

    /// Position among the parent's element children (0 for detached nodes).
    pub fn index(self) -> usize {
        let mut index = 0;
        let mut current = self.previous_sibling();
        while let Some(prev) = current {
            index += 1;
            current = prev.previous_sibling();
        }
        index
    }

    pub fn local_name(self) -> &'a LocalName {
        match &self.node().data {
            crate::dom::ArenaNodeData::Element { name, .. } => &name.local,
            _ => unreachable!("ElementRef always points at an element"),
        }
    }

    pub fn attr(self, name: &str) -> Option<&'a str> {
        self.dom.get_attr(self.id, name)
    }

    /// Value of the `id` attribute.
    pub fn element_id(self) -> Option<&'a str> {
        self.dom.element_id(self.id)
    }

    pub fn classes(self) -> &'a [String] {
        self.dom.element_classes(self.id)
    }

    pub fn has_class(self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.dom, other.dom)
    }
}

impl Eq for ElementRef<'_> {}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", self.local_name())
            .finish()
    }
}

impl fmt::Display for ElementRef<'_> {
    /// Short CSS-like label: `tag#id.class1.class2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_name())?;
        if let Some(id) = self.element_id() {
            write!(f, "#{id}")?;
        }
        for class in self.classes() {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

impl ArenaDom {
    /// Element handle for `id`, or `None` if `id` is not an element.
    pub fn element(&self, id: ArenaNodeId) -> Option<ElementRef<'_>> {
        if self.is_element(id) {
            Some(ElementRef { dom: self, id })
        } else {
            None
        }
    }

    /// Handle to the top-level element (normally `<html>`).
    pub fn root(&self) -> Option<ElementRef<'_>> {
        self.root_element().and_then(|id| self.element(id))
    }
}

/// Single-step navigation with absence propagation.
///
/// Implemented for [`ElementRef`] and for `Option<ElementRef>`; on `None`
/// every step returns `None` without touching the tree.
pub trait Navigate<'a>: Sized {
    fn parent(self) -> Option<ElementRef<'a>>;
    fn first_child(self) -> Option<ElementRef<'a>>;
    fn last_child(self) -> Option<ElementRef<'a>>;
    fn next_sibling(self) -> Option<ElementRef<'a>>;
    fn previous_sibling(self) -> Option<ElementRef<'a>>;
    fn closest<F>(self, predicate: F) -> Option<ElementRef<'a>>
    where
        F: FnMut(ElementRef<'a>) -> bool;
}

impl<'a> Navigate<'a> for ElementRef<'a> {
    fn parent(self) -> Option<ElementRef<'a>> {
        ElementRef::parent(self)
    }

    fn first_child(self) -> Option<ElementRef<'a>> {
        ElementRef::first_child(self)
    }

    fn last_child(self) -> Option<ElementRef<'a>> {
        ElementRef::last_child(self)
    }

    fn next_sibling(self) -> Option<ElementRef<'a>> {
        ElementRef::next_sibling(self)
    }

    fn previous_sibling(self) -> Option<ElementRef<'a>> {
        ElementRef::previous_sibling(self)
    }

    fn closest<F>(self, predicate: F) -> Option<ElementRef<'a>>
    where
        F: FnMut(ElementRef<'a>) -> bool,
    {
        ElementRef::closest(self, predicate)
    }
}

impl<'a> Navigate<'a> for Option<ElementRef<'a>> {
    fn parent(self) -> Option<ElementRef<'a>> {
        self.and_then(ElementRef::parent)
    }

    fn first_child(self) -> Option<ElementRef<'a>> {
        self.and_then(ElementRef::first_child)
    }

    fn last_child(self) -> Option<ElementRef<'a>> {
        self.and_then(ElementRef::last_child)
    }

    fn next_sibling(self) -> Option<ElementRef<'a>> {
        self.and_then(ElementRef::next_sibling)
    }

    fn previous_sibling(self) -> Option<ElementRef<'a>> {
        self.and_then(ElementRef::previous_sibling)
    }

    fn closest<F>(self, predicate: F) -> Option<ElementRef<'a>>
    where
        F: FnMut(ElementRef<'a>) -> bool,
    {
        self.and_then(|el| ElementRef::closest(el, predicate))
    }
}
