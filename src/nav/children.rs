//! Child element collections.
//!
//! Three shapes, because "live" and "snapshot" behave differently once the
//! tree changes:
//!
//! - [`Children`] borrows the DOM and re-reads the element links on every
//!   call. It always reflects the tree at the moment of the call; while it
//!   exists the DOM cannot be mutated.
//! - [`LiveChildren`] is the same view without the borrow. It remembers only
//!   the parent id and is resolved against the DOM at each access, so it
//!   can be kept across mutations and reports the current children.
//! - [`ChildList`] is a snapshot: the child ids as they were when it was
//!   taken. Later mutation does not change it.

use std::iter::FusedIterator;

use super::ElementRef;
use crate::dom::{ArenaDom, ArenaNodeId};

/// Live view of an element's element children.
#[derive(Clone, Copy)]
pub struct Children<'a> {
    dom: &'a ArenaDom,
    parent: ArenaNodeId,
}

impl<'a> Children<'a> {
    pub(super) fn new(dom: &'a ArenaDom, parent: ArenaNodeId) -> Self {
        Self { dom, parent }
    }

    /// The element whose children this views.
    pub fn parent(&self) -> ElementRef<'a> {
        ElementRef {
            dom: self.dom,
            id: self.parent,
        }
    }

    pub fn iter(&self) -> ChildrenIter<'a> {
        let node = self.dom.node(self.parent);
        ChildrenIter {
            dom: self.dom,
            front: node.first_element_child,
            back: node.last_element_child,
        }
    }

    /// Number of element children. Walks the list.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    pub fn first(&self) -> Option<ElementRef<'a>> {
        self.parent().first_child()
    }

    pub fn last(&self) -> Option<ElementRef<'a>> {
        self.parent().last_child()
    }

    /// Child at `index`, walking from the front.
    pub fn get(&self, index: usize) -> Option<ElementRef<'a>> {
        self.iter().nth(index)
    }

    pub fn contains(&self, element: ElementRef<'_>) -> bool {
        std::ptr::eq(self.dom, element.dom())
            && element.parent().is_some_and(|p| p.id() == self.parent)
    }

    /// Snapshot the current children.
    pub fn to_list(&self) -> ChildList {
        ChildList {
            ids: self.iter().map(ElementRef::id).collect(),
        }
    }
}

impl<'a> IntoIterator for Children<'a> {
    type Item = ElementRef<'a>;
    type IntoIter = ChildrenIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &Children<'a> {
    type Item = ElementRef<'a>;
    type IntoIter = ChildrenIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended iterator over element children.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    front: ArenaNodeId,
    back: ArenaNodeId,
}

impl ChildrenIter<'_> {
    fn finish(&mut self) {
        self.front = ArenaNodeId::NONE;
        self.back = ArenaNodeId::NONE;
    }
}

impl<'a> Iterator for ChildrenIter<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }
        let current = self.front;
        if current == self.back {
            self.finish();
        } else {
            self.front = self.dom.node(current).next_element_sibling;
        }
        Some(ElementRef {
            dom: self.dom,
            id: current,
        })
    }
}

impl DoubleEndedIterator for ChildrenIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }
        let current = self.back;
        if current == self.front {
            self.finish();
        } else {
            self.back = self.dom.node(current).prev_element_sibling;
        }
        Some(ElementRef {
            dom: self.dom,
            id: current,
        })
    }
}

impl FusedIterator for ChildrenIter<'_> {}

/// Live children handle that does not borrow the DOM.
///
/// Resolve it with [`view`](Self::view) each time; results always reflect
/// the DOM passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveChildren {
    parent: ArenaNodeId,
}

impl LiveChildren {
    pub(super) fn new(parent: ArenaNodeId) -> Self {
        Self { parent }
    }

    pub fn parent_id(&self) -> ArenaNodeId {
        self.parent
    }

    /// Borrowed view over the current children.
    ///
    /// # Panics
    ///
    /// Panics if `dom` is not the document the handle was taken from (the
    /// parent id is not an element there).
    pub fn view<'a>(&self, dom: &'a ArenaDom) -> Children<'a> {
        ElementRef::new(dom, self.parent).children()
    }

    pub fn len(&self, dom: &ArenaDom) -> usize {
        self.view(dom).len()
    }

    pub fn is_empty(&self, dom: &ArenaDom) -> bool {
        self.view(dom).is_empty()
    }

    pub fn get<'a>(&self, dom: &'a ArenaDom, index: usize) -> Option<ElementRef<'a>> {
        self.view(dom).get(index)
    }
}

/// Snapshot of element child ids, fixed at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildList {
    ids: Vec<ArenaNodeId>,
}

impl ChildList {
    pub fn ids(&self) -> &[ArenaNodeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ArenaNodeId> {
        self.ids.get(index).copied()
    }

    /// Resolve the snapshot against a DOM.
    ///
    /// Ids stay valid after detaching, so entries that have since moved or
    /// been removed are still yielded.
    ///
    /// # Panics
    ///
    /// The returned iterator panics if `dom` is not the document the
    /// snapshot was taken from (an id is not an element there).
    pub fn iter_in<'a>(&self, dom: &'a ArenaDom) -> impl Iterator<Item = ElementRef<'a>> {
        self.ids.iter().map(move |&id| ElementRef::new(dom, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn ids<'a>(children: impl IntoIterator<Item = ElementRef<'a>>) -> Vec<&'a str> {
        children
            .into_iter()
            .map(|el| el.element_id().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_iterates_in_document_order() {
        let dom = parse_html(r#"<ol id="l"><li id="1"></li> <li id="2"></li><li id="3"></li></ol>"#);
        let list = dom.element(dom.get_by_id("l").unwrap()).unwrap();
        let children = list.children();

        assert_eq!(ids(children), vec!["1", "2", "3"]);
        assert_eq!(ids(children.iter().rev()), vec!["3", "2", "1"]);
        assert_eq!(children.len(), 3);
        assert_eq!(children.get(1).and_then(|el| el.element_id()), Some("2"));
        assert_eq!(children.get(3), None);
    }

    #[test]
    fn test_double_ended_meets_in_middle() {
        let dom = parse_html(r#"<ol id="l"><li id="1"></li><li id="2"></li><li id="3"></li></ol>"#);
        let list = dom.element(dom.get_by_id("l").unwrap()).unwrap();
        let mut iter = list.children().iter();

        assert_eq!(iter.next().and_then(|e| e.element_id()), Some("1"));
        assert_eq!(iter.next_back().and_then(|e| e.element_id()), Some("3"));
        assert_eq!(iter.next().and_then(|e| e.element_id()), Some("2"));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn test_empty_children() {
        let dom = parse_html("<p id=\"p\">only text</p>");
        let p = dom.element(dom.get_by_id("p").unwrap()).unwrap();

        assert!(p.children().is_empty());
        assert_eq!(p.children().len(), 0);
        assert_eq!(p.children().first(), None);
        assert!(p.children().to_list().is_empty());
    }

    #[test]
    fn test_contains() {
        let dom = parse_html(r#"<div id="d"><span id="s"><b id="b"></b></span></div>"#);
        let div = dom.element(dom.get_by_id("d").unwrap()).unwrap();
        let span = dom.element(dom.get_by_id("s").unwrap()).unwrap();
        let bold = dom.element(dom.get_by_id("b").unwrap()).unwrap();

        assert!(div.children().contains(span));
        assert!(!div.children().contains(bold));
        assert!(!div.children().contains(div));
    }

    #[test]
    #[should_panic(expected = "not an element")]
    fn test_snapshot_in_other_document_panics() {
        let dom = parse_html(r#"<ul id="l"><li></li><li></li></ul>"#);
        let list = dom.element(dom.get_by_id("l").unwrap()).unwrap();
        let snapshot = list.children().to_list();

        let other = ArenaDom::new();
        let _ = snapshot.iter_in(&other).count();
    }
}
