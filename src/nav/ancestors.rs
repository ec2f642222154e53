//! Upward traversal: the inclusive ancestor chain and `closest`.

use std::iter::FusedIterator;

use log::trace;

use super::ElementRef;

/// Iterator over an element and its ancestors, nearest first.
///
/// Follows [`ElementRef::parent`] only, so each element of the chain is
/// yielded exactly once and siblings are never visited.
#[derive(Clone)]
pub struct Ancestors<'a> {
    next: Option<ElementRef<'a>>,
}

impl<'a> Ancestors<'a> {
    pub(super) fn new(start: ElementRef<'a>) -> Self {
        Self { next: Some(start) }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl FusedIterator for Ancestors<'_> {}

pub(super) fn closest<'a, F>(start: ElementRef<'a>, mut predicate: F) -> Option<ElementRef<'a>>
where
    F: FnMut(ElementRef<'a>) -> bool,
{
    let mut visited = 0usize;
    let found = start.ancestors().find(|&el| {
        visited += 1;
        predicate(el)
    });
    trace!(
        "closest from {start}: visited {visited}, {}",
        found.map_or_else(|| "no match".to_string(), |el| format!("matched {el}"))
    );
    found
}
