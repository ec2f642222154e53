//! CSS selector matching for elements.
//!
//! Navigation treats "does this element match?" as an opaque question. This
//! module answers it with the `selectors` crate: [`Selector`] parses a
//! selector list once and tests single elements, and `ElementRef`
//! implements [`selectors::Element`] on top of the navigation accessors.

use std::fmt;

use html5ever::{LocalName, Namespace, ns};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use crate::dom::{ArenaDom, ArenaNodeData};
use crate::error::{Error, Result};
use crate::nav::ElementRef;

/// Selector implementation for the selectors crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSelectors;

/// Identifier string type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        let mut h: u32 = 0;
        for byte in self.0.bytes() {
            h = h.wrapping_mul(31).wrapping_add(byte as u32);
        }
        h
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for IdentStr {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Wrapper type for LocalName that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(LocalName::from(s))
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Wrapper type for Namespace that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'i> selectors::parser::Parser<'i> for DomSelectors {
    type Impl = DomSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: cssparser::SourceLocation,
        name: cssparser::CowRcStr<'i>,
    ) -> std::result::Result<NonTSPseudoClass, cssparser::ParseError<'i, Self::Error>> {
        let class = match name.to_ascii_lowercase().as_str() {
            "link" | "any-link" => NonTSPseudoClass::Link,
            "visited" => NonTSPseudoClass::Visited,
            "hover" => NonTSPseudoClass::Hover,
            "active" => NonTSPseudoClass::Active,
            "focus" => NonTSPseudoClass::Focus,
            _ => {
                return Err(location.new_custom_error(
                    SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
                ));
            }
        };
        Ok(class)
    }
}

/// Pseudo-elements never match a static tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DomSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

/// Non-tree-structural pseudo-classes.
///
/// Only `:link` can match; user-action states never hold in a static tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
    Visited,
    Hover,
    Active,
    Focus,
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = DomSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, Self::Hover | Self::Active)
    }

    fn is_user_action_state(&self) -> bool {
        matches!(self, Self::Hover | Self::Active | Self::Focus)
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Link => dest.write_str(":link"),
            Self::Visited => dest.write_str(":visited"),
            Self::Hover => dest.write_str(":hover"),
            Self::Active => dest.write_str(":active"),
            Self::Focus => dest.write_str(":focus"),
        }
    }
}

impl SelectorImpl for DomSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// A parsed selector list, usable as a navigation predicate.
///
/// ```
/// use domwalk::dom::parse_html;
/// use domwalk::select::Selector;
///
/// let dom = parse_html(r#"<div class="card"><button>Like</button></div>"#);
/// let button = dom.element(dom.find_by_tag("button").unwrap()).unwrap();
/// let card = Selector::parse(".card").unwrap();
///
/// assert!(button.closest_selector(&card).is_some());
/// ```
#[derive(Clone)]
pub struct Selector {
    source: String,
    list: SelectorList<DomSelectors>,
}

impl Selector {
    /// Parse a comma-separated selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&DomSelectors, &mut parser, ParseRelative::No).map_err(
            |err| Error::InvalidSelector {
                selector: source.to_string(),
                reason: format!("{:?}", err.kind),
            },
        )?;

        Ok(Self {
            source: source.trim().to_string(),
            list,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `element` matches any selector in the list.
    pub fn matches(&self, element: ElementRef<'_>) -> bool {
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );

        self.list.slice().iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &element, &mut context)
        })
    }

    /// First matching element in document order.
    pub fn first_match<'a>(&self, dom: &'a ArenaDom) -> Option<ElementRef<'a>> {
        dom.find(|id, node| node.is_element() && self.matches(ElementRef::new(dom, id)))
            .and_then(|id| dom.element(id))
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl<'a> selectors::Element for ElementRef<'a> {
    type Impl = DomSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.dom().node(self.id()))
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent()
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.previous_sibling()
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.next_sibling()
    }

    fn first_element_child(&self) -> Option<Self> {
        self.first_child()
    }

    fn is_html_element_in_html_document(&self) -> bool {
        // Decides whether tag selectors compare case-insensitively
        self.dom()
            .element_namespace(self.id())
            .is_some_and(|namespace| *namespace == ns!(html))
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        *self.local_name() == name.0
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.dom()
            .element_namespace(self.id())
            .is_some_and(|n| n == &ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.local_name() == other.local_name()
            && self.dom().element_namespace(self.id()) == other.dom().element_namespace(other.id())
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        let attrs = match &self.dom().node(self.id()).data {
            ArenaNodeData::Element { attrs, .. } => attrs,
            _ => return false,
        };

        attrs
            .iter()
            .filter(|attr| match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            })
            .find(|attr| attr.name.local == local_name.0)
            .is_some_and(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            NonTSPseudoClass::Link => self.is_link(),
            _ => false,
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        self.local_name().as_ref() == "a" && self.attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.element_id()
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.classes()
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        let dom = self.dom();
        dom.children(self.id()).all(|child| match &dom.node(child).data {
            ArenaNodeData::Element { .. } => false,
            ArenaNodeData::Text(t) => t.is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        let parent = self.dom().node(self.id()).parent;
        self.dom()
            .get(parent)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Document))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn first<'a>(dom: &'a ArenaDom, tag: &str) -> ElementRef<'a> {
        dom.element(dom.find_by_tag(tag).unwrap()).unwrap()
    }

    #[test]
    fn test_tag_selector() {
        let dom = parse_html("<div><p>Hello</p></div>");
        let p = first(&dom, "p");

        assert!(Selector::parse("p").unwrap().matches(p));
        assert!(!Selector::parse("div").unwrap().matches(p));
    }

    #[test]
    fn test_class_selector() {
        let dom = parse_html(r#"<p class="intro highlight">Hello</p>"#);
        let p = first(&dom, "p");

        assert!(p.matches(&Selector::parse(".intro").unwrap()));
        assert!(p.matches(&Selector::parse(".highlight").unwrap()));
        assert!(p.matches(&Selector::parse("p.intro").unwrap()));
        assert!(!p.matches(&Selector::parse(".missing").unwrap()));
    }

    #[test]
    fn test_id_selector() {
        let dom = parse_html(r#"<p id="main">Hello</p>"#);
        let p = first(&dom, "p");

        assert!(p.matches(&Selector::parse("#main").unwrap()));
        assert!(p.matches(&Selector::parse("p#main").unwrap()));
        assert!(!p.matches(&Selector::parse("#other").unwrap()));
    }

    #[test]
    fn test_combinators_use_element_links() {
        let dom = parse_html("<div><span>x</span> text <p>Hello</p></div>");
        let p = first(&dom, "p");

        assert!(p.matches(&Selector::parse("div > p").unwrap()));
        assert!(p.matches(&Selector::parse("span + p").unwrap()));
        assert!(p.matches(&Selector::parse("div p:last-child").unwrap()));
        assert!(!p.matches(&Selector::parse("p:first-child").unwrap()));
    }

    #[test]
    fn test_selector_list_and_attributes() {
        let dom = parse_html(r#"<a href="/x" data-kind="nav">go</a>"#);
        let a = first(&dom, "a");

        assert!(a.matches(&Selector::parse("section, a[href]").unwrap()));
        assert!(a.matches(&Selector::parse(r#"[data-kind="nav"]"#).unwrap()));
        assert!(a.matches(&Selector::parse("a:link").unwrap()));
        assert!(!a.matches(&Selector::parse("a:hover").unwrap()));
    }

    #[test]
    fn test_root_and_empty() {
        let dom = parse_html("<div id=\"e\"><!-- c --></div>");
        let html = dom.root().unwrap();
        let div = first(&dom, "div");

        assert!(html.matches(&Selector::parse(":root").unwrap()));
        assert!(!div.matches(&Selector::parse(":root").unwrap()));
        assert!(div.matches(&Selector::parse(":empty").unwrap()));
    }

    #[test]
    fn test_foreign_tag_names_keep_their_case() {
        let dom = parse_html(
            r#"<svg><foreignObject><div id="d"></div></foreignObject><linearGradient id="g"/></svg>"#,
        );
        let div = dom.element(dom.get_by_id("d").unwrap()).unwrap();
        let gradient = dom.element(dom.get_by_id("g").unwrap()).unwrap();

        let foreign = div.closest_selector(&Selector::parse("foreignObject").unwrap());
        assert_eq!(foreign, div.parent());
        assert!(foreign.is_some());
        assert!(gradient.matches(&Selector::parse("linearGradient").unwrap()));
        assert!(gradient.matches(&Selector::parse("svg > linearGradient").unwrap()));
        assert!(!gradient.matches(&Selector::parse("lineargradient").unwrap()));

        // HTML elements still match regardless of case
        assert!(div.matches(&Selector::parse("DIV").unwrap()));
        assert_eq!(
            div.closest_selector(&Selector::parse("svg").unwrap()),
            gradient.parent()
        );
    }

    #[test]
    fn test_invalid_selector() {
        let err = Selector::parse("div >").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { ref selector, .. } if selector == "div >"));
        assert!(Selector::parse("").is_err());
    }

    #[test]
    fn test_first_match_document_order() {
        let dom = parse_html(r#"<p class="x" id="one"></p><div><p class="x" id="two"></p></div>"#);
        let sel = Selector::parse(".x").unwrap();

        assert_eq!(sel.first_match(&dom).and_then(|el| el.element_id()), Some("one"));
        assert!(Selector::parse("table").unwrap().first_match(&dom).is_none());
    }
}
