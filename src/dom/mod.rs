//! The element tree that navigation reads.
//!
//! [`ArenaDom`] owns the nodes and is the only place structure changes.
//! [`parse_html`] builds one from markup.
//!
//! # Example
//!
//! ```
//! use domwalk::dom::parse_html;
//!
//! let dom = parse_html("<ul><li>one</li><li>two</li></ul>");
//! let ul = dom.find_by_tag("ul").unwrap();
//! assert_eq!(dom.element_name(ul).unwrap().as_ref(), "ul");
//! ```

mod arena;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use log::debug;

use tree_sink::ArenaSink;

/// Parse an HTML document into an [`ArenaDom`].
///
/// Parsing is lenient: malformed markup is repaired the way browsers do and
/// parse errors are dropped. The result always has `<html>`, `<head>` and
/// `<body>` elements.
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = ArenaSink::new();
    let dom = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom();
    debug!("parsed {} bytes of html into {} nodes", html.len(), dom.len());
    dom
}
