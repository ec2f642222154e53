//! # domwalk
//!
//! Relative navigation over HTML element trees.
//!
//! Start from any element and move around it without knowing the shape of
//! the rest of the document:
//!
//! - up to the parent,
//! - down to the children (or just the first or last one),
//! - sideways to the next or previous sibling,
//! - up to the nearest element, itself included, that matches a predicate.
//!
//! Only elements are visited; text, comments and doctypes are skipped.
//! Missing neighbours are `None`, and chains of steps stop at the first
//! `None` instead of panicking.
//!
//! ## Quick Start
//!
//! ```
//! use domwalk::{parse_html, Navigate, Selector};
//!
//! let dom = parse_html(r#"
//!     <section class="grid">
//!       <article class="card featured"><button>Like</button></article>
//!       <article class="card"></article>
//!     </section>
//! "#);
//!
//! let button = dom.element(dom.find_by_tag("button").unwrap()).unwrap();
//! let card = button.closest_selector(&Selector::parse(".card").unwrap()).unwrap();
//!
//! assert!(card.has_class("featured"));
//! assert_eq!(card.parent().unwrap().children().len(), 2);
//! assert!(card.next_sibling().next_sibling().is_none());
//! ```
//!
//! ## Live views and snapshots
//!
//! [`ElementRef::children`] returns a view that reads the tree each time it
//! is used. [`Children::to_list`](nav::Children::to_list) takes a snapshot
//! that stays fixed when the tree changes afterwards. See [`nav`] for the
//! details.

pub mod dom;
pub mod error;
pub mod nav;
pub mod select;

pub use dom::{ArenaDom, ArenaNodeId, parse_html};
pub use error::{Error, Result};
pub use nav::{ElementRef, Navigate, Path, Step};
pub use select::Selector;
