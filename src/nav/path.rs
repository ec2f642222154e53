//! Navigation paths: a chain of steps written as text.
//!
//! `parent/next/closest(.card)` means "go to the parent, then its next
//! sibling, then the nearest `.card` at or above that". Applying a path stops
//! at the first step that finds nothing.

use std::fmt;
use std::str::FromStr;

use super::ElementRef;
use crate::error::{Error, Result};
use crate::select::Selector;

/// One navigation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Parent,
    FirstChild,
    LastChild,
    NextSibling,
    PreviousSibling,
    Closest(Selector),
}

impl Step {
    pub fn apply<'a>(&self, from: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Step::Parent => from.parent(),
            Step::FirstChild => from.first_child(),
            Step::LastChild => from.last_child(),
            Step::NextSibling => from.next_sibling(),
            Step::PreviousSibling => from.previous_sibling(),
            Step::Closest(selector) => from.closest_selector(selector),
        }
    }
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "parent" => return Ok(Step::Parent),
            "first" => return Ok(Step::FirstChild),
            "last" => return Ok(Step::LastChild),
            "next" => return Ok(Step::NextSibling),
            "prev" => return Ok(Step::PreviousSibling),
            _ => {}
        }

        if let Some(inner) = s
            .strip_prefix("closest(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Selector::parse(inner).map(Step::Closest);
        }

        Err(Error::InvalidPath(format!("unknown step `{s}`")))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Parent => f.write_str("parent"),
            Step::FirstChild => f.write_str("first"),
            Step::LastChild => f.write_str("last"),
            Step::NextSibling => f.write_str("next"),
            Step::PreviousSibling => f.write_str("prev"),
            Step::Closest(selector) => write!(f, "closest({selector})"),
        }
    }
}

/// A sequence of [`Step`]s applied left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Parse `/`-separated steps: `parent`, `first`, `last`, `next`, `prev`
    /// and `closest(<selector>)`.
    ///
    /// Selectors may themselves contain `/` only inside the parentheses of a
    /// `closest` step, e.g. `closest([href="a/b"])`.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::InvalidPath("empty path".to_string()));
        }
        split_steps(text)?
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk the path from `start`; `None` as soon as a step finds nothing.
    pub fn apply<'a>(&self, start: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.steps
            .iter()
            .try_fold(start, |current, step| step.apply(current))
    }

    /// Like [`apply`](Self::apply), starting from a possibly missing element.
    pub fn apply_opt<'a>(&self, start: Option<ElementRef<'a>>) -> Option<ElementRef<'a>> {
        start.and_then(|el| self.apply(el))
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Split on `/` outside parentheses and quoted strings.
fn split_steps(text: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut quote = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::InvalidPath(format!("unbalanced `)` in `{text}`")))?;
            }
            '/' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(Error::InvalidPath(format!("unterminated string in `{text}`")));
    }
    if depth != 0 {
        return Err(Error::InvalidPath(format!("unbalanced `(` in `{text}`")));
    }
    parts.push(&text[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(Error::InvalidPath(format!("empty step in `{text}`")));
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const TASKS: &str = r#"<ul class="tasks" id="tasks">
        <li class="task" id="t1"><span id="label">one</span></li>
        <li class="task" id="t2">two</li>
        <li class="task" id="t3">three</li>
    </ul>"#;

    #[test]
    fn test_parse_simple_steps() {
        let path = Path::parse("parent / next/first/last/prev").unwrap();
        assert_eq!(
            path.steps(),
            &[
                Step::Parent,
                Step::NextSibling,
                Step::FirstChild,
                Step::LastChild,
                Step::PreviousSibling,
            ]
        );
        assert_eq!(path.to_string(), "parent/next/first/last/prev");
    }

    #[test]
    fn test_parse_closest_with_slash_in_selector() {
        let path = Path::parse(r#"closest([href="a/b"])/parent"#).unwrap();
        assert_eq!(path.steps().len(), 2);
        assert!(matches!(path.steps()[0], Step::Closest(_)));
        assert_eq!(path.steps()[1], Step::Parent);
    }

    #[test]
    fn test_parens_and_slashes_inside_quotes() {
        let path = Path::parse(r#"closest([title=")"])/next"#).unwrap();
        assert_eq!(path.steps().len(), 2);
        assert_eq!(path.to_string(), r#"closest([title=")"])/next"#);

        let path = Path::parse(r#"closest([data-x='a/(b'])"#).unwrap();
        assert_eq!(path.steps().len(), 1);

        let path = Path::parse(r#"closest([title="say \"/\""])"#).unwrap();
        assert_eq!(path.steps().len(), 1);

        assert!(matches!(
            Path::parse(r#"closest([title=")])"#),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Path::parse(""), Err(Error::InvalidPath(_))));
        assert!(matches!(Path::parse("parent//next"), Err(Error::InvalidPath(_))));
        assert!(matches!(Path::parse("sideways"), Err(Error::InvalidPath(_))));
        assert!(matches!(Path::parse("closest(.a"), Err(Error::InvalidPath(_))));
        assert!(matches!(
            Path::parse("closest(..bad)"),
            Err(Error::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_apply_chained_siblings() {
        let dom = parse_html(TASKS);
        let first = dom.element(dom.get_by_id("t1").unwrap()).unwrap();

        let third = Path::parse("next/next").unwrap().apply(first).unwrap();
        assert_eq!(third.element_id(), Some("t3"));

        assert_eq!(Path::parse("next/next/next").unwrap().apply(first), None);
        assert_eq!(Path::parse("next/next/next/parent").unwrap().apply(first), None);
    }

    #[test]
    fn test_apply_closest_step() {
        let dom = parse_html(TASKS);
        let label = dom.element(dom.get_by_id("label").unwrap()).unwrap();

        let next_task = Path::parse("closest(.task)/next").unwrap().apply(label).unwrap();
        assert_eq!(next_task.element_id(), Some("t2"));

        let list = Path::parse("closest(ul.tasks)").unwrap().apply(label).unwrap();
        assert_eq!(list.element_id(), Some("tasks"));
    }

    #[test]
    fn test_empty_path_is_identity() {
        let dom = parse_html(TASKS);
        let first = dom.element(dom.get_by_id("t1").unwrap()).unwrap();
        assert_eq!(Path::default().apply(first), Some(first));
        assert_eq!(Path::default().apply_opt(None), None);
    }
}
