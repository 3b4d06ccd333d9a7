//! Selectors.
//!
//! A [`Selector`] describes how to find elements. Its `Display` form is the
//! familiar `css:has-text("...")` / `>>` notation and doubles as the lookup
//! key for the in-memory driver. `to_all_query` renders the JavaScript the
//! CDP driver evaluates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector
    Css(String),
    /// Deepest elements whose text contains the string
    Text(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// CSS selector
        css: String,
        /// Text to contain
        text: String,
    },
    /// Elements matching `child` inside elements matching `parent`
    Descendant {
        /// Outer selector
        parent: Box<Selector>,
        /// Inner CSS selector
        child: String,
    },
    /// The n-th match of a selector (negative counts from the end)
    Nth {
        /// Base selector
        base: Box<Selector>,
        /// Index
        index: i32,
    },
    /// Matches of either selector, in document order
    Or(Box<Selector>, Box<Selector>),
    /// Next element sibling of each match
    NextSibling(Box<Selector>),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Narrow to `child` elements inside this selector's matches
    #[must_use]
    pub fn descendant(self, child: impl Into<String>) -> Self {
        Self::Descendant {
            parent: Box::new(self),
            child: child.into(),
        }
    }

    /// The first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// The last match
    #[must_use]
    pub fn last(self) -> Self {
        self.nth(-1)
    }

    /// The n-th match
    #[must_use]
    pub fn nth(self, index: i32) -> Self {
        Self::Nth {
            base: Box::new(self),
            index,
        }
    }

    /// The element right after each match
    #[must_use]
    pub fn next_sibling(self) -> Self {
        Self::NextSibling(Box::new(self))
    }

    /// Either this selector or `other`
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// JavaScript expression evaluating to an array of all matching elements
    #[must_use]
    pub fn to_all_query(&self) -> String {
        match self {
            Self::Css(css) => format!("Array.from(document.querySelectorAll({}))", js_str(css)),
            Self::Text(text) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(e => \
                 (e.textContent || '').includes({t}) && \
                 !Array.from(e.children).some(c => (c.textContent || '').includes({t})))",
                t = js_str(text)
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(e => (e.textContent || '').includes({}))",
                js_str(css),
                js_str(text)
            ),
            Self::Descendant { parent, child } => format!(
                "({}).flatMap(p => Array.from(p.querySelectorAll({})))",
                parent.to_all_query(),
                js_str(child)
            ),
            Self::Nth { base, index } => format!(
                "(a => {{ const e = a.at({index}); return e ? [e] : []; }})({})",
                base.to_all_query()
            ),
            Self::Or(a, b) => format!(
                "(s => Array.from(document.querySelectorAll('*')).filter(e => s.has(e)))\
                 (new Set([...({}), ...({})]))",
                a.to_all_query(),
                b.to_all_query()
            ),
            Self::NextSibling(base) => format!(
                "({}).map(e => e.nextElementSibling).filter(Boolean)",
                base.to_all_query()
            ),
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("(({})[0] || null)", self.to_all_query())
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_all_query())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::Text(text) => write!(f, "text={text}"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text(\"{text}\")"),
            Self::Descendant { parent, child } => write!(f, "{parent} >> {child}"),
            Self::Nth { base, index } => write!(f, "{base} >> nth={index}"),
            Self::Or(a, b) => write!(f, "{a} || {b}"),
            Self::NextSibling(base) => write!(f, "{base} + *"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::css(css)
    }
}

/// How a dropdown option is chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectBy {
    /// Visible option label
    Label(String),
    /// Option `value` attribute
    Value(String),
}

impl SelectBy {
    /// The label or value being matched
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Label(s) | Self::Value(s) => s,
        }
    }
}

impl fmt::Display for SelectBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "label '{label}'"),
            Self::Value(value) => write!(f, "value '{value}'"),
        }
    }
}

// serde_json escapes quotes, backslashes and control characters the way JS expects.
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}
