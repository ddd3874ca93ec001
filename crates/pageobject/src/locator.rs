//! Locators and locator templates.
//!
//! A [`Locator`] is a strategy + expression pair that identifies an element in
//! the current document. A [`LocatorTemplate`] is the same pair with positional
//! `{N}` placeholders in the expression, materialised at call time:
//!
//! ```
//! use pageobject::{By, LocatorTemplate};
//!
//! let cell = LocatorTemplate::new(By::Css, "table#orders tr:nth-child({0}) td:nth-child({1})");
//! let locator = cell.materialize(&["3", "2"]).unwrap();
//! assert_eq!(locator.expression(), "table#orders tr:nth-child(3) td:nth-child(2)");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::result::{PageError, PageResult};

/// Locator strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum By {
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// Single class name
    ClassName,
    /// Tag name
    TagName,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Exact anchor text
    LinkText,
    /// Anchor text substring
    PartialLinkText,
}

impl By {
    /// WebDriver name of the strategy
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::ClassName => "class name",
            Self::TagName => "tag name",
            Self::Css => "css selector",
            Self::XPath => "xpath",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
        }
    }
}

impl std::fmt::Display for By {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    by: By,
    expression: String,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(by: By, expression: impl Into<String>) -> Self {
        Self {
            by,
            expression: expression.into(),
        }
    }

    /// Locate by `id`
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(By::Id, id)
    }

    /// Locate by `name`
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(By::Name, name)
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(By::Css, selector)
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(By::XPath, xpath)
    }

    /// Strategy
    #[must_use]
    pub const fn by(&self) -> By {
        self.by
    }

    /// Expression
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Equivalent CSS selector, when the strategy has one.
    ///
    /// XPath and link text locators return `None`.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self.by {
            By::Css | By::TagName => Some(self.expression.clone()),
            By::Id => Some(format!("[id={:?}]", self.expression)),
            By::Name => Some(format!("[name={:?}]", self.expression)),
            By::ClassName => Some(format!(".{}", self.expression)),
            By::XPath | By::LinkText | By::PartialLinkText => None,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = '{}'", self.by, self.expression)
    }
}

/// A locator whose expression may contain positional `{N}` placeholders.
///
/// `{{` and `}}` produce literal braces. Surplus placeholders are ignored; a
/// referenced index that was not supplied is an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorTemplate {
    by: By,
    template: String,
}

#[allow(clippy::expect_used)]
fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{(\d+)\}").expect("placeholder pattern is a valid regex")
    })
}

impl LocatorTemplate {
    /// Create a template
    #[must_use]
    pub fn new(by: By, template: impl Into<String>) -> Self {
        Self {
            by,
            template: template.into(),
        }
    }

    /// Strategy
    #[must_use]
    pub const fn by(&self) -> By {
        self.by
    }

    /// Raw template text
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Highest placeholder index referenced plus one
    #[must_use]
    pub fn arity(&self) -> usize {
        placeholder_pattern()
            .captures_iter(&self.template)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().parse::<usize>().ok())
            .map(|i| i + 1)
            .max()
            .unwrap_or(0)
    }

    /// Substitute placeholders and produce a concrete [`Locator`]
    pub fn materialize(&self, placeholders: &[&str]) -> PageResult<Locator> {
        let mut expression = String::with_capacity(self.template.len());
        let mut last = 0;

        for caps in placeholder_pattern().captures_iter(&self.template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            expression.push_str(&self.template[last..whole.start()]);
            last = whole.end();

            match caps.get(1) {
                Some(index) => {
                    let index = index
                        .as_str()
                        .parse::<usize>()
                        .map_err(|_| self.missing(usize::MAX, placeholders.len()))?;
                    let value = placeholders
                        .get(index)
                        .ok_or_else(|| self.missing(index, placeholders.len()))?;
                    expression.push_str(value);
                }
                None => expression.push_str(&whole.as_str()[..1]),
            }
        }
        expression.push_str(&self.template[last..]);

        Ok(Locator::new(self.by, expression))
    }

    fn missing(&self, index: usize, supplied: usize) -> PageError {
        PageError::MissingPlaceholder {
            template: self.template.clone(),
            index,
            supplied,
        }
    }
}

impl From<Locator> for LocatorTemplate {
    fn from(locator: Locator) -> Self {
        Self {
            by: locator.by,
            template: locator.expression,
        }
    }
}
