//! Capability traits consumed by [`PageObject`](crate::PageObject).
//!
//! Test code describes the controls of a page with a type implementing
//! [`PageElement`], usually an enum with one variant per control:
//!
//! ```
//! use pageobject::{By, LocatorTemplate, PageElement};
//!
//! #[derive(Debug)]
//! enum SearchPage {
//!     Query,
//!     ResultRow,
//! }
//!
//! impl PageElement for SearchPage {
//!     fn template(&self) -> LocatorTemplate {
//!         match self {
//!             Self::Query => LocatorTemplate::new(By::Name, "q"),
//!             Self::ResultRow => LocatorTemplate::new(By::Css, "#results li:nth-child({0})"),
//!         }
//!     }
//! }
//!
//! let row = SearchPage::ResultRow.locator(&["2"]).unwrap();
//! assert_eq!(row.expression(), "#results li:nth-child(2)");
//! ```

use crate::locator::{By, Locator, LocatorTemplate};
use crate::result::PageResult;

/// Element descriptor: a logical UI control that can resolve itself into a
/// [`Locator`] given positional placeholders.
pub trait PageElement {
    /// Locator template of this control
    fn template(&self) -> LocatorTemplate;

    /// Materialise the locator for the given placeholders
    fn locator(&self, placeholders: &[&str]) -> PageResult<Locator> {
        self.template().materialize(placeholders)
    }

    /// Locator strategy
    fn strategy(&self) -> By {
        self.template().by()
    }

    /// Raw (unmaterialised) locator expression
    fn expression(&self) -> String {
        self.template().template().to_string()
    }

    /// Name used in log output
    fn name(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

impl PageElement for LocatorTemplate {
    fn template(&self) -> LocatorTemplate {
        self.clone()
    }
}

impl PageElement for Locator {
    fn template(&self) -> LocatorTemplate {
        self.clone().into()
    }

    // already concrete; braces in the expression are literal
    fn locator(&self, _placeholders: &[&str]) -> PageResult<Locator> {
        Ok(self.clone())
    }
}

/// A value selectable in a dropdown by its display text
pub trait DropDownValue {
    /// Visible option text
    fn value(&self) -> &str;
}

impl DropDownValue for str {
    fn value(&self) -> &str {
        self
    }
}

impl DropDownValue for String {
    fn value(&self) -> &str {
        self
    }
}

/// Supplies the ordered placeholders for a locator template
pub trait PlaceholdersProvider {
    /// Placeholders in positional order
    fn placeholders(&self) -> Vec<String>;
}

impl PlaceholdersProvider for Vec<String> {
    fn placeholders(&self) -> Vec<String> {
        self.clone()
    }
}

impl<const N: usize> PlaceholdersProvider for [String; N] {
    fn placeholders(&self) -> Vec<String> {
        self.to_vec()
    }
}

impl PlaceholdersProvider for [&str] {
    fn placeholders(&self) -> Vec<String> {
        self.iter().map(|s| (*s).to_string()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum OrderPage {
        Customer,
        Cell,
    }

    impl PageElement for OrderPage {
        fn template(&self) -> LocatorTemplate {
            match self {
                Self::Customer => LocatorTemplate::new(By::Id, "customer"),
                Self::Cell => LocatorTemplate::new(By::XPath, "//tr[{0}]/td[{1}]"),
            }
        }
    }

    #[derive(Debug)]
    enum Colour {
        Green,
    }

    impl DropDownValue for Colour {
        fn value(&self) -> &str {
            match self {
                Self::Green => "Green",
            }
        }
    }

    #[test]
    fn test_descriptor_resolves_locator() {
        let cell = OrderPage::Cell.locator(&["2", "5"]).unwrap();
        assert_eq!(cell, Locator::xpath("//tr[2]/td[5]"));
        assert_eq!(OrderPage::Customer.locator(&[]).unwrap(), Locator::id("customer"));
    }

    #[test]
    fn test_descriptor_strategy_and_expression() {
        assert_eq!(OrderPage::Cell.strategy(), By::XPath);
        assert_eq!(OrderPage::Cell.expression(), "//tr[{0}]/td[{1}]");
    }

    #[test]
    fn test_descriptor_name() {
        assert_eq!(OrderPage::Customer.name(), "OrderPage");
    }

    #[test]
    fn test_locator_is_a_descriptor() {
        let locator = Locator::css("button.save");
        assert_eq!(locator.locator(&[]).unwrap(), locator);

        let braces = Locator::xpath("//td[text()='{0}']");
        assert_eq!(braces.locator(&[]).unwrap(), braces);
    }

    #[test]
    fn test_dropdown_values() {
        assert_eq!(Colour::Green.value(), "Green");
        assert_eq!("Red".value(), "Red");
        assert_eq!(String::from("Blue").value(), "Blue");
    }

    #[test]
    fn test_placeholder_providers() {
        let owned = vec!["1".to_string(), "2".to_string()];
        assert_eq!(owned.placeholders(), vec!["1", "2"]);

        let array = ["a".to_string()];
        assert_eq!(array.placeholders(), vec!["a"]);

        let borrowed: &[&str] = &["x", "y", "z"];
        assert_eq!(borrowed.placeholders(), vec!["x", "y", "z"]);
    }
}
