//! Session - the browser automation seam.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageObject<S: Session, T: PageElement>                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │        │                                                     │
//! │        ▼                                                     │
//! │  Session (trait)                                             │
//! │  ┌────────────────────┐        ┌──────────────────────────┐  │
//! │  │  CdpSession        │        │  MockSession             │  │
//! │  │  chromiumoxide     │        │  in-memory document      │  │
//! │  │  (feature browser) │        │  (unit tests)            │  │
//! │  └────────────────────┘        └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods take `&self`: a session is a shared handle to one browser tab and
//! is driven from a single thread at a time.

use serde::{Deserialize, Serialize};

use crate::dialog::Dialog;
use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};

/// Opaque handle to an element in the current document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// Session-specific element id
    pub id: String,
    /// Tag name, lowercase
    pub tag_name: String,
}

impl ElementRef {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into().to_ascii_lowercase(),
        }
    }
}

/// WebDriver special keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Backspace
    Backspace,
    /// Tab
    Tab,
    /// Enter
    Enter,
    /// Escape
    Escape,
    /// Space
    Space,
    /// Arrow up
    ArrowUp,
    /// Arrow down
    ArrowDown,
}

impl Key {
    /// Unicode private-use code point WebDriver uses for this key
    #[must_use]
    pub const fn code(&self) -> char {
        match self {
            Self::Backspace => '\u{E003}',
            Self::Tab => '\u{E004}',
            Self::Enter => '\u{E007}',
            Self::Escape => '\u{E00C}',
            Self::Space => '\u{E00D}',
            Self::ArrowUp => '\u{E013}',
            Self::ArrowDown => '\u{E015}',
        }
    }

    /// DOM `KeyboardEvent.key` name
    #[must_use]
    pub const fn dom_name(&self) -> &'static str {
        match self {
            Self::Backspace => "Backspace",
            Self::Tab => "Tab",
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::Space => " ",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
        }
    }

    /// Map a code point back to a key
    #[must_use]
    pub fn from_code(c: char) -> Option<Self> {
        [
            Self::Backspace,
            Self::Tab,
            Self::Enter,
            Self::Escape,
            Self::Space,
            Self::ArrowUp,
            Self::ArrowDown,
        ]
        .into_iter()
        .find(|k| k.code() == c)
    }

    /// The key as a string for [`Session::send_keys`]
    #[must_use]
    pub fn as_keys(&self) -> String {
        self.code().to_string()
    }
}

/// Browser automation primitives consumed by the page object adapter.
///
/// Element queries return [`DriverError::StaleElement`] once a handle is
/// detached from the document; lookups return
/// [`DriverError::NoSuchElement`] when nothing matches.
pub trait Session {
    /// All elements matching the locator, in document order
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>>;

    /// First element matching the locator
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        self.find_elements(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement {
                locator: locator.to_string(),
            })
    }

    /// Whether the element is rendered
    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Whether the element accepts interaction
    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Checked state of a checkbox/radio, or selected state of an option
    fn is_selected(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Visible text (input value for form fields)
    fn text(&self, element: &ElementRef) -> DriverResult<String>;

    /// Tag name, lowercase
    fn tag_name(&self, element: &ElementRef) -> DriverResult<String> {
        Ok(element.tag_name.clone())
    }

    /// Click the element
    fn click(&self, element: &ElementRef) -> DriverResult<()>;

    /// Clear the content of an editable element
    fn clear(&self, element: &ElementRef) -> DriverResult<()>;

    /// Type text; [`Key`] code points are sent as key presses
    fn send_keys(&self, element: &ElementRef, keys: &str) -> DriverResult<()>;

    /// Option elements of a select element
    fn options(&self, select: &ElementRef) -> DriverResult<Vec<ElementRef>>;

    /// Make `option` the selected option of its select element
    fn select_option(&self, option: &ElementRef) -> DriverResult<()>;

    /// The currently open dialog, or [`DriverError::NoAlertOpen`]
    fn active_dialog(&self) -> DriverResult<Dialog>;

    /// Accept the open dialog
    fn accept_dialog(&self) -> DriverResult<()>;

    /// Dismiss the open dialog
    fn dismiss_dialog(&self) -> DriverResult<()>;

    /// Navigate the tab to `url`
    fn navigate(&self, url: &str) -> DriverResult<()>;

    /// URL of the current document
    fn current_url(&self) -> DriverResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ref_lowercases_tag() {
        let element = ElementRef::new("e-1", "SELECT");
        assert_eq!(element.id, "e-1");
        assert_eq!(element.tag_name, "select");
    }

    #[test]
    fn test_tab_code_point() {
        assert_eq!(Key::Tab.code(), '\u{E004}');
        assert_eq!(Key::Tab.as_keys(), "\u{E004}");
        assert_eq!(Key::Tab.dom_name(), "Tab");
    }

    #[test]
    fn test_key_round_trip_through_code() {
        for key in [Key::Backspace, Key::Tab, Key::Enter, Key::Escape, Key::ArrowDown] {
            assert_eq!(Key::from_code(key.code()), Some(key));
        }
        assert_eq!(Key::from_code('a'), None);
    }
}
