//! The page interaction adapter.
//!
//! A [`PageObject`] borrows a [`Session`] and resolves element descriptors
//! into live elements through an explicit "clickable" wait before every
//! interaction. Test-level page types wrap one and expose domain actions:
//!
//! ```
//! use pageobject::{By, LocatorTemplate, MockElement, MockSession, Locator, PageConfig, PageElement, PageObject};
//!
//! enum Login {
//!     User,
//!     Submit,
//! }
//!
//! impl PageElement for Login {
//!     fn template(&self) -> LocatorTemplate {
//!         match self {
//!             Self::User => LocatorTemplate::new(By::Id, "user"),
//!             Self::Submit => LocatorTemplate::new(By::Css, "button[type=submit]"),
//!         }
//!     }
//! }
//!
//! let session = MockSession::new();
//! session.add_element(MockElement::input(Locator::id("user")).with_text("previous"));
//! session.add_element(MockElement::new(Locator::css("button[type=submit]"), "button"));
//!
//! let page = PageObject::new(&session, PageConfig::default());
//! page.send_keys(&Login::User, "alice", &[]).unwrap();
//! page.click(&Login::Submit, &[]).unwrap();
//!
//! assert_eq!(session.text_of(&Locator::id("user")).unwrap(), "alice");
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::config::PageConfig;
use crate::dialog::Dialog;
use crate::element::{DropDownValue, PageElement, PlaceholdersProvider};
use crate::locator::Locator;
use crate::result::{PageError, PageResult};
use crate::session::{ElementRef, Key, Session};
use crate::wait::{conditions, Wait};

/// Page interaction adapter over a session for descriptors of type `T`
pub struct PageObject<'s, S: Session, T: PageElement> {
    session: &'s S,
    config: PageConfig,
    _element: PhantomData<fn(&T)>,
}

impl<S: Session, T: PageElement> fmt::Debug for PageObject<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageObject")
            .field("element", &std::any::type_name::<T>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'s, S: Session, T: PageElement> PageObject<'s, S, T> {
    /// Create an adapter over `session`
    #[must_use]
    pub const fn new(session: &'s S, config: PageConfig) -> Self {
        Self {
            session,
            config,
            _element: PhantomData,
        }
    }

    /// Underlying session
    #[must_use]
    pub const fn session(&self) -> &'s S {
        self.session
    }

    /// Configuration
    #[must_use]
    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    fn element_wait(&self) -> Wait<'s, S> {
        Wait::new(self.session, self.config.default_timeout())
            .with_poll_interval(self.config.poll_interval())
    }

    fn alert_wait(&self) -> Wait<'s, S> {
        Wait::new(self.session, self.config.alert_timeout())
            .with_poll_interval(self.config.poll_interval().min(self.config.alert_timeout()))
    }

    fn clickable(&self, locator: &Locator) -> PageResult<ElementRef> {
        self.element_wait().until(
            &format!("element located by {locator} to be clickable"),
            |s| conditions::element_to_be_clickable(s, locator),
        )
    }

    /// Wait until the element is clickable and return its handle
    pub fn resolve(&self, element: &T, placeholders: &[&str]) -> PageResult<ElementRef> {
        let locator = element.locator(placeholders)?;
        self.clickable(&locator)
    }

    /// Click the element
    pub fn click(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        let handle = self.resolve(element, placeholders)?;
        tracing::debug!(element = %element.name(), id = %handle.id, "click");
        self.session.click(&handle)?;
        Ok(())
    }

    /// Click the element, then wait until the clicked element goes stale
    pub fn click_and_wait_for_page_to_load(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        let locator = element.locator(placeholders)?;
        let handle = self.clickable(&locator)?;
        tracing::debug!(element = %element.name(), %locator, "click and wait for page load");
        self.session.click(&handle)?;
        self.element_wait().until(
            &format!("element located by {locator} to go stale"),
            |s| conditions::staleness_of(s, &handle),
        )
    }

    /// Clear the element, then type `text`
    pub fn send_keys(&self, element: &T, text: &str, placeholders: &[&str]) -> PageResult<()> {
        let handle = self.resolve(element, placeholders)?;
        tracing::debug!(element = %element.name(), chars = text.chars().count(), "send keys");
        self.session.clear(&handle)?;
        self.session.send_keys(&handle, text)?;
        Ok(())
    }

    /// Press the Tab key in the element
    pub fn press_tab_key(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        let handle = self.resolve(element, placeholders)?;
        tracing::debug!(element = %element.name(), "press tab");
        self.session.send_keys(&handle, &Key::Tab.as_keys())?;
        Ok(())
    }

    /// Clear the element
    pub fn clear(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        let handle = self.resolve(element, placeholders)?;
        self.session.clear(&handle)?;
        Ok(())
    }

    /// Ensure the checkbox is checked
    pub fn tick_checkbox(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        self.adjust_checkbox(element, true, placeholders)
    }

    /// Ensure the checkbox is unchecked
    pub fn untick_checkbox(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        self.adjust_checkbox(element, false, placeholders)
    }

    fn adjust_checkbox(&self, element: &T, checked: bool, placeholders: &[&str]) -> PageResult<()> {
        let handle = self.resolve(element, placeholders)?;
        if self.session.is_selected(&handle)? != checked {
            tracing::debug!(element = %element.name(), checked, "toggle checkbox");
            self.session.click(&handle)?;
        }
        Ok(())
    }

    /// Select the dropdown option whose text equals `value`
    pub fn set_selected_option<V>(&self, element: &T, value: &V, placeholders: &[&str]) -> PageResult<()>
    where
        V: DropDownValue + ?Sized,
    {
        self.select_by_visible_text(element, value.value(), placeholders)
    }

    /// Select the dropdown option whose text is exactly `text`
    pub fn select_by_visible_text(&self, element: &T, text: &str, placeholders: &[&str]) -> PageResult<()> {
        let select = SelectElement::new(self.session, self.resolve(element, placeholders)?)?;
        tracing::debug!(element = %element.name(), option = text, "select option");
        select.select_by_visible_text(text)
    }

    /// Text of the selected dropdown option
    pub fn get_selected_option(&self, element: &T, placeholders: &[&str]) -> PageResult<String> {
        let locator = element.locator(placeholders)?;
        let select = SelectElement::new(self.session, self.clickable(&locator)?)?;
        match select.first_selected_option()? {
            Some(option) => Ok(self.session.text(&option)?),
            None => Err(PageError::NoOptionSelected {
                locator: locator.to_string(),
            }),
        }
    }

    /// Visible text of the element
    pub fn get_text(&self, element: &T, placeholders: &[&str]) -> PageResult<String> {
        let handle = self.resolve(element, placeholders)?;
        Ok(self.session.text(&handle)?)
    }

    /// Wait until the element is present and displayed
    pub fn wait_for_element_to_be_visible(&self, element: &T, placeholders: &[&str]) -> PageResult<ElementRef> {
        let locator = element.locator(placeholders)?;
        self.element_wait().until(
            &format!("element located by {locator} to be visible"),
            |s| conditions::visibility_of_element_located(s, &locator),
        )
    }

    /// Wait until the element is absent or hidden
    pub fn wait_for_element_to_be_not_visible(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        let locator = element.locator(placeholders)?;
        self.element_wait().until(
            &format!("element located by {locator} to be invisible"),
            |s| conditions::invisibility_of_element_located(s, &locator),
        )
    }

    /// Whether the resolved element is enabled
    pub fn is_enabled(&self, element: &T, placeholders: &[&str]) -> PageResult<bool> {
        let handle = self.resolve(element, placeholders)?;
        Ok(self.session.is_enabled(&handle)?)
    }

    /// Whether the resolved element is displayed
    pub fn is_visible(&self, element: &T, placeholders: &[&str]) -> PageResult<bool> {
        let handle = self.resolve(element, placeholders)?;
        Ok(self.session.is_displayed(&handle)?)
    }

    /// Assert the element becomes clickable within the default timeout
    pub fn should_have(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        self.resolve(element, placeholders).map(|_| ())
    }

    /// [`should_have`](Self::should_have) with placeholders from a provider
    pub fn should_have_with<P>(&self, element: &T, provider: &P) -> PageResult<()>
    where
        P: PlaceholdersProvider + ?Sized,
    {
        let owned = provider.placeholders();
        let placeholders: Vec<&str> = owned.iter().map(String::as_str).collect();
        self.should_have(element, &placeholders)
    }

    /// Assert the element is enabled.
    ///
    /// The element still has to pass the clickable wait first, so a disabled
    /// element usually surfaces as a timeout; a control that is re-disabled
    /// between resolution and the check is reported as
    /// [`PageError::ElementDisabled`].
    pub fn should_have_enabled(&self, element: &T, placeholders: &[&str]) -> PageResult<()> {
        let locator = element.locator(placeholders)?;
        let handle = self.clickable(&locator)?;
        if self.session.is_enabled(&handle)? {
            Ok(())
        } else {
            Err(PageError::ElementDisabled {
                strategy: locator.by().to_string(),
                expression: locator.expression().to_string(),
            })
        }
    }

    /// The open alert, or `None` when none shows up within the alert timeout
    pub fn wait_get_alert(&self) -> PageResult<Option<Dialog>> {
        match self
            .alert_wait()
            .until("alert to be present", conditions::alert_is_present)
        {
            Ok(dialog) => Ok(Some(dialog)),
            Err(err) if err.is_timeout() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Accept the open alert if its message is `expected`
    pub fn close_alert(&self, expected: &str) -> PageResult<()> {
        match self.wait_get_alert()? {
            Some(dialog) if dialog.message() == expected => {
                tracing::debug!(message = expected, "accept alert");
                self.session.accept_dialog()?;
                Ok(())
            }
            Some(dialog) => Err(PageError::AlertMismatch {
                expected: expected.to_string(),
                actual: dialog.message().to_string(),
            }),
            None => Err(PageError::AlertMissing {
                expected: expected.to_string(),
            }),
        }
    }

    /// Fail if an alert shows up within the alert timeout
    pub fn assert_no_alert(&self) -> PageResult<()> {
        match self.wait_get_alert()? {
            Some(dialog) => Err(PageError::UnexpectedAlert {
                message: dialog.message().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Navigate to `path` relative to the configured base URL
    pub fn open(&self, path: &str) -> PageResult<()> {
        let url = self.config.url_for(path);
        tracing::debug!(%url, "open");
        self.session.navigate(&url)?;
        Ok(())
    }
}

/// `<select>` helper over a resolved element
struct SelectElement<'s, S: Session> {
    session: &'s S,
    element: ElementRef,
}

impl<'s, S: Session> SelectElement<'s, S> {
    fn new(session: &'s S, element: ElementRef) -> PageResult<Self> {
        let tag = session.tag_name(&element)?;
        if tag.eq_ignore_ascii_case("select") {
            Ok(Self { session, element })
        } else {
            Err(PageError::UnexpectedTag {
                expected: "select".to_string(),
                actual: tag,
            })
        }
    }

    fn options(&self) -> PageResult<Vec<(ElementRef, String)>> {
        let mut options = Vec::new();
        for option in self.session.options(&self.element)? {
            let text = self.session.text(&option)?;
            options.push((option, text));
        }
        Ok(options)
    }

    fn select_by_visible_text(&self, text: &str) -> PageResult<()> {
        let options = self.options()?;
        match options.iter().find(|(_, option_text)| option_text == text) {
            Some((option, _)) => {
                self.session.select_option(option)?;
                Ok(())
            }
            None => Err(PageError::InvalidSelection {
                requested: text.to_string(),
                available: options.into_iter().map(|(_, t)| t).collect(),
            }),
        }
    }

    fn first_selected_option(&self) -> PageResult<Option<ElementRef>> {
        for option in self.session.options(&self.element)? {
            if self.session.is_selected(&option)? {
                return Ok(Some(option));
            }
        }
        Ok(None)
    }
}
