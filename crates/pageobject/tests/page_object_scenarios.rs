//! End-to-end scenarios for the page object adapter
//!
//! Page types are written the way test suites use the library: a descriptor
//! enum, a struct wrapping `PageObject`, and domain actions on top.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::Cell;
use std::time::Duration;

use pageobject::{
    By, Dialog, DriverResult, ElementRef, Locator, LocatorTemplate, MockElement, MockSession,
    PageConfig, PageElement, PageError, PageObject, PageResult, Session,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Registration {
    FullName,
    Country,
    Newsletter,
    Submit,
    Spinner,
    ErrorRow,
}

impl PageElement for Registration {
    fn template(&self) -> LocatorTemplate {
        match self {
            Self::FullName => LocatorTemplate::new(By::Id, "full-name"),
            Self::Country => LocatorTemplate::new(By::Name, "country"),
            Self::Newsletter => LocatorTemplate::new(By::Css, "input[name=newsletter]"),
            Self::Submit => LocatorTemplate::new(By::Css, "form#register button[type=submit]"),
            Self::Spinner => LocatorTemplate::new(By::ClassName, "spinner"),
            Self::ErrorRow => LocatorTemplate::new(By::XPath, "//ul[@id='errors']/li[{0}]"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Country {
    Norway,
    Chile,
}

impl pageobject::DropDownValue for Country {
    fn value(&self) -> &str {
        match self {
            Self::Norway => "Norway",
            Self::Chile => "Chile",
        }
    }
}

/// Registration page built on the adapter
struct RegistrationPage<'s, S: Session> {
    page: PageObject<'s, S, Registration>,
}

impl<'s, S: Session> RegistrationPage<'s, S> {
    fn new(session: &'s S) -> Self {
        Self {
            page: PageObject::new(session, fast_config()),
        }
    }

    fn register(&self, name: &str, country: Country, newsletter: bool) -> PageResult<()> {
        self.page.send_keys(&Registration::FullName, name, &[])?;
        self.page.press_tab_key(&Registration::FullName, &[])?;
        self.page.set_selected_option(&Registration::Country, &country, &[])?;
        if newsletter {
            self.page.tick_checkbox(&Registration::Newsletter, &[])?;
        } else {
            self.page.untick_checkbox(&Registration::Newsletter, &[])?;
        }
        self.page.click(&Registration::Submit, &[])?;
        self.page.wait_for_element_to_be_not_visible(&Registration::Spinner, &[])
    }
}

fn fast_config() -> PageConfig {
    PageConfig::default()
        .with_default_timeout(300)
        .with_alert_timeout(60)
        .with_poll_interval(5)
}

fn registration_form(session: &MockSession) {
    session.add_element(MockElement::input(Locator::id("full-name")).with_text("placeholder"));
    session.add_element(MockElement::select(
        Locator::name("country"),
        &["Norway", "Chile", "Japan"],
    ));
    session.add_element(MockElement::checkbox(Locator::css("input[name=newsletter]"), false));
    session.add_element(MockElement::new(
        Locator::css("form#register button[type=submit]"),
        "button",
    ));
    session.add_element(
        MockElement::new(Locator::new(By::ClassName, "spinner"), "div")
            .hides_after(Duration::from_millis(30)),
    );
}

// ============================================================================
// Page flow
// ============================================================================

#[test]
fn test_registration_flow() {
    let session = MockSession::new();
    registration_form(&session);
    let page = RegistrationPage::new(&session);

    page.register("Ada Lovelace", Country::Chile, true).unwrap();

    assert_eq!(session.text_of(&Locator::id("full-name")).unwrap(), "Ada Lovelace");
    assert_eq!(
        page.page.get_selected_option(&Registration::Country, &[]).unwrap(),
        "Chile"
    );
    assert_eq!(session.is_checked(&Locator::css("input[name=newsletter]")), Some(true));
    assert!(session.history().iter().any(|c| c.ends_with(":Tab")));
}

#[test]
fn test_registration_is_repeatable() {
    let session = MockSession::new();
    registration_form(&session);
    let page = RegistrationPage::new(&session);

    page.register("First", Country::Norway, true).unwrap();
    page.register("Second", Country::Norway, true).unwrap();

    assert_eq!(session.text_of(&Locator::id("full-name")).unwrap(), "Second");
    // newsletter ticked once, submit clicked twice
    assert_eq!(session.call_count("click"), 3);
}

#[test]
fn test_error_rows_by_placeholder() {
    let session = MockSession::new();
    session.add_element(
        MockElement::new(Locator::xpath("//ul[@id='errors']/li[2]"), "li").with_text("Name is required"),
    );
    let page: PageObject<'_, MockSession, Registration> = PageObject::new(&session, fast_config());

    assert_eq!(
        page.get_text(&Registration::ErrorRow, &["2"]).unwrap(),
        "Name is required"
    );
    page.should_have_with(&Registration::ErrorRow, &["2".to_string()])
        .unwrap();
    assert!(page
        .should_have(&Registration::ErrorRow, &["1"])
        .unwrap_err()
        .is_timeout());
}

#[test]
fn test_unknown_country_reports_every_option() {
    let session = MockSession::new();
    registration_form(&session);
    let page: PageObject<'_, MockSession, Registration> = PageObject::new(&session, fast_config());

    let err = page
        .select_by_visible_text(&Registration::Country, "Peru", &[])
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        r#"There is no option with visible text equal to 'Peru' in drop down. Visible options: ["Norway", "Chile", "Japan"]."#
    );
}

// ============================================================================
// Alerts
// ============================================================================

#[test]
fn test_submit_confirmation_alert() {
    let session = MockSession::new();
    session.add_element(
        MockElement::new(Locator::css("form#register button[type=submit]"), "button")
            .opens_dialog_on_click(Dialog::alert("Registration complete")),
    );
    let page: PageObject<'_, MockSession, Registration> = PageObject::new(&session, fast_config());

    page.click(&Registration::Submit, &[]).unwrap();
    page.close_alert("Registration complete").unwrap();
    page.assert_no_alert().unwrap();
}

#[test]
fn test_unexpected_alert_is_reported() {
    let session = MockSession::new();
    session.open_dialog(Dialog::alert("Session expired"));
    let page: PageObject<'_, MockSession, Registration> = PageObject::new(&session, fast_config());

    match page.assert_no_alert().unwrap_err() {
        PageError::UnexpectedAlert { message } => assert_eq!(message, "Session expired"),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Custom sessions
// ============================================================================

/// Delegates to a mock but reports the element disabled once it has been
/// resolved, like a control disabled by a script right after rendering.
struct DisabledAfterResolve {
    inner: MockSession,
    enabled_checks: Cell<usize>,
}

impl Session for DisabledAfterResolve {
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        self.inner.find_elements(locator)
    }

    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        self.inner.is_displayed(element)
    }

    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        let checks = self.enabled_checks.get();
        self.enabled_checks.set(checks + 1);
        if checks == 0 {
            self.inner.is_enabled(element)
        } else {
            Ok(false)
        }
    }

    fn is_selected(&self, element: &ElementRef) -> DriverResult<bool> {
        self.inner.is_selected(element)
    }

    fn text(&self, element: &ElementRef) -> DriverResult<String> {
        self.inner.text(element)
    }

    fn click(&self, element: &ElementRef) -> DriverResult<()> {
        self.inner.click(element)
    }

    fn clear(&self, element: &ElementRef) -> DriverResult<()> {
        self.inner.clear(element)
    }

    fn send_keys(&self, element: &ElementRef, keys: &str) -> DriverResult<()> {
        self.inner.send_keys(element, keys)
    }

    fn options(&self, select: &ElementRef) -> DriverResult<Vec<ElementRef>> {
        self.inner.options(select)
    }

    fn select_option(&self, option: &ElementRef) -> DriverResult<()> {
        self.inner.select_option(option)
    }

    fn active_dialog(&self) -> DriverResult<Dialog> {
        self.inner.active_dialog()
    }

    fn accept_dialog(&self) -> DriverResult<()> {
        self.inner.accept_dialog()
    }

    fn dismiss_dialog(&self) -> DriverResult<()> {
        self.inner.dismiss_dialog()
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.inner.navigate(url)
    }

    fn current_url(&self) -> DriverResult<String> {
        self.inner.current_url()
    }
}

#[test]
fn test_should_have_enabled_names_materialised_locator() {
    let inner = MockSession::new();
    inner.add_element(MockElement::new(Locator::xpath("//ul[@id='errors']/li[3]"), "li"));
    let session = DisabledAfterResolve {
        inner,
        enabled_checks: Cell::new(0),
    };
    let page: PageObject<'_, DisabledAfterResolve, Registration> =
        PageObject::new(&session, fast_config());

    let err = page
        .should_have_enabled(&Registration::ErrorRow, &["3"])
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Element located by xpath = '//ul[@id='errors']/li[3]' is not enabled."
    );
}

#[test]
fn test_config_from_environment_style_overrides() {
    let config = PageConfig::default()
        .with_overrides(|key| (key == pageobject::ENV_ALERT_TIMEOUT_MS).then(|| "25".to_string()))
        .unwrap();
    let session = MockSession::new();
    let page: PageObject<'_, MockSession, Registration> = PageObject::new(&session, config);

    assert_eq!(page.config().alert_timeout(), Duration::from_millis(25));
    assert!(page.wait_get_alert().unwrap().is_none());
}
