//! In-memory [`Session`] for unit tests.
//!
//! `MockSession` models just enough of a document to exercise page objects
//! without a browser: elements keyed by locator, visibility that can change
//! over time, checkboxes, select elements, clicks that detach the clicked
//! element (a simulated navigation) and a queue of native dialogs. Every
//! mutating call is recorded so tests can assert on click counts.
//!
//! ```
//! use pageobject::{Locator, MockElement, MockSession, Session};
//!
//! let session = MockSession::new();
//! session.add_element(MockElement::new(Locator::id("save"), "button"));
//!
//! let save = session.find_element(&Locator::id("save")).unwrap();
//! session.click(&save).unwrap();
//! assert_eq!(session.call_count("click"), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::dialog::Dialog;
use crate::locator::Locator;
use crate::result::{DriverError, DriverResult};
use crate::session::{ElementRef, Key, Session};

/// Description of an element placed into a [`MockSession`]
#[derive(Debug, Clone)]
pub struct MockElement {
    locator: Locator,
    tag_name: String,
    text: String,
    displayed: bool,
    enabled: bool,
    selected: bool,
    toggles_on_click: bool,
    navigates_on_click: bool,
    dialog_on_click: Option<Dialog>,
    appears_after: Option<Duration>,
    shows_after: Option<Duration>,
    hides_after: Option<Duration>,
    options: Vec<(String, bool)>,
}

impl MockElement {
    /// A displayed, enabled element
    #[must_use]
    pub fn new(locator: Locator, tag_name: impl Into<String>) -> Self {
        Self {
            locator,
            tag_name: tag_name.into().to_ascii_lowercase(),
            text: String::new(),
            displayed: true,
            enabled: true,
            selected: false,
            toggles_on_click: false,
            navigates_on_click: false,
            dialog_on_click: None,
            appears_after: None,
            shows_after: None,
            hides_after: None,
            options: Vec::new(),
        }
    }

    /// A text input
    #[must_use]
    pub fn input(locator: Locator) -> Self {
        Self::new(locator, "input")
    }

    /// A checkbox that toggles when clicked
    #[must_use]
    pub fn checkbox(locator: Locator, checked: bool) -> Self {
        let mut element = Self::new(locator, "input");
        element.selected = checked;
        element.toggles_on_click = true;
        element
    }

    /// A select element with the given option texts, nothing selected
    #[must_use]
    pub fn select(locator: Locator, options: &[&str]) -> Self {
        let mut element = Self::new(locator, "select");
        element.options = options.iter().map(|o| ((*o).to_string(), false)).collect();
        element
    }

    /// Set the text content (or input value)
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark the option with this text as selected
    #[must_use]
    pub fn with_selected_option(mut self, text: &str) -> Self {
        for (option, selected) in &mut self.options {
            *selected = option == text;
        }
        self
    }

    /// Render the element hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Render the element disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Detach the element from the document when it is clicked
    #[must_use]
    pub const fn navigates_on_click(mut self) -> Self {
        self.navigates_on_click = true;
        self
    }

    /// Open a dialog when the element is clicked
    #[must_use]
    pub fn opens_dialog_on_click(mut self, dialog: Dialog) -> Self {
        self.dialog_on_click = Some(dialog);
        self
    }

    /// Keep the element out of the document until `delay` has passed
    #[must_use]
    pub const fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    /// Render a hidden element once `delay` has passed
    #[must_use]
    pub const fn shows_after(mut self, delay: Duration) -> Self {
        self.shows_after = Some(delay);
        self
    }

    /// Hide the element once `delay` has passed
    #[must_use]
    pub const fn hides_after(mut self, delay: Duration) -> Self {
        self.hides_after = Some(delay);
        self
    }
}

#[derive(Debug)]
struct Node {
    handle: ElementRef,
    element: MockElement,
    parent: Option<String>,
    attached: bool,
    added_at: Instant,
}

impl Node {
    fn present(&self, now: Instant) -> bool {
        self.element
            .appears_after
            .map_or(true, |delay| now.duration_since(self.added_at) >= delay)
    }

    fn displayed(&self, now: Instant) -> bool {
        let age = now.duration_since(self.added_at);
        let shown = self.element.displayed
            || self.element.shows_after.is_some_and(|delay| age >= delay);
        let hidden = self.element.hides_after.is_some_and(|delay| age >= delay);
        shown && !hidden
    }
}

#[derive(Debug, Default)]
struct Document {
    nodes: Vec<Node>,
    next_id: usize,
    dialogs: VecDeque<Dialog>,
    call_history: Vec<String>,
    current_url: String,
}

impl Document {
    fn node(&self, handle: &ElementRef) -> DriverResult<&Node> {
        self.nodes
            .iter()
            .find(|n| n.handle.id == handle.id)
            .filter(|n| n.attached)
            .ok_or_else(|| DriverError::StaleElement {
                id: handle.id.clone(),
            })
    }

    fn node_mut(&mut self, handle: &ElementRef) -> DriverResult<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| n.handle.id == handle.id)
            .filter(|n| n.attached)
            .ok_or_else(|| DriverError::StaleElement {
                id: handle.id.clone(),
            })
    }

    fn insert(&mut self, element: MockElement, parent: Option<String>) -> ElementRef {
        self.next_id += 1;
        let handle = ElementRef::new(format!("mock-{}", self.next_id), element.tag_name.clone());
        self.nodes.push(Node {
            handle: handle.clone(),
            element,
            parent,
            attached: true,
            added_at: Instant::now(),
        });
        handle
    }
}

/// In-memory session for unit tests
#[derive(Debug, Default)]
pub struct MockSession {
    document: Mutex<Document>,
}

impl MockSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an element to the document
    pub fn add_element(&self, mut element: MockElement) -> ElementRef {
        let mut doc = self.document();
        let options = std::mem::take(&mut element.options);
        let handle = doc.insert(element, None);
        for (text, selected) in options {
            let mut option = MockElement::new(Locator::css("option"), "option").with_text(text);
            option.selected = selected;
            let _ = doc.insert(option, Some(handle.id.clone()));
        }
        handle
    }

    /// Detach every element matching the locator
    pub fn detach(&self, locator: &Locator) {
        let mut doc = self.document();
        for node in doc.nodes.iter_mut().filter(|n| &n.element.locator == locator) {
            node.attached = false;
        }
    }

    /// Queue a dialog as if the page had opened it
    pub fn open_dialog(&self, dialog: Dialog) {
        self.document().dialogs.push_back(dialog);
    }

    /// Number of dialogs still open
    #[must_use]
    pub fn open_dialogs(&self) -> usize {
        self.document().dialogs.len()
    }

    /// Text of the first attached element matching the locator
    #[must_use]
    pub fn text_of(&self, locator: &Locator) -> Option<String> {
        self.document()
            .nodes
            .iter()
            .find(|n| n.attached && &n.element.locator == locator)
            .map(|n| n.element.text.clone())
    }

    /// Checked state of the first attached element matching the locator
    #[must_use]
    pub fn is_checked(&self, locator: &Locator) -> Option<bool> {
        self.document()
            .nodes
            .iter()
            .find(|n| n.attached && &n.element.locator == locator)
            .map(|n| n.element.selected)
    }

    /// Call history for verification
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.document().call_history.clone()
    }

    /// Check if a command was called
    #[must_use]
    pub fn was_called(&self, command: &str) -> bool {
        self.call_count(command) > 0
    }

    /// Number of recorded calls of a command
    #[must_use]
    pub fn call_count(&self, command: &str) -> usize {
        self.document()
            .call_history
            .iter()
            .filter(|c| c.split(':').next() == Some(command))
            .count()
    }
}

impl Session for MockSession {
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let now = Instant::now();
        Ok(self
            .document()
            .nodes
            .iter()
            .filter(|n| n.attached && n.parent.is_none())
            .filter(|n| &n.element.locator == locator && n.present(now))
            .map(|n| n.handle.clone())
            .collect())
    }

    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        let doc = self.document();
        Ok(doc.node(element)?.displayed(Instant::now()))
    }

    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        Ok(self.document().node(element)?.element.enabled)
    }

    fn is_selected(&self, element: &ElementRef) -> DriverResult<bool> {
        Ok(self.document().node(element)?.element.selected)
    }

    fn text(&self, element: &ElementRef) -> DriverResult<String> {
        Ok(self.document().node(element)?.element.text.clone())
    }

    fn click(&self, element: &ElementRef) -> DriverResult<()> {
        let mut doc = self.document();
        let node = doc.node_mut(element)?;
        if node.element.toggles_on_click {
            node.element.selected = !node.element.selected;
        }
        if node.element.navigates_on_click {
            node.attached = false;
        }
        let dialog = node.element.dialog_on_click.clone();

        doc.call_history.push(format!("click:{}", element.id));
        if let Some(dialog) = dialog {
            doc.dialogs.push_back(dialog);
        }
        Ok(())
    }

    fn clear(&self, element: &ElementRef) -> DriverResult<()> {
        let mut doc = self.document();
        doc.node_mut(element)?.element.text.clear();
        doc.call_history.push(format!("clear:{}", element.id));
        Ok(())
    }

    fn send_keys(&self, element: &ElementRef, keys: &str) -> DriverResult<()> {
        let mut doc = self.document();
        let node = doc.node_mut(element)?;
        let mut pressed = Vec::new();
        for c in keys.chars() {
            match Key::from_code(c) {
                Some(Key::Backspace) => {
                    let _ = node.element.text.pop();
                }
                Some(Key::Space) => node.element.text.push(' '),
                Some(key) => pressed.push(key),
                None => node.element.text.push(c),
            }
        }

        doc.call_history
            .push(format!("send_keys:{}:{}", element.id, keys.len()));
        for key in pressed {
            doc.call_history
                .push(format!("key:{}:{}", element.id, key.dom_name()));
        }
        Ok(())
    }

    fn options(&self, select: &ElementRef) -> DriverResult<Vec<ElementRef>> {
        let doc = self.document();
        let _ = doc.node(select)?;
        Ok(doc
            .nodes
            .iter()
            .filter(|n| n.attached && n.parent.as_deref() == Some(select.id.as_str()))
            .map(|n| n.handle.clone())
            .collect())
    }

    fn select_option(&self, option: &ElementRef) -> DriverResult<()> {
        let mut doc = self.document();
        let parent = doc.node(option)?.parent.clone();
        for node in &mut doc.nodes {
            if node.parent.is_some() && node.parent == parent {
                node.element.selected = node.handle.id == option.id;
            }
        }
        doc.call_history.push(format!("select_option:{}", option.id));
        Ok(())
    }

    fn active_dialog(&self) -> DriverResult<Dialog> {
        self.document()
            .dialogs
            .front()
            .cloned()
            .ok_or(DriverError::NoAlertOpen)
    }

    fn accept_dialog(&self) -> DriverResult<()> {
        let mut doc = self.document();
        let dialog = doc.dialogs.pop_front().ok_or(DriverError::NoAlertOpen)?;
        doc.call_history
            .push(format!("accept_dialog:{}", dialog.message()));
        Ok(())
    }

    fn dismiss_dialog(&self) -> DriverResult<()> {
        let mut doc = self.document();
        let dialog = doc.dialogs.pop_front().ok_or(DriverError::NoAlertOpen)?;
        doc.call_history
            .push(format!("dismiss_dialog:{}", dialog.message()));
        Ok(())
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut doc = self.document();
        doc.call_history.push(format!("navigate:{url}"));
        doc.current_url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self.document().current_url.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_find_by_locator() {
            let session = MockSession::new();
            let handle = session.add_element(MockElement::input(Locator::id("name")));

            assert_eq!(session.find_element(&Locator::id("name")).unwrap(), handle);
            assert!(session.find_elements(&Locator::id("other")).unwrap().is_empty());
        }

        #[test]
        fn test_missing_element() {
            let session = MockSession::new();
            let err = session.find_element(&Locator::css("nav")).unwrap_err();
            assert!(matches!(err, DriverError::NoSuchElement { .. }));
        }

        #[test]
        fn test_delayed_element() {
            let session = MockSession::new();
            session.add_element(
                MockElement::new(Locator::id("late"), "div").appears_after(Duration::from_millis(30)),
            );
            assert!(session.find_elements(&Locator::id("late")).unwrap().is_empty());
            std::thread::sleep(Duration::from_millis(40));
            assert_eq!(session.find_elements(&Locator::id("late")).unwrap().len(), 1);
        }

        #[test]
        fn test_detached_element_is_stale() {
            let session = MockSession::new();
            let handle = session.add_element(MockElement::new(Locator::id("x"), "div"));
            session.detach(&Locator::id("x"));

            assert!(matches!(
                session.is_enabled(&handle),
                Err(DriverError::StaleElement { .. })
            ));
            assert!(session.find_elements(&Locator::id("x")).unwrap().is_empty());
        }
    }

    mod visibility_tests {
        use super::*;

        #[test]
        fn test_hides_after() {
            let session = MockSession::new();
            let handle = session.add_element(
                MockElement::new(Locator::id("spinner"), "div").hides_after(Duration::from_millis(20)),
            );
            assert!(session.is_displayed(&handle).unwrap());
            std::thread::sleep(Duration::from_millis(30));
            assert!(!session.is_displayed(&handle).unwrap());
        }

        #[test]
        fn test_shows_after() {
            let session = MockSession::new();
            let handle = session.add_element(
                MockElement::new(Locator::id("toast"), "div")
                    .hidden()
                    .shows_after(Duration::from_millis(20)),
            );
            assert!(!session.is_displayed(&handle).unwrap());
            std::thread::sleep(Duration::from_millis(30));
            assert!(session.is_displayed(&handle).unwrap());
        }
    }

    mod interaction_tests {
        use super::*;

        #[test]
        fn test_checkbox_toggles() {
            let session = MockSession::new();
            let handle = session.add_element(MockElement::checkbox(Locator::id("terms"), false));
            session.click(&handle).unwrap();
            assert_eq!(session.is_checked(&Locator::id("terms")), Some(true));
            assert_eq!(session.call_count("click"), 1);
        }

        #[test]
        fn test_typing_and_keys() {
            let session = MockSession::new();
            let handle = session.add_element(MockElement::input(Locator::id("q")).with_text("old"));
            session.clear(&handle).unwrap();
            session.send_keys(&handle, "rusx").unwrap();
            session.send_keys(&handle, &Key::Backspace.as_keys()).unwrap();
            session.send_keys(&handle, "t").unwrap();
            session.send_keys(&handle, &Key::Tab.as_keys()).unwrap();

            assert_eq!(session.text_of(&Locator::id("q")).unwrap(), "rust");
            assert!(session.history().iter().any(|c| c.ends_with(":Tab")));
        }

        #[test]
        fn test_space_key_types_a_space() {
            let session = MockSession::new();
            let handle = session.add_element(MockElement::input(Locator::id("q")));
            let keys = format!("a{}b", Key::Space.as_keys());
            session.send_keys(&handle, &keys).unwrap();

            assert_eq!(session.text_of(&Locator::id("q")).unwrap(), "a b");
        }

        #[test]
        fn test_navigating_click_detaches() {
            let session = MockSession::new();
            let handle =
                session.add_element(MockElement::new(Locator::id("go"), "a").navigates_on_click());
            session.click(&handle).unwrap();
            assert!(session.click(&handle).is_err());
        }

        #[test]
        fn test_select_options() {
            let session = MockSession::new();
            let select = session.add_element(
                MockElement::select(Locator::id("colour"), &["Red", "Green"]).with_selected_option("Red"),
            );
            let options = session.options(&select).unwrap();
            assert_eq!(options.len(), 2);
            assert!(session.is_selected(&options[0]).unwrap());

            session.select_option(&options[1]).unwrap();
            assert!(!session.is_selected(&options[0]).unwrap());
            assert!(session.is_selected(&options[1]).unwrap());
            assert_eq!(session.text(&options[1]).unwrap(), "Green");
        }
    }

    mod dialog_tests {
        use super::*;

        #[test]
        fn test_dialog_queue() {
            let session = MockSession::new();
            assert_eq!(session.active_dialog().unwrap_err(), DriverError::NoAlertOpen);

            session.open_dialog(Dialog::alert("first"));
            session.open_dialog(Dialog::confirm("second"));
            assert_eq!(session.active_dialog().unwrap().message(), "first");

            session.accept_dialog().unwrap();
            assert_eq!(session.active_dialog().unwrap().message(), "second");
            session.dismiss_dialog().unwrap();
            assert_eq!(session.open_dialogs(), 0);
            assert!(session.was_called("accept_dialog"));
            assert!(session.was_called("dismiss_dialog"));
        }

        #[test]
        fn test_dialog_on_click() {
            let session = MockSession::new();
            let handle = session.add_element(
                MockElement::new(Locator::id("delete"), "button")
                    .opens_dialog_on_click(Dialog::confirm("Really?")),
            );
            session.click(&handle).unwrap();
            assert_eq!(session.active_dialog().unwrap().message(), "Really?");
        }
    }

    #[test]
    fn test_navigation() {
        let session = MockSession::new();
        session.navigate("http://localhost/login").unwrap();
        assert_eq!(session.current_url().unwrap(), "http://localhost/login");
        assert!(session.was_called("navigate"));
    }
}
