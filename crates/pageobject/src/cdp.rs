//! Chrome DevTools Protocol session.
//!
//! Drives a real Chromium tab through chromiumoxide. The public surface stays
//! synchronous: every call is run to completion on a private tokio runtime
//! owned by the session, bounded by `command_timeout_ms`.
//!
//! Native dialogs block the page's script engine, so dialog state is tracked
//! from `Page.javascriptDialogOpening` / `Page.javascriptDialogClosed` events
//! instead of being queried.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogClosed, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Runtime;

use crate::dialog::{Dialog, DialogType};
use crate::locator::{By, Locator};
use crate::result::{DriverError, DriverResult, PageError, PageResult};
use crate::session::{ElementRef, Key, Session};

const IS_DISPLAYED_JS: &str = "function() {
    if (!this.isConnected) return null;
    const style = window.getComputedStyle(this);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    return this.getClientRects().length > 0;
}";

const IS_ENABLED_JS: &str = "function() {
    if (!this.isConnected) return null;
    return !this.disabled;
}";

const IS_SELECTED_JS: &str = "function() {
    if (!this.isConnected) return null;
    return Boolean(this.checked || this.selected);
}";

const TEXT_JS: &str = "function() {
    if (!this.isConnected) return null;
    if (this.tagName === 'INPUT' || this.tagName === 'TEXTAREA') return this.value;
    return this.innerText;
}";

const TAG_NAME_JS: &str = "function() {
    if (!this.isConnected) return null;
    return this.tagName.toLowerCase();
}";

const CLEAR_JS: &str = "function() {
    if (!this.isConnected) return null;
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
    return true;
}";

const SELECT_OPTION_JS: &str = "function() {
    if (!this.isConnected) return null;
    this.selected = true;
    const select = this.closest('select');
    if (select) {
        select.dispatchEvent(new Event('input', { bubbles: true }));
        select.dispatchEvent(new Event('change', { bubbles: true }));
    }
    return true;
}";

/// Launch settings for [`CdpSession`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpSessionConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Chrome sandbox (disable for containers)
    pub sandbox: bool,
    /// Path to the Chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Budget for a single protocol command in milliseconds
    pub command_timeout_ms: u64,
}

impl Default for CdpSessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
            viewport_width: 1280,
            viewport_height: 800,
            command_timeout_ms: 5_000,
        }
    }
}

impl CdpSessionConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the per-command budget
    #[must_use]
    pub const fn with_command_timeout(mut self, timeout_ms: u64) -> Self {
        self.command_timeout_ms = timeout_ms;
        self
    }
}

/// [`Session`] over one Chromium tab
#[derive(Debug)]
pub struct CdpSession {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    elements: Mutex<Registry<Element>>,
    dialog: Arc<Mutex<Option<Dialog>>>,
    next_id: AtomicU64,
    command_timeout: Duration,
}

/// Live element handles, one per backend DOM node
#[derive(Debug)]
struct Registry<E> {
    elements: HashMap<String, Arc<E>>,
    nodes: HashMap<i64, ElementRef>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
            nodes: HashMap::new(),
        }
    }
}

impl<E> Registry<E> {
    fn get(&self, id: &str) -> Option<Arc<E>> {
        self.elements.get(id).cloned()
    }

    /// Handle already issued for `node`
    fn known(&self, node: i64) -> Option<ElementRef> {
        self.nodes
            .get(&node)
            .filter(|handle| self.elements.contains_key(&handle.id))
            .cloned()
    }

    fn insert(&mut self, node: i64, handle: ElementRef, element: E) {
        self.elements.insert(handle.id.clone(), Arc::new(element));
        self.nodes.insert(node, handle);
    }

    fn remove(&mut self, id: &str) {
        self.elements.remove(id);
        self.nodes.retain(|_, handle| handle.id != id);
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.nodes.clear();
    }
}

/// Protocol errors raised when the node or its document went away mid-lookup
const MISSING_NODE_ERRORS: &[&str] = &[
    "Could not find node with given id",
    "No node with given id found",
    "Could not find object with given id",
    "Cannot find context with specified id",
    "Execution context was destroyed",
];

/// Lookup failures caused by a document being replaced count as "no match";
/// everything else is a session failure
fn lookup_error(locator: &Locator, err: DriverError) -> DriverError {
    match err {
        DriverError::Session { ref message } if MISSING_NODE_ERRORS.iter().any(|m| message.contains(m)) => {
            tracing::trace!(%locator, error = %message, "lookup raced a document change");
            DriverError::NoSuchElement {
                locator: locator.to_string(),
            }
        }
        other => other,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn driver_error(err: impl std::fmt::Display) -> DriverError {
    DriverError::session(err.to_string())
}

/// XPath string literal for arbitrary text
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// XPath equivalent of the link text strategies
fn link_xpath(locator: &Locator) -> Option<String> {
    let text = xpath_literal(locator.expression());
    match locator.by() {
        By::LinkText => Some(format!("//a[normalize-space(.)={text}]")),
        By::PartialLinkText => Some(format!("//a[contains(., {text})]")),
        _ => None,
    }
}

impl CdpSession {
    /// Launch Chromium and open a blank tab
    pub fn launch(config: &CdpSessionConfig) -> PageResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let mut builder = BrowserConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(PageError::config)?;

        let dialog = Arc::new(Mutex::new(None));
        let (browser, page) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(browser_config).await.map_err(driver_error)?;
            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(driver_error)?;
            Self::track_dialogs(&page, Arc::clone(&dialog)).await?;
            Ok::<_, DriverError>((browser, page))
        })?;

        tracing::info!(headless = config.headless, "chromium session started");

        Ok(Self {
            runtime,
            browser,
            page,
            elements: Mutex::new(Registry::default()),
            dialog,
            next_id: AtomicU64::new(0),
            command_timeout: Duration::from_millis(config.command_timeout_ms),
        })
    }

    async fn track_dialogs(page: &Page, dialog: Arc<Mutex<Option<Dialog>>>) -> DriverResult<()> {
        let mut opening = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(driver_error)?;
        let mut closed = page
            .event_listener::<EventJavascriptDialogClosed>()
            .await
            .map_err(driver_error)?;

        let opened_state = Arc::clone(&dialog);
        tokio::spawn(async move {
            while let Some(event) = opening.next().await {
                let kind = DialogType::from_cdp(event.r#type.as_ref());
                let mut opened = Dialog::new(kind, event.message.clone());
                if kind == DialogType::Prompt {
                    opened = Dialog::prompt(event.message.clone(), event.default_prompt.clone());
                }
                tracing::debug!(dialog = %kind, message = %event.message, "dialog opened");
                *lock(&opened_state) = Some(opened);
            }
        });
        tokio::spawn(async move {
            while closed.next().await.is_some() {
                *lock(&dialog) = None;
            }
        });
        Ok(())
    }

    /// Close the browser
    pub fn close(self) -> PageResult<()> {
        let Self {
            runtime,
            mut browser,
            command_timeout,
            ..
        } = self;
        runtime
            .block_on(async { tokio::time::timeout(command_timeout, browser.close()).await })
            .map_err(|_| DriverError::session("timed out closing the browser"))?
            .map_err(driver_error)?;
        Ok(())
    }

    fn run<F, T>(&self, future: F) -> DriverResult<T>
    where
        F: Future<Output = DriverResult<T>>,
    {
        let timeout = self.command_timeout;
        self.runtime
            .block_on(async { tokio::time::timeout(timeout, future).await })
            .map_err(|_| DriverError::session(format!("command timed out after {}ms", timeout.as_millis())))?
    }

    fn element(&self, handle: &ElementRef) -> DriverResult<Arc<Element>> {
        lock(&self.elements)
            .get(&handle.id)
            .ok_or_else(|| DriverError::StaleElement {
                id: handle.id.clone(),
            })
    }

    fn register(&self, element: Element, tag_name: &str) -> ElementRef {
        let id = format!("cdp-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let handle = ElementRef::new(id, tag_name);
        let node = *element.backend_node_id.inner();
        lock(&self.elements).insert(node, handle.clone(), element);
        handle
    }

    /// Run a JS state query on the element; `null` means detached
    fn query(&self, handle: &ElementRef, function: &str) -> DriverResult<Value> {
        let element = self.element(handle)?;
        let stale = || DriverError::StaleElement {
            id: handle.id.clone(),
        };
        let value = self.run(async {
            let returns = element.call_js_fn(function, false).await.map_err(|_| stale())?;
            if returns.exception_details.is_some() {
                return Err(DriverError::session(format!("script failed on element {}", handle.id)));
            }
            Ok(returns.result.value.unwrap_or(Value::Null))
        })?;
        if value.is_null() {
            lock(&self.elements).remove(&handle.id);
            return Err(stale());
        }
        Ok(value)
    }

    fn query_bool(&self, handle: &ElementRef, function: &str) -> DriverResult<bool> {
        self.query(handle, function)?
            .as_bool()
            .ok_or_else(|| DriverError::session("expected a boolean from the page"))
    }

    fn query_string(&self, handle: &ElementRef, function: &str) -> DriverResult<String> {
        match self.query(handle, function)? {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    /// Handles for `elements`, reusing the handle of a node seen before
    fn wrap(&self, elements: Vec<Element>) -> DriverResult<Vec<ElementRef>> {
        let mut handles = Vec::with_capacity(elements.len());
        for element in elements {
            let known = lock(&self.elements).known(*element.backend_node_id.inner());
            if let Some(handle) = known {
                handles.push(handle);
                continue;
            }
            let tag = self.run(async {
                let returns = element.call_js_fn(TAG_NAME_JS, false).await.map_err(driver_error)?;
                Ok(returns
                    .result
                    .value
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default())
            })?;
            handles.push(self.register(element, &tag));
        }
        Ok(handles)
    }
}

impl Session for CdpSession {
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let elements = if let Some(css) = locator.to_css() {
            self.run(async { self.page.find_elements(css).await.map_err(driver_error) })
        } else {
            let xpath = link_xpath(locator).unwrap_or_else(|| locator.expression().to_string());
            self.run(async { self.page.find_xpaths(xpath).await.map_err(driver_error) })
        };
        elements
            .and_then(|elements| self.wrap(elements))
            .map_err(|err| lookup_error(locator, err))
    }

    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        self.query_bool(element, IS_DISPLAYED_JS)
    }

    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        self.query_bool(element, IS_ENABLED_JS)
    }

    fn is_selected(&self, element: &ElementRef) -> DriverResult<bool> {
        self.query_bool(element, IS_SELECTED_JS)
    }

    fn text(&self, element: &ElementRef) -> DriverResult<String> {
        self.query_string(element, TEXT_JS)
    }

    fn tag_name(&self, element: &ElementRef) -> DriverResult<String> {
        self.query_string(element, TAG_NAME_JS)
    }

    fn click(&self, element: &ElementRef) -> DriverResult<()> {
        let target = self.element(element)?;
        self.run(async {
            target.click().await.map_err(driver_error)?;
            Ok(())
        })
    }

    fn clear(&self, element: &ElementRef) -> DriverResult<()> {
        self.query(element, CLEAR_JS).map(|_| ())
    }

    fn send_keys(&self, element: &ElementRef, keys: &str) -> DriverResult<()> {
        let target = self.element(element)?;
        self.run(async {
            target.focus().await.map_err(driver_error)?;
            let mut text = String::new();
            for c in keys.chars() {
                match Key::from_code(c) {
                    Some(Key::Space) => text.push(' '),
                    Some(key) => {
                        if !text.is_empty() {
                            target.type_str(&text).await.map_err(driver_error)?;
                            text.clear();
                        }
                        target.press_key(key.dom_name()).await.map_err(driver_error)?;
                    }
                    None => text.push(c),
                }
            }
            if !text.is_empty() {
                target.type_str(&text).await.map_err(driver_error)?;
            }
            Ok(())
        })
    }

    fn options(&self, select: &ElementRef) -> DriverResult<Vec<ElementRef>> {
        let target = self.element(select)?;
        let options = self.run(async { target.find_elements("option").await.map_err(driver_error) })?;
        self.wrap(options)
    }

    fn select_option(&self, option: &ElementRef) -> DriverResult<()> {
        self.query(option, SELECT_OPTION_JS).map(|_| ())
    }

    fn active_dialog(&self) -> DriverResult<Dialog> {
        lock(&self.dialog).clone().ok_or(DriverError::NoAlertOpen)
    }

    fn accept_dialog(&self) -> DriverResult<()> {
        self.handle_dialog(true)
    }

    fn dismiss_dialog(&self) -> DriverResult<()> {
        self.handle_dialog(false)
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        tracing::debug!(url, "navigate");
        self.run(async {
            self.page.goto(url).await.map_err(driver_error)?;
            Ok(())
        })?;
        lock(&self.elements).clear();
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        self.run(async { self.page.url().await.map_err(driver_error) })
            .map(Option::unwrap_or_default)
    }
}

impl CdpSession {
    fn handle_dialog(&self, accept: bool) -> DriverResult<()> {
        if lock(&self.dialog).is_none() {
            return Err(DriverError::NoAlertOpen);
        }
        self.run(async {
            self.page
                .execute(HandleJavaScriptDialogParams::new(accept))
                .await
                .map_err(driver_error)?;
            Ok(())
        })?;
        *lock(&self.dialog) = None;
        Ok(())
    }
}
