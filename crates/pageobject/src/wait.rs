//! Explicit waits.
//!
//! A [`Wait`] polls a condition against the session until it yields a value
//! or the budget runs out. The condition is always checked at least once.
//! `NoSuchElement` and `StaleElement` count as "not yet"; any other session
//! error ends the wait immediately. A timeout is terminal: nothing here
//! retries after it.
//!
//! The [`conditions`] module holds the expected conditions the page object
//! adapter is built from.

use std::time::{Duration, Instant};

use crate::result::{DriverResult, PageError, PageResult};
use crate::session::Session;

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Shortest sleep between polls
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Value produced by a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value the condition produced
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was evaluated
    pub polls: u32,
}

/// Bounded polling loop over a session
#[derive(Debug)]
pub struct Wait<'s, S: Session> {
    session: &'s S,
    timeout: Duration,
    poll_interval: Duration,
}

impl<'s, S: Session> Wait<'s, S> {
    /// Create a wait with the default poll interval
    #[must_use]
    pub fn new(session: &'s S, timeout: Duration) -> Self {
        Self {
            session,
            timeout,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set polling interval (at least 1ms)
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = if poll_interval.is_zero() {
            MIN_POLL_INTERVAL
        } else {
            poll_interval
        };
        self
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll `condition` until it yields `Some`, returning the value and timing
    pub fn until_result<T, F>(&self, waited_for: &str, mut condition: F) -> PageResult<WaitResult<T>>
    where
        F: FnMut(&S) -> DriverResult<Option<T>>,
    {
        let start = Instant::now();
        let mut polls = 0_u32;

        loop {
            polls += 1;
            match condition(self.session) {
                Ok(Some(value)) => {
                    tracing::trace!(waited_for, polls, elapsed_ms = start.elapsed().as_millis() as u64, "wait satisfied");
                    return Ok(WaitResult {
                        value,
                        elapsed: start.elapsed(),
                        polls,
                    });
                }
                Ok(None) => {}
                Err(err) if err.is_transient() => {
                    tracing::trace!(waited_for, error = %err, "ignoring transient error while waiting");
                }
                Err(err) => return Err(err.into()),
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                let ms = self.timeout.as_millis() as u64;
                tracing::warn!(waited_for, ms, polls, "wait timed out");
                return Err(PageError::Timeout {
                    waited_for: waited_for.to_string(),
                    ms,
                });
            }
            std::thread::sleep(self.poll_interval.min(self.timeout - elapsed));
        }
    }

    /// Poll `condition` until it yields `Some`
    pub fn until<T, F>(&self, waited_for: &str, condition: F) -> PageResult<T>
    where
        F: FnMut(&S) -> DriverResult<Option<T>>,
    {
        self.until_result(waited_for, condition).map(|r| r.value)
    }
}

/// Expected conditions over session primitives.
///
/// Each condition is a single check; wrap it in a closure for [`Wait::until`]:
///
/// ```
/// use std::time::Duration;
/// use pageobject::{conditions, Locator, MockElement, MockSession, Wait};
///
/// let session = MockSession::new();
/// session.add_element(MockElement::new(Locator::id("save"), "button"));
///
/// let save = Locator::id("save");
/// let element = Wait::new(&session, Duration::from_millis(200))
///     .until("save button", |s| conditions::element_to_be_clickable(s, &save))
///     .unwrap();
/// assert_eq!(element.tag_name, "button");
/// ```
pub mod conditions {
    use crate::dialog::Dialog;
    use crate::locator::Locator;
    use crate::result::{DriverError, DriverResult};
    use crate::session::{ElementRef, Session};

    /// Present, displayed and enabled; yields the element
    pub fn element_to_be_clickable<S: Session + ?Sized>(
        session: &S,
        locator: &Locator,
    ) -> DriverResult<Option<ElementRef>> {
        let element = session.find_element(locator)?;
        if session.is_displayed(&element)? && session.is_enabled(&element)? {
            Ok(Some(element))
        } else {
            Ok(None)
        }
    }

    /// Present and displayed; yields the element
    pub fn visibility_of_element_located<S: Session + ?Sized>(
        session: &S,
        locator: &Locator,
    ) -> DriverResult<Option<ElementRef>> {
        let element = session.find_element(locator)?;
        Ok(session.is_displayed(&element)?.then_some(element))
    }

    /// Absent, detached or hidden
    pub fn invisibility_of_element_located<S: Session + ?Sized>(
        session: &S,
        locator: &Locator,
    ) -> DriverResult<Option<()>> {
        match session.find_element(locator) {
            Ok(element) => match session.is_displayed(&element) {
                Ok(displayed) => Ok((!displayed).then_some(())),
                Err(DriverError::StaleElement { .. }) => Ok(Some(())),
                Err(err) => Err(err),
            },
            Err(DriverError::NoSuchElement { .. }) => Ok(Some(())),
            Err(err) => Err(err),
        }
    }

    /// The handle is no longer attached to the document
    pub fn staleness_of<S: Session + ?Sized>(
        session: &S,
        element: &ElementRef,
    ) -> DriverResult<Option<()>> {
        match session.is_enabled(element) {
            Ok(_) => Ok(None),
            Err(DriverError::StaleElement { .. }) => Ok(Some(())),
            Err(err) => Err(err),
        }
    }

    /// A native dialog is open; yields it
    pub fn alert_is_present<S: Session + ?Sized>(session: &S) -> DriverResult<Option<Dialog>> {
        match session.active_dialog() {
            Ok(dialog) => Ok(Some(dialog)),
            Err(DriverError::NoAlertOpen) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
