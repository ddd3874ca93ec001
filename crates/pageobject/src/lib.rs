//! Pageobject: Page Object adapter for browser UI tests
//!
//! A [`PageObject`] mediates every interaction between test code and a
//! browser session: element location with explicit waits, clicks, text
//! entry, dropdown selection, checkbox toggling and native alert handling.
//! Pages are described by element descriptor types implementing
//! [`PageElement`]; the browser is reached through the [`Session`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Page type  │    │ PageObject │    │ Session    │            │
//! │   │ (test)     │───►│ + Wait     │───►│ Mock / CDP │            │
//! │   │            │    │            │    │            │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                  ▲                                    │
//! │         ▼                  │                                    │
//! │   ┌────────────┐    ┌────────────┐                              │
//! │   │ PageElement│───►│ Locator    │                              │
//! │   │ descriptor │    │ Template   │                              │
//! │   └────────────┘    └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation is synchronous and blocks until it succeeds, fails, or
//! its wait budget from [`PageConfig`] elapses.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc)]
mod config;
mod dialog;
mod element;
mod locator;
#[allow(clippy::missing_errors_doc)]
mod logging;
#[allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
mod page_object;
mod result;
mod session;

/// In-memory session for unit tests
#[allow(clippy::missing_panics_doc, clippy::must_use_candidate)]
pub mod mock;

/// Explicit waits and expected conditions
#[allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]
pub mod wait;

/// Chrome DevTools Protocol session (requires `browser` feature)
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod cdp;

#[cfg(feature = "browser")]
pub use cdp::{CdpSession, CdpSessionConfig};
pub use config::{
    PageConfig, DEFAULT_ALERT_TIMEOUT_MS, DEFAULT_BASE_URL, ENV_ALERT_TIMEOUT_MS, ENV_BASE_URL,
    ENV_DEFAULT_TIMEOUT_MS, ENV_POLL_INTERVAL_MS,
};
pub use dialog::{Dialog, DialogType};
pub use element::{DropDownValue, PageElement, PlaceholdersProvider};
pub use locator::{By, Locator, LocatorTemplate};
pub use logging::{init_tracing, DEFAULT_FILTER};
pub use mock::{MockElement, MockSession};
pub use page_object::PageObject;
pub use result::{DriverError, DriverResult, PageError, PageResult};
pub use session::{ElementRef, Key, Session};
pub use wait::{conditions, Wait, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// `#[derive(PageElement)]` for descriptor enums (requires `derive` feature)
#[cfg(feature = "derive")]
pub use pageobject_derive::PageElement;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::config::*;
    pub use super::dialog::*;
    pub use super::element::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::wait::conditions;
    pub use super::wait::{Wait, WaitResult};
    pub use super::{MockElement, MockSession};

    #[cfg(feature = "browser")]
    pub use super::cdp::*;

    #[cfg(feature = "derive")]
    pub use pageobject_derive::PageElement;
}
