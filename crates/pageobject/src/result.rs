//! Result and error types for page object operations.

use thiserror::Error;

/// Result type for page object operations
pub type PageResult<T> = Result<T, PageError>;

/// Result type for raw session calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Failures reported by a [`Session`](crate::Session) implementation.
///
/// `NoSuchElement` and `StaleElement` are transient while an explicit wait is
/// polling; everything else ends the wait immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No element matched the locator
    #[error("No element found for {locator}")]
    NoSuchElement {
        /// Locator that was queried
        locator: String,
    },

    /// The element handle is no longer attached to the document
    #[error("Element {id} is no longer attached to the document")]
    StaleElement {
        /// Handle id
        id: String,
    },

    /// No native dialog is open
    #[error("No alert is open")]
    NoAlertOpen,

    /// Any other session failure (transport, protocol, browser crash)
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Whether an explicit wait should keep polling after this error
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. } | Self::StaleElement { .. })
    }
}

/// Errors raised by page object operations
#[derive(Debug, Error)]
pub enum PageError {
    /// A wait exceeded its budget
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// What the wait was polling for
        waited_for: String,
        /// Budget in milliseconds
        ms: u64,
    },

    /// Requested dropdown text is not among the current options
    #[error(
        "There is no option with visible text equal to '{requested}' in drop down. Visible options: {available:?}."
    )]
    InvalidSelection {
        /// Text that was requested
        requested: String,
        /// Every option text the dropdown offered
        available: Vec<String>,
    },

    /// Element resolved but reports itself disabled
    #[error("Element located by {strategy} = '{expression}' is not enabled.")]
    ElementDisabled {
        /// Locator strategy
        strategy: String,
        /// Locator expression
        expression: String,
    },

    /// The open alert carries a different message
    #[error("Expected alert with '{expected}' message but got '{actual}' message.")]
    AlertMismatch {
        /// Expected alert text
        expected: String,
        /// Actual alert text
        actual: String,
    },

    /// An alert appeared when none was expected
    #[error("Alert with '{message}' message appeared.")]
    UnexpectedAlert {
        /// Alert text
        message: String,
    },

    /// An alert was expected but none appeared within the alert timeout
    #[error("Expected alert with '{expected}' message but no alert appeared.")]
    AlertMissing {
        /// Expected alert text
        expected: String,
    },

    /// A select element has no selected option
    #[error("No option is selected in drop down located by {locator}")]
    NoOptionSelected {
        /// Locator of the select element
        locator: String,
    },

    /// A select helper was used on another kind of element
    #[error("Element should have been {expected} but was {actual}")]
    UnexpectedTag {
        /// Expected tag name
        expected: String,
        /// Actual tag name
        actual: String,
    },

    /// A locator template referenced a placeholder that was not supplied
    #[error("Locator template '{template}' needs placeholder {{{index}}} but only {supplied} were supplied")]
    MissingPlaceholder {
        /// Template text
        template: String,
        /// Missing positional index
        index: usize,
        /// Number of placeholders supplied
        supplied: usize,
    },

    /// Session failure that is not part of a wait condition
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PageError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_driver_errors() {
        assert!(DriverError::NoSuchElement {
            locator: "id = 'x'".into()
        }
        .is_transient());
        assert!(DriverError::StaleElement { id: "e1".into() }.is_transient());
        assert!(!DriverError::NoAlertOpen.is_transient());
        assert!(!DriverError::session("gone").is_transient());
    }

    #[test]
    fn test_invalid_selection_lists_every_option() {
        let err = PageError::InvalidSelection {
            requested: "Purple".into(),
            available: vec!["Red".into(), "Green".into(), "Blue".into()],
        };
        let message = err.to_string();
        assert!(message.contains("'Purple'"));
        assert!(message.contains(r#"["Red", "Green", "Blue"]"#));
    }

    #[test]
    fn test_element_disabled_names_locator() {
        let err = PageError::ElementDisabled {
            strategy: "css selector".into(),
            expression: "button#save".into(),
        };
        assert_eq!(
            err.to_string(),
            "Element located by css selector = 'button#save' is not enabled."
        );
    }

    #[test]
    fn test_alert_messages() {
        let mismatch = PageError::AlertMismatch {
            expected: "Saved".into(),
            actual: "Failed".into(),
        };
        assert_eq!(
            mismatch.to_string(),
            "Expected alert with 'Saved' message but got 'Failed' message."
        );

        let unexpected = PageError::UnexpectedAlert {
            message: "Boom".into(),
        };
        assert_eq!(unexpected.to_string(), "Alert with 'Boom' message appeared.");
    }

    #[test]
    fn test_missing_placeholder_message() {
        let err = PageError::MissingPlaceholder {
            template: "tr:nth-child({0}) td:nth-child({1})".into(),
            index: 1,
            supplied: 1,
        };
        assert!(err.to_string().contains("placeholder {1}"));
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let err: PageError = DriverError::session("connection reset").into();
        assert_eq!(err.to_string(), "Session error: connection reset");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_timeout_message() {
        let err = PageError::Timeout {
            waited_for: "element located by id = 'name' to be clickable".into(),
            ms: 250,
        };
        assert!(err.is_timeout());
        assert!(err.to_string().starts_with("Timed out after 250ms"));
    }
}
