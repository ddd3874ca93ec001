//! Native browser dialogs (alert, confirm, prompt, beforeunload).

use serde::{Deserialize, Serialize};

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogType {
    /// Alert dialog (OK button only)
    #[default]
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl DialogType {
    /// Parse the CDP dialog type name
    #[must_use]
    pub fn from_cdp(name: &str) -> Self {
        match name {
            "confirm" => Self::Confirm,
            "prompt" => Self::Prompt,
            "beforeunload" => Self::BeforeUnload,
            _ => Self::Alert,
        }
    }
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// An open browser dialog as reported by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    dialog_type: DialogType,
    message: String,
    default_value: Option<String>,
}

impl Dialog {
    /// Create a new dialog
    #[must_use]
    pub fn new(dialog_type: DialogType, message: impl Into<String>) -> Self {
        Self {
            dialog_type,
            message: message.into(),
            default_value: None,
        }
    }

    /// Create an alert dialog
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(DialogType::Alert, message)
    }

    /// Create a confirm dialog
    #[must_use]
    pub fn confirm(message: impl Into<String>) -> Self {
        Self::new(DialogType::Confirm, message)
    }

    /// Create a prompt dialog
    #[must_use]
    pub fn prompt(message: impl Into<String>, default: Option<String>) -> Self {
        let mut dialog = Self::new(DialogType::Prompt, message);
        dialog.default_value = default;
        dialog
    }

    /// Dialog type
    #[must_use]
    pub const fn dialog_type(&self) -> DialogType {
        self.dialog_type
    }

    /// Dialog message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Default value (prompts only)
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let alert = Dialog::alert("Saved");
        assert_eq!(alert.dialog_type(), DialogType::Alert);
        assert_eq!(alert.message(), "Saved");
        assert!(alert.default_value().is_none());

        let confirm = Dialog::confirm("Delete?");
        assert_eq!(confirm.dialog_type(), DialogType::Confirm);

        let prompt = Dialog::prompt("Name?", Some("anon".into()));
        assert_eq!(prompt.default_value(), Some("anon"));
    }

    #[test]
    fn test_from_cdp() {
        assert_eq!(DialogType::from_cdp("alert"), DialogType::Alert);
        assert_eq!(DialogType::from_cdp("confirm"), DialogType::Confirm);
        assert_eq!(DialogType::from_cdp("prompt"), DialogType::Prompt);
        assert_eq!(DialogType::from_cdp("beforeunload"), DialogType::BeforeUnload);
        assert_eq!(DialogType::from_cdp("unknown"), DialogType::Alert);
    }

    #[test]
    fn test_display_matches_serde() {
        for kind in [
            DialogType::Alert,
            DialogType::Confirm,
            DialogType::Prompt,
            DialogType::BeforeUnload,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
