use serde::Serialize;

pub const SUCCESS_BANNER: &str = "Message sent successfully! We'll get back to you soon.";
pub const NON_JSON_ERROR: &str = "Server error - check terminal for details";
pub const FALLBACK_ERROR: &str = "Failed to send message";

/// The one outcome shown to the visitor at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl Outcome {
    pub fn is_loading(&self) -> bool {
        matches!(self, Outcome::Loading)
    }

    /// Banner text for the outcome, if any is shown.
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success => Some(SUCCESS_BANNER),
            Outcome::Error(message) => Some(message),
            Outcome::Idle | Outcome::Loading => None,
        }
    }

    /// Label of the submit affordance.
    pub fn button_label(&self) -> &'static str {
        if self.is_loading() {
            "Sending..."
        } else {
            "Send Message"
        }
    }
}
