//! UI surfaces the row-action executor reports to.

use serde::Serialize;

/// Severity of a transient notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Alert class used by the console's notification styles.
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Error => "danger",
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Info => "info",
        }
    }
}

/// Notification shown by the feedback channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub message: String,
    pub severity: Severity,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Transient, auto-dismissing notification surface.
pub trait FeedbackChannel {
    fn notify(&self, feedback: Feedback);
}

/// Texts of a blocking yes/no prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmRequest {
    pub title: String,
    pub content: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

/// Modal confirmation dialog. The user's answer comes back to the executor
/// as a `confirm` or `cancel` call.
pub trait ConfirmationSurface {
    fn open(&self, request: ConfirmRequest);
    /// Shows a failure inside the open dialog so the user can retry.
    fn show_error(&self, message: &str);
    fn close(&self);
}

/// Feedback channel writing to the log, for headless hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFeedback;

impl FeedbackChannel for LogFeedback {
    fn notify(&self, feedback: Feedback) {
        match feedback.severity {
            Severity::Error => log::error!("{}", feedback.message),
            Severity::Warning => log::warn!("{}", feedback.message),
            Severity::Success | Severity::Info => log::info!("{}", feedback.message),
        }
    }
}
