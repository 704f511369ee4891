//! Toast notifications — the user-visible outcome channel.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: Option<String>) -> Self {
        Self { title: title.into(), description, variant: ToastVariant::Default }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: Some(description.into()), variant: ToastVariant::Destructive }
    }

    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

/// Sink for toasts. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes toasts to the log. Used by the CLI, where there is no toast UI.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        let description = toast.description.as_deref().unwrap_or("");
        match toast.variant {
            ToastVariant::Default => info!(title = %toast.title, %description, "toast"),
            ToastVariant::Destructive => warn!(title = %toast.title, %description, "toast"),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use super::*;

    /// Records every toast for later assertions.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        toasts: Mutex<Vec<Toast>>,
    }

    impl RecordingNotifier {
        pub fn toasts(&self) -> Vec<Toast> {
            self.toasts.lock().unwrap().clone()
        }

        pub fn last(&self) -> Option<Toast> {
            self.toasts.lock().unwrap().last().cloned()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, toast: Toast) {
            self.toasts.lock().unwrap().push(toast);
        }
    }
}
