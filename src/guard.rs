//! Navigation guard — keeps unsaved board edits from being dropped silently.
//!
//! DESIGN
//! ======
//! Two exits are guarded. In-app route changes go through
//! [`NavigationGuard::navigate_with_confirmation`], which parks the target
//! path while the user chooses save, discard, or cancel. Closing the page is
//! covered by the platform's "confirm before leaving" prompt, armed while
//! the board is dirty and disarmed when it is clean.
//!
//! The guard never reads the store itself; callers pass the dirty flag in,
//! which keeps the store exclusively owned by the editing session.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::future::Future;

use tracing::{debug, info};

// =============================================================================
// PLATFORM SEAMS
// =============================================================================

/// Performs an in-app route change.
pub trait Navigator: Send {
    fn navigate(&mut self, path: &str);
}

/// The platform's native "leave this page?" prompt.
pub trait UnloadPrompt: Send {
    fn arm(&mut self);
    fn disarm(&mut self);
}

/// Logs route changes instead of performing them. Used by the CLI.
#[derive(Debug, Default)]
pub struct LoggingNavigator {
    pub last_path: Option<String>,
}

impl Navigator for LoggingNavigator {
    fn navigate(&mut self, path: &str) {
        info!(%path, "navigate");
        self.last_path = Some(path.to_owned());
    }
}

/// For hosts without a page-close event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUnloadPrompt;

impl UnloadPrompt for NoUnloadPrompt {
    fn arm(&mut self) {}
    fn disarm(&mut self) {}
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GuardPhase {
    #[default]
    Idle,
    /// Waiting for the user to save, discard, or cancel.
    Confirming { pending: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    Navigated(String),
    AwaitingConfirmation(String),
}

pub struct NavigationGuard {
    phase: GuardPhase,
    navigator: Box<dyn Navigator>,
    unload: Box<dyn UnloadPrompt>,
    unload_armed: bool,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(navigator: Box<dyn Navigator>, unload: Box<dyn UnloadPrompt>) -> Self {
        Self { phase: GuardPhase::Idle, navigator, unload, unload_armed: false }
    }

    #[must_use]
    pub fn phase(&self) -> &GuardPhase {
        &self.phase
    }

    #[must_use]
    pub fn pending_path(&self) -> Option<&str> {
        match &self.phase {
            GuardPhase::Confirming { pending } => Some(pending),
            GuardPhase::Idle => None,
        }
    }

    #[must_use]
    pub fn is_confirming(&self) -> bool {
        matches!(self.phase, GuardPhase::Confirming { .. })
    }

    #[must_use]
    pub fn unload_armed(&self) -> bool {
        self.unload_armed
    }

    /// Re-arm or disarm the page-close prompt to match `dirty`. Only edges
    /// reach the platform.
    pub fn observe_dirty(&mut self, dirty: bool) {
        if dirty == self.unload_armed {
            return;
        }
        if dirty {
            self.unload.arm();
        } else {
            self.unload.disarm();
        }
        self.unload_armed = dirty;
    }

    /// Navigate now if clean; otherwise park `path` and wait for a decision.
    /// A second request while confirming replaces the parked path.
    pub fn navigate_with_confirmation(&mut self, path: &str, dirty: bool) -> NavigationOutcome {
        if !dirty {
            self.phase = GuardPhase::Idle;
            self.navigator.navigate(path);
            return NavigationOutcome::Navigated(path.to_owned());
        }
        debug!(%path, "navigation held for unsaved changes");
        self.phase = GuardPhase::Confirming { pending: path.to_owned() };
        NavigationOutcome::AwaitingConfirmation(path.to_owned())
    }

    /// Run `save`, then navigate to the parked path whatever the save
    /// outcome. Surfacing a failed save is the save operation's job.
    ///
    /// Returns the path navigated to, or `None` (without polling `save`)
    /// when nothing was parked.
    pub async fn handle_save_and_navigate<F>(&mut self, save: F) -> Option<String>
    where
        F: Future<Output = ()>,
    {
        let GuardPhase::Confirming { pending } = std::mem::take(&mut self.phase) else {
            debug!("save-and-navigate with no pending path");
            return None;
        };
        save.await;
        self.navigator.navigate(&pending);
        Some(pending)
    }

    /// Navigate to the parked path without saving.
    pub fn handle_discard_and_navigate(&mut self) -> Option<String> {
        let GuardPhase::Confirming { pending } = std::mem::take(&mut self.phase) else {
            return None;
        };
        info!(path = %pending, "discarding unsaved board changes");
        self.navigator.navigate(&pending);
        Some(pending)
    }

    /// Stay on the board. Dirty state is untouched.
    pub fn handle_cancel_navigation(&mut self) {
        self.phase = GuardPhase::Idle;
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Shared log of everything the guard asked the platform to do.
    #[derive(Clone, Debug, Default)]
    pub struct PlatformLog {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl PlatformLog {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn navigations(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|event| event.strip_prefix("navigate:").map(str::to_owned))
                .collect()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct RecordingNavigator(PlatformLog);

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, path: &str) {
            self.0.push(format!("navigate:{path}"));
        }
    }

    struct RecordingUnloadPrompt(PlatformLog);

    impl UnloadPrompt for RecordingUnloadPrompt {
        fn arm(&mut self) {
            self.0.push("unload:arm".to_owned());
        }

        fn disarm(&mut self) {
            self.0.push("unload:disarm".to_owned());
        }
    }

    /// A guard wired to a shared [`PlatformLog`].
    pub fn recording_guard() -> (NavigationGuard, PlatformLog) {
        let log = PlatformLog::default();
        let guard =
            NavigationGuard::new(Box::new(RecordingNavigator(log.clone())), Box::new(RecordingUnloadPrompt(log.clone())));
        (guard, log)
    }
}
