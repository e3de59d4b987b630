//! Caller decision callbacks.
//!
//! The engine never talks to a human directly. The presentation layer
//! injects a [`DecisionHandler`] and the orchestrator consults it at
//! the two human-in-the-loop gates: proceeding without a primary key,
//! and forcing a lossy type cast.

/// Decision and notification callbacks supplied by the caller.
pub trait DecisionHandler {
    /// Synchronous yes/no decision. Blocks until answered.
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Fire-and-forget report of a successful outcome.
    fn notify_info(&self, message: &str);

    /// Fire-and-forget report of a failure.
    fn notify_error(&self, message: &str);
}

/// Answers yes to every question and discards notifications. Useful
/// for non-interactive callers that accept lossy operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAll;

impl DecisionHandler for ApproveAll {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        true
    }

    fn notify_info(&self, _message: &str) {}

    fn notify_error(&self, _message: &str) {}
}
