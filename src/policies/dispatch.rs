//! # Subscription dispatch policy
//!
//! A subscription receives matching messages in a loop and hands each one to its
//! handler. The dispatch policy decides how a new message interacts with handler
//! runs that are still in flight.
//!
//! ## Variants
//! - `Every`: **Fork** a handler task per message; runs may overlap.
//! - `LeadingOnly`: **Invoke** the handler and wait; messages queued meanwhile are discarded.
//! - `LatestOnly`: **Cancel** the previous run (waiting for its teardown), then fork the new one.
//!
//! ## Invariants
//! - Under `LeadingOnly` at most one handler run exists at any instant.
//! - Under `LatestOnly` at most one handler run is live after each dispatch.

/// Policy controlling how a subscription dispatches messages to its handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Fork a handler task per message.
    ///
    /// Use when:
    /// - Every message must be handled
    /// - Handlers are independent
    /// - Example: audit log writer
    #[default]
    Every,

    /// Handle one message at a time, ignoring messages that arrive while busy.
    ///
    /// Use when:
    /// - Repeated triggers should collapse into the running one
    /// - Example: "save" button debouncing
    LeadingOnly,

    /// Keep only the newest handler run.
    ///
    /// Use when:
    /// - New input invalidates the previous computation
    /// - Example: search-as-you-type
    LatestOnly,
}

impl DispatchPolicy {
    /// Short stable label (snake_case) for events and logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchPolicy::Every => "every",
            DispatchPolicy::LeadingOnly => "leading_only",
            DispatchPolicy::LatestOnly => "latest_only",
        }
    }
}
