//! # Engine configuration.
//!
//! Provides [`Config`] centralized settings for [`TokioEngine`](crate::TokioEngine).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` / `mailbox_capacity = 0` → clamped to 1 by the accessors
//! - `grace = 0s` → shutdown does not wait; any live task is reported as stuck

use std::time::Duration;

/// Global configuration for the engine runtime.
///
/// Defines:
/// - **Shutdown behavior**: grace period for live tasks to settle
/// - **Event system**: bus capacity for event delivery
/// - **Keyed channels**: mailbox ring buffer size
/// - **Fork behavior**: whether forked tasks are polled once on the issuing task
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time [`TokioEngine::shutdown`](crate::TokioEngine::shutdown) waits for
    /// live tasks to settle after the root token is cancelled.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow observers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Capacity of the keyed message channel shared by all receivers.
    ///
    /// A receiver that falls behind more than `mailbox_capacity` messages skips the
    /// oldest ones (and a `MailboxLagged` event is published).
    pub mailbox_capacity: usize,

    /// Poll every forked task once on the issuing task before handing it to tokio.
    ///
    /// - `true`: a task whose body completes without suspending is already finished
    ///   when `fork` returns (Race fast path, Join short-circuit)
    /// - `false`: every forked task starts on the tokio scheduler
    pub eager_fork: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a mailbox capacity clamped to a minimum of 1.
    #[inline]
    pub fn mailbox_capacity_clamped(&self) -> usize {
        self.mailbox_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    /// - `mailbox_capacity = 1024`
    /// - `eager_fork = true`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
            mailbox_capacity: 1024,
            eager_fork: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities_are_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            mailbox_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.mailbox_capacity_clamped(), 1);
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.grace, Duration::from_secs(60));
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
        assert!(cfg.eager_fork);
    }
}
