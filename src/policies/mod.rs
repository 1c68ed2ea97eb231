//! Subscription policies.
//!
//! ## Contents
//! - [`DispatchPolicy`] how a subscription hands messages to its handler
//!   (every message / leading only / latest only)
//!
//! ## Quick wiring
//! ```text
//! SubscribeSpec { key, predicate, handler, leading_only, latest_only }
//!      └─► SubscribeSpec::policy() → DispatchPolicy
//!           └─► combinators::subscribe loop: fork / invoke / cancel-then-fork
//! ```
//!
//! ## Defaults
//! - `DispatchPolicy::Every` (no flag set).

mod dispatch;

pub use dispatch::DispatchPolicy;
