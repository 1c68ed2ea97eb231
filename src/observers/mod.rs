//! Event observers.
//!
//! - [`Observe`] is the extension point: implement it to receive every [`Event`](crate::Event).
//! - [`ObserverSet`] fans events out to observers through bounded per-observer queues.
//! - `LogWriter` (feature `logging`) prints events to stdout.

#[cfg(feature = "logging")]
mod log;
mod observer;
mod observer_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::Observe;
pub use observer_set::ObserverSet;
