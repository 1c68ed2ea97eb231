//! # Descriptor trees.
//!
//! - [`Node`] - leaf / ordered / keyed tagged variant shared by effects, handles and results
//! - [`Key`] - index or name of a child

mod key;
mod node;

pub use key::Key;
pub use node::Node;
