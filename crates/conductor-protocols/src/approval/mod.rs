//! Approval protocol definitions.
//!
//! An approval request is created pending and resolved exactly once, to
//! approved or rejected. The store behind it is the source of truth.

mod store;
mod types;

pub use store::*;
pub use types::*;
