//! Common types used across Conductor.

mod common;
mod message;

pub use common::*;
pub use message::*;
