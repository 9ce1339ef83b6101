//! # Conductor Approval
//!
//! Human-in-the-loop approval gate. Requests are persisted through an
//! [`ApprovalStore`](conductor_protocols::ApprovalStore) and move exactly once
//! from `pending` to `approved` or `rejected`.
//!
//! - [`ApprovalGate`] - submit, resolve and await requests
//! - [`SqliteApprovalStore`] - durable store surviving restarts
//! - [`MemoryApprovalStore`] - volatile store for tests and demos

mod gate;
mod store;

pub use gate::{ApprovalGate, DEFAULT_RESOLVER};
pub use store::{MemoryApprovalStore, SqliteApprovalStore};
