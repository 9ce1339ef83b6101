//! Approval store implementations.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryApprovalStore;
pub use sqlite::SqliteApprovalStore;
