//! HTTP endpoints.

pub mod monitoring;
pub mod routes;

pub(crate) mod agents;
pub(crate) mod approvals;
pub(crate) mod tools;
pub(crate) mod workflows;
