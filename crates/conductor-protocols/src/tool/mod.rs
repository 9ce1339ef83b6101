//! Tool protocol definitions.
//!
//! Tools are the way tool-backed agents act on the world. The engine only
//! needs name-based invocation, expressed by [`ToolInvoker`].

mod context;
mod definition;
mod result;
mod traits;

pub use context::*;
pub use definition::*;
pub use result::*;
pub use traits::*;
