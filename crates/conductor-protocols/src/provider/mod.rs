//! LLM Provider protocol definitions.
//!
//! Providers connect to model APIs and serve chat completions. The model
//! gateway routes requests across providers.

mod request;
mod response;
mod traits;

pub use request::*;
pub use response::*;
pub use traits::*;
