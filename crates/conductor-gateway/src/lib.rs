//! # Conductor Gateway
//!
//! Routes chat completions across registered LLM providers. A [`ModelRoute`]
//! names the preferred provider and its ordered fallbacks; retryable failures
//! move on to the next provider, non-retryable ones abort the call.

mod error;
mod gateway;
mod route;

pub use error::{GatewayError, ProviderFailure};
pub use gateway::{ActiveModel, GatewayResponse, ModelGateway};
pub use route::ModelRoute;
