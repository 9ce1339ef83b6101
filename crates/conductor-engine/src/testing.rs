//! Scripted collaborators for engine tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use conductor_core::ProviderRegistry;
use conductor_gateway::{ModelGateway, ModelRoute};
use conductor_protocols::error::{ProviderError, ToolError};
use conductor_protocols::provider::{CompletionRequest, CompletionResponse, LLMProvider};
use conductor_protocols::tool::ToolInvoker;
use conductor_protocols::types::{Message, RiskLevel, Usage};

use crate::agent::AgentServices;

pub(crate) const CALL_TIMEOUT: Duration = Duration::from_millis(100);

pub(crate) enum Behavior {
    Reply(String),
    Fail(ProviderError),
    Hang,
}

pub(crate) struct ScriptedProvider {
    id: String,
    behavior: Behavior,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub(crate) fn new(id: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn reply(id: &str, text: &str) -> Arc<Self> {
        Self::new(id, Behavior::Reply(text.to_string()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_prompt(&self) -> Option<Vec<Message>> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.messages.clone());
        match &self.behavior {
            Behavior::Reply(text) => Ok(CompletionResponse {
                id: format!("{}-1", self.id),
                model: request.model_or(self.default_model()).to_string(),
                message: Message::assistant(text.clone()),
                finish_reason: Some("stop".to_string()),
                usage: Usage::default(),
                metadata: Default::default(),
            }),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(ProviderError::Network("unreachable".to_string()))
            }
        }
    }
}

/// Tool invoker that records calls.
///
/// `fail` always errors, `explode` panics, `sleep` waits `ms` milliseconds,
/// `flaky` errors on its first `failures` calls, and every other tool
/// answers `{"tool": name, "arguments": args}`.
/// A call counts as completed once the tool body has run to the end.
#[derive(Default)]
pub(crate) struct RecordingTools {
    calls: Mutex<Vec<(String, Value)>>,
    completed: Mutex<Vec<String>>,
    risks: HashMap<String, RiskLevel>,
}

impl RecordingTools {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_risky(tools: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            risks: tools
                .iter()
                .map(|t| (t.to_string(), RiskLevel::High))
                .collect(),
            ..Default::default()
        })
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub(crate) fn completed(&self) -> Vec<String> {
        self.completed.lock().clone()
    }
}

#[async_trait]
impl ToolInvoker for RecordingTools {
    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let attempt = {
            let mut calls = self.calls.lock();
            calls.push((name.to_string(), arguments.clone()));
            calls.iter().filter(|(tool, _)| tool == name).count() as u64
        };
        let result = match name {
            "fail" => Err(ToolError::ExecutionFailed("boom".to_string())),
            "flaky" => {
                let failures = arguments.get("failures").and_then(Value::as_u64).unwrap_or(0);
                if attempt <= failures {
                    Err(ToolError::ExecutionFailed(format!("flaky attempt {}", attempt)))
                } else {
                    Ok(json!({ "attempt": attempt }))
                }
            }
            "explode" => panic!("tool exploded"),
            "sleep" => {
                let ms = arguments.get("ms").and_then(Value::as_u64).unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(json!({ "slept_ms": ms }))
            }
            _ => Ok(json!({ "tool": name, "arguments": arguments })),
        };
        self.completed.lock().push(name.to_string());
        result
    }

    fn risk_level(&self, name: &str) -> Option<RiskLevel> {
        self.risks.get(name).copied()
    }
}

pub(crate) fn services_with(
    providers: &[Arc<ScriptedProvider>],
    default_route: Option<ModelRoute>,
    tools: Arc<RecordingTools>,
) -> AgentServices {
    let registry = Arc::new(ProviderRegistry::new());
    for provider in providers {
        registry.register(provider.clone()).unwrap();
    }
    let mut gateway = ModelGateway::new(registry, CALL_TIMEOUT);
    if let Some(route) = default_route {
        gateway = gateway.with_default_route(route);
    }
    AgentServices::new(Arc::new(gateway), tools)
}
