//! Agent execution.

use serde_json::{Value, json};
use tracing::debug;

use conductor_gateway::GatewayError;
use conductor_protocols::provider::CompletionRequest;
use conductor_protocols::types::{Message, RiskLevel};

use super::model::{Agent, AgentKind, AgentOutcome, AgentServices, LlmBinding, Stage, TaskInvocation, ToolBinding};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

struct StageOutput {
    output: Value,
    provider: Option<String>,
}

impl Agent {
    /// Run one dispatch of a task.
    ///
    /// Asks for approval before doing anything when the agent or task
    /// requires it, or when a tool it would call is high risk, unless the
    /// invocation already carries a granted approval.
    pub async fn run(&self, invocation: &TaskInvocation, services: &AgentServices) -> AgentOutcome {
        if !invocation.approval_granted {
            if let Some(action) = self.approval_action(invocation, services) {
                debug!("Agent {} needs approval for {}", self.id, action);
                return AgentOutcome::NeedsApproval {
                    action,
                    payload: with_context(invocation.input.clone(), &invocation.context),
                };
            }
        }

        debug!("Agent {} running task {}", self.id, invocation.task_id);
        let result = match &self.kind {
            AgentKind::Llm(binding) => run_llm(binding, invocation, None, services).await,
            AgentKind::Tool(binding) => match resolve_tool(binding, &invocation.input) {
                Some(tool) => {
                    let arguments = with_context(tool_arguments(&invocation.input), &invocation.context);
                    run_tool(&tool, arguments, services).await
                }
                None => Err(format!("no tool configured for agent {}", self.id)),
            },
            AgentKind::Composite(stages) => self.run_stages(stages, invocation, services).await,
        };

        match result {
            Ok(stage) => AgentOutcome::Success {
                output: stage.output,
                provider: stage.provider,
            },
            Err(reason) => AgentOutcome::Failure(reason),
        }
    }

    async fn run_stages(
        &self,
        stages: &[Stage],
        invocation: &TaskInvocation,
        services: &AgentServices,
    ) -> Result<StageOutput, String> {
        if stages.is_empty() {
            return Err(format!("agent {} has no stages", self.id));
        }

        let mut previous: Option<Value> = None;
        let mut provider = None;
        for (i, stage) in stages.iter().enumerate() {
            let result = match stage {
                Stage::Llm(binding) => run_llm(binding, invocation, previous.as_ref(), services).await,
                Stage::Tool(binding) => match &binding.tool {
                    Some(tool) => {
                        // A later stage works on its predecessor's output alone.
                        let arguments = match &previous {
                            Some(output) => tool_arguments(output),
                            None => with_context(tool_arguments(&invocation.input), &invocation.context),
                        };
                        run_tool(tool, arguments, services).await
                    }
                    None => Err("no tool configured".to_string()),
                },
            };
            let output = result.map_err(|reason| format!("stage {} failed: {}", i + 1, reason))?;
            if output.provider.is_some() {
                provider = output.provider;
            }
            previous = Some(output.output);
        }

        Ok(StageOutput {
            output: previous.unwrap_or(Value::Null),
            provider,
        })
    }

    fn approval_action(&self, invocation: &TaskInvocation, services: &AgentServices) -> Option<String> {
        if self.requires_approval || invocation.requires_approval {
            return Some(invocation.task_name.clone());
        }
        self.tool_names(invocation)
            .into_iter()
            .find(|tool| services.tools.risk_level(tool) == Some(RiskLevel::High))
    }

    fn tool_names(&self, invocation: &TaskInvocation) -> Vec<String> {
        match &self.kind {
            AgentKind::Llm(_) => Vec::new(),
            AgentKind::Tool(binding) => resolve_tool(binding, &invocation.input).into_iter().collect(),
            AgentKind::Composite(stages) => stages
                .iter()
                .filter_map(|stage| match stage {
                    Stage::Tool(binding) => binding.tool.clone(),
                    Stage::Llm(_) => None,
                })
                .collect(),
        }
    }
}

async fn run_llm(
    binding: &LlmBinding,
    invocation: &TaskInvocation,
    previous: Option<&Value>,
    services: &AgentServices,
) -> Result<StageOutput, String> {
    let system = binding.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let messages = vec![
        Message::system(system),
        Message::user(user_prompt(invocation, previous)),
    ];

    let route = binding
        .route
        .as_ref()
        .or(services.gateway.default_route())
        .ok_or_else(|| GatewayError::NoProviders.to_string())?;
    let response = services
        .gateway
        .complete(CompletionRequest::new(messages), route)
        .await
        .map_err(|e| e.to_string())?;

    Ok(StageOutput {
        output: parse_output(response.text()),
        provider: Some(response.provider),
    })
}

async fn run_tool(tool: &str, arguments: Value, services: &AgentServices) -> Result<StageOutput, String> {
    let output = services
        .tools
        .invoke(tool, arguments)
        .await
        .map_err(|e| e.to_string())?;
    Ok(StageOutput {
        output,
        provider: None,
    })
}

/// The task input's `tool` field wins over the agent's default tool.
fn resolve_tool(binding: &ToolBinding, input: &Value) -> Option<String> {
    input
        .get("tool")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| binding.tool.clone())
}

/// The input's `arguments` object, or the whole input minus `tool`.
fn tool_arguments(input: &Value) -> Value {
    if let Some(arguments) = input.get("arguments") {
        return arguments.clone();
    }
    match input {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove("tool");
            Value::Object(map)
        }
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    }
}

/// Fold the workflow inputs and dependency results into a task's own
/// object. Keys the task sets itself win; dependency results sit under
/// `dependencies`, keyed by task name.
fn with_context(own: Value, context: &Value) -> Value {
    let mut merged = serde_json::Map::new();
    if let Some(inputs) = context.pointer("/workflow/inputs").and_then(Value::as_object) {
        merged.extend(inputs.clone());
    }
    if let Some(dependencies) = context.get("dependencies").and_then(Value::as_object) {
        if !dependencies.is_empty() {
            merged.insert("dependencies".to_string(), Value::Object(dependencies.clone()));
        }
    }

    match own {
        Value::Object(map) => {
            merged.extend(map);
            Value::Object(merged)
        }
        Value::Null => Value::Object(merged),
        other if merged.is_empty() => other,
        other => {
            merged.insert("input".to_string(), other);
            Value::Object(merged)
        }
    }
}

fn user_prompt(invocation: &TaskInvocation, previous: Option<&Value>) -> String {
    let mut lines = vec![format!("Task: {}", invocation.task_name)];
    if !invocation.description.is_empty() {
        lines.push(format!("Description: {}", invocation.description));
    }
    if !is_blank(&invocation.input) {
        lines.push(format!("Input: {}", invocation.input));
    }
    if !is_blank(&invocation.context) {
        lines.push(format!("Context: {}", invocation.context));
    }
    if let Some(previous) = previous {
        lines.push(format!("Previous stage output: {}", previous));
    }
    lines.join("\n")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// JSON documents are kept as-is; anything else is wrapped as `{"text": ...}`.
fn parse_output(text: &str) -> Value {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) if value.is_object() || value.is_array() => value,
        _ => json!({ "text": text }),
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
