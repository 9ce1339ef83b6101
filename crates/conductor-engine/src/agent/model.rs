//! Agent data types.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use conductor_gateway::{ModelGateway, ModelRoute};
use conductor_protocols::tool::ToolInvoker;

/// LLM-backed execution.
#[derive(Debug, Clone, Default)]
pub struct LlmBinding {
    /// Overrides the gateway's process-wide route.
    pub route: Option<ModelRoute>,
    pub system_prompt: Option<String>,
}

impl LlmBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, route: ModelRoute) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

/// Tool-backed execution.
#[derive(Debug, Clone, Default)]
pub struct ToolBinding {
    /// Default tool, overridable by the task input's `tool` field.
    pub tool: Option<String>,
}

impl ToolBinding {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: Some(tool.into()),
        }
    }
}

/// One step of a composite agent.
#[derive(Debug, Clone)]
pub enum Stage {
    Llm(LlmBinding),
    Tool(ToolBinding),
}

#[derive(Debug, Clone)]
pub enum AgentKind {
    Llm(LlmBinding),
    Tool(ToolBinding),
    /// Stages run in order, each fed the previous stage's output.
    Composite(Vec<Stage>),
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm(_) => "llm",
            Self::Tool(_) => "tool",
            Self::Composite(_) => "composite",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: AgentKind,
    /// Every task run by this agent needs human sign-off first.
    pub requires_approval: bool,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: AgentKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
            requires_approval: false,
        }
    }

    pub fn llm(id: impl Into<String>, binding: LlmBinding) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, AgentKind::Llm(binding))
    }

    pub fn tool(id: impl Into<String>, tool: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, AgentKind::Tool(ToolBinding::new(tool)))
    }

    pub fn composite(id: impl Into<String>, stages: Vec<Stage>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, AgentKind::Composite(stages))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    pub fn summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind.as_str(),
            requires_approval: self.requires_approval,
        }
    }
}

/// Serializable view of a registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: &'static str,
    pub requires_approval: bool,
}

/// What an agent is asked to do for one dispatch of a task.
#[derive(Debug, Clone)]
pub struct TaskInvocation {
    pub task_id: String,
    pub task_name: String,
    pub description: String,
    pub input: Value,
    /// Workflow inputs, dependency results and notes.
    pub context: Value,
    pub requires_approval: bool,
    /// Set when the task is re-dispatched after an approval.
    pub approval_granted: bool,
}

impl TaskInvocation {
    pub fn new(task_id: impl Into<String>, task_name: impl Into<String>, input: Value) -> Self {
        Self {
            task_id: task_id.into(),
            task_name: task_name.into(),
            description: String::new(),
            input,
            context: Value::Object(Default::default()),
            requires_approval: false,
            approval_granted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Success {
        output: Value,
        /// Provider that served the LLM call, if any.
        provider: Option<String>,
    },
    Failure(String),
    NeedsApproval {
        action: String,
        payload: Value,
    },
}

/// Collaborators an agent may call.
#[derive(Clone)]
pub struct AgentServices {
    pub gateway: Arc<ModelGateway>,
    pub tools: Arc<dyn ToolInvoker>,
}

impl AgentServices {
    pub fn new(gateway: Arc<ModelGateway>, tools: Arc<dyn ToolInvoker>) -> Self {
        Self { gateway, tools }
    }
}
