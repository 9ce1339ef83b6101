//! Workflow definition files (YAML or JSON).

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{RetryPolicy, Task, TaskPriority, Workflow};
use crate::error::WorkflowError;

fn default_version() -> String {
    "1.0".to_string()
}

/// A reusable workflow template. Each run instantiates a fresh [`Workflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    pub tasks: Vec<TaskDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    /// Defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    pub agent: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub input: Value,
}

impl WorkflowDefinition {
    pub fn from_yaml_str(content: &str) -> Result<Self, WorkflowError> {
        let definition: Self = serde_yml::from_str(content)
            .map_err(|e| WorkflowError::InvalidDefinition(e.to_string()))?;
        definition.check()?;
        Ok(definition)
    }

    pub fn from_json_str(content: &str) -> Result<Self, WorkflowError> {
        let definition: Self = serde_json::from_str(content)
            .map_err(|e| WorkflowError::InvalidDefinition(e.to_string()))?;
        definition.check()?;
        Ok(definition)
    }

    /// Load a definition, picking the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, WorkflowError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WorkflowError::InvalidDefinition(format!("{}: {}", path.display(), e))
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.map_err(|e| match e {
            WorkflowError::InvalidDefinition(msg) => {
                WorkflowError::InvalidDefinition(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    fn check(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::InvalidDefinition(
                "workflow name must not be empty".to_string(),
            ));
        }
        if self.tasks.is_empty() {
            return Err(WorkflowError::EmptyWorkflow(self.name.clone()));
        }
        Ok(())
    }

    /// Build a runnable workflow with a fresh id.
    pub fn instantiate(&self, inputs: Value) -> Workflow {
        let inputs = if inputs.is_null() {
            Value::Object(Default::default())
        } else {
            inputs
        };
        let mut workflow = Workflow::new(&self.name)
            .with_description(&self.description)
            .with_inputs(inputs);
        workflow.timeout_secs = self.timeout_seconds;
        workflow.tasks = self.tasks.iter().map(TaskDefinition::to_task).collect();
        workflow
    }
}

impl TaskDefinition {
    fn to_task(&self) -> Task {
        let mut task = Task::new(
            &self.id,
            self.name.as_deref().unwrap_or(&self.id),
            &self.agent,
        )
        .with_description(&self.description)
        .with_priority(self.priority)
        .depends_on(self.depends_on.iter().cloned())
        .with_input(self.input.clone());
        task.optional = self.optional;
        task.requires_approval = self.requires_approval;
        task.timeout_secs = self.timeout_seconds;
        task.retry = self.retry.clone();
        task
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
