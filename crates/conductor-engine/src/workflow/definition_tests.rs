use super::*;
use crate::workflow::{TaskStatus, WorkflowStatus};
use serde_json::json;

const REPORT_YAML: &str = r#"
name: report
description: Research and write a short report
timeout_seconds: 120
tasks:
  - id: research
    agent: researcher
    priority: high
    retry:
      max_attempts: 4
      backoff_seconds: 0.5
    input:
      topic: rust
  - id: write
    name: Write report
    agent: writer
    depends_on: [research]
    optional: true
  - id: publish
    agent: publisher
    depends_on: [write]
    requires_approval: true
    timeout_seconds: 10
"#;

#[test]
fn test_parse_yaml() {
    let definition = WorkflowDefinition::from_yaml_str(REPORT_YAML).unwrap();
    assert_eq!(definition.name, "report");
    assert_eq!(definition.version, "1.0");
    assert_eq!(definition.timeout_seconds, Some(120));
    assert_eq!(definition.tasks.len(), 3);
    assert_eq!(definition.tasks[0].priority, TaskPriority::High);
    assert_eq!(definition.tasks[1].name.as_deref(), Some("Write report"));
    assert!(definition.tasks[1].optional);
    assert!(definition.tasks[2].requires_approval);
    assert_eq!(definition.tasks[2].timeout_seconds, Some(10));

    let retry = definition.tasks[0].retry.as_ref().unwrap();
    assert_eq!(retry.max_attempts, 4);
    assert_eq!(retry.backoff_seconds, 0.5);
    assert_eq!(retry.backoff_multiplier, 2.0);
    assert!(definition.tasks[1].retry.is_none());
}

#[test]
fn test_parse_json() {
    let content = json!({
        "name": "single",
        "tasks": [{"id": "a", "agent": "echo", "input": {"x": 1}}]
    })
    .to_string();
    let definition = WorkflowDefinition::from_json_str(&content).unwrap();
    assert_eq!(definition.tasks[0].input, json!({"x": 1}));
    assert_eq!(definition.tasks[0].priority, TaskPriority::Normal);
}

#[test]
fn test_empty_tasks_rejected() {
    let err = WorkflowDefinition::from_yaml_str("name: nothing\ntasks: []\n").unwrap_err();
    assert!(matches!(err, WorkflowError::EmptyWorkflow(name) if name == "nothing"));
}

#[test]
fn test_missing_agent_rejected() {
    let err = WorkflowDefinition::from_yaml_str("name: x\ntasks:\n  - id: a\n").unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidDefinition(_)));
}

#[test]
fn test_instantiate() {
    let definition = WorkflowDefinition::from_yaml_str(REPORT_YAML).unwrap();
    let first = definition.instantiate(json!({"audience": "ops"}));
    let second = definition.instantiate(Value::Null);

    assert_ne!(first.id, second.id);
    assert_eq!(first.status, WorkflowStatus::Pending);
    assert_eq!(first.timeout_secs, Some(120));
    assert_eq!(first.inputs, json!({"audience": "ops"}));
    assert_eq!(second.inputs, json!({}));

    let research = first.task("research").unwrap();
    assert_eq!(research.name, "research");
    assert_eq!(research.agent_id, "researcher");
    assert_eq!(research.status, TaskStatus::Pending);
    assert_eq!(research.input, json!({"topic": "rust"}));
    assert_eq!(research.max_retries(), 3);
    assert_eq!(research.retry_count, 0);

    let write = first.task("write").unwrap();
    assert_eq!(write.name, "Write report");
    assert_eq!(write.depends_on, vec!["research".to_string()]);
}

#[test]
fn test_from_path_picks_format() {
    let dir = tempfile::tempdir().unwrap();
    let yaml_path = dir.path().join("report.yaml");
    std::fs::write(&yaml_path, REPORT_YAML).unwrap();
    let json_path = dir.path().join("single.json");
    std::fs::write(&json_path, r#"{"name":"single","tasks":[{"id":"a","agent":"echo"}]}"#).unwrap();

    assert_eq!(WorkflowDefinition::from_path(&yaml_path).unwrap().name, "report");
    assert_eq!(WorkflowDefinition::from_path(&json_path).unwrap().name, "single");

    let missing = dir.path().join("missing.yaml");
    let err = WorkflowDefinition::from_path(&missing).unwrap_err();
    assert!(err.to_string().contains("missing.yaml"));
}
