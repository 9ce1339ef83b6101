use super::*;

#[test]
fn test_tool_result_success() {
    let result = ToolResult::success("OK");
    assert!(result.success);
    assert_eq!(result.content, "OK");
    assert!(result.error.is_none());
    assert!(result.structured_output.is_none());
}

#[test]
fn test_tool_result_success_json() {
    let output = serde_json::json!({"key": "value"});
    let result = ToolResult::success_json("OK", output);
    assert!(result.success);
    assert_eq!(result.structured_output.as_ref().unwrap()["key"], "value");
}

#[test]
fn test_tool_result_error() {
    let result = ToolResult::error("Something went wrong");
    assert!(!result.success);
    assert!(result.content.is_empty());
    assert_eq!(result.error, Some("Something went wrong".to_string()));
}

#[test]
fn test_tool_result_with_metadata() {
    let result = ToolResult::success("OK").with_metadata("duration", serde_json::json!(100));
    assert_eq!(result.metadata.get("duration").unwrap(), &serde_json::json!(100));
}

#[test]
fn test_into_value_prefers_structured_output() {
    let value = ToolResult::success_json("ignored", serde_json::json!({"n": 1})).into_value();
    assert_eq!(value, serde_json::json!({"n": 1}));

    let value = ToolResult::success("plain").into_value();
    assert_eq!(value, serde_json::json!("plain"));
}
