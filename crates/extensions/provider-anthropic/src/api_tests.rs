use super::*;

#[test]
fn test_api_request_skips_unset_fields() {
    let request = ApiRequest {
        model: "claude-3-5-sonnet-20241022".to_string(),
        messages: vec![ApiMessage {
            role: "user",
            content: "Hello".to_string(),
        }],
        system: None,
        max_tokens: 1024,
        temperature: None,
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["max_tokens"], 1024);
    assert_eq!(json["messages"][0]["role"], "user");
    assert!(json.get("system").is_none());
    assert!(json.get("temperature").is_none());
}

#[test]
fn test_api_response_text_joins_text_blocks() {
    let json = serde_json::json!({
        "id": "msg_123",
        "model": "claude-3-5-sonnet-20241022",
        "content": [
            {"type": "text", "text": "Hello"},
            {"type": "tool_use", "id": "toolu_1", "name": "search", "input": {}},
            {"type": "text", "text": " there"}
        ],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    });

    let response: ApiResponse = serde_json::from_value(json).unwrap();
    assert_eq!(response.text(), "Hello there");
    let usage: Usage = response.usage.unwrap().into();
    assert_eq!(usage.total_tokens, 15);
}

#[test]
fn test_error_message_extraction() {
    let body = r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
    assert_eq!(error_message(body), "Overloaded");
    assert_eq!(error_message("upstream reset"), "upstream reset");
}
