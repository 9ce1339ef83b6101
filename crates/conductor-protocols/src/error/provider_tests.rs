use super::*;

#[test]
fn test_provider_error_not_found() {
    let err = ProviderError::NotFound("test_provider".to_string());
    assert!(err.to_string().contains("Provider not found"));
}

#[test]
fn test_provider_error_api_error() {
    let err = ProviderError::ApiError {
        status: 500,
        message: "Internal Server Error".to_string(),
    };
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("Internal Server Error"));
}

#[test]
fn test_provider_error_rate_limited() {
    let err = ProviderError::RateLimited {
        retry_after_seconds: 60,
    };
    assert!(err.to_string().contains("Rate limited"));
    assert!(err.to_string().contains("60"));
}

#[test]
fn test_provider_error_context_length() {
    let err = ProviderError::ContextLengthExceeded {
        used: 150000,
        max: 128000,
    };
    assert!(err.to_string().contains("150000"));
    assert!(err.to_string().contains("128000"));
}

#[test]
fn test_provider_error_timeout() {
    let err = ProviderError::Timeout { after_ms: 250 };
    assert!(err.to_string().contains("Timeout"));
    assert!(err.to_string().contains("250"));
}

#[test]
fn test_from_api_response_auth_failed() {
    let err = ProviderError::from_api_response(401, "Invalid API key".to_string());
    assert!(matches!(err, ProviderError::AuthenticationFailed(_)));

    let err = ProviderError::from_api_response(403, "Forbidden".to_string());
    assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
}

#[test]
fn test_from_api_response_rate_limited() {
    let err = ProviderError::from_api_response(429, "Rate limit exceeded".to_string());
    assert!(matches!(err, ProviderError::RateLimited { .. }));
}

#[test]
fn test_from_api_response_model_not_found() {
    let err = ProviderError::from_api_response(404, "model `gpt-9` does not exist".to_string());
    assert!(matches!(err, ProviderError::ModelNotFound(_)));
}

#[test]
fn test_from_api_response_token_exceed() {
    let err = ProviderError::from_api_response(
        400,
        "Total tokens exceed the maximum limit".to_string(),
    );
    assert!(matches!(err, ProviderError::ContextLengthExceeded { .. }));
}

#[test]
fn test_from_api_response_context_length() {
    let err = ProviderError::from_api_response(
        400,
        "This model's maximum context length is 128000".to_string(),
    );
    assert!(matches!(err, ProviderError::ContextLengthExceeded { .. }));
}

#[test]
fn test_from_api_response_content_filtered() {
    let err = ProviderError::from_api_response(400, "Content filter triggered".to_string());
    assert!(matches!(err, ProviderError::ContentFiltered(_)));

    let err = ProviderError::from_api_response(
        400,
        "Response blocked by safety settings".to_string(),
    );
    assert!(matches!(err, ProviderError::ContentFiltered(_)));
}

#[test]
fn test_from_api_response_invalid_request() {
    let err = ProviderError::from_api_response(400, "messages: field required".to_string());
    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}

#[test]
fn test_from_api_response_generic_error() {
    let err = ProviderError::from_api_response(503, "Service Unavailable".to_string());
    assert!(matches!(err, ProviderError::ApiError { status: 503, .. }));
}

#[test]
fn test_is_retryable() {
    assert!(ProviderError::RateLimited { retry_after_seconds: 5 }.is_retryable());
    assert!(ProviderError::ContextLengthExceeded { used: 0, max: 0 }.is_retryable());
    assert!(ProviderError::Network("err".to_string()).is_retryable());
    assert!(ProviderError::Timeout { after_ms: 30 }.is_retryable());
    assert!(ProviderError::NotFound("p9".to_string()).is_retryable());
    assert!(ProviderError::ApiError { status: 502, message: "bad gateway".to_string() }.is_retryable());
    assert!(ProviderError::ApiError { status: 529, message: "overloaded".to_string() }.is_retryable());

    assert!(!ProviderError::AuthenticationFailed("err".to_string()).is_retryable());
    assert!(!ProviderError::InvalidRequest("err".to_string()).is_retryable());
    assert!(!ProviderError::ContentFiltered("err".to_string()).is_retryable());
    assert!(!ProviderError::ApiError { status: 418, message: "teapot".to_string() }.is_retryable());
}

#[test]
fn test_is_context_length_error() {
    assert!(ProviderError::ContextLengthExceeded { used: 0, max: 0 }.is_context_length_error());
    assert!(!ProviderError::RateLimited { retry_after_seconds: 0 }.is_context_length_error());
    assert!(!ProviderError::Network("err".to_string()).is_context_length_error());
}
