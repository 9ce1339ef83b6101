//! Tool invocation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Tool execution timed out after {0} seconds")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_not_found() {
        let err = ToolError::NotFound("test_tool".to_string());
        assert!(err.to_string().contains("Tool not found"));
        assert!(err.to_string().contains("test_tool"));
    }

    #[test]
    fn test_tool_error_invalid_arguments() {
        let err = ToolError::InvalidArguments("missing field `path`".to_string());
        assert!(err.to_string().contains("Invalid arguments"));
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_tool_error_execution_failed() {
        let err = ToolError::ExecutionFailed("Something went wrong".to_string());
        assert!(err.to_string().contains("execution failed"));
    }

    #[test]
    fn test_tool_error_timeout() {
        let err = ToolError::Timeout(30);
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("30"));
    }
}
