//! Configuration validation.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::schema::{AgentKindConfig, ApprovalBackend, Config, StageKindConfig};

/// Provider kinds the binary knows how to construct.
const KNOWN_PROVIDER_KINDS: [&str; 3] = ["openai", "anthropic", "gemini"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_engine(config, &mut result);
        Self::validate_gateway(config, &mut result);
        Self::validate_providers(config, &mut result);
        Self::validate_approval(config, &mut result);
        Self::validate_agents(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;
        if engine.max_concurrency == 0 {
            result.add_error(ValidationError::new(
                "engine.max_concurrency",
                "max_concurrency must be greater than 0",
            ));
        }

        if engine.task_timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "engine.task_timeout_seconds",
                "task_timeout_seconds must be greater than 0",
            ));
        }

        if engine.workflow_timeout_seconds == Some(0) {
            result.add_error(ValidationError::new(
                "engine.workflow_timeout_seconds",
                "workflow_timeout_seconds must be greater than 0 when set",
            ));
        }

        if engine.memory_max_entries == 0 {
            result.add_error(ValidationError::new(
                "engine.memory_max_entries",
                "memory_max_entries must be greater than 0",
            ));
        }

        if engine.approval_wait_chunk_seconds == 0 {
            result.add_error(ValidationError::new(
                "engine.approval_wait_chunk_seconds",
                "approval_wait_chunk_seconds must be greater than 0",
            ));
        }

        if let Some(dir) = &engine.workflows_dir {
            if !dir.exists() {
                result.add_warning(ValidationWarning::new(
                    "engine.workflows_dir",
                    format!("Workflows directory does not exist: {:?}", dir),
                ));
            }
        }
    }

    fn validate_gateway(config: &Config, result: &mut ValidationResult) {
        if config.gateway.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "gateway.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        match &config.gateway.preferred {
            Some(preferred) => {
                Self::check_route_member(config, "gateway.preferred", preferred, result)
            }
            None if !config.providers.is_empty() => {
                result.add_warning(ValidationWarning::new(
                    "gateway.preferred",
                    "No preferred provider set, agents without a route cannot call a model",
                ));
            }
            None => {}
        }

        for fallback in &config.gateway.fallbacks {
            Self::check_route_member(config, "gateway.fallbacks", fallback, result);
        }
    }

    fn validate_providers(config: &Config, result: &mut ValidationResult) {
        for (name, provider) in &config.providers {
            if !KNOWN_PROVIDER_KINDS.contains(&provider.kind.as_str()) {
                result.add_error(ValidationError::new(
                    format!("providers.{}.kind", name),
                    format!(
                        "Unknown provider kind '{}', valid values: {:?}",
                        provider.kind, KNOWN_PROVIDER_KINDS
                    ),
                ));
            }

            if provider.api_key.is_none() {
                result.add_warning(ValidationWarning::new(
                    format!("providers.{}.api_key", name),
                    "API key is not set, requests will be sent unauthenticated",
                ));
            }

            if let Some(ref url) = provider.base_url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    result.add_error(ValidationError::new(
                        format!("providers.{}.base_url", name),
                        "base_url must start with http:// or https://",
                    ));
                }
            }
        }
    }

    fn validate_approval(config: &Config, result: &mut ValidationResult) {
        if config.approval.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "approval.poll_interval_ms",
                "poll_interval_ms must be greater than 0",
            ));
        }

        if config.approval.backend == ApprovalBackend::Memory {
            result.add_warning(ValidationWarning::new(
                "approval.backend",
                "Memory backend loses pending approvals on restart",
            ));
        }
    }

    fn validate_agents(config: &Config, result: &mut ValidationResult) {
        let mut seen = HashSet::new();
        for (index, agent) in config.agents.iter().enumerate() {
            let path = format!("agents[{}]", index);

            if agent.id.is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.id", path),
                    "Agent id cannot be empty",
                ));
            } else if !seen.insert(agent.id.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.id", path),
                    format!("Duplicate agent id '{}'", agent.id),
                ));
            }

            match agent.kind {
                AgentKindConfig::Llm => {}
                AgentKindConfig::Tool => {
                    if agent.tool.is_none() {
                        result.add_warning(ValidationWarning::new(
                            format!("{}.tool", path),
                            "Tool agent has no default tool, tasks must name one in their input",
                        ));
                    }
                }
                AgentKindConfig::Composite => {
                    if agent.stages.is_empty() {
                        result.add_error(ValidationError::new(
                            format!("{}.stages", path),
                            "Composite agent needs at least one stage",
                        ));
                    }
                    for (stage_index, stage) in agent.stages.iter().enumerate() {
                        if stage.kind == StageKindConfig::Tool && stage.tool.is_none() {
                            result.add_error(ValidationError::new(
                                format!("{}.stages[{}].tool", path, stage_index),
                                "Tool stage must name a tool",
                            ));
                        }
                        if let Some(preferred) = &stage.preferred {
                            Self::check_route_member(
                                config,
                                &format!("{}.stages[{}].preferred", path, stage_index),
                                preferred,
                                result,
                            );
                        }
                    }
                }
            }

            if let Some(preferred) = &agent.preferred {
                Self::check_route_member(config, &format!("{}.preferred", path), preferred, result);
            }
            for fallback in &agent.fallbacks {
                Self::check_route_member(config, &format!("{}.fallbacks", path), fallback, result);
            }
        }
    }

    // Unknown providers in a route are skipped at call time, so this is a warning.
    fn check_route_member(config: &Config, path: &str, provider: &str, result: &mut ValidationResult) {
        if !config.providers.contains_key(provider) {
            result.add_warning(ValidationWarning::new(
                path,
                format!("Provider '{}' is not configured", provider),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
