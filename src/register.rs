//! Provider, tool, agent and workflow registration for Conductor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use conductor_approval::{ApprovalGate, MemoryApprovalStore, SqliteApprovalStore};
use conductor_config::{
    AgentConfig, AgentKindConfig, ApprovalBackend, ApprovalConfig, Config, ConfigError,
    ConfigLoader, ConfigValidator, ProviderConfig, StageConfig, StageKindConfig,
    detect_providers, merge_detected,
};
use conductor_core::{ProviderRegistry, ToolRegistry};
use conductor_engine::{
    Agent, AgentKind, AgentRegistry, AgentServices, EngineConfig, LlmBinding, Stage, ToolBinding,
    WorkflowEngine, load_dir,
};
use conductor_gateway::{ModelGateway, ModelRoute};
use conductor_protocols::approval::ApprovalStore;
use conductor_protocols::provider::LLMProvider;
use conductor_provider_anthropic::AnthropicProvider;
use conductor_provider_gemini::GeminiProvider;
use conductor_provider_openai::OpenAICompatibleProvider;
use conductor_tools_builtin::register_builtin_tools;

use crate::BoxError;

/// Everything the CLI commands and the server share.
pub(crate) struct Runtime {
    pub engine: Arc<WorkflowEngine>,
    pub tools: Arc<ToolRegistry>,
}

/// Build the engine from configuration.
pub(crate) async fn bootstrap(config: &Config) -> Result<Runtime, BoxError> {
    let mut config = config.clone();
    if config.gateway.auto_detect {
        let added = merge_detected(&mut config, detect_providers(|name| std::env::var(name).ok()));
        if !added.is_empty() {
            info!("Detected providers from environment: {:?}", added);
        }
    }
    let config = &config;

    let warnings = ConfigValidator::validate(config)?.into_result()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    let providers = Arc::new(ProviderRegistry::new());
    register_providers(&providers, config);

    let mut gateway = ModelGateway::new(
        providers,
        Duration::from_secs(config.gateway.timeout_seconds),
    );
    if let Some(route) = route_of(config.gateway.preferred.as_deref(), &config.gateway.fallbacks) {
        info!("Default model route: {:?}", route.providers());
        gateway = gateway.with_default_route(route);
    }

    let tools = Arc::new(ToolRegistry::new());
    register_builtin_tools(&tools)?;
    info!("Registered {} tools", tools.len());

    let agents = Arc::new(AgentRegistry::new());
    register_agents(&agents, &config.agents)?;

    let approvals = open_approvals(&config.approval).await?;
    let services = AgentServices::new(Arc::new(gateway), tools.clone());
    let engine = Arc::new(WorkflowEngine::new(
        agents,
        services,
        approvals,
        engine_config(config),
    ));

    if let Some(dir) = &config.engine.workflows_dir {
        let dir = PathBuf::from(ConfigLoader::expand_path(&dir.to_string_lossy()));
        if dir.is_dir() {
            let loaded = load_dir(engine.workflows().as_ref(), &dir).await?;
            info!("Loaded {} workflows from {}", loaded, dir.display());
        } else {
            warn!("Workflows directory {} not found, catalog is empty", dir.display());
        }
    }

    Ok(Runtime { engine, tools })
}

/// Register configured providers, in id order.
///
/// An unset `api_key` falls back to `<ID>_API_KEY` in the environment; local
/// OpenAI-compatible servers usually need none, the native kinds always do.
pub(crate) fn register_providers(registry: &ProviderRegistry, config: &Config) {
    let mut ids: Vec<&String> = config.providers.keys().collect();
    ids.sort();

    for id in ids {
        let Some(provider) = build_provider(id, &config.providers[id]) else {
            continue;
        };
        match registry.register(provider) {
            Ok(()) => info!("Registered provider '{}'", id),
            Err(e) => warn!("Failed to register provider '{}': {}", id, e),
        }
    }

    if registry.is_empty() {
        warn!("No model providers registered. LLM agents will fail until one is configured.");
    }
}

fn build_provider(id: &str, config: &ProviderConfig) -> Option<Arc<dyn LLMProvider>> {
    let api_key = config
        .api_key
        .clone()
        .or_else(|| std::env::var(env_key(id)).ok());
    let base_url = config.base_url.as_deref();
    let model = config.default_model.as_deref();

    let provider: Arc<dyn LLMProvider> = match config.kind.as_str() {
        "openai" => {
            let mut provider = OpenAICompatibleProvider::new(id, api_key);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            if let Some(model) = model {
                provider = provider.with_default_model(model);
            }
            Arc::new(provider)
        }
        "anthropic" => {
            let Some(key) = api_key else {
                warn!("Provider '{}' has no API key, skipping", id);
                return None;
            };
            let mut provider = AnthropicProvider::new(id, key);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            if let Some(model) = model {
                provider = provider.with_default_model(model);
            }
            Arc::new(provider)
        }
        "gemini" => {
            let Some(key) = api_key else {
                warn!("Provider '{}' has no API key, skipping", id);
                return None;
            };
            let mut provider = GeminiProvider::new(id, key);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            if let Some(model) = model {
                provider = provider.with_default_model(model);
            }
            Arc::new(provider)
        }
        other => {
            warn!("Unknown provider kind '{}' for '{}', skipping", other, id);
            return None;
        }
    };
    Some(provider)
}

fn env_key(id: &str) -> String {
    format!("{}_API_KEY", id.to_uppercase().replace('-', "_"))
}

pub(crate) fn register_agents(registry: &AgentRegistry, configs: &[AgentConfig]) -> Result<(), BoxError> {
    for config in configs {
        registry.register(agent_from_config(config)?)?;
    }
    info!("Registered {} agents", registry.len());
    Ok(())
}

pub(crate) fn agent_from_config(config: &AgentConfig) -> Result<Agent, ConfigError> {
    let kind = match config.kind {
        AgentKindConfig::Llm => AgentKind::Llm(llm_binding(
            config.preferred.as_deref(),
            &config.fallbacks,
            config.system_prompt.as_deref(),
        )),
        AgentKindConfig::Tool => AgentKind::Tool(ToolBinding {
            tool: config.tool.clone(),
        }),
        AgentKindConfig::Composite => {
            if config.stages.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("agents.{}.stages", config.id),
                    message: "composite agents need at least one stage".to_string(),
                });
            }
            AgentKind::Composite(config.stages.iter().map(stage_from_config).collect())
        }
    };

    let mut agent = Agent::new(config.id.as_str(), config.display_name(), kind)
        .with_description(config.description.as_str());
    agent.requires_approval = config.requires_approval;
    Ok(agent)
}

fn stage_from_config(stage: &StageConfig) -> Stage {
    match stage.kind {
        StageKindConfig::Llm => Stage::Llm(llm_binding(
            stage.preferred.as_deref(),
            &stage.fallbacks,
            stage.system_prompt.as_deref(),
        )),
        StageKindConfig::Tool => Stage::Tool(ToolBinding {
            tool: stage.tool.clone(),
        }),
    }
}

fn llm_binding(preferred: Option<&str>, fallbacks: &[String], system_prompt: Option<&str>) -> LlmBinding {
    let mut binding = LlmBinding::new();
    if let Some(route) = route_of(preferred, fallbacks) {
        binding = binding.with_route(route);
    }
    if let Some(prompt) = system_prompt {
        binding = binding.with_system_prompt(prompt);
    }
    binding
}

fn route_of(preferred: Option<&str>, fallbacks: &[String]) -> Option<ModelRoute> {
    preferred.map(|p| ModelRoute::new(p).with_fallbacks(fallbacks.iter().cloned()))
}

pub(crate) fn engine_config(config: &Config) -> EngineConfig {
    let engine = &config.engine;
    EngineConfig {
        max_concurrency: engine.max_concurrency,
        task_timeout: Duration::from_secs(engine.task_timeout_seconds),
        workflow_timeout: engine.workflow_timeout_seconds.map(Duration::from_secs),
        approval_wait_chunk: Duration::from_secs(engine.approval_wait_chunk_seconds),
        memory_capacity: engine.memory_max_entries,
        memory_ttl: engine.memory_ttl_seconds.map(Duration::from_secs),
        ..EngineConfig::default()
    }
}

/// Open the approval store named by the config.
pub(crate) async fn open_approvals(config: &ApprovalConfig) -> Result<Arc<ApprovalGate>, BoxError> {
    let store: Arc<dyn ApprovalStore> = match config.backend {
        ApprovalBackend::Memory => Arc::new(MemoryApprovalStore::new()),
        ApprovalBackend::Sqlite => {
            let path = PathBuf::from(ConfigLoader::expand_path(&config.path));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            info!("Approval store: {}", path.display());
            Arc::new(SqliteApprovalStore::open(&path).await?)
        }
    };
    Ok(Arc::new(
        ApprovalGate::new(store).with_poll_interval(Duration::from_millis(config.poll_interval_ms)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_config::ProviderConfig;

    fn agent_config(id: &str, kind: AgentKindConfig) -> AgentConfig {
        AgentConfig {
            id: id.to_string(),
            name: None,
            description: String::new(),
            kind,
            preferred: None,
            fallbacks: Vec::new(),
            system_prompt: None,
            tool: None,
            requires_approval: false,
            stages: Vec::new(),
        }
    }

    #[test]
    fn test_llm_agent_from_config() {
        let mut config = agent_config("writer", AgentKindConfig::Llm);
        config.preferred = Some("primary".to_string());
        config.fallbacks = vec!["backup".to_string()];
        config.system_prompt = Some("Be brief.".to_string());
        config.requires_approval = true;

        let agent = agent_from_config(&config).unwrap();
        assert_eq!(agent.name, "writer");
        assert!(agent.requires_approval);
        match agent.kind {
            AgentKind::Llm(binding) => {
                assert_eq!(binding.route.unwrap().providers(), vec!["primary", "backup"]);
                assert_eq!(binding.system_prompt.as_deref(), Some("Be brief."));
            }
            other => panic!("unexpected kind {}", other.as_str()),
        }
    }

    #[test]
    fn test_composite_agent_from_config() {
        let mut config = agent_config("pipeline", AgentKindConfig::Composite);
        config.stages = vec![
            StageConfig {
                kind: StageKindConfig::Tool,
                tool: Some("echo".to_string()),
                system_prompt: None,
                preferred: None,
                fallbacks: Vec::new(),
            },
            StageConfig {
                kind: StageKindConfig::Llm,
                tool: None,
                system_prompt: None,
                preferred: None,
                fallbacks: Vec::new(),
            },
        ];

        let agent = agent_from_config(&config).unwrap();
        match agent.kind {
            AgentKind::Composite(stages) => {
                assert_eq!(stages.len(), 2);
                assert!(matches!(&stages[0], Stage::Tool(b) if b.tool.as_deref() == Some("echo")));
                assert!(matches!(&stages[1], Stage::Llm(b) if b.route.is_none()));
            }
            other => panic!("unexpected kind {}", other.as_str()),
        }
    }

    #[test]
    fn test_composite_without_stages_rejected() {
        let config = agent_config("empty", AgentKindConfig::Composite);
        assert!(matches!(
            agent_from_config(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_engine_config_conversion() {
        let mut config = Config::default();
        config.engine.max_concurrency = 2;
        config.engine.workflow_timeout_seconds = Some(90);
        config.engine.memory_ttl_seconds = Some(600);

        let engine = engine_config(&config);
        assert_eq!(engine.max_concurrency, 2);
        assert_eq!(engine.task_timeout, Duration::from_secs(60));
        assert_eq!(engine.workflow_timeout, Some(Duration::from_secs(90)));
        assert_eq!(engine.approval_wait_chunk, Duration::from_secs(5));
        assert_eq!(engine.memory_capacity, 1000);
        assert_eq!(engine.memory_ttl, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_register_providers_skips_unknown_kind() {
        let mut config = Config::default();
        config.providers.insert(
            "local".to_string(),
            ProviderConfig {
                base_url: Some("http://localhost:11434/v1".to_string()),
                ..ProviderConfig::default()
            },
        );
        config.providers.insert(
            "odd".to_string(),
            ProviderConfig {
                kind: "carrier-pigeon".to_string(),
                ..ProviderConfig::default()
            },
        );

        let registry = ProviderRegistry::new();
        register_providers(&registry, &config);
        assert!(registry.get("local").is_some());
        assert!(registry.get("odd").is_none());
    }

    #[test]
    fn test_register_native_provider_kinds() {
        let mut config = Config::default();
        for (id, kind) in [("claude", "anthropic"), ("google", "gemini")] {
            config.providers.insert(
                id.to_string(),
                ProviderConfig {
                    kind: kind.to_string(),
                    api_key: Some("key".to_string()),
                    ..ProviderConfig::default()
                },
            );
        }
        config.providers.insert(
            "keyless-test-vendor".to_string(),
            ProviderConfig {
                kind: "anthropic".to_string(),
                ..ProviderConfig::default()
            },
        );

        let registry = ProviderRegistry::new();
        register_providers(&registry, &config);
        assert!(registry.get("claude").is_some());
        assert!(registry.get("google").is_some());
        assert!(registry.get("keyless-test-vendor").is_none());
    }

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("open-router"), "OPEN_ROUTER_API_KEY");
    }

    #[tokio::test]
    async fn test_bootstrap_loads_workflows() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("echo.yaml"),
            "name: echo-twice\ntasks:\n  - id: a\n    agent: echoer\n  - id: b\n    agent: echoer\n    depends_on: [a]\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.gateway.auto_detect = false;
        config.approval.backend = ApprovalBackend::Memory;
        config.engine.workflows_dir = Some(dir.path().to_path_buf());
        let mut echoer = agent_config("echoer", AgentKindConfig::Tool);
        echoer.tool = Some("echo".to_string());
        config.agents.push(echoer);

        let runtime = bootstrap(&config).await.unwrap();
        assert_eq!(runtime.tools.len(), 2);
        assert_eq!(
            runtime.engine.list_workflows().await.unwrap(),
            vec!["echo-twice".to_string()]
        );

        let result = runtime
            .engine
            .run_named("echo-twice", serde_json::json!({}), Default::default())
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_bundled_config_and_workflows() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        let mut config = ConfigLoader::load(&root.join("config/default.toml")).unwrap();
        config.gateway.auto_detect = false;
        config.approval.backend = ApprovalBackend::Memory;
        config.engine.workflows_dir = Some(root.join("workflows"));

        let runtime = bootstrap(&config).await.unwrap();
        assert_eq!(runtime.engine.agents().len(), 4);
        assert_eq!(
            runtime.engine.list_workflows().await.unwrap(),
            vec!["echo-fanout".to_string(), "release-notes".to_string()]
        );

        let result = runtime
            .engine
            .run_named("echo-fanout", serde_json::json!({}), Default::default())
            .await
            .unwrap();
        assert!(result.is_success());
        assert_eq!(result.tasks["start"].result, Some(serde_json::json!("ada")));
        let left = result.tasks["left"].result.clone().unwrap();
        assert_eq!(left["side"], "left");
        assert_eq!(left["dependencies"]["start"], "ada");
    }
}
