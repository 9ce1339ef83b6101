//! Provider discovery from API keys in the environment.
//!
//! Each known vendor is matched by its `<VENDOR>_API_KEY` variable and a
//! shape check on the key. Matches become provider entries that the
//! gateway can route to without any `[providers]` table.

use crate::schema::{Config, ProviderConfig};

/// A provider found through its API key.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedProvider {
    pub id: String,
    pub kind: String,
    pub default_model: String,
    pub base_url: Option<String>,
    pub api_key: String,
    /// Lower sorts first.
    pub priority: u8,
}

struct KnownVendor {
    id: &'static str,
    env: &'static str,
    kind: &'static str,
    default_model: &'static str,
    base_url: Option<&'static str>,
    accepts: fn(&str) -> bool,
}

fn long_enough(key: &str) -> bool {
    key.len() > 10
}

const KNOWN_VENDORS: [KnownVendor; 10] = [
    KnownVendor {
        id: "openai",
        env: "OPENAI_API_KEY",
        kind: "openai",
        default_model: "gpt-4o",
        base_url: None,
        accepts: |k| k.starts_with("sk-") && !k.contains("ant"),
    },
    KnownVendor {
        id: "anthropic",
        env: "ANTHROPIC_API_KEY",
        kind: "anthropic",
        default_model: "claude-3-5-sonnet-20241022",
        base_url: None,
        accepts: |k| k.starts_with("sk-ant-"),
    },
    KnownVendor {
        id: "gemini",
        env: "GEMINI_API_KEY",
        kind: "gemini",
        default_model: "gemini-1.5-pro",
        base_url: None,
        accepts: |k| k.starts_with("AIza"),
    },
    KnownVendor {
        id: "groq",
        env: "GROQ_API_KEY",
        kind: "openai",
        default_model: "llama-3.1-70b-versatile",
        base_url: Some("https://api.groq.com/openai/v1"),
        accepts: |k| k.starts_with("gsk_"),
    },
    KnownVendor {
        id: "mistral",
        env: "MISTRAL_API_KEY",
        kind: "openai",
        default_model: "mistral-large-latest",
        base_url: Some("https://api.mistral.ai/v1"),
        accepts: long_enough,
    },
    KnownVendor {
        id: "cohere",
        env: "COHERE_API_KEY",
        kind: "openai",
        default_model: "command-r-plus",
        base_url: Some("https://api.cohere.ai/compatibility/v1"),
        accepts: long_enough,
    },
    KnownVendor {
        id: "together",
        env: "TOGETHER_API_KEY",
        kind: "openai",
        default_model: "meta-llama/Llama-3-70b-chat-hf",
        base_url: Some("https://api.together.xyz/v1"),
        accepts: long_enough,
    },
    KnownVendor {
        id: "perplexity",
        env: "PERPLEXITY_API_KEY",
        kind: "openai",
        default_model: "llama-3.1-sonar-large-128k-online",
        base_url: Some("https://api.perplexity.ai"),
        accepts: |k| k.starts_with("pplx-"),
    },
    KnownVendor {
        id: "fireworks",
        env: "FIREWORKS_API_KEY",
        kind: "openai",
        default_model: "accounts/fireworks/models/llama-v3p1-70b-instruct",
        base_url: Some("https://api.fireworks.ai/inference/v1"),
        accepts: |k| k.starts_with("fw_"),
    },
    KnownVendor {
        id: "deepseek",
        env: "DEEPSEEK_API_KEY",
        kind: "openai",
        default_model: "deepseek-chat",
        base_url: Some("https://api.deepseek.com/v1"),
        accepts: long_enough,
    },
];

/// Scan `lookup` for known API keys, best first.
///
/// `lookup` is usually `|name| std::env::var(name).ok()`; tests pass a map.
pub fn detect_providers(lookup: impl Fn(&str) -> Option<String>) -> Vec<DetectedProvider> {
    KNOWN_VENDORS
        .iter()
        .zip(1u8..)
        .filter_map(|(vendor, priority)| {
            let key = lookup(vendor.env)?;
            let key = key.trim();
            if key.is_empty() || !(vendor.accepts)(key) {
                return None;
            }
            Some(DetectedProvider {
                id: vendor.id.to_string(),
                kind: vendor.kind.to_string(),
                default_model: vendor.default_model.to_string(),
                base_url: vendor.base_url.map(str::to_string),
                api_key: key.to_string(),
                priority,
            })
        })
        .collect()
}

/// Add detected providers that the config does not already declare.
///
/// With no preferred provider configured, the best detection becomes the
/// preferred one and the rest become fallbacks. Otherwise detections are
/// appended to the fallback chain. Returns the ids that were added.
pub fn merge_detected(config: &mut Config, mut detected: Vec<DetectedProvider>) -> Vec<String> {
    detected.sort_by_key(|d| d.priority);

    let mut added = Vec::new();
    for found in detected {
        if config.providers.contains_key(&found.id) {
            continue;
        }
        config.providers.insert(
            found.id.clone(),
            ProviderConfig {
                kind: found.kind,
                api_key: Some(found.api_key),
                base_url: found.base_url,
                default_model: Some(found.default_model),
                ..Default::default()
            },
        );
        added.push(found.id);
    }

    let gateway = &mut config.gateway;
    for id in &added {
        if gateway.preferred.is_none() {
            gateway.preferred = Some(id.clone());
        } else if gateway.preferred.as_deref() != Some(id.as_str())
            && !gateway.fallbacks.contains(id)
        {
            gateway.fallbacks.push(id.clone());
        }
    }

    added
}
