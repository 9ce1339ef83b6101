//! CLI definitions for Conductor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

/// Conductor CLI.
#[derive(Parser)]
#[command(name = "conductor")]
#[command(about = "Multi-agent workflow engine")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Overrides `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Overrides `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a workflow by catalog name or definition file
    Run {
        /// Workflow name, or path to a YAML/JSON definition
        target: String,

        /// Workflow input as key=value (repeatable)
        #[arg(short, long = "input", value_name = "KEY=VALUE")]
        inputs: Vec<String>,

        /// Whole-workflow timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Check a workflow definition without running it
    Validate {
        /// Path to a YAML/JSON definition
        file: PathBuf,
    },

    /// Approval management commands
    Approvals {
        #[command(subcommand)]
        action: ApprovalAction,
    },

    /// Print the service summary
    Health,
}

#[derive(Subcommand)]
pub(crate) enum ApprovalAction {
    /// List pending approval requests
    List {
        /// Include resolved requests
        #[arg(long)]
        all: bool,
    },

    /// Approve a pending request
    Approve {
        id: String,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Reject a pending request
    Reject {
        id: String,

        #[arg(long)]
        comment: Option<String>,
    },
}

/// Build the workflow inputs object from `key=value` pairs.
///
/// Values that parse as JSON keep their type; anything else is a string.
pub(crate) fn parse_inputs(pairs: &[String]) -> Result<Value, String> {
    let mut inputs = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("input `{}` is not in key=value form", pair))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("input `{}` has an empty key", pair));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        inputs.insert(key.to_string(), value);
    }
    Ok(Value::Object(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_inputs() {
        let pairs = vec![
            "user=ada".to_string(),
            "count=3".to_string(),
            "tags=[\"a\"]".to_string(),
            "query=a=b".to_string(),
        ];
        let inputs = parse_inputs(&pairs).unwrap();
        assert_eq!(
            inputs,
            json!({"user": "ada", "count": 3, "tags": ["a"], "query": "a=b"})
        );
    }

    #[test]
    fn test_parse_inputs_rejects_bad_pairs() {
        assert!(parse_inputs(&["novalue".to_string()]).is_err());
        assert!(parse_inputs(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_parse_inputs_empty() {
        assert_eq!(parse_inputs(&[]).unwrap(), json!({}));
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "conductor", "run", "triage", "-i", "user=ada", "--input", "n=1", "--timeout", "30",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run {
                target,
                inputs,
                timeout,
            }) => {
                assert_eq!(target, "triage");
                assert_eq!(inputs, vec!["user=ada", "n=1"]);
                assert_eq!(timeout, Some(30));
            }
            _ => panic!("expected run command"),
        }
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_cli_parses_approvals() {
        let cli = Cli::try_parse_from([
            "conductor", "--config", "c.toml", "approvals", "reject", "abc", "--comment", "no",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("c.toml"));
        assert!(matches!(
            cli.command,
            Some(Commands::Approvals {
                action: ApprovalAction::Reject { ref id, ref comment }
            }) if id == "abc" && comment.as_deref() == Some("no")
        ));
    }
}
