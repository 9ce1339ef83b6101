//! `run` and `validate` commands.

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use conductor_config::Config;
use conductor_engine::{RunOptions, WorkflowDefinition, WorkflowStatus};

use crate::BoxError;
use crate::cli::parse_inputs;
use crate::register::bootstrap;

/// Run a workflow to completion and print its result.
///
/// `target` is read as a definition file when such a file exists, otherwise
/// as a catalog name. Ctrl-c cancels the run.
pub(crate) async fn run_workflow(
    config: &Config,
    target: &str,
    inputs: &[String],
    timeout: Option<u64>,
) -> Result<(), BoxError> {
    let inputs = parse_inputs(inputs)?;
    let runtime = bootstrap(config).await?;

    let cancel = CancellationToken::new();
    let mut options = RunOptions::new().with_cancel(cancel.clone());
    if let Some(secs) = timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling workflow");
            cancel.cancel();
        }
    });

    let path = Path::new(target);
    let result = if path.is_file() {
        let definition = WorkflowDefinition::from_path(path)?;
        info!("Running workflow {} from {}", definition.name, path.display());
        runtime
            .engine
            .execute_with(definition.instantiate(inputs), options)
            .await
    } else {
        runtime.engine.run_named(target, inputs, options).await
    };
    signal.abort();
    let result = result?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.pending_approvals.is_empty() {
        eprintln!(
            "{} approval(s) still pending: {}",
            result.pending_approvals.len(),
            result.pending_approvals.join(", ")
        );
    }
    match result.status {
        WorkflowStatus::Completed => Ok(()),
        status => Err(format!("workflow {} ended {}", result.name, status).into()),
    }
}

/// Parse a definition and check it against the configured agents.
pub(crate) async fn validate_workflow(config: &Config, file: &Path) -> Result<(), BoxError> {
    let definition = WorkflowDefinition::from_path(file)?;
    let runtime = bootstrap(config).await?;
    runtime
        .engine
        .validate(&definition.instantiate(serde_json::Value::Null))?;
    println!(
        "{}: workflow '{}' is valid ({} tasks)",
        file.display(),
        definition.name,
        definition.tasks.len()
    );
    Ok(())
}
