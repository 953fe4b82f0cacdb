//! Raw command gateway
//!
//! Escape hatch for protocol commands the bridge has no typed wrapper for:
//! resolve a human-readable command name, forward the caller's parameters
//! untouched, and hand the response body back pretty-printed. Unknown names
//! are rejected before anything touches the wire.

use crate::error::BridgeError;
use crate::ptsl::client::{CommandStatus, PtslClient};
use crate::ptsl::commands::CommandId;
use serde_json::Value;
use tracing::debug;

/// Outcome of one raw command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutcome {
    /// The name did not resolve; nothing was sent
    UnknownCommand { command: String, message: String },
    /// The workstation rejected the command
    Failed { command: String, message: String },
    /// Success, with the response body pretty-printed (or a placeholder
    /// when the command returned no body)
    Success { command: String, body_pretty: String },
}

/// Resolve `name`, send it with `params` verbatim, and report the outcome.
///
/// Command failures are data here, not errors: the caller gets a `Failed`
/// outcome with the joined error messages. Only session/transport problems
/// surface as `Err`.
pub async fn run_raw_command(
    client: &mut PtslClient,
    name: &str,
    params: Value,
) -> Result<RawOutcome, BridgeError> {
    let Some(command) = CommandId::from_name(name) else {
        return Ok(RawOutcome::UnknownCommand {
            command: name.to_string(),
            message: format!("Unknown command: {}", name),
        });
    };

    debug!(command = command.name(), "Dispatching raw command");
    let response = client.send_request(command, params).await?;

    match response.status {
        CommandStatus::Failed => Ok(RawOutcome::Failed {
            command: command.name().to_string(),
            message: response.error_messages().join(", "),
        }),
        CommandStatus::Success => {
            let body_pretty = match &response.body {
                Some(body) => serde_json::to_string_pretty(body)
                    .unwrap_or_else(|_| body.to_string()),
                None => "(no response body)".to_string(),
            };
            Ok(RawOutcome::Success {
                command: command.name().to_string(),
                body_pretty,
            })
        }
    }
}
