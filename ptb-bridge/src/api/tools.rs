//! Tool dispatch endpoint
//!
//! POST /api/tools takes `{"tool": name, "args": {...}}` and routes to one
//! of a fixed set of tools. Mutating tools are gated by the write-permission
//! policy, re-read from the environment on every call so an operator can
//! tighten or relax it without restarting the bridge.

use crate::api::AppState;
use crate::audio;
use crate::error::{ApiError, ApiResult};
use crate::import::{self, ImportMode, SpotOptions};
use crate::ptsl::client::PtslClient;
use crate::ptsl::commands::{CommandId, PermissionGroup};
use crate::ptsl::gateway::{run_raw_command, RawOutcome};
use axum::{extract::State, Json};
use ptb_common::config::WritePermission;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

/// Tools the endpoint will dispatch; anything else is a 400
pub const ALLOWED_TOOLS: &[&str] = &[
    "get_session_info",
    "get_track_list",
    "get_track_format",
    "import_audio",
    "spot_clips",
    "ptsl_command",
];

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

/// POST /api/tools
pub async fn run_tool(
    State(state): State<AppState>,
    Json(request): Json<ToolRequest>,
) -> ApiResult<Json<Value>> {
    if !ALLOWED_TOOLS.contains(&request.tool.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unknown tool: {}",
            request.tool
        )));
    }

    info!(tool = %request.tool, "Dispatching tool");
    let data = match request.tool.as_str() {
        "get_session_info" => {
            let mut client = state.client.lock().await;
            get_session_info(&mut client).await?
        }
        "get_track_list" => {
            let mut client = state.client.lock().await;
            get_track_list(&mut client).await?
        }
        "get_track_format" => get_track_format(request.args)?,
        "import_audio" => {
            require_permission(CommandId::ImportAudioToClipList.permission_group())?;
            let mut client = state.client.lock().await;
            import_audio(&mut client, request.args).await?
        }
        "spot_clips" => {
            require_permission(CommandId::SpotClipsById.permission_group())?;
            let mut client = state.client.lock().await;
            spot_clips(&mut client, request.args).await?
        }
        "ptsl_command" => {
            let mut client = state.client.lock().await;
            ptsl_command(&mut client, request.args).await?
        }
        // Unreachable; the allow-list check above covers it
        other => return Err(ApiError::BadRequest(format!("Unknown tool: {}", other))),
    };

    Ok(Json(json!({ "ok": true, "data": data })))
}

/// Check the per-request write policy against a command's group.
fn require_permission(group: Option<PermissionGroup>) -> ApiResult<()> {
    let Some(group) = group else {
        // Read-only commands need no permission
        return Ok(());
    };

    let permission =
        WritePermission::from_env().map_err(|e| ApiError::Internal(e.to_string()))?;

    // `memory` is a caller contract (no physical writes), not enforced
    // here; only `none` blocks mutating tools
    if permission.allows_writes() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Write operation blocked: permission level '{}' rejects {:?} commands",
            permission, group
        )))
    }
}

/// Send one query command and pull a string field from its body.
async fn query_field(
    client: &mut PtslClient,
    command: CommandId,
    field: &str,
) -> ApiResult<Option<Value>> {
    let response = client
        .send_request(command, json!({}))
        .await?
        .require_success(command)?;
    Ok(response.body.and_then(|b| b.get(field).cloned()))
}

async fn get_session_info(client: &mut PtslClient) -> ApiResult<Value> {
    let name = query_field(client, CommandId::GetSessionName, "session_name").await?;
    let path = query_field(client, CommandId::GetSessionPath, "session_path").await?;
    let sample_rate =
        query_field(client, CommandId::GetSessionSampleRate, "sample_rate").await?;
    let bit_depth =
        query_field(client, CommandId::GetSessionBitDepth, "current_bit_depth").await?;

    Ok(json!({
        "name": name,
        "path": path,
        "sample_rate": sample_rate,
        "bit_depth": bit_depth,
    }))
}

async fn get_track_list(client: &mut PtslClient) -> ApiResult<Value> {
    let response = client
        .send_request(CommandId::GetTrackList, json!({}))
        .await?
        .require_success(CommandId::GetTrackList)?;
    Ok(response.body.unwrap_or_else(|| json!({ "track_list": [] })))
}

#[derive(Debug, Deserialize)]
struct TrackFormatArgs {
    file_path: PathBuf,
}

fn get_track_format(args: Value) -> ApiResult<Value> {
    let args: TrackFormatArgs = parse_args(args)?;
    let channels = audio::channel_count(&args.file_path);
    let format = audio::track_format_for_channels(channels, audio::FORMAT_STEREO);
    Ok(json!({ "channels": channels, "track_format": format }))
}

#[derive(Debug, Deserialize)]
struct ImportArgs {
    file_paths: Vec<String>,
    #[serde(default)]
    destination_path: Option<String>,
    #[serde(default)]
    mode: Option<ImportMode>,
}

async fn import_audio(client: &mut PtslClient, args: Value) -> ApiResult<Value> {
    let args: ImportArgs = parse_args(args)?;
    if args.file_paths.is_empty() {
        return Err(ApiError::BadRequest(
            "file_paths must not be empty".to_string(),
        ));
    }

    let outcome = import::import_audio_to_clip_list(
        client,
        &args.file_paths,
        args.destination_path.as_deref(),
        args.mode.unwrap_or_default(),
    )
    .await?;
    serde_json::to_value(&outcome).map_err(|e| ApiError::Internal(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct SpotArgs {
    clip_ids: Vec<String>,
    track_name: String,
    #[serde(default)]
    location: Option<String>,
}

async fn spot_clips(client: &mut PtslClient, args: Value) -> ApiResult<Value> {
    let args: SpotArgs = parse_args(args)?;
    if args.clip_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "clip_ids must not be empty".to_string(),
        ));
    }

    let mut options = SpotOptions::default();
    if let Some(location) = args.location {
        options.location = location;
    }

    import::spot_clips_by_name(client, &args.clip_ids, &args.track_name, &options).await?;
    Ok(json!({ "spotted": args.clip_ids.len(), "track": args.track_name }))
}

#[derive(Debug, Deserialize)]
struct RawArgs {
    command: String,
    #[serde(default)]
    params: Value,
}

async fn ptsl_command(client: &mut PtslClient, args: Value) -> ApiResult<Value> {
    let args: RawArgs = parse_args(args)?;

    // Gate before resolving reaches the wire: a mutating raw command needs
    // the same permission as its typed equivalent would
    if let Some(command) = CommandId::from_name(&args.command) {
        if command.is_mutating() {
            require_permission(command.permission_group())?;
        }
    }

    let params = if args.params.is_null() {
        json!({})
    } else {
        args.params
    };

    match run_raw_command(client, &args.command, params).await? {
        RawOutcome::UnknownCommand { message, .. } => Err(ApiError::BadRequest(message)),
        RawOutcome::Failed { command, message } => Ok(json!({
            "command": command,
            "status": "failed",
            "error": message,
        })),
        RawOutcome::Success {
            command,
            body_pretty,
        } => Ok(json!({
            "command": command,
            "status": "success",
            "body": body_pretty,
        })),
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> ApiResult<T> {
    serde_json::from_value(args)
        .map_err(|e| ApiError::BadRequest(format!("Invalid tool arguments: {}", e)))
}
