//! Import and spot orchestration
//!
//! Typed wrappers over the clip-list import and spot commands. Batch
//! imports report per-file outcomes; the batch as a whole is OK only when
//! no file failed and at least one clip actually landed.

use crate::error::BridgeError;
use crate::ptsl::client::{CommandStatus, PtslClient};
use crate::ptsl::commands::CommandId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// How imported audio is brought into the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    CopyAudio,
    AddAudio,
    ConvertAudio,
}

impl ImportMode {
    /// Protocol-level operation name
    pub fn operation(&self) -> &'static str {
        match self {
            ImportMode::CopyAudio => "AOperations_CopyAudio",
            ImportMode::AddAudio => "AOperations_AddAudio",
            ImportMode::ConvertAudio => "AOperations_ConvertAudio",
        }
    }
}

impl Default for ImportMode {
    fn default() -> Self {
        ImportMode::CopyAudio
    }
}

/// One successfully imported file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedClip {
    /// Path as submitted in the batch
    pub original_path: String,
    /// Where the workstation placed the audio, when it reports one
    pub destination_path: Option<String>,
    /// Clip ids minted for this file
    pub clip_ids: Vec<String>,
}

/// Result of one batch import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchImportOutcome {
    /// True only when `failures` is empty AND at least one clip imported
    pub ok: bool,
    pub clips: Vec<ImportedClip>,
    /// Paths the workstation reported as failed
    pub failures: Vec<String>,
    /// Command-level error when the whole batch was rejected
    pub error: Option<String>,
}

/// Import a batch of audio files into the session clip list.
///
/// The command itself succeeding does not make the batch OK: the response
/// body carries per-file outcomes and a single bad file marks the batch as
/// failed while still reporting the clips that did land.
pub async fn import_audio_to_clip_list(
    client: &mut PtslClient,
    file_paths: &[String],
    destination_path: Option<&str>,
    mode: ImportMode,
) -> Result<BatchImportOutcome, BridgeError> {
    if file_paths.is_empty() {
        return Err(BridgeError::NotReady(
            "import requires at least one file path".to_string(),
        ));
    }

    // destination_path is always present on the wire, empty when unset
    let params = json!({
        "file_list": file_paths,
        "destination_path": destination_path.unwrap_or(""),
        "audio_operations": mode.operation(),
    });

    debug!(files = file_paths.len(), mode = mode.operation(), "Importing audio batch");
    let response = client
        .send_request(CommandId::ImportAudioToClipList, params)
        .await?;

    if response.status == CommandStatus::Failed {
        let message = response.error_messages().join(", ");
        warn!(error = %message, "Import command rejected");
        return Ok(BatchImportOutcome {
            ok: false,
            clips: Vec::new(),
            failures: file_paths.to_vec(),
            error: Some(message),
        });
    }

    Ok(parse_import_body(file_paths, response.body.as_ref()))
}

/// Per-file entry in the import response body. The workstation reports the
/// submitted path as `original_input_path`; destination paths and the clip
/// ids minted for them live inside `destination_file_list`.
#[derive(Debug, Deserialize)]
struct ImportEntry {
    #[serde(default)]
    original_input_path: String,
    #[serde(default)]
    destination_file_list: Vec<DestinationEntry>,
}

#[derive(Debug, Deserialize)]
struct DestinationEntry {
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    clip_id_list: Vec<String>,
}

fn parse_import_body(file_paths: &[String], body: Option<&Value>) -> BatchImportOutcome {
    let Some(body) = body else {
        // Success status with no body means nothing was imported
        return BatchImportOutcome {
            ok: false,
            clips: Vec::new(),
            failures: file_paths.to_vec(),
            error: Some("Import returned no response body".to_string()),
        };
    };

    let entries: Vec<ImportEntry> = body
        .get("file_list")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let clips: Vec<ImportedClip> = entries
        .into_iter()
        .map(|entry| {
            let destination = entry.destination_file_list.into_iter().next();
            let (destination_path, clip_ids) = match destination {
                Some(d) => (d.file_path, d.clip_id_list),
                None => (None, Vec::new()),
            };
            ImportedClip {
                original_path: entry.original_input_path,
                destination_path,
                clip_ids,
            }
        })
        .collect();

    // Failure entries have been observed both as bare path strings and as
    // `{file_path}` objects
    let failures: Vec<String> = body
        .get("failure_list")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|f| {
                    f.as_str()
                        .or_else(|| f.get("file_path").and_then(Value::as_str))
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();

    let ok = failures.is_empty() && !clips.is_empty();
    BatchImportOutcome {
        ok,
        clips,
        failures,
        error: None,
    }
}

/// Timeline time base for spot placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeType {
    Samples,
}

impl TimeType {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            TimeType::Samples => "TLType_Samples",
        }
    }
}

/// Which edge of the clip lands on the location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Start,
}

impl LocationType {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            LocationType::Start => "SLType_Start",
        }
    }
}

/// Placement options for a spot operation
#[derive(Debug, Clone)]
pub struct SpotOptions {
    /// Timeline location, in the units of `time_type`
    pub location: String,
    pub time_type: TimeType,
    pub location_type: LocationType,
}

impl Default for SpotOptions {
    fn default() -> Self {
        Self {
            location: "0".to_string(),
            time_type: TimeType::Samples,
            location_type: LocationType::Start,
        }
    }
}

/// Spot previously imported clips onto a named track.
///
/// Failure here is exceptional (unlike import): a failed spot becomes a
/// `CommandFailed` error carrying the workstation's messages.
pub async fn spot_clips_by_name(
    client: &mut PtslClient,
    clip_ids: &[String],
    track_name: &str,
    options: &SpotOptions,
) -> Result<(), BridgeError> {
    if clip_ids.is_empty() {
        return Err(BridgeError::NotReady(
            "spot requires at least one clip id".to_string(),
        ));
    }

    // Placement nests under dst_location_data; the track may be addressed
    // by id or name, and the unused selector is sent as an empty string
    let params = json!({
        "src_clips": clip_ids,
        "dst_track_id": "",
        "dst_track_name": track_name,
        "dst_location_data": {
            "location_type": options.location_type.protocol_name(),
            "location": {
                "time_type": options.time_type.protocol_name(),
                "location": options.location,
            },
        },
    });

    debug!(clips = clip_ids.len(), track = track_name, "Spotting clips");
    client
        .send_request(CommandId::SpotClipsById, params)
        .await?
        .require_success(CommandId::SpotClipsById)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_files_imported_is_ok() {
        let body = json!({
            "file_list": [
                {
                    "original_input_path": "/audio/a.wav",
                    "destination_file_list": [{
                        "file_path": "/session/Audio Files/a.wav",
                        "clip_id_list": ["clip-1"]
                    }]
                }
            ],
            "failure_list": []
        });
        let outcome = parse_import_body(&paths(&["/audio/a.wav"]), Some(&body));
        assert!(outcome.ok);
        assert_eq!(outcome.clips.len(), 1);
        assert_eq!(outcome.clips[0].original_path, "/audio/a.wav");
        assert_eq!(
            outcome.clips[0].destination_path.as_deref(),
            Some("/session/Audio Files/a.wav")
        );
        assert_eq!(outcome.clips[0].clip_ids, vec!["clip-1".to_string()]);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn partial_failure_marks_batch_not_ok_but_keeps_successes() {
        let body = json!({
            "file_list": [
                {
                    "original_input_path": "/audio/a.wav",
                    "destination_file_list": [{
                        "file_path": "/session/Audio Files/a.wav",
                        "clip_id_list": ["clip-1"]
                    }]
                }
            ],
            "failure_list": [
                {"file_path": "/audio/b.wav"}
            ]
        });
        let outcome = parse_import_body(&paths(&["/audio/a.wav", "/audio/b.wav"]), Some(&body));
        assert!(!outcome.ok);
        assert_eq!(outcome.clips.len(), 1);
        assert_eq!(outcome.failures, vec!["/audio/b.wav".to_string()]);
    }

    #[test]
    fn bare_string_failure_entries_are_accepted() {
        let body = json!({
            "file_list": [],
            "failure_list": ["/audio/b.wav"]
        });
        let outcome = parse_import_body(&paths(&["/audio/b.wav"]), Some(&body));
        assert!(!outcome.ok);
        assert_eq!(outcome.failures, vec!["/audio/b.wav".to_string()]);
    }

    #[test]
    fn entry_without_destination_yields_no_clip_ids() {
        let body = json!({
            "file_list": [
                {"original_input_path": "/audio/a.wav", "destination_file_list": []}
            ],
            "failure_list": []
        });
        let outcome = parse_import_body(&paths(&["/audio/a.wav"]), Some(&body));
        assert_eq!(outcome.clips.len(), 1);
        assert!(outcome.clips[0].destination_path.is_none());
        assert!(outcome.clips[0].clip_ids.is_empty());
    }

    #[test]
    fn empty_result_is_not_ok() {
        let body = json!({"file_list": [], "failure_list": []});
        let outcome = parse_import_body(&paths(&["/audio/a.wav"]), Some(&body));
        assert!(!outcome.ok);
        assert!(outcome.clips.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn missing_body_fails_the_whole_batch() {
        let outcome = parse_import_body(&paths(&["/audio/a.wav"]), None);
        assert!(!outcome.ok);
        assert_eq!(outcome.failures, vec!["/audio/a.wav".to_string()]);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn import_modes_map_to_protocol_operations() {
        assert_eq!(ImportMode::CopyAudio.operation(), "AOperations_CopyAudio");
        assert_eq!(ImportMode::AddAudio.operation(), "AOperations_AddAudio");
        assert_eq!(ImportMode::ConvertAudio.operation(), "AOperations_ConvertAudio");
        assert_eq!(ImportMode::default(), ImportMode::CopyAudio);
    }

    #[test]
    fn spot_defaults_place_clip_start_at_timeline_zero() {
        let options = SpotOptions::default();
        assert_eq!(options.location, "0");
        assert_eq!(options.time_type.protocol_name(), "TLType_Samples");
        assert_eq!(options.location_type.protocol_name(), "SLType_Start");
    }
}
