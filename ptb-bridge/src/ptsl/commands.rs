//! Protocol command identifiers
//!
//! Stable numeric ids for the workstation's command protocol, the
//! human-name lookup used by the raw gateway, and the read-only /
//! permission-group classification used by the HTTP boundary's write
//! gating. The id numbers are part of the public wire contract.

/// Command identifiers with their protocol-level numeric ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandId {
    // Session management
    CreateSession = 0,
    OpenSession = 1,
    GetTrackList = 3,
    ExportClipsAsFiles = 10,
    GetFileLocation = 16,
    CloseSession = 17,
    SaveSession = 18,
    SaveSessionAs = 19,

    // Editing
    Cut = 20,
    Copy = 21,
    Paste = 22,
    Clear = 23,
    ExportMix = 28,
    ExportSessionInfoAsText = 30,

    // Transport
    SetPlaybackMode = 32,
    SetRecordMode = 33,
    GetSessionSampleRate = 35,
    GetSessionBitDepth = 36,
    GetSessionTimeCodeRate = 38,
    GetSessionName = 42,
    GetSessionPath = 43,
    GetSessionStartTime = 44,
    GetSessionLength = 45,
    GetPtslVersion = 55,
    GetPlaybackMode = 56,
    GetRecordMode = 57,
    GetTransportState = 59,

    // Memory locations / markers
    ClearMemoryLocation = 61,
    TogglePlayState = 64,
    ToggleRecordEnable = 65,
    PlayHalfSpeed = 66,
    RecordHalfSpeed = 67,
    EditMemoryLocation = 68,
    GetMemoryLocations = 69,

    // Connection
    RegisterConnection = 70,
    CreateMemoryLocation = 71,
    CreateNewTracks = 72,
    SelectTracksByName = 73,
    GetEditMode = 74,
    GetEditTool = 76,
    SetEditTool = 77,
    SetTimelineSelection = 81,
    GetTimelineSelection = 82,
    SelectMemoryLocation = 84,
    SetTrackMuteState = 85,
    SetTrackSoloState = 86,
    SetTrackRecordEnableState = 88,
    GetMainCounterFormat = 102,
    Undo = 104,
    Redo = 105,
    ClearAllMemoryLocations = 117,

    // Clip import / spotting
    ImportAudioToClipList = 123,
    SpotClipsById = 124,
    GetClipList = 125,
    GetTrackPlaylists = 154,
    GetPlaylistElements = 158,
}

/// Permission groups for coarse-grained write classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionGroup {
    /// Cut, Paste, Clear
    Clipboard,
    /// Markers / memory locations
    Memory,
    /// Record enable on tracks
    TrackState,
    /// Creating tracks
    TrackStructure,
    /// Session lifecycle and clip import/spotting
    Session,
    /// Export operations
    Export,
    /// Record mode / enable
    Recording,
}

impl CommandId {
    /// Protocol-level numeric id
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Human-readable command name as accepted by the raw gateway
    pub fn name(self) -> &'static str {
        match self {
            CommandId::CreateSession => "CreateSession",
            CommandId::OpenSession => "OpenSession",
            CommandId::GetTrackList => "GetTrackList",
            CommandId::ExportClipsAsFiles => "ExportClipsAsFiles",
            CommandId::GetFileLocation => "GetFileLocation",
            CommandId::CloseSession => "CloseSession",
            CommandId::SaveSession => "SaveSession",
            CommandId::SaveSessionAs => "SaveSessionAs",
            CommandId::Cut => "Cut",
            CommandId::Copy => "Copy",
            CommandId::Paste => "Paste",
            CommandId::Clear => "Clear",
            CommandId::ExportMix => "ExportMix",
            CommandId::ExportSessionInfoAsText => "ExportSessionInfoAsText",
            CommandId::SetPlaybackMode => "SetPlaybackMode",
            CommandId::SetRecordMode => "SetRecordMode",
            CommandId::GetSessionSampleRate => "GetSessionSampleRate",
            CommandId::GetSessionBitDepth => "GetSessionBitDepth",
            CommandId::GetSessionTimeCodeRate => "GetSessionTimeCodeRate",
            CommandId::GetSessionName => "GetSessionName",
            CommandId::GetSessionPath => "GetSessionPath",
            CommandId::GetSessionStartTime => "GetSessionStartTime",
            CommandId::GetSessionLength => "GetSessionLength",
            CommandId::GetPtslVersion => "GetPTSLVersion",
            CommandId::GetPlaybackMode => "GetPlaybackMode",
            CommandId::GetRecordMode => "GetRecordMode",
            CommandId::GetTransportState => "GetTransportState",
            CommandId::ClearMemoryLocation => "ClearMemoryLocation",
            CommandId::TogglePlayState => "TogglePlayState",
            CommandId::ToggleRecordEnable => "ToggleRecordEnable",
            CommandId::PlayHalfSpeed => "PlayHalfSpeed",
            CommandId::RecordHalfSpeed => "RecordHalfSpeed",
            CommandId::EditMemoryLocation => "EditMemoryLocation",
            CommandId::GetMemoryLocations => "GetMemoryLocations",
            CommandId::RegisterConnection => "RegisterConnection",
            CommandId::CreateMemoryLocation => "CreateMemoryLocation",
            CommandId::CreateNewTracks => "CreateNewTracks",
            CommandId::SelectTracksByName => "SelectTracksByName",
            CommandId::GetEditMode => "GetEditMode",
            CommandId::GetEditTool => "GetEditTool",
            CommandId::SetEditTool => "SetEditTool",
            CommandId::SetTimelineSelection => "SetTimelineSelection",
            CommandId::GetTimelineSelection => "GetTimelineSelection",
            CommandId::SelectMemoryLocation => "SelectMemoryLocation",
            CommandId::SetTrackMuteState => "SetTrackMuteState",
            CommandId::SetTrackSoloState => "SetTrackSoloState",
            CommandId::SetTrackRecordEnableState => "SetTrackRecordEnableState",
            CommandId::GetMainCounterFormat => "GetMainCounterFormat",
            CommandId::Undo => "Undo",
            CommandId::Redo => "Redo",
            CommandId::ClearAllMemoryLocations => "ClearAllMemoryLocations",
            CommandId::ImportAudioToClipList => "ImportAudioToClipList",
            CommandId::SpotClipsById => "SpotClipsByID",
            CommandId::GetClipList => "GetClipList",
            CommandId::GetTrackPlaylists => "GetTrackPlaylists",
            CommandId::GetPlaylistElements => "GetPlaylistElements",
        }
    }

    /// Resolve a human-readable name to a command id.
    ///
    /// Returns None for unknown names; unresolved names must never reach
    /// the transport.
    pub fn from_name(name: &str) -> Option<CommandId> {
        ALL_COMMANDS.iter().copied().find(|c| c.name() == name)
    }

    /// Read-only commands (queries, playback control) are always allowed.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            CommandId::RegisterConnection
                | CommandId::GetPtslVersion
                | CommandId::GetSessionName
                | CommandId::GetSessionPath
                | CommandId::GetSessionSampleRate
                | CommandId::GetSessionBitDepth
                | CommandId::GetSessionTimeCodeRate
                | CommandId::GetSessionStartTime
                | CommandId::GetSessionLength
                | CommandId::GetMainCounterFormat
                | CommandId::GetTrackList
                | CommandId::SelectTracksByName
                | CommandId::GetPlaybackMode
                | CommandId::GetRecordMode
                | CommandId::GetTransportState
                | CommandId::TogglePlayState
                | CommandId::PlayHalfSpeed
                | CommandId::GetEditMode
                | CommandId::GetEditTool
                | CommandId::GetTimelineSelection
                | CommandId::GetMemoryLocations
                | CommandId::SelectMemoryLocation
                | CommandId::Undo
                | CommandId::Redo
                | CommandId::GetClipList
                | CommandId::GetTrackPlaylists
                | CommandId::GetPlaylistElements
                | CommandId::GetFileLocation
                | CommandId::Copy
                | CommandId::SetTrackMuteState
                | CommandId::SetTrackSoloState
                | CommandId::SetTimelineSelection
                | CommandId::SetEditTool
                | CommandId::SetPlaybackMode
        )
    }

    /// Permission group for commands that mutate workstation state
    pub fn permission_group(self) -> Option<PermissionGroup> {
        let group = match self {
            CommandId::Cut | CommandId::Paste | CommandId::Clear => PermissionGroup::Clipboard,
            CommandId::ClearMemoryLocation
            | CommandId::EditMemoryLocation
            | CommandId::CreateMemoryLocation
            | CommandId::ClearAllMemoryLocations => PermissionGroup::Memory,
            CommandId::SetTrackRecordEnableState => PermissionGroup::TrackState,
            CommandId::CreateNewTracks => PermissionGroup::TrackStructure,
            CommandId::CreateSession
            | CommandId::OpenSession
            | CommandId::CloseSession
            | CommandId::SaveSession
            | CommandId::SaveSessionAs
            | CommandId::ImportAudioToClipList
            | CommandId::SpotClipsById => PermissionGroup::Session,
            CommandId::ExportClipsAsFiles
            | CommandId::ExportMix
            | CommandId::ExportSessionInfoAsText => PermissionGroup::Export,
            CommandId::SetRecordMode
            | CommandId::ToggleRecordEnable
            | CommandId::RecordHalfSpeed => PermissionGroup::Recording,
            _ => return None,
        };
        Some(group)
    }

    /// A command mutates workstation state unless classified read-only.
    pub fn is_mutating(self) -> bool {
        !self.is_read_only()
    }
}

/// Every command the bridge knows, for name resolution
const ALL_COMMANDS: &[CommandId] = &[
    CommandId::CreateSession,
    CommandId::OpenSession,
    CommandId::GetTrackList,
    CommandId::ExportClipsAsFiles,
    CommandId::GetFileLocation,
    CommandId::CloseSession,
    CommandId::SaveSession,
    CommandId::SaveSessionAs,
    CommandId::Cut,
    CommandId::Copy,
    CommandId::Paste,
    CommandId::Clear,
    CommandId::ExportMix,
    CommandId::ExportSessionInfoAsText,
    CommandId::SetPlaybackMode,
    CommandId::SetRecordMode,
    CommandId::GetSessionSampleRate,
    CommandId::GetSessionBitDepth,
    CommandId::GetSessionTimeCodeRate,
    CommandId::GetSessionName,
    CommandId::GetSessionPath,
    CommandId::GetSessionStartTime,
    CommandId::GetSessionLength,
    CommandId::GetPtslVersion,
    CommandId::GetPlaybackMode,
    CommandId::GetRecordMode,
    CommandId::GetTransportState,
    CommandId::ClearMemoryLocation,
    CommandId::TogglePlayState,
    CommandId::ToggleRecordEnable,
    CommandId::PlayHalfSpeed,
    CommandId::RecordHalfSpeed,
    CommandId::EditMemoryLocation,
    CommandId::GetMemoryLocations,
    CommandId::RegisterConnection,
    CommandId::CreateMemoryLocation,
    CommandId::CreateNewTracks,
    CommandId::SelectTracksByName,
    CommandId::GetEditMode,
    CommandId::GetEditTool,
    CommandId::SetEditTool,
    CommandId::SetTimelineSelection,
    CommandId::GetTimelineSelection,
    CommandId::SelectMemoryLocation,
    CommandId::SetTrackMuteState,
    CommandId::SetTrackSoloState,
    CommandId::SetTrackRecordEnableState,
    CommandId::GetMainCounterFormat,
    CommandId::Undo,
    CommandId::Redo,
    CommandId::ClearAllMemoryLocations,
    CommandId::ImportAudioToClipList,
    CommandId::SpotClipsById,
    CommandId::GetClipList,
    CommandId::GetTrackPlaylists,
    CommandId::GetPlaylistElements,
];
