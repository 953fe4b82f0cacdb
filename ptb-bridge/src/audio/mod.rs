//! Local audio file inspection
//!
//! Reads just enough of a WAV or AIFF header to answer "how many channels
//! is this file?", which drives track-format selection when spotting
//! imported clips. Parsing is deliberately forgiving: any unreadable or
//! unrecognized file yields `None` and the caller falls back to a default.

mod header;

pub use header::{channel_count, parse_aiff_channels, parse_wav_channels};

/// Track format names understood by the workstation
pub const FORMAT_MONO: &str = "TFormat_Mono";
pub const FORMAT_STEREO: &str = "TFormat_Stereo";
pub const FORMAT_QUAD: &str = "TFormat_Quad";
pub const FORMAT_5_1: &str = "TFormat_5_1";

/// Map a channel count to a workstation track format.
///
/// Total: unknown or unusual counts get the caller's fallback.
pub fn track_format_for_channels(channels: Option<u16>, fallback: &'static str) -> &'static str {
    match channels {
        Some(1) => FORMAT_MONO,
        Some(2) => FORMAT_STEREO,
        Some(4) => FORMAT_QUAD,
        Some(6) => FORMAT_5_1,
        _ => fallback,
    }
}

/// Inspect a file on disk and pick a track format for it.
pub fn track_format_for_file(path: &std::path::Path, fallback: &'static str) -> &'static str {
    track_format_for_channels(channel_count(path), fallback)
}
