//! WAV and AIFF header scanning
//!
//! Both containers are chunked: a magic preamble, then a sequence of
//! (4-byte id, 4-byte size, payload) chunks. Chunk payloads are padded to
//! even lengths, so the walk advances by `8 + size + (size & 1)`. WAV is
//! little-endian RIFF/WAVE with the channel count at bytes 2..4 of the
//! "fmt " payload; AIFF is big-endian FORM/AIFF (or AIFC) with the channel
//! count at bytes 0..2 of the "COMM" payload.

use std::path::Path;
use tracing::trace;

/// Channel count for a WAV or AIFF file, dispatched on extension.
///
/// Unknown extensions, missing files, and malformed headers all yield
/// `None`; this function never fails loudly.
pub fn channel_count(path: &Path) -> Option<u16> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let bytes = std::fs::read(path).ok()?;
    match ext.as_str() {
        "wav" => parse_wav_channels(&bytes),
        "aif" | "aiff" | "aifc" => parse_aiff_channels(&bytes),
        _ => {
            trace!(path = %path.display(), ext, "Not a recognized audio container");
            None
        }
    }
}

/// Channel count from a RIFF/WAVE byte buffer.
pub fn parse_wav_channels(bytes: &[u8]) -> Option<u16> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return None;
    }

    let mut offset = 12usize;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().ok()?) as usize;
        if id == b"fmt " {
            let payload = bytes.get(offset + 8..offset + 8 + size)?;
            if payload.len() < 4 {
                return None;
            }
            return Some(u16::from_le_bytes([payload[2], payload[3]]));
        }
        offset = offset.checked_add(8 + size + (size & 1))?;
    }
    None
}

/// Channel count from a FORM/AIFF or FORM/AIFC byte buffer.
pub fn parse_aiff_channels(bytes: &[u8]) -> Option<u16> {
    if bytes.len() < 12 || &bytes[0..4] != b"FORM" {
        return None;
    }
    let form_type = &bytes[8..12];
    if form_type != b"AIFF" && form_type != b"AIFC" {
        return None;
    }

    let mut offset = 12usize;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_be_bytes(bytes[offset + 4..offset + 8].try_into().ok()?) as usize;
        if id == b"COMM" {
            let payload = bytes.get(offset + 8..offset + 8 + size)?;
            if payload.len() < 2 {
                return None;
            }
            return Some(u16::from_be_bytes([payload[0], payload[1]]));
        }
        offset = offset.checked_add(8 + size + (size & 1))?;
    }
    None
}
