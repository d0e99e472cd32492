//! Audio decoding
//!
//! Supports WAV, MP3, FLAC and OGG with pure Rust decoders, and falls back to
//! Symphonia for other containers (M4A/AAC, MP4, MKV, WebM).

mod container;
mod decoder;

pub use container::decode_container;
pub use decoder::{decode_audio, AudioData};

use std::path::Path;

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,

    // Decoded through Symphonia
    Mp4,
    Aac,
    Mkv,
    Webm,

    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") => AudioFormat::Ogg,

            Some("mp4") | Some("m4a") => AudioFormat::Mp4,
            Some("aac") => AudioFormat::Aac,
            Some("mkv") | Some("mka") => AudioFormat::Mkv,
            Some("webm") => AudioFormat::Webm,

            _ => AudioFormat::Unknown,
        }
    }

    /// Check if the format goes through the Symphonia container path
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            AudioFormat::Mp4 | AudioFormat::Aac | AudioFormat::Mkv | AudioFormat::Webm
        )
    }
}
