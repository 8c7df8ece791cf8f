//! Media information types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Information about a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// File size in bytes.
    pub file_size: u64,
    /// Container format as reported by the prober (e.g., "mov,mp4,m4a,3gp,3g2,mj2").
    pub container: String,
    /// Container duration.
    pub duration: Option<Duration>,
    /// Video tracks in the file.
    pub video_tracks: Vec<VideoTrack>,
    /// Audio tracks in the file.
    pub audio_tracks: Vec<AudioTrack>,
}

/// Information about a video track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoTrack {
    /// Track index.
    pub index: u32,
    /// Video codec (e.g., "h264", "hevc").
    pub codec: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frame rate exactly as the prober reported it (e.g., "30000/1001").
    pub frame_rate_expr: String,
    /// Frame rate in FPS, when the expression could be evaluated.
    pub frame_rate: Option<f64>,
}

/// Information about an audio track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Track index.
    pub index: u32,
    /// Audio codec (e.g., "aac", "opus").
    pub codec: String,
    /// Number of channels.
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
}

impl MediaInfo {
    /// Get the primary (first) video track.
    pub fn primary_video(&self) -> Option<&VideoTrack> {
        self.video_tracks.first()
    }

    /// Whether the file carries at least one video stream.
    pub fn has_video(&self) -> bool {
        !self.video_tracks.is_empty()
    }

    /// Whether the file carries at least one audio stream.
    pub fn has_audio(&self) -> bool {
        !self.audio_tracks.is_empty()
    }

    /// Container duration in seconds, `0.0` when unknown.
    pub fn duration_secs(&self) -> f64 {
        self.duration.map(|d| d.as_secs_f64()).unwrap_or(0.0)
    }

    /// Dimensions of the primary video track.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.primary_video().map(|v| (v.width, v.height))
    }
}
