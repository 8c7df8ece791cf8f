//! Target encoding parameters shared by every clip in a batch.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// x264 speed/compression trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    #[default]
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl SpeedPreset {
    /// Get the ffmpeg preset name.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            SpeedPreset::Ultrafast => "ultrafast",
            SpeedPreset::Superfast => "superfast",
            SpeedPreset::Veryfast => "veryfast",
            SpeedPreset::Faster => "faster",
            SpeedPreset::Fast => "fast",
            SpeedPreset::Medium => "medium",
            SpeedPreset::Slow => "slow",
            SpeedPreset::Slower => "slower",
            SpeedPreset::Veryslow => "veryslow",
        }
    }
}

impl std::str::FromStr for SpeedPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ultrafast" => Ok(SpeedPreset::Ultrafast),
            "superfast" => Ok(SpeedPreset::Superfast),
            "veryfast" => Ok(SpeedPreset::Veryfast),
            "faster" => Ok(SpeedPreset::Faster),
            "fast" => Ok(SpeedPreset::Fast),
            "medium" => Ok(SpeedPreset::Medium),
            "slow" => Ok(SpeedPreset::Slow),
            "slower" => Ok(SpeedPreset::Slower),
            "veryslow" => Ok(SpeedPreset::Veryslow),
            _ => Err(format!("Unknown speed preset: {}", s)),
        }
    }
}

/// Resolution, frame rate and encoder settings every clip is normalized to.
///
/// One profile is shared read-only by all workers of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationProfile {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub frame_rate: u32,
    /// x264 CRF (lower is higher quality).
    pub quality_factor: u8,
    /// AAC bitrate token, e.g. "128k".
    pub audio_bitrate: String,
    /// Audio sample rate in Hz.
    pub audio_sample_rate: u32,
    /// x264 preset.
    pub speed_preset: SpeedPreset,
}

impl Default for NormalizationProfile {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frame_rate: 30,
            quality_factor: 23,
            audio_bitrate: "128k".to_string(),
            audio_sample_rate: 48_000,
            speed_preset: SpeedPreset::Fast,
        }
    }
}

impl NormalizationProfile {
    /// Highest CRF libx264 accepts for 8-bit output.
    pub const MAX_QUALITY_FACTOR: u8 = 51;

    /// Check the profile describes something the encoder can produce.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidInput(format!(
                "resolution must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        // yuv420p needs even dimensions
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(Error::InvalidInput(format!(
                "resolution must be even, got {}x{}",
                self.width, self.height
            )));
        }
        if self.frame_rate == 0 {
            return Err(Error::InvalidInput("frame rate must be positive".into()));
        }
        if self.quality_factor > Self::MAX_QUALITY_FACTOR {
            return Err(Error::InvalidInput(format!(
                "quality factor must be between 0 and {}, got {}",
                Self::MAX_QUALITY_FACTOR,
                self.quality_factor
            )));
        }
        if !is_bitrate_token(&self.audio_bitrate) {
            return Err(Error::InvalidInput(format!(
                "invalid audio bitrate: {:?}",
                self.audio_bitrate
            )));
        }
        if self.audio_sample_rate == 0 {
            return Err(Error::InvalidInput(
                "audio sample rate must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Encoder arguments shared by normalization and crossfade steps.
    pub fn encoder_args(&self) -> Vec<(&'static str, String)> {
        vec![
            ("-c:v", "libx264".to_string()),
            ("-preset", self.speed_preset.ffmpeg_name().to_string()),
            ("-crf", self.quality_factor.to_string()),
            ("-pix_fmt", "yuv420p".to_string()),
            ("-r", self.frame_rate.to_string()),
            ("-c:a", "aac".to_string()),
            ("-b:a", self.audio_bitrate.clone()),
            ("-ar", self.audio_sample_rate.to_string()),
            ("-ac", "2".to_string()),
            ("-movflags", "+faststart".to_string()),
            ("-f", "mp4".to_string()),
        ]
    }
}

/// `128k`, `1M`, `96000`.
fn is_bitrate_token(token: &str) -> bool {
    let digits = token.trim_end_matches(['k', 'K', 'm', 'M']);
    let suffix_len = token.len() - digits.len();
    !digits.is_empty() && suffix_len <= 1 && digits.chars().all(|c| c.is_ascii_digit())
}
