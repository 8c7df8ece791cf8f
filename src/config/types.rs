use clipforge_av::{NormalizationProfile, SpeedPreset, TransitionKind, TransitionSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub normalization: NormalizationConfig,

    #[serde(default)]
    pub transition: TransitionConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

impl ToolsConfig {
    /// Configured override for `tool`, if any.
    pub fn configured_path(&self, tool: &str) -> Option<&Path> {
        match tool {
            "ffmpeg" => self.ffmpeg_path.as_deref(),
            "ffprobe" => self.ffprobe_path.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Base directory for run workspaces
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,

    /// Where finished videos land (default: `<root>/output`)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// File name of the finished video when the caller gives no output path
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("./processed_elements")
}

fn default_output_name() -> String {
    "output_concatenated_video.mp4".to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            output_dir: None,
            output_name: default_output_name(),
        }
    }
}

impl WorkspaceConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.root.join("output"))
    }

    /// Destination used when a request does not name one.
    pub fn default_output(&self) -> PathBuf {
        self.output_dir().join(&self.output_name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NormalizationConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// x264 CRF, 0-51
    #[serde(default = "default_quality_factor")]
    pub quality_factor: u8,

    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,

    #[serde(default)]
    pub speed_preset: SpeedPreset,

    /// Parallel normalization workers (default: number of CPUs)
    #[serde(default)]
    pub max_workers: Option<usize>,
}

fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_frame_rate() -> u32 {
    30
}
fn default_quality_factor() -> u8 {
    23
}
fn default_audio_bitrate() -> String {
    "128k".to_string()
}
fn default_audio_sample_rate() -> u32 {
    48_000
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frame_rate: default_frame_rate(),
            quality_factor: default_quality_factor(),
            audio_bitrate: default_audio_bitrate(),
            audio_sample_rate: default_audio_sample_rate(),
            speed_preset: SpeedPreset::default(),
            max_workers: None,
        }
    }
}

impl NormalizationConfig {
    pub fn profile(&self) -> NormalizationProfile {
        NormalizationProfile {
            width: self.width,
            height: self.height,
            frame_rate: self.frame_rate,
            quality_factor: self.quality_factor,
            audio_bitrate: self.audio_bitrate.clone(),
            audio_sample_rate: self.audio_sample_rate,
            speed_preset: self.speed_preset,
        }
    }

    /// Configured worker count, or one per CPU.
    pub fn worker_count(&self) -> usize {
        self.max_workers
            .unwrap_or_else(crate::pipeline::default_worker_count)
            .max(1)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransitionConfig {
    /// Default transition style
    #[serde(default)]
    pub kind: TransitionKind,

    /// Default transition length in seconds
    #[serde(default = "default_transition_duration")]
    pub duration_secs: f64,
}

fn default_transition_duration() -> f64 {
    TransitionSpec::DEFAULT_DURATION_SECS
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            kind: TransitionKind::default(),
            duration_secs: default_transition_duration(),
        }
    }
}

impl TransitionConfig {
    pub fn spec(&self) -> clipforge_av::Result<TransitionSpec> {
        TransitionSpec::new(self.kind, self.duration_secs)
    }
}
