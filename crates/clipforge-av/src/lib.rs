//! # clipforge-av
//!
//! Media probing and processing library behind clipforge.
//!
//! This crate provides functionality for:
//! - Probing media files for duration, stream presence, dimensions and frame rate
//! - Normalizing clips to a shared resolution/frame rate/codec profile
//! - Crossfading two clips with any named `xfade` transition
//! - Run-scoped workspaces for intermediate files and atomic promotion of results
//!
//! All heavy lifting is delegated to an external engine through the
//! [`MediaEngine`] and [`Prober`] traits; [`FfmpegEngine`] and
//! [`FfprobeProber`] drive the `ffmpeg`/`ffprobe` command-line tools.
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//! - `test-support` - Expose the fake engine and prober in [`testing`]
//!
//! ## Example
//!
//! ```no_run
//! use clipforge_av::{FfprobeProber, Prober};
//!
//! let info = FfprobeProber::default().probe("/path/to/clip.mp4".as_ref())?;
//! println!("Duration: {:.2}s", info.duration_secs());
//! if let Some(video) = info.primary_video() {
//!     println!("Video: {}x{} @ {}", video.width, video.height, video.frame_rate_expr);
//! }
//! # Ok::<(), clipforge_av::Error>(())
//! ```

pub mod actions;
pub mod engine;
mod error;
pub mod probe;
pub mod profile;
pub mod tools;
pub mod transition;
pub mod validate;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-exports
pub use engine::{FfmpegEngine, MediaEngine, TranscodeRequest};
pub use error::{Error, Result};
pub use probe::{AudioTrack, FfprobeProber, MediaInfo, Prober, VideoTrack};
pub use profile::{NormalizationProfile, SpeedPreset};
pub use tools::{resolve_tool, ResolvedTool, ToolSource, REQUIRED_TOOLS};
pub use transition::{transition_offset, TransitionKind, TransitionSpec};
pub use validate::validate_input;
pub use workspace::{promote, Workspace};

