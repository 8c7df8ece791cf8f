//! Shared helpers for integration tests.
//!
//! Re-exports the fake engine and prober from `clipforge_av::testing` and
//! adds [`make_clip`] for generating real clips when ffmpeg is installed.

#![allow(dead_code, unused_imports)]

use clipforge::pipeline::{ConcatSettings, Concatenator};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

pub use clipforge_av::testing::{clip_duration, graph_value, write_clip, FakeEngine, FakeProber};

/// A concatenator over fakes, rooted at `root`.
pub fn fake_concatenator(root: &Path, engine: Arc<FakeEngine>) -> Concatenator {
    Concatenator::new(engine, Arc::new(FakeProber), ConcatSettings::rooted_at(root))
}

/// `work-*` directories left under `root`.
pub fn leftover_workspaces(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("work-"))
        })
        .collect()
}

/// Whether ffmpeg and ffprobe are both on `PATH`.
pub fn ffmpeg_available() -> bool {
    which::which("ffmpeg").is_ok() && which::which("ffprobe").is_ok()
}

/// Generate a real test-pattern clip with ffmpeg.
pub fn make_clip(
    dir: &Path,
    name: &str,
    duration_secs: f64,
    size: (u32, u32),
    with_audio: bool,
) -> PathBuf {
    let path = dir.join(name);
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-f", "lavfi", "-i"])
        .arg(format!(
            "testsrc=size={}x{}:rate=25:duration={}",
            size.0, size.1, duration_secs
        ));
    if with_audio {
        cmd.args(["-f", "lavfi", "-i"])
            .arg(format!("sine=frequency=440:duration={}", duration_secs));
    }
    cmd.args(["-c:v", "libx264", "-preset", "ultrafast", "-pix_fmt", "yuv420p"]);
    if with_audio {
        cmd.args(["-c:a", "aac", "-shortest"]);
    }
    cmd.arg(&path);

    let status = cmd.status().expect("failed to run ffmpeg");
    assert!(status.success(), "ffmpeg failed to generate {name}");
    path
}
