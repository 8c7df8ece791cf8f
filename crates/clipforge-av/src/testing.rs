//! In-memory stand-ins for ffmpeg/ffprobe, shared by unit and integration
//! tests.
//!
//! A fake media file is a small text file: `duration=<secs>` plus an
//! optional `audio=0` line. [`FakeEngine`] writes outputs in the same
//! format, computing the duration a real crossfade would produce, so tests
//! can check timing without an encoder.

use crate::engine::Filter;
use crate::{AudioTrack, Error, MediaEngine, MediaInfo, Prober, Result, TranscodeRequest, VideoTrack};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Write a fake clip lasting `duration_secs`.
pub fn write_clip(dir: &Path, name: &str, duration_secs: f64, audio: bool) -> PathBuf {
    let path = dir.join(name);
    let mut body = format!("duration={duration_secs}\n");
    if !audio {
        body.push_str("audio=0\n");
    }
    std::fs::write(&path, body).expect("failed to write fake clip");
    path
}

/// Duration of a fake clip.
pub fn clip_duration(path: &Path) -> f64 {
    FakeProber
        .probe(path)
        .expect("failed to probe fake clip")
        .duration_secs()
}

/// Numeric value following `key` in a filter graph, e.g. `offset=`.
pub fn graph_value(graph: &str, key: &str) -> f64 {
    graph
        .split_once(key)
        .map(|(_, rest)| {
            rest.chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect::<String>()
        })
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

pub struct FakeProber;

impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let content = std::fs::read_to_string(path).map_err(|_| Error::file_not_found(path))?;
        let duration = content
            .lines()
            .find_map(|l| l.strip_prefix("duration="))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .ok_or_else(|| {
                Error::tool_failed("ffprobe", "Invalid data found when processing input")
            })?;
        let audio_tracks = if content.lines().any(|l| l == "audio=0") {
            Vec::new()
        } else {
            vec![AudioTrack {
                index: 1,
                codec: "aac".to_string(),
                channels: 2,
                sample_rate: Some(48_000),
            }]
        };

        Ok(MediaInfo {
            file_path: path.to_path_buf(),
            file_size: content.len() as u64,
            container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: Some(Duration::from_secs_f64(duration)),
            video_tracks: vec![VideoTrack {
                index: 0,
                codec: "h264".to_string(),
                width: 1280,
                height: 720,
                frame_rate_expr: "30/1".to_string(),
                frame_rate: Some(30.0),
            }],
            audio_tracks,
        })
    }
}

/// Records every request and writes outputs whose duration matches what
/// the real filters would produce.
#[derive(Default)]
pub struct FakeEngine {
    requests: Mutex<Vec<TranscodeRequest>>,
    failing_inputs: HashSet<PathBuf>,
    failing_outputs: HashSet<String>,
}

impl FakeEngine {
    /// Fail any request that reads `path`.
    pub fn failing_input(mut self, path: &Path) -> Self {
        self.failing_inputs.insert(path.to_path_buf());
        self
    }

    /// Fail any request whose output file is called `name`.
    pub fn failing_output(mut self, name: &str) -> Self {
        self.failing_outputs.insert(name.to_string());
        self
    }

    pub fn requests(&self) -> Vec<TranscodeRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// Requests that merged two inputs, in execution order.
    pub fn crossfades(&self) -> Vec<TranscodeRequest> {
        self.requests()
            .into_iter()
            .filter(|r| matches!(r.filter, Filter::Complex { .. }))
            .collect()
    }
}

impl MediaEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn transcode(&self, request: &TranscodeRequest) -> Result<()> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());

        let inputs: Vec<&Path> = request.input_files().collect();
        if inputs.iter().any(|p| self.failing_inputs.contains(*p)) {
            return Err(Error::tool_failed("ffmpeg", "moov atom not found"));
        }
        let output_name = request
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_outputs.contains(&output_name) {
            return Err(Error::tool_failed("ffmpeg", "Error initializing filter 'xfade'"));
        }

        let duration = match (&request.filter, inputs.as_slice()) {
            (Filter::Complex { graph, .. }, [_, second]) => {
                graph_value(graph, "offset=") + clip_duration(second)
            }
            (_, [source, ..]) => clip_duration(source),
            _ => return Err(Error::InvalidInput("no inputs".into())),
        };

        std::fs::write(&request.output, format!("duration={duration}\n"))?;
        Ok(())
    }
}
