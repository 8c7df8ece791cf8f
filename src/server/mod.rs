//! Agent tool server.
//!
//! Exposes the concatenation pipeline as tools over stdio using the Model
//! Context Protocol. Pipeline failures come back as tool results flagged as
//! errors whose text is the JSON error report; protocol-level errors are
//! reserved for malformed requests and internal faults.

pub mod tools;

use crate::config::{Config, TransitionConfig};
use crate::error::PipelineError;
use crate::pipeline::{ConcatReport, Concatenator};
use clipforge_av::{MediaInfo, TransitionKind, TransitionSpec};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::borrow::Cow;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tools::*;

fn text_content(s: impl Into<String>) -> Content {
    Content {
        raw: RawContent::Text(RawTextContent { text: s.into() }),
        annotations: None,
    }
}

fn internal_error(message: impl Into<String>) -> ErrorData {
    ErrorData {
        code: ErrorCode(-32603),
        message: Cow::from(message.into()),
        data: None,
    }
}

fn json_result(value: &serde_json::Value) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(value).map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![text_content(text)]))
}

fn pipeline_error_result(err: &PipelineError) -> CallToolResult {
    tracing::error!("{}", err);
    CallToolResult::error(vec![text_content(err.report().to_json())])
}

/// Success payload of `concat_clips_with_transition`.
pub fn concat_response(report: &ConcatReport) -> serde_json::Value {
    let mut body = serde_json::json!({
        "status": "OK",
        "output_path": report.output_path,
        "clips_used": report.clips_used,
        "clips_dropped": report.clips_dropped,
    });
    if let Some(ref cleanup_error) = report.cleanup_error {
        body["cleanup_error"] = serde_json::Value::from(cleanup_error.as_str());
    }
    body
}

/// Success payload of `get_video_metadata`.
pub fn metadata_response(info: &MediaInfo) -> serde_json::Value {
    let video = info.primary_video().map(|v| {
        serde_json::json!({
            "codec": v.codec,
            "width": v.width,
            "height": v.height,
            "frame_rate": v.frame_rate_expr,
        })
    });
    let audio: Vec<serde_json::Value> = info
        .audio_tracks
        .iter()
        .map(|a| {
            serde_json::json!({
                "codec": a.codec,
                "channels": a.channels,
                "sample_rate": a.sample_rate,
            })
        })
        .collect();

    serde_json::json!({
        "status": "OK",
        "path": info.file_path,
        "container": info.container,
        "size_bytes": info.file_size,
        "duration_secs": info.duration_secs(),
        "has_audio": info.has_audio(),
        "video": video,
        "audio": audio,
    })
}

/// Success payload of `list_transitions`.
pub fn transitions_response(defaults: &TransitionConfig) -> serde_json::Value {
    let names: Vec<&str> = TransitionKind::ALL.iter().map(|k| k.name()).collect();
    serde_json::json!({
        "status": "OK",
        "default": defaults.kind.name(),
        "default_duration_secs": defaults.duration_secs,
        "transitions": names,
    })
}

#[derive(Debug, Clone)]
pub struct ClipforgeService {
    concatenator: Arc<Concatenator>,
    defaults: TransitionConfig,
    tool_router: ToolRouter<ClipforgeService>,
}

#[tool_router]
impl ClipforgeService {
    pub fn new(concatenator: Concatenator, defaults: TransitionConfig) -> Self {
        Self {
            concatenator: Arc::new(concatenator),
            defaults,
            tool_router: Self::tool_router(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Concatenator::from_config(config),
            config.transition.clone(),
        )
    }

    #[tool(
        description = "Join two or more video clips into one video with a transition between each pair. \
                       Clips are first normalized to a common resolution, frame rate and codec; \
                       clips that fail normalization are skipped and reported."
    )]
    async fn concat_clips_with_transition(
        &self,
        Parameters(req): Parameters<ConcatClipsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let style = req
            .transition_type
            .as_deref()
            .unwrap_or(self.defaults.kind.name());
        let duration = req.transition_duration.unwrap_or(self.defaults.duration_secs);
        let transition = match TransitionSpec::parse(style, duration) {
            Ok(spec) => spec,
            Err(e) => return Ok(pipeline_error_result(&PipelineError::input(e.to_string()))),
        };

        let clips: Vec<PathBuf> = req.input_video_clips.iter().map(PathBuf::from).collect();
        let output = req.output_path.map(PathBuf::from);
        let concatenator = Arc::clone(&self.concatenator);

        let result = tokio::task::spawn_blocking(move || {
            concatenator.concatenate(&clips, &transition, output.as_deref())
        })
        .await
        .map_err(|e| internal_error(format!("concatenation task failed: {e}")))?;

        match result {
            Ok(report) => json_result(&concat_response(&report)),
            Err(e) => Ok(pipeline_error_result(&e)),
        }
    }

    #[tool(description = "Probe a video file: duration, container, video stream and audio streams")]
    async fn get_video_metadata(
        &self,
        Parameters(req): Parameters<VideoMetadataRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let path = PathBuf::from(req.input_video_path);
        let concatenator = Arc::clone(&self.concatenator);

        let result = tokio::task::spawn_blocking(move || concatenator.inspect(&path))
            .await
            .map_err(|e| internal_error(format!("probe task failed: {e}")))?;

        match result {
            Ok(info) => json_result(&metadata_response(&info)),
            Err(e) => Ok(pipeline_error_result(&e)),
        }
    }

    #[tool(description = "List the transition styles accepted by concat_clips_with_transition")]
    async fn list_transitions(
        &self,
        Parameters(_req): Parameters<ListTransitionsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        json_result(&transitions_response(&self.defaults))
    }
}

#[tool_handler]
impl ServerHandler for ClipforgeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "clipforge".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Clipforge: join video clips with crossfade-style transitions (concat_clips_with_transition), \
                 inspect a video (get_video_metadata) and list transition styles (list_transitions). \
                 Requires ffmpeg and ffprobe on the server host."
                    .to_string(),
            ),
        }
    }
}

/// Serve tools over stdin/stdout until the client disconnects.
pub async fn serve_stdio(config: &Config) -> anyhow::Result<()> {
    use anyhow::Context;
    use rmcp::service::ServiceExt;
    use rmcp::transport::io::stdio;

    tracing::info!("Starting clipforge tool server on stdio");

    let service = ClipforgeService::from_config(config);
    let running = service
        .serve(stdio())
        .await
        .context("MCP transport failed")?;
    running.waiting().await.context("MCP server error")?;

    Ok(())
}
