//! Tool request types with JSON Schema for parameter generation

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConcatClipsRequest {
    #[schemars(description = "Paths of the video clips to join, in playback order (at least two)")]
    pub input_video_clips: Vec<String>,
    #[schemars(
        description = "Transition style between clips, e.g. fade, dissolve, wipeleft, circleopen (default: fade). Call list_transitions for all names"
    )]
    pub transition_type: Option<String>,
    #[schemars(description = "Transition length in seconds (default: 2.0)")]
    pub transition_duration: Option<f64>,
    #[schemars(description = "Where to write the result (default: the server's output directory)")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VideoMetadataRequest {
    #[schemars(description = "Path of the video file to inspect")]
    pub input_video_path: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListTransitionsRequest {}
