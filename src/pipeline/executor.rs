use crate::config::Config;
use crate::error::{ErrorReport, PipelineError, Result};
use crate::pipeline::chain::TransitionChainBuilder;
use crate::pipeline::normalize::{
    ClipSpec, DroppedClip, NormalizationCoordinator, NormalizationOutcome,
};
use clipforge_av::{
    resolve_tool, validate_input, FfmpegEngine, FfprobeProber, MediaEngine, MediaInfo,
    NormalizationProfile, Prober, TransitionSpec, Workspace,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(f32, &str) + Send + Sync>;

/// Batch-wide settings, fixed for the lifetime of a [`Concatenator`].
#[derive(Debug, Clone)]
pub struct ConcatSettings {
    pub profile: NormalizationProfile,
    pub max_workers: usize,
    /// Base directory under which each run creates its workspace
    pub workspace_root: PathBuf,
    /// Destination when a request names none
    pub default_output: PathBuf,
}

impl ConcatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            profile: config.normalization.profile(),
            max_workers: config.normalization.worker_count(),
            workspace_root: config.workspace.root.clone(),
            default_output: config.workspace.default_output(),
        }
    }

    /// Default settings with the workspace and output under `root`.
    pub fn rooted_at(root: &Path) -> Self {
        let mut config = Config::default();
        config.workspace.root = root.to_path_buf();
        Self::from_config(&config)
    }
}

impl Default for ConcatSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of a successful concatenation.
#[derive(Debug, Clone, Serialize)]
pub struct ConcatReport {
    pub output_path: PathBuf,
    pub clips_used: usize,
    pub clips_dropped: Vec<DroppedClip>,
    /// Set when the final video was written but the workspace could not be
    /// removed afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_error: Option<String>,
}

/// Runs the whole pipeline: validate, normalize in parallel, chain
/// transitions, promote the result, clean up.
pub struct Concatenator {
    engine: Arc<dyn MediaEngine>,
    prober: Arc<dyn Prober>,
    settings: ConcatSettings,
    progress_callback: Option<ProgressCallback>,
}

impl Concatenator {
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        prober: Arc<dyn Prober>,
        settings: ConcatSettings,
    ) -> Self {
        Self {
            engine,
            prober,
            settings,
            progress_callback: None,
        }
    }

    /// ffmpeg/ffprobe backed pipeline using the configured tool paths.
    ///
    /// Missing tools are not fatal here; every call will fail with a
    /// tool-not-found error until they are installed.
    pub fn from_config(config: &Config) -> Self {
        let ffmpeg = tool_or_bare_name("ffmpeg", config);
        let ffprobe = tool_or_bare_name("ffprobe", config);

        Self::new(
            Arc::new(FfmpegEngine::new(ffmpeg)),
            Arc::new(FfprobeProber::new(ffprobe)),
            ConcatSettings::from_config(config),
        )
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn report_progress(&self, progress: f32, step: &str) {
        if let Some(ref cb) = self.progress_callback {
            cb(progress, step);
        }
        tracing::info!("[{:.0}%] {}", progress, step);
    }

    /// Validate and probe a single input.
    pub fn inspect(&self, path: &Path) -> Result<MediaInfo> {
        validate_input(path, self.prober.as_ref())
            .map_err(|e| PipelineError::from_validation(path, e))
    }

    /// Validate every input, failing on the first bad one.
    pub fn validate_inputs(&self, clips: &[PathBuf]) -> Result<()> {
        for clip in clips {
            self.inspect(clip)?;
        }
        Ok(())
    }

    /// Normalize `clips` into `output_dir` without chaining them.
    pub fn normalize(&self, clips: &[PathBuf], output_dir: &Path) -> Result<NormalizationOutcome> {
        self.validate_inputs(clips)?;
        std::fs::create_dir_all(output_dir).map_err(|e| {
            PipelineError::Lifecycle(format!(
                "failed to create {}: {}",
                output_dir.display(),
                e
            ))
        })?;
        self.coordinator().normalize_all(
            &ClipSpec::from_paths(clips),
            &self.settings.profile,
            output_dir,
        )
    }

    /// Concatenate `clips` with `transition` between each pair.
    ///
    /// The result goes to `output`, or to the configured default output,
    /// replacing whatever is there. The run workspace is removed only after
    /// success; a failed run leaves it behind for inspection.
    pub fn concatenate(
        &self,
        clips: &[PathBuf],
        transition: &TransitionSpec,
        output: Option<&Path>,
    ) -> Result<ConcatReport> {
        if clips.len() < 2 {
            return Err(PipelineError::input(format!(
                "at least two video clips are required, got {}",
                clips.len()
            )));
        }

        let destination = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.default_output.clone());

        self.report_progress(0.0, &format!("Validating {} clips", clips.len()));
        self.validate_inputs(clips)?;

        let workspace = Workspace::create(&self.settings.workspace_root)
            .map_err(|e| PipelineError::Lifecycle(e.to_string()))?;

        let outcome = match self.run(clips, transition, &destination, &workspace) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    "Concatenation failed; leaving workspace {:?} in place",
                    workspace.root()
                );
                workspace.keep();
                return Err(e);
            }
        };

        self.report_progress(100.0, "Cleaning up");
        let cleanup_error = workspace.cleanup().err().map(|e| {
            tracing::warn!("Failed to clean up workspace: {}", e);
            e.to_string()
        });

        tracing::info!(
            "Concatenated {} clips into {:?}",
            outcome.clips.len(),
            destination
        );

        Ok(ConcatReport {
            output_path: destination,
            clips_used: outcome.clips.len(),
            clips_dropped: outcome.dropped,
            cleanup_error,
        })
    }

    /// Caller-facing entry point: parse the style, run the pipeline and
    /// return either the output path or a structured error payload.
    pub fn concatenate_with_transitions(
        &self,
        clips: &[PathBuf],
        style: &str,
        duration_secs: f64,
    ) -> std::result::Result<PathBuf, ErrorReport> {
        let transition = TransitionSpec::parse(style, duration_secs)
            .map_err(|e| PipelineError::input(e.to_string()).report())?;

        self.concatenate(clips, &transition, None)
            .map(|report| report.output_path)
            .map_err(|e| e.report())
    }

    fn run(
        &self,
        clips: &[PathBuf],
        transition: &TransitionSpec,
        destination: &Path,
        workspace: &Workspace,
    ) -> Result<NormalizationOutcome> {
        self.report_progress(10.0, "Normalizing clips");
        let outcome = self.coordinator().normalize_all(
            &ClipSpec::from_paths(clips),
            &self.settings.profile,
            workspace.normalized_dir(),
        )?;

        self.report_progress(
            50.0,
            &format!("Applying {} transitions", outcome.clips.len().saturating_sub(1)),
        );
        TransitionChainBuilder::new(
            self.engine.as_ref(),
            self.prober.as_ref(),
            &self.settings.profile,
            workspace,
        )
        .build_chain(&outcome.paths(), transition, destination)?;

        Ok(outcome)
    }

    fn coordinator(&self) -> NormalizationCoordinator<'_> {
        NormalizationCoordinator::new(self.engine.as_ref(), self.prober.as_ref())
            .with_max_workers(self.settings.max_workers)
    }
}

fn tool_or_bare_name(name: &str, config: &Config) -> PathBuf {
    match resolve_tool(name, config.tools.configured_path(name)) {
        Ok(tool) => tool.path,
        Err(e) => {
            tracing::warn!("{}; falling back to `{}` on PATH", e, name);
            PathBuf::from(name)
        }
    }
}

/// Run the full pipeline with default settings and the tools found on `PATH`.
pub fn concatenate_with_transitions(
    clips: &[PathBuf],
    style: &str,
    duration_secs: f64,
) -> std::result::Result<PathBuf, ErrorReport> {
    Concatenator::from_config(&Config::default())
        .concatenate_with_transitions(clips, style, duration_secs)
}

impl std::fmt::Debug for Concatenator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Concatenator")
            .field("engine", &self.engine.name())
            .field("prober", &self.prober.name())
            .field("settings", &self.settings)
            .finish()
    }
}
