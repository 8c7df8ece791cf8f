//! Left-to-right fold of normalized clips into one video.

use crate::error::{PipelineError, Result};
use clipforge_av::actions::crossfade;
use clipforge_av::{promote, MediaEngine, NormalizationProfile, Prober, TransitionSpec, Workspace};
use std::path::{Path, PathBuf};

/// Fold accumulator: the video built so far and the last step applied.
///
/// Step `i` (1-based) merges clip `i` onto the accumulator, so after step
/// `i` the accumulator covers clips `0..=i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState {
    pub accumulator: PathBuf,
    pub step_index: usize,
}

/// Builds the transition chain, writing one intermediate file per step into
/// the run workspace.
pub struct TransitionChainBuilder<'a> {
    engine: &'a dyn MediaEngine,
    prober: &'a dyn Prober,
    profile: &'a NormalizationProfile,
    workspace: &'a Workspace,
}

impl<'a> TransitionChainBuilder<'a> {
    pub fn new(
        engine: &'a dyn MediaEngine,
        prober: &'a dyn Prober,
        profile: &'a NormalizationProfile,
        workspace: &'a Workspace,
    ) -> Self {
        Self {
            engine,
            prober,
            profile,
            workspace,
        }
    }

    /// Chain `clips` with `transition` between every adjacent pair and move
    /// the result to `output`.
    ///
    /// Stops at the first failing step; later steps never run. Intermediate
    /// files stay in the intermediate directory either way.
    pub fn build_chain(
        &self,
        clips: &[PathBuf],
        transition: &TransitionSpec,
        output: &Path,
    ) -> Result<PathBuf> {
        let (first, rest) = match clips {
            [first, rest @ ..] if !rest.is_empty() => (first, rest),
            _ => {
                return Err(PipelineError::input(format!(
                    "at least two clips are needed for a transition, got {}",
                    clips.len()
                )))
            }
        };

        let total_steps = rest.len();
        tracing::info!(
            "Chaining {} clips with {} ({:.2}s)",
            clips.len(),
            transition.kind,
            transition.duration_secs
        );

        let initial = ChainState {
            accumulator: first.clone(),
            step_index: 0,
        };

        let last = rest
            .iter()
            .enumerate()
            .try_fold(initial, |state, (i, next)| {
                self.step(state, next, i + 1, total_steps, transition)
            })?;

        promote(&last.accumulator, output).map_err(|e| {
            PipelineError::Lifecycle(format!(
                "failed to move result to {}: {}",
                output.display(),
                e
            ))
        })
    }

    fn step(
        &self,
        state: ChainState,
        next: &Path,
        step: usize,
        total_steps: usize,
        transition: &TransitionSpec,
    ) -> Result<ChainState> {
        let duration = self
            .prober
            .probe(&state.accumulator)
            .map_err(|e| e.to_string())
            .and_then(|info| {
                info.duration
                    .map(|d| d.as_secs_f64())
                    .ok_or_else(|| "no duration reported".to_string())
            })
            .map_err(|message| PipelineError::Probe {
                path: state.accumulator.clone(),
                step: Some(step),
                message,
            })?;

        let offset = transition.offset_for(duration);
        let output = self.workspace.step_file(step, total_steps);

        tracing::debug!(
            "Step {}/{}: {:?} ({:.3}s) + {:?} at {:.3}s",
            step,
            total_steps,
            state.accumulator,
            duration,
            next,
            offset
        );

        crossfade(
            self.engine,
            &state.accumulator,
            next,
            &output,
            transition,
            offset,
            self.profile,
        )
        .map_err(|e| PipelineError::Transition {
            step,
            message: e.to_string(),
        })?;

        Ok(ChainState {
            accumulator: output,
            step_index: step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_av::testing::{clip_duration, write_clip, FakeEngine, FakeProber};
    use clipforge_av::TransitionKind;

    fn setup(durations: &[f64]) -> (tempfile::TempDir, Vec<PathBuf>, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let clips = durations
            .iter()
            .enumerate()
            .map(|(i, d)| write_clip(dir.path(), &format!("normalized_{i:04}.mp4"), *d, true))
            .collect();
        let workspace = Workspace::create(dir.path()).unwrap();
        (dir, clips, workspace)
    }

    #[test]
    fn test_output_duration_accounts_for_overlaps() {
        let (dir, clips, workspace) = setup(&[5.0, 6.0, 7.0]);
        let engine = FakeEngine::default();
        let profile = NormalizationProfile::default();
        let spec = TransitionSpec::new(TransitionKind::Fade, 1.0).unwrap();
        let output = dir.path().join("out").join("final.mp4");

        let result = TransitionChainBuilder::new(&engine, &FakeProber, &profile, &workspace)
            .build_chain(&clips, &spec, &output)
            .unwrap();

        assert_eq!(result, output);
        // 5 + 6 + 7 - 2 * 1
        assert!((clip_duration(&output) - 16.0).abs() < 1e-6);

        let requests = engine.requests();
        assert_eq!(requests.len(), 2);
        let inputs: Vec<Vec<PathBuf>> = requests
            .iter()
            .map(|r| r.input_files().map(Path::to_path_buf).collect())
            .collect();
        assert_eq!(inputs[0], vec![clips[0].clone(), clips[1].clone()]);
        assert_eq!(inputs[1][0], workspace.intermediate_dir().join("step_0001.mp4"));
        assert_eq!(inputs[1][1], clips[2]);
    }

    #[test]
    fn test_offset_uses_accumulated_duration() {
        let (dir, clips, workspace) = setup(&[4.0, 4.0, 4.0]);
        let engine = FakeEngine::default();
        let profile = NormalizationProfile::default();
        let spec = TransitionSpec::default();

        TransitionChainBuilder::new(&engine, &FakeProber, &profile, &workspace)
            .build_chain(&clips, &spec, &dir.path().join("final.mp4"))
            .unwrap();

        let requests = engine.requests();
        let graph = |i: usize| match &requests[i].filter {
            clipforge_av::engine::Filter::Complex { graph, .. } => graph.clone(),
            other => panic!("unexpected filter {:?}", other),
        };
        assert!(graph(0).contains("offset=2.000"));
        // accumulator after step 1 is 2 + 4 = 6s long
        assert!(graph(1).contains("offset=4.000"));
    }

    #[test]
    fn test_short_clip_offset_clamped() {
        let (dir, clips, workspace) = setup(&[1.0, 4.0]);
        let engine = FakeEngine::default();
        let profile = NormalizationProfile::default();
        let spec = TransitionSpec::new(TransitionKind::Dissolve, 3.0).unwrap();

        TransitionChainBuilder::new(&engine, &FakeProber, &profile, &workspace)
            .build_chain(&clips, &spec, &dir.path().join("final.mp4"))
            .unwrap();

        match &engine.requests()[0].filter {
            clipforge_av::engine::Filter::Complex { graph, .. } => {
                assert!(graph.contains("offset=0.000"));
                assert!(graph.contains("transition=dissolve"));
            }
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn test_failing_step_stops_chain() {
        let (dir, clips, workspace) = setup(&[4.0, 4.0, 4.0, 4.0]);
        let engine = FakeEngine::default().failing_output("step_0002.mp4");
        let profile = NormalizationProfile::default();
        let output = dir.path().join("final.mp4");

        let err = TransitionChainBuilder::new(&engine, &FakeProber, &profile, &workspace)
            .build_chain(&clips, &TransitionSpec::default(), &output)
            .unwrap_err();

        assert_matches::assert_matches!(err, PipelineError::Transition { step: 2, .. });
        assert_eq!(engine.requests().len(), 2);
        assert!(!output.exists());
        assert!(workspace.intermediate_dir().join("step_0001.mp4").exists());
    }

    #[test]
    fn test_single_clip_rejected() {
        let (dir, clips, workspace) = setup(&[4.0]);
        let engine = FakeEngine::default();
        let profile = NormalizationProfile::default();

        let err = TransitionChainBuilder::new(&engine, &FakeProber, &profile, &workspace)
            .build_chain(&clips, &TransitionSpec::default(), &dir.path().join("x.mp4"))
            .unwrap_err();

        assert_eq!(err.kind(), "InputError");
        assert!(engine.requests().is_empty());
    }

    #[test]
    fn test_empty_list_rejected() {
        let (dir, _, workspace) = setup(&[]);
        let engine = FakeEngine::default();
        let profile = NormalizationProfile::default();

        let err = TransitionChainBuilder::new(&engine, &FakeProber, &profile, &workspace)
            .build_chain(&[], &TransitionSpec::default(), &dir.path().join("x.mp4"))
            .unwrap_err();

        assert_eq!(err.kind(), "InputError");
        assert!(engine.requests().is_empty());
        assert!(!dir.path().join("x.mp4").exists());
    }
}
