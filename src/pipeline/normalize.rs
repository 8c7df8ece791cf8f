//! Parallel normalization of a clip batch.

use crate::error::{PipelineError, Result};
use clipforge_av::actions::{normalize_clip, SourceAudio};
use clipforge_av::workspace::normalized_clip_path;
use clipforge_av::{MediaEngine, NormalizationProfile, Prober};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One input clip, tagged with its position in the caller's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSpec {
    pub source_path: PathBuf,
    pub index: usize,
}

impl ClipSpec {
    /// Tag `paths` with their positions.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<ClipSpec> {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| ClipSpec {
                source_path: path.as_ref().to_path_buf(),
                index,
            })
            .collect()
    }
}

/// A clip that made it through normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedClip {
    pub source_index: usize,
    pub output_path: PathBuf,
}

/// A clip excluded from the batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedClip {
    pub source_index: usize,
    pub source_path: PathBuf,
    pub reason: String,
}

/// Result of normalizing a batch.
///
/// `clips` is sorted by output path, which (thanks to zero-padded names)
/// is the order the caller listed the sources in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizationOutcome {
    pub clips: Vec<NormalizedClip>,
    pub dropped: Vec<DroppedClip>,
}

impl NormalizationOutcome {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.clips.iter().map(|c| c.output_path.clone()).collect()
    }
}

/// One worker per CPU, at least one.
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1)
}

/// Fans a batch of clips out over a bounded worker pool and waits for all
/// of them before returning.
///
/// Workers share the engine, the prober and the profile read-only; each one
/// writes only its own output file.
pub struct NormalizationCoordinator<'a> {
    engine: &'a dyn MediaEngine,
    prober: &'a dyn Prober,
    max_workers: usize,
}

impl<'a> NormalizationCoordinator<'a> {
    pub fn new(engine: &'a dyn MediaEngine, prober: &'a dyn Prober) -> Self {
        Self {
            engine,
            prober,
            max_workers: default_worker_count(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Normalize every clip into `output_dir`.
    ///
    /// A clip that fails is logged and dropped; the batch carries on. Only
    /// an empty input or a batch where nothing succeeded is an error.
    pub fn normalize_all(
        &self,
        clips: &[ClipSpec],
        profile: &NormalizationProfile,
        output_dir: &Path,
    ) -> Result<NormalizationOutcome> {
        if clips.is_empty() {
            return Err(PipelineError::input("no clips to normalize"));
        }

        let total = clips.len();
        let name_span = clips.iter().map(|c| c.index + 1).max().unwrap_or(total);
        let workers = self.max_workers.min(total);

        tracing::info!(
            "Starting normalization of {} clips with {} parallel workers",
            total,
            workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("clipforge-normalize-{i}"))
            .build()
            .map_err(|e| PipelineError::Normalization {
                failed: total,
                total,
                message: format!("failed to start worker pool: {e}"),
            })?;

        let results: Vec<(&ClipSpec, clipforge_av::Result<PathBuf>)> = pool.install(|| {
            clips
                .par_iter()
                .map(|clip| {
                    let output = normalized_clip_path(output_dir, clip.index, name_span);
                    (clip, self.normalize_one(clip, &output, profile))
                })
                .collect()
        });

        let mut outcome = NormalizationOutcome::default();
        for (clip, result) in results {
            match result {
                Ok(output_path) => outcome.clips.push(NormalizedClip {
                    source_index: clip.index,
                    output_path,
                }),
                Err(e) => {
                    tracing::warn!(
                        "Dropping clip {} ({:?}): {}",
                        clip.index,
                        clip.source_path,
                        e
                    );
                    outcome.dropped.push(DroppedClip {
                        source_index: clip.index,
                        source_path: clip.source_path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
            .clips
            .sort_by(|a, b| a.output_path.cmp(&b.output_path));
        outcome.dropped.sort_by_key(|d| d.source_index);

        tracing::info!("Normalized {}/{} clips", outcome.clips.len(), total);

        if outcome.clips.is_empty() {
            let message = outcome
                .dropped
                .iter()
                .map(|d| format!("clip {}: {}", d.source_index, d.reason))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(PipelineError::Normalization {
                failed: total,
                total,
                message,
            });
        }

        Ok(outcome)
    }

    fn normalize_one(
        &self,
        clip: &ClipSpec,
        output: &Path,
        profile: &NormalizationProfile,
    ) -> clipforge_av::Result<PathBuf> {
        let info = self.prober.probe(&clip.source_path)?;
        let audio = if info.has_audio() {
            SourceAudio::Present
        } else {
            SourceAudio::Missing
        };
        normalize_clip(self.engine, &clip.source_path, output, profile, audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_av::testing::{write_clip, FakeEngine, FakeProber};

    #[test]
    fn test_outputs_follow_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let sources: Vec<PathBuf> = (0..11)
            .map(|i| write_clip(dir.path(), &format!("src{i}.mov"), 3.0 + i as f64, true))
            .collect();
        let out = dir.path().join("normalized");
        std::fs::create_dir_all(&out).unwrap();

        let engine = FakeEngine::default();
        let prober = FakeProber;
        let outcome = NormalizationCoordinator::new(&engine, &prober)
            .with_max_workers(4)
            .normalize_all(
                &ClipSpec::from_paths(&sources),
                &NormalizationProfile::default(),
                &out,
            )
            .unwrap();

        assert_eq!(outcome.clips.len(), 11);
        assert!(outcome.dropped.is_empty());
        let indices: Vec<usize> = outcome.clips.iter().map(|c| c.source_index).collect();
        assert_eq!(indices, (0..11).collect::<Vec<_>>());
        assert!(outcome.clips[10]
            .output_path
            .ends_with("normalized_0010.mp4"));
    }

    #[test]
    fn test_failed_clip_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let good_a = write_clip(dir.path(), "a.mov", 4.0, true);
        let bad = write_clip(dir.path(), "b.mov", 4.0, true);
        let good_c = write_clip(dir.path(), "c.mov", 4.0, false);

        let engine = FakeEngine::default().failing_input(&bad);
        let prober = FakeProber;
        let outcome = NormalizationCoordinator::new(&engine, &prober)
            .normalize_all(
                &ClipSpec::from_paths(&[good_a, bad.clone(), good_c]),
                &NormalizationProfile::default(),
                dir.path(),
            )
            .unwrap();

        assert_eq!(outcome.clips.len(), 2);
        assert_eq!(outcome.clips[0].source_index, 0);
        assert_eq!(outcome.clips[1].source_index, 2);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].source_path, bad);
    }

    #[test]
    fn test_silent_source_gets_synthesized_audio() {
        let dir = tempfile::tempdir().unwrap();
        let silent = write_clip(dir.path(), "silent.mov", 4.0, false);

        let engine = FakeEngine::default();
        let prober = FakeProber;
        NormalizationCoordinator::new(&engine, &prober)
            .normalize_all(
                &ClipSpec::from_paths(&[silent]),
                &NormalizationProfile::default(),
                dir.path(),
            )
            .unwrap();

        let requests = engine.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].inputs.len(), 2);
    }

    #[test]
    fn test_all_failed_is_normalization_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_clip(dir.path(), "a.mov", 4.0, true);
        let b = write_clip(dir.path(), "b.mov", 4.0, true);

        let engine = FakeEngine::default().failing_input(&a).failing_input(&b);
        let prober = FakeProber;
        let err = NormalizationCoordinator::new(&engine, &prober)
            .normalize_all(
                &ClipSpec::from_paths(&[a, b]),
                &NormalizationProfile::default(),
                dir.path(),
            )
            .unwrap_err();

        assert_matches::assert_matches!(
            err,
            PipelineError::Normalization {
                failed: 2,
                total: 2,
                ..
            }
        );
    }

    #[test]
    fn test_empty_batch_is_input_error() {
        let engine = FakeEngine::default();
        let prober = FakeProber;
        let err = NormalizationCoordinator::new(&engine, &prober)
            .normalize_all(&[], &NormalizationProfile::default(), Path::new("/tmp"))
            .unwrap_err();
        assert_eq!(err.kind(), "InputError");
    }
}
