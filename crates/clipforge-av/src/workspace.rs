//! Workspace management for concatenation runs.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Minimum digit count in indexed artifact names.
const MIN_INDEX_WIDTH: usize = 4;

/// Run-scoped working directories for intermediate artifacts.
///
/// A workspace lives at `<base>/work-<uuid>/` and holds a `normalized/`
/// directory (one file per normalized clip) and an `intermediate/`
/// directory (one file per transition step). Nothing is deleted on drop:
/// only [`Workspace::cleanup`] removes the directories, and callers invoke
/// it after the final artifact has been promoted. A failed run keeps its
/// files for inspection.
///
/// # Example
///
/// ```no_run
/// use clipforge_av::Workspace;
///
/// let workspace = Workspace::create("/var/lib/clipforge")?;
/// let first_step = workspace.step_file(1, 2);
/// // ... normalize, chain, promote ...
/// workspace.cleanup()?;
/// # Ok::<(), clipforge_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    normalized_dir: PathBuf,
    intermediate_dir: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `base`.
    pub fn create<P: AsRef<Path>>(base: P) -> Result<Self> {
        let root = base
            .as_ref()
            .join(format!("work-{}", uuid::Uuid::new_v4().simple()));
        let normalized_dir = root.join("normalized");
        let intermediate_dir = root.join("intermediate");

        for dir in [&normalized_dir, &intermediate_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::Workspace(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Created workspace {:?}", root);

        Ok(Self {
            root,
            normalized_dir,
            intermediate_dir,
        })
    }

    /// Root directory of this run.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory shared by all normalization workers.
    pub fn normalized_dir(&self) -> &Path {
        &self.normalized_dir
    }

    /// Directory holding per-step merge results.
    pub fn intermediate_dir(&self) -> &Path {
        &self.intermediate_dir
    }

    /// Path of the merge result of transition `step` out of `total_steps`.
    pub fn step_file(&self, step: usize, total_steps: usize) -> PathBuf {
        self.intermediate_dir
            .join(indexed_name("step", step, total_steps, "mp4"))
    }

    /// Remove the whole run directory. Success path only.
    pub fn cleanup(self) -> Result<()> {
        std::fs::remove_dir_all(&self.root).map_err(|e| {
            Error::Workspace(format!(
                "Failed to remove workspace {}: {}",
                self.root.display(),
                e
            ))
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Removed workspace {:?}", self.root);

        Ok(())
    }

    /// Give up ownership without deleting anything, returning the run root.
    pub fn keep(self) -> PathBuf {
        self.root
    }
}

/// Normalized clip path for input `index` inside `dir`.
///
/// Used directly when normalizing into a caller-chosen directory instead of
/// a run workspace.
pub fn normalized_clip_path(dir: &Path, index: usize, total: usize) -> PathBuf {
    dir.join(indexed_name("normalized", index, total, "mp4"))
}

/// `<prefix>_<zero-padded index>.<ext>`, padded so that lexicographic order of
/// names within a batch of `total` equals index order.
fn indexed_name(prefix: &str, index: usize, total: usize, ext: &str) -> String {
    let width = digits(total.max(index + 1)).max(MIN_INDEX_WIDTH);
    format!("{prefix}_{index:0width$}.{ext}")
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Move `temp` to `destination`, creating parent directories as needed.
///
/// An existing destination is replaced in a single rename, so it is never
/// missing and no sibling file is touched. When `temp` lives on another
/// filesystem it is first copied next to the destination and then renamed
/// over it.
pub fn promote(temp: &Path, destination: &Path) -> Result<PathBuf> {
    if !temp.is_file() {
        return Err(Error::Workspace(format!(
            "Output file does not exist: {:?}",
            temp
        )));
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Workspace(format!(
                "Failed to create output directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    if std::fs::rename(temp, destination).is_err() {
        copy_into_place(temp, destination)?;
        if let Err(_e) = std::fs::remove_file(temp) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Promoted copy of {:?}, but the original stays: {}", temp, _e);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Promoted {:?} -> {:?}", temp, destination);

    Ok(destination.to_path_buf())
}

/// Copy `from` to a staging file beside `to`, then rename it over `to`.
fn copy_into_place(from: &Path, to: &Path) -> Result<()> {
    let file_name = to
        .file_name()
        .ok_or_else(|| Error::Workspace(format!("Invalid output path: {:?}", to)))?;
    let staging = to.with_file_name(format!(
        ".{}.{}.partial",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    ));

    let moved = std::fs::copy(from, &staging).and_then(|_| std::fs::rename(&staging, to));
    if let Err(e) = moved {
        let _ = std::fs::remove_file(&staging);
        return Err(Error::Workspace(format!(
            "Failed to move output to {}: {}",
            to.display(),
            e
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_workspace_layout() {
        let base = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(base.path()).unwrap();

        assert!(workspace.root().starts_with(base.path()));
        assert!(workspace.normalized_dir().is_dir());
        assert!(workspace.intermediate_dir().is_dir());
        assert!(normalized_clip_path(workspace.normalized_dir(), 0, 2)
            .starts_with(workspace.normalized_dir()));
        assert!(workspace
            .step_file(1, 1)
            .starts_with(workspace.intermediate_dir()));
    }

    #[test]
    fn test_workspaces_do_not_collide() {
        let base = tempfile::tempdir().unwrap();
        let a = Workspace::create(base.path()).unwrap();
        let b = Workspace::create(base.path()).unwrap();
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn test_indexed_names_sort_like_indices() {
        assert_eq!(indexed_name("normalized", 7, 3, "mp4"), "normalized_0007.mp4");
        assert_eq!(
            normalized_clip_path(Path::new("/out"), 2, 5),
            Path::new("/out/normalized_0002.mp4")
        );

        let mut names: Vec<String> = (0..12)
            .map(|i| indexed_name("normalized", i, 12, "mp4"))
            .collect();
        let expected = names.clone();
        names.sort();
        assert_eq!(names, expected);

        let big = indexed_name("step", 12_345, 20_000, "mp4");
        assert_eq!(big, "step_12345.mp4");
        assert!(indexed_name("step", 9_999, 20_000, "mp4") < big);
    }

    #[test]
    fn test_cleanup_removes_everything() {
        let base = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(base.path()).unwrap();
        fs::write(normalized_clip_path(workspace.normalized_dir(), 0, 1), b"clip").unwrap();
        let root = workspace.root().to_path_buf();

        workspace.cleanup().unwrap();
        assert!(!root.exists());
        assert!(base.path().exists());
    }

    #[test]
    fn test_drop_keeps_files() {
        let base = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(base.path()).unwrap();
        let clip = normalized_clip_path(workspace.normalized_dir(), 0, 1);
        fs::write(&clip, b"clip").unwrap();

        drop(workspace);
        assert!(clip.exists());
    }

    #[test]
    fn test_promote_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("step_0001.mp4");
        fs::write(&temp, b"final").unwrap();
        let destination = dir.path().join("output").join("final.mp4");

        let result = promote(&temp, &destination).unwrap();
        assert_eq!(result, destination);
        assert!(!temp.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "final");
    }

    #[test]
    fn test_promote_replaces_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("step_0001.mp4");
        let destination = dir.path().join("final.mp4");
        fs::write(&temp, b"new").unwrap();
        fs::write(&destination, b"old").unwrap();

        promote(&temp, &destination).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_promote_leaves_sibling_backup_alone() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("step_0003.mp4");
        let destination = dir.path().join("reel.mp4");
        let sibling = dir.path().join("reel.bak");
        fs::write(&temp, b"new").unwrap();
        fs::write(&destination, b"old").unwrap();
        fs::write(&sibling, b"keep me").unwrap();

        promote(&temp, &destination).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
        assert_eq!(fs::read_to_string(&sibling).unwrap(), "keep me");
    }

    #[test]
    fn test_promote_to_bak_destination_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("step_0001.mp4");
        let destination = dir.path().join("final.bak");
        fs::write(&temp, b"new").unwrap();
        fs::write(&destination, b"old").unwrap();

        let result = promote(&temp, &destination).unwrap();
        assert_eq!(result, destination);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
        assert!(!temp.exists());
    }

    #[test]
    fn test_copy_into_place_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("step_0002.mp4");
        let destination = dir.path().join("reel.mp4");
        fs::write(&source, b"new").unwrap();
        fs::write(&destination, b"old").unwrap();

        copy_into_place(&source, &destination).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".partial")), "{names:?}");
    }

    #[test]
    fn test_promote_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = promote(&dir.path().join("nope.mp4"), &dir.path().join("out.mp4"));
        assert!(matches!(result, Err(Error::Workspace(_))));
    }
}
