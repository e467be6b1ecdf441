//! Ties the loader, analyzer, lowering and generator registry into the
//! three operations the CLI exposes, grounded in the Go `Builder`'s
//! `NewBuilder`/`Build`/`Snapshot`/`Generate` (`original_source/cmd/cmd.go`).

use std::path::Path;

use nexema_core::definition::{self, Snapshot};
use nexema_core::diagnostic::DiagnosticBag;

use crate::error::{NexemaError, NexemaResult};
use crate::generator::GeneratorRegistry;
use crate::manifest::NexemaManifest;

pub const SNAPSHOT_EXTENSION: &str = "nexs";

/// Accumulates the state of one build: the manifest it was configured
/// from, the diagnostics its last `build` produced, and the snapshot if
/// that run was clean. A fresh `Builder` has none of the three.
pub struct Builder {
    manifest: Option<NexemaManifest>,
    diagnostics: DiagnosticBag,
    snapshot: Option<Snapshot>,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            manifest: None,
            diagnostics: DiagnosticBag::new(),
            snapshot: None,
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    /// Loads the manifest, runs the loader and analyzer over `input_dir`,
    /// and stores the snapshot if the combined diagnostic bag came back
    /// empty. A non-empty bag is not an error return — it is stored on the
    /// builder for the caller to render, per the diagnostics-as-data policy.
    pub fn build(&mut self, input_dir: &Path) -> NexemaResult<()> {
        let manifest = NexemaManifest::load(input_dir)?;

        let (project, mut diagnostics) = nexema_core::project::load(input_dir, &manifest.skip)?;
        if diagnostics.is_empty() {
            diagnostics.extend(nexema_core::analyzer::analyze(&project));
        }

        self.snapshot = if diagnostics.is_empty() {
            Some(Snapshot {
                project_name: manifest.name.clone().unwrap_or_else(|| "nexema".to_string()),
                project_version: manifest.version,
                types: definition::lower(&project),
            })
        } else {
            None
        };
        self.diagnostics = diagnostics;
        self.manifest = Some(manifest);

        Ok(())
    }

    /// Writes the stored snapshot to `<output_dir>/<project_name>.nexs`.
    /// Errors if `build` was never called, or its last run produced
    /// diagnostics.
    pub fn snapshot(&self, output_dir: &Path) -> NexemaResult<std::path::PathBuf> {
        let snapshot = self.require_snapshot()?;

        std::fs::create_dir_all(output_dir).map_err(|source| NexemaError::SnapshotWrite {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let path = output_dir.join(format!("{}.{SNAPSHOT_EXTENSION}", snapshot.project_name));
        let contents = serde_json::to_string_pretty(snapshot).map_err(|source| NexemaError::SnapshotParse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, contents).map_err(|source| NexemaError::SnapshotWrite { path: path.clone(), source })?;

        Ok(path)
    }

    /// Invokes every generator named in the manifest's `generators` map.
    /// Uses the snapshot just computed by `build` unless `snapshot_path` is
    /// given, in which case that file is read and used instead — `build`
    /// must still have run first, since the manifest (and its generator
    /// list) comes from there, not from the snapshot file.
    pub fn generate(&self, output_dir: &Path, snapshot_path: Option<&Path>) -> NexemaResult<()> {
        let manifest = self.manifest.as_ref().expect("generate called before build");

        let snapshot = match snapshot_path {
            Some(path) => load_snapshot(path)?,
            None => self.require_snapshot()?.clone(),
        };

        let registry = GeneratorRegistry::standard();
        for (name, config) in &manifest.generators {
            let generator = registry.get(name).ok_or_else(|| NexemaError::UnknownGenerator { name: name.clone() })?;
            generator.generate(output_dir, config, &snapshot.types)?;
        }

        Ok(())
    }

    fn require_snapshot(&self) -> NexemaResult<&Snapshot> {
        if self.manifest.is_none() {
            panic!("build was never called");
        }
        self.snapshot
            .as_ref()
            .ok_or_else(|| NexemaError::Diagnostics { count: self.diagnostics.len() })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

fn load_snapshot(path: &Path) -> NexemaResult<Snapshot> {
    let contents = std::fs::read_to_string(path).map_err(|source| NexemaError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| NexemaError::SnapshotParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively removes every file under `root` whose extension matches
/// [`SNAPSHOT_EXTENSION`], returning how many were deleted.
pub fn clear_snapshots(root: &Path) -> NexemaResult<usize> {
    let mut cleared = 0;
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            NexemaError::ClearSnapshots { path, source: err }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXTENSION) {
            continue;
        }
        std::fs::remove_file(entry.path()).map_err(|source| NexemaError::SnapshotWrite {
            path: entry.path().to_path_buf(),
            source,
        })?;
        cleared += 1;
    }
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_project(dir: &Path) {
        fs::write(dir.join("nexema.yaml"), "version: 1\nname: shapes\ngenerators:\n  json: {}\n").unwrap();
        fs::write(dir.join("main.nex"), "struct Point { x int32 y int32 }\n").unwrap();
    }

    #[test]
    fn build_then_snapshot_writes_a_nexs_file() {
        let input = tempfile::tempdir().unwrap();
        write_project(input.path());
        let output = tempfile::tempdir().unwrap();

        let mut builder = Builder::new();
        builder.build(input.path()).unwrap();
        assert!(builder.diagnostics().is_empty());

        let path = builder.snapshot(output.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "shapes.nexs");
        assert!(path.exists());
    }

    #[test]
    fn build_then_generate_invokes_the_json_generator() {
        let input = tempfile::tempdir().unwrap();
        write_project(input.path());
        let output = tempfile::tempdir().unwrap();

        let mut builder = Builder::new();
        builder.build(input.path()).unwrap();
        builder.generate(output.path(), None).unwrap();

        assert!(output.path().join("Point.json").exists());
    }

    #[test]
    #[should_panic(expected = "build was never called")]
    fn snapshot_before_build_panics() {
        let builder = Builder::new();
        let output = tempfile::tempdir().unwrap();
        let _ = builder.snapshot(output.path());
    }

    #[test]
    #[should_panic(expected = "generate called before build")]
    fn generate_before_build_panics() {
        let builder = Builder::new();
        let output = tempfile::tempdir().unwrap();
        let _ = builder.generate(output.path(), None);
    }

    #[test]
    fn snapshot_after_diagnostics_reports_their_count() {
        let input = tempfile::tempdir().unwrap();
        fs::write(input.path().join("nexema.yaml"), "version: 1\n").unwrap();
        fs::write(input.path().join("main.nex"), "struct Foo { a nosuchtype }\n").unwrap();
        let output = tempfile::tempdir().unwrap();

        let mut builder = Builder::new();
        builder.build(input.path()).unwrap();
        assert!(!builder.diagnostics().is_empty());

        let err = builder.snapshot(output.path()).unwrap_err();
        assert!(matches!(err, NexemaError::Diagnostics { .. }));
    }

    #[test]
    fn clear_snapshots_removes_only_nexs_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.nexs"), "{}").unwrap();
        fs::write(dir.path().join("b.txt"), "keep").unwrap();

        let cleared = clear_snapshots(dir.path()).unwrap();
        assert_eq!(cleared, 1);
        assert!(!dir.path().join("a.nexs").exists());
        assert!(dir.path().join("b.txt").exists());
    }
}
