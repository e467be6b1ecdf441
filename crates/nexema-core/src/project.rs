//! Project loading: walks a source tree, parses every `.nex` file not
//! excluded by the manifest's skip globs, and groups files into one
//! package per containing directory.
//!
//! The manifest itself (`nexema.yaml`) is the root crate's concern — this
//! module takes already-resolved skip-glob strings as plain data, keeping
//! the core pipeline free of YAML parsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::ast;
use crate::diagnostic::DiagnosticBag;
use crate::error::{CoreError, CoreResult};
use crate::parser;
use crate::scope::{self, FileScope, PackageScope};

/// Everything the analyzer needs: every package's symbol table, every
/// file's import scope, and the raw ASTs behind them.
pub struct Project {
    pub root: PathBuf,
    pub packages: BTreeMap<String, PackageScope>,
    pub file_scopes: Vec<FileScope>,
    pub files: BTreeMap<PathBuf, ast::File>,
}

impl Project {
    pub fn package(&self, path: &str) -> Option<&PackageScope> {
        self.packages.get(path)
    }
}

/// Walks `root`, parses every `.nex` file not matched by `skip_globs`,
/// groups files by directory into packages, and resolves each file's
/// imports. Always returns whatever it could build alongside every
/// diagnostic collected — a non-empty bag does not stop the loader, so a
/// single run still surfaces as many independent problems as possible.
/// Only a genuine I/O or configuration failure (an unreadable file, a
/// broken walk, a malformed skip pattern) aborts the run early, since those
/// are not something the analyzer could meaningfully continue past.
pub fn load(root: &Path, skip_globs: &[String]) -> CoreResult<(Project, DiagnosticBag)> {
    let skip_set = build_skip_set(skip_globs)?;
    let mut diagnostics = DiagnosticBag::new();

    let mut by_package: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| CoreError::WalkDir {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("nex") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if skip_set.is_match(relative) {
            debug!(path = %relative.display(), "skipping file matched by skip glob");
            continue;
        }
        let package_path = package_path_of(relative);
        by_package.entry(package_path).or_default().push(path.to_path_buf());
    }

    let mut files: BTreeMap<PathBuf, ast::File> = BTreeMap::new();
    // Package enumeration order is the `BTreeMap`'s key order, kept stable
    // for reproducible diagnostics regardless of walk order.
    let mut parsed_by_package: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for (package_path, mut paths) in by_package {
        paths.sort();
        debug!(package = %package_path, files = paths.len(), "parsing package");
        for path in &paths {
            let source = std::fs::read_to_string(path).map_err(|source| CoreError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let (file, file_diagnostics) = parser::parse(&source, path.clone(), package_path.clone(), file_name);
            diagnostics.extend(file_diagnostics);
            files.insert(path.clone(), file);
        }
        parsed_by_package.insert(package_path, paths);
    }

    let mut packages: BTreeMap<String, PackageScope> = BTreeMap::new();
    for (package_path, paths) in &parsed_by_package {
        let refs: Vec<(PathBuf, &ast::File)> = paths
            .iter()
            .map(|p| (p.clone(), files.get(p).expect("file was just parsed into this map")))
            .collect();
        let (scope, scope_diagnostics) = PackageScope::build(package_path.clone(), &refs);
        diagnostics.extend(scope_diagnostics);
        packages.insert(package_path.clone(), scope);
    }

    let mut file_scopes = Vec::new();
    for (package_path, paths) in &parsed_by_package {
        for path in paths {
            let file = files.get(path).expect("file was just parsed into this map");
            let (file_scope, import_diagnostics) =
                scope::build_file_scope(path.clone(), package_path.clone(), file, &packages);
            diagnostics.extend(import_diagnostics);
            file_scopes.push(file_scope);
        }
    }

    let project = Project {
        root: root.to_path_buf(),
        packages,
        file_scopes,
        files,
    };

    Ok((project, diagnostics))
}

fn build_skip_set(patterns: &[String]) -> CoreResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| CoreError::InvalidSkipGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| CoreError::InvalidSkipGlob {
        pattern: patterns.join(", "),
        source,
    })
}

/// The package path is the file's containing directory relative to the
/// project root, with components joined by `/` regardless of platform.
fn package_path_of(relative_file_path: &Path) -> String {
    let parent = relative_file_path.parent().unwrap_or(Path::new(""));
    let segments: Vec<&str> = parent.components().filter_map(|c| c.as_os_str().to_str()).collect();
    segments.join("/")
}
