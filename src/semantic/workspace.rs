use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ignore::WalkBuilder;
use log::warn;
use serde::Deserialize;

use crate::core::{Error, Result};

/// A loaded workspace: the ordered collection of projects handed to the
/// analysis pipeline.
#[derive(Debug)]
pub struct Workspace {
    pub manifest_path: PathBuf,
    pub root_dir: PathBuf,
    /// Workspace display name, taken from the directory containing the
    /// manifest. Also names the output report.
    pub name: String,
    pub projects: Vec<Project>,
}

/// One workspace member crate.
#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub root: PathBuf,
    pub documents: Vec<Document>,
}

/// A parsed source file.
#[derive(Debug)]
pub struct Document {
    pub path: PathBuf,
    pub source: String,
    pub ast: syn::File,
}

/// Observational progress notification emitted while loading.
#[derive(Debug)]
pub struct LoadProgress {
    pub operation: &'static str,
    pub elapsed: Duration,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    workspace: Option<WorkspaceTable>,
    package: Option<PackageTable>,
}

#[derive(Debug, Deserialize)]
struct WorkspaceTable {
    #[serde(default)]
    members: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PackageTable {
    name: String,
}

impl Workspace {
    /// Load a workspace from its `Cargo.toml`.
    ///
    /// Member globs are expanded relative to the manifest directory. A member
    /// whose manifest fails to parse, or a document that fails `syn`, is
    /// logged and skipped; load failures never abort the run by themselves.
    pub fn load(
        manifest_path: &Path,
        ignore_patterns: &[String],
        mut progress: impl FnMut(LoadProgress),
    ) -> Result<Workspace> {
        let started = Instant::now();
        let manifest_path = manifest_path
            .canonicalize()
            .map_err(|e| Error::workspace(manifest_path, e.to_string()))?;
        let root_dir = manifest_path
            .parent()
            .ok_or_else(|| Error::workspace(&manifest_path, "manifest has no parent directory"))?
            .to_path_buf();

        let manifest: Manifest = toml::from_str(&std::fs::read_to_string(&manifest_path)?)
            .map_err(|e| Error::manifest(&manifest_path, e.to_string()))?;

        let mut member_dirs = Vec::new();
        if let Some(workspace) = &manifest.workspace {
            for member in &workspace.members {
                member_dirs.extend(expand_member_glob(&root_dir, member));
            }
        }
        if manifest.package.is_some() {
            member_dirs.push(root_dir.clone());
        }
        if member_dirs.is_empty() {
            return Err(Error::manifest(
                &manifest_path,
                "manifest declares neither [workspace] members nor a [package]",
            ));
        }
        member_dirs.sort();
        member_dirs.dedup();

        let mut projects = Vec::new();
        for dir in member_dirs {
            progress(LoadProgress {
                operation: "Resolve",
                elapsed: started.elapsed(),
                path: dir.clone(),
            });
            match load_project(&dir, ignore_patterns) {
                Ok(project) => {
                    progress(LoadProgress {
                        operation: "Load",
                        elapsed: started.elapsed(),
                        path: dir.clone(),
                    });
                    projects.push(project);
                }
                Err(e) => warn!("skipping member '{}': {}", dir.display(), e),
            }
        }

        let name = root_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workspace".to_string());

        Ok(Workspace {
            manifest_path,
            root_dir,
            name,
            projects,
        })
    }

    /// Path of the report written alongside the manifest:
    /// `<workspace-dir-name>.tsv`.
    pub fn report_path(&self) -> PathBuf {
        self.root_dir.join(format!("{}.tsv", self.name))
    }
}

fn expand_member_glob(root: &Path, member: &str) -> Vec<PathBuf> {
    let pattern = root.join(member);
    let pattern = pattern.to_string_lossy();
    match glob::glob(&pattern) {
        Ok(paths) => {
            let mut dirs: Vec<PathBuf> = paths
                .filter_map(|p| p.ok())
                .filter(|p| p.is_dir() && p.join("Cargo.toml").is_file())
                .collect();
            dirs.sort();
            dirs
        }
        Err(e) => {
            warn!("invalid workspace member pattern '{member}': {e}");
            Vec::new()
        }
    }
}

fn load_project(dir: &Path, ignore_patterns: &[String]) -> Result<Project> {
    let manifest_path = dir.join("Cargo.toml");
    let manifest: Manifest = toml::from_str(&std::fs::read_to_string(&manifest_path)?)
        .map_err(|e| Error::manifest(&manifest_path, e.to_string()))?;
    let name = manifest
        .package
        .map(|p| p.name)
        .ok_or_else(|| Error::manifest(&manifest_path, "member manifest has no [package] name"))?;

    let mut documents = Vec::new();
    for path in source_files(dir, ignore_patterns) {
        let source = std::fs::read_to_string(&path)?;
        match syn::parse_file(&source) {
            Ok(ast) => documents.push(Document { path, source, ast }),
            Err(e) => warn!("skipping unparsable document '{}': {}", path.display(), e),
        }
    }

    Ok(Project {
        name,
        root: dir.to_path_buf(),
        documents,
    })
}

/// Collect the member's `.rs` files in a fixed (sorted) order.
fn source_files(dir: &Path, ignore_patterns: &[String]) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(dir).hidden(false).git_ignore(true).build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .filter(|path| !path.components().any(|c| c.as_os_str() == "target"))
        .filter(|path| !is_ignored(path, ignore_patterns))
        .collect();
    files.sort();
    files
}

fn is_ignored(path: &Path, patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    patterns.iter().any(|pattern| {
        glob::Pattern::new(pattern)
            .map(|p| p.matches(&path_str))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::fs;

    fn write_crate(root: &Path, name: &str, lib: &str) {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(
            dir.join("Cargo.toml"),
            format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\n"),
        )
        .unwrap();
        fs::write(dir.join("src/lib.rs"), lib).unwrap();
    }

    #[test]
    fn loads_workspace_members_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("Cargo.toml"),
            indoc! {r#"
                [workspace]
                members = ["crates/*"]
            "#},
        )
        .unwrap();
        write_crate(&tmp.path().join("crates"), "beta", "pub struct B;\n");
        write_crate(&tmp.path().join("crates"), "alpha", "pub struct A;\n");

        let ws = Workspace::load(&tmp.path().join("Cargo.toml"), &[], |_| {}).unwrap();
        let names: Vec<&str> = ws.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(ws.projects[0].documents.len(), 1);
    }

    #[test]
    fn single_package_manifest_is_a_one_project_workspace() {
        let tmp = tempfile::tempdir().unwrap();
        write_crate(tmp.path(), "solo", "pub struct S;\n");

        let manifest = tmp.path().join("solo/Cargo.toml");
        let ws = Workspace::load(&manifest, &[], |_| {}).unwrap();
        assert_eq!(ws.projects.len(), 1);
        assert_eq!(ws.projects[0].name, "solo");
    }

    #[test]
    fn unparsable_documents_are_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write_crate(tmp.path(), "solo", "pub struct S;\n");
        fs::write(tmp.path().join("solo/src/broken.rs"), "fn {{{").unwrap();

        let ws = Workspace::load(&tmp.path().join("solo/Cargo.toml"), &[], |_| {}).unwrap();
        assert_eq!(ws.projects[0].documents.len(), 1);
    }

    #[test]
    fn ignore_patterns_filter_documents() {
        let tmp = tempfile::tempdir().unwrap();
        write_crate(tmp.path(), "solo", "pub struct S;\n");
        fs::write(tmp.path().join("solo/src/generated.rs"), "pub struct G;\n").unwrap();

        let ws = Workspace::load(
            &tmp.path().join("solo/Cargo.toml"),
            &["**/generated.rs".to_string()],
            |_| {},
        )
        .unwrap();
        assert_eq!(ws.projects[0].documents.len(), 1);
    }
}
