use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use log::info;

use crate::analyzers::{DependencyAggregator, DependencyExtractor, LocationCache, PlainDataClassifier};
use crate::config::CouplingConfig;
use crate::core::Extraction;
use crate::io::{paths::RepoRoot, ReportWriter};
use crate::semantic::{build_catalog, harvest, module_namespace, Workspace};
use crate::toolchain;

pub struct AnalyzeConfig {
    pub manifest: PathBuf,
    pub assume_toolchain: bool,
    pub config: CouplingConfig,
}

/// Full analysis run: toolchain selection, root discovery, workspace load,
/// extraction, and report emission.
pub fn run(config: AnalyzeConfig) -> anyhow::Result<()> {
    let instances = toolchain::detect();
    let instance = toolchain::select(
        &instances,
        config.assume_toolchain,
        std::io::stdin().lock(),
        std::io::stdout(),
    )?;
    println!(
        "Using toolchain '{}' at '{}'",
        instance.name,
        instance.path.display()
    );

    // Fatal before anything else: without a repository root no path in the
    // report can be normalized.
    let root = RepoRoot::discover(&config.manifest)?;
    info!("repository root: {}", root.path().display());

    println!("Loading workspace '{}'", config.manifest.display());
    let workspace = Workspace::load(&config.manifest, &config.config.ignore, |progress| {
        println!(
            "{:<10} {:>9.3}s {}",
            progress.operation,
            progress.elapsed.as_secs_f64(),
            progress.path.display()
        );
    })?;
    println!("Finished loading workspace '{}'", config.manifest.display());

    let entries = analyze_workspace(&workspace, &root, &config.config);

    let report_path = workspace.report_path();
    let file = File::create(&report_path)
        .with_context(|| format!("cannot create report '{}'", report_path.display()))?;
    ReportWriter::new(BufWriter::new(file)).write_report(&entries)?;
    println!("Report written to '{}'", report_path.display());
    Ok(())
}

/// The single-flow extraction pipeline: projects, then documents, then nodes,
/// one at a time, feeding one aggregator and one location cache.
pub fn analyze_workspace(
    workspace: &Workspace,
    root: &RepoRoot,
    config: &CouplingConfig,
) -> Vec<Extraction> {
    let catalog = build_catalog(workspace, root);
    info!("cataloged {} type(s)", catalog.len());

    let classifier = PlainDataClassifier::new();
    let extractor = DependencyExtractor::new(config.exclude_namespaces.clone());
    let mut cache = LocationCache::new();
    let mut aggregator = DependencyAggregator::new();

    let mut remaining = workspace.projects.len();
    for project in &workspace.projects {
        println!("{} projects to go, processing {}", remaining, project.name);
        remaining -= 1;

        for document in &project.documents {
            let namespace = module_namespace(&project.name, &project.root, &document.path);
            let file = root.normalize(&document.path);
            for node in harvest(&document.ast, &namespace, &file) {
                for extraction in
                    extractor.extract(&node, &project.name, &catalog, &classifier, &mut cache)
                {
                    aggregator.add(extraction);
                }
            }
        }
    }

    info!("aggregated {} entrie(s)", aggregator.len());
    aggregator.into_entries()
}
