// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod semantic;
pub mod toolchain;

// Re-export commonly used types
pub use crate::analyzers::{
    DependencyAggregator, DependencyExtractor, LocationCache, PlainDataClassifier,
};
pub use crate::config::CouplingConfig;
pub use crate::core::{Extraction, SourceSegment, TypeDependency};
pub use crate::io::{render_lines, RepoRoot, ReportWriter, REPORT_HEADER};
pub use crate::semantic::{build_catalog, harvest, TypeCatalog, Workspace};
