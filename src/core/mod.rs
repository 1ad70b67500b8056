pub mod errors;
pub mod types;

pub use errors::{Error, Result};
pub use types::{qualified_name, AnalysisDiagnostic, Extraction, SourceSegment, TypeDependency};
