/// An immutable source span with free-text payloads.
///
/// Lines and columns are 1-based; 0 means "not yet resolved". Equality is
/// structural over all five fields, which is what drives deduplication of
/// dependencies further down the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceSegment {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    /// Free-form payload: the referencing syntax text, or diagnostic detail.
    pub text: String,
    /// Free-form payload: a repo-relative file path.
    pub path: String,
}

impl SourceSegment {
    pub fn new(
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
        text: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            text: text.into(),
            path: path.into(),
        }
    }

    /// A segment with no resolved span, carrying only payloads.
    pub fn unresolved(text: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(0, 0, 0, 0, text, path)
    }
}

/// A directed coupling relationship between two complex types.
///
/// `from_namespace::from_type` is the type containing the reference;
/// `to_namespace::to_type` is the type being referenced. The referenced
/// type's resolved location is carried as explicit `to_project`/`to_file`
/// fields; `origin` holds the referencing node's span and source text, with
/// `origin.path` being the repo-relative referencing file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDependency {
    pub from_namespace: String,
    pub from_type: String,
    pub to_namespace: String,
    pub to_type: String,
    pub from_project: String,
    pub to_project: String,
    pub to_file: String,
    pub origin: SourceSegment,
}

/// A recovered per-node analysis failure, rendered as a sentinel report row
/// instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisDiagnostic {
    /// Short failure message; lands in the `ToType` column.
    pub message: String,
    /// Error chain / context detail.
    pub detail: String,
    /// Span of the node that failed to analyze.
    pub origin: SourceSegment,
}

/// Outcome of extracting one syntax node: a real dependency or a diagnostic.
/// Both feed the same aggregator and render through the same report writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extraction {
    Dependency(TypeDependency),
    Diagnostic(AnalysisDiagnostic),
}

/// Render a fully-qualified type name. An empty namespace yields the bare
/// name, so diagnostic rows show their message without a dangling separator.
pub fn qualified_name(namespace: &str, type_name: &str) -> String {
    if namespace.is_empty() {
        type_name.to_string()
    } else {
        format!("{namespace}::{type_name}")
    }
}
