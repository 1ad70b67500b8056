pub mod paths;
pub mod report;

pub use paths::RepoRoot;
pub use report::{render_lines, ReportWriter, REPORT_HEADER};
