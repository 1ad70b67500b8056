use std::io::Write;

use crate::core::{qualified_name, Extraction};

/// Fixed header of the 6-column report.
pub const REPORT_HEADER: &str = "FromProject\tFromFile\tFromType\tToProject\tToFile\tToType";

/// Render aggregated extractions into the final ordered report lines.
///
/// Rows are sorted by all six columns so the report is deterministic and
/// diff-friendly regardless of aggregation order.
pub fn render_lines(entries: &[Extraction]) -> Vec<String> {
    let mut rows: Vec<[String; 6]> = entries.iter().map(render_row).collect();
    rows.sort();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(REPORT_HEADER.to_string());
    lines.extend(rows.into_iter().map(|row| row.join("\t")));
    lines
}

fn render_row(entry: &Extraction) -> [String; 6] {
    match entry {
        Extraction::Dependency(dep) => [
            dep.from_project.clone(),
            dep.origin.path.clone(),
            qualified_name(&dep.from_namespace, &dep.from_type),
            dep.to_project.clone(),
            dep.to_file.clone(),
            qualified_name(&dep.to_namespace, &dep.to_type),
        ],
        // Sentinel row: empty endpoints, diagnostic detail in the FromType
        // column and the failure message in the ToType column.
        Extraction::Diagnostic(diag) => [
            String::new(),
            String::new(),
            diag.detail.clone(),
            String::new(),
            String::new(),
            diag.message.clone(),
        ],
    }
}

/// Writes the rendered report to any `Write` destination.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_report(&mut self, entries: &[Extraction]) -> anyhow::Result<()> {
        for line in render_lines(entries) {
            writeln!(self.writer, "{line}")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
