//! Document export: Markdown reports, JSON files and share links.

mod report;
mod share;

pub use report::to_report;
pub use share::{
    decode_link_or_token, decode_share, encode_share, share_url, shared_analysis_from_url,
    strip_share_param, token_from_url, SHARE_PARAM,
};

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppResult;
use crate::model::Analysis;

/// File stem used when a document has no name.
const DEFAULT_FILE_STEM: &str = "analysis";

/// Output format for file exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// The Markdown report.
    Markdown,
    /// The document as pretty JSON.
    Json,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

/// Pretty-printed JSON of a single document, in the persisted layout.
pub fn to_json(analysis: &Analysis) -> serde_json::Result<String> {
    serde_json::to_string_pretty(analysis)
}

/// `<name or "analysis">.<ext>`, with path separators replaced.
pub fn export_file_name(analysis: &Analysis, format: ExportFormat) -> String {
    let stem = if analysis.name.is_empty() {
        DEFAULT_FILE_STEM.to_string()
    } else {
        analysis.name.replace(['/', '\\'], "-")
    };
    format!("{}.{}", stem, format.extension())
}

/// Render a document in `format`.
pub fn render(analysis: &Analysis, format: ExportFormat) -> AppResult<String> {
    Ok(match format {
        ExportFormat::Markdown => to_report(analysis),
        ExportFormat::Json => to_json(analysis)?,
    })
}

/// Write a document export to `output`, or to its default file name in `dir`.
///
/// Returns the path written.
pub fn write_export(
    analysis: &Analysis,
    format: ExportFormat,
    dir: &Path,
    output: Option<&Path>,
) -> AppResult<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => dir.join(export_file_name(analysis, format)),
    };
    let content = render(analysis, format)?;
    std::fs::write(&path, content)?;
    info!(path = %path.display(), analysis_id = %analysis.id, "Export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        let mut analysis = Analysis::blank(Some("Search v2"));
        assert_eq!(
            export_file_name(&analysis, ExportFormat::Markdown),
            "Search v2.md"
        );
        assert_eq!(export_file_name(&analysis, ExportFormat::Json), "Search v2.json");

        analysis.name.clear();
        assert_eq!(
            export_file_name(&analysis, ExportFormat::Markdown),
            "analysis.md"
        );

        analysis.name = "a/b\\c".to_string();
        assert_eq!(export_file_name(&analysis, ExportFormat::Markdown), "a-b-c.md");
    }

    #[test]
    fn test_json_export_parses_back() {
        let mut analysis = Analysis::blank(Some("Json"));
        analysis.add_question("q");
        let json = to_json(&analysis).unwrap();
        let back: Analysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analysis);
    }
}
