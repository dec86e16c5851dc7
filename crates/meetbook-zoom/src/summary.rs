//! Markdown rendering for meeting summaries.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::client::{MeetingSummary, ZoomApi};
use crate::error::ZoomResult;

/// File name the summary of a meeting is saved under.
pub fn summary_file_name(topic: &str) -> String {
    format!("{topic}_summary.md")
}

/// Renders a summary as a Markdown document.
///
/// Chapters without text are skipped; a chapter without a label gets a
/// generic heading.
pub fn render_summary(summary: &MeetingSummary, topic: &str) -> String {
    let mut doc = format!("# Meeting Summary: {topic}\n");

    if let Some(overview) = summary
        .summary_overview
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        doc.push('\n');
        doc.push_str(overview);
        doc.push('\n');
    }

    for chapter in &summary.summary_details {
        let Some(text) = chapter.summary.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        let label = chapter.label.as_deref().unwrap_or("Chapter");
        doc.push_str(&format!("\n## {label}\n\n{text}\n"));
    }

    doc
}

/// Fetches the summary of a meeting and writes it next to the recording.
///
/// Returns the path of the written file.
pub(crate) async fn save_summary(
    api: &ZoomApi,
    token: &str,
    meeting_uuid: &str,
    topic: &str,
    dir: &Path,
) -> ZoomResult<PathBuf> {
    let summary = api.meeting_summary(meeting_uuid, token).await?;
    let path = dir.join(summary_file_name(topic));
    tokio::fs::write(&path, render_summary(&summary, topic)).await?;
    info!(path = %path.display(), "meeting summary saved");
    Ok(path)
}
