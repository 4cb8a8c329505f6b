//! Output formatting for `starc` subcommands.
//!
//! Every formatter returns the text printed on stdout; `json` switches to
//! pretty-printed JSON of the underlying value.

use chrono::Local;
use serde::Serialize;
use serde_json::json;
use starc_core::models::document::Document;
use starc_core::models::history::HistoryEntry;
use starc_core::models::scores::ScoreSet;
use starc_core::models::search::DocumentListing;
use starc_core::models::stats::UserStats;
use starc_core::models::suggestion::SuggestionChunk;
use starc_core::settings::DisplaySettings;
use starc_core::text::preview;
use starc_editor::history::{entry_preview, DiffSegment};
use starc_editor::{RewriteOutcome, VersionComparison, VersionRef};

const TITLE_COLUMN_CHARS: usize = 40;
const SUGGESTION_PREVIEW_CHARS: usize = 60;

fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub(crate) fn format_listing(listing: &DocumentListing, json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(listing);
    }
    match listing {
        DocumentListing::Empty { message } => Ok(message.clone()),
        DocumentListing::Documents {
            items,
            total_items,
            total_pages,
            current_page,
        } => {
            let mut lines: Vec<String> = items
                .iter()
                .map(|doc| {
                    format!(
                        "{:>6}  {:<width$}  {} words",
                        doc.id,
                        preview(&doc.title, TITLE_COLUMN_CHARS),
                        doc.word_count,
                        width = TITLE_COLUMN_CHARS + 3
                    )
                })
                .collect();
            lines.push(format!(
                "page {} of {} ({} documents)",
                current_page, total_pages, total_items
            ));
            Ok(lines.join("\n"))
        }
    }
}

pub(crate) fn format_document(document: &Document, json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(document);
    }
    Ok(format!(
        "{} (#{})\n\n{}",
        document.title, document.id, document.text
    ))
}

pub(crate) fn format_created(document: &Document, json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(document);
    }
    Ok(format!("Created: {} ({})", document.title, document.id))
}

/// One-line rendering of the four metrics, rounded for display.
pub(crate) fn score_line(scores: &ScoreSet) -> String {
    let [overall, optimism, confidence, forecast] = scores.rounded();
    format!(
        "overall {}  optimism {}  confidence {}  forecast {}",
        overall, optimism, confidence, forecast
    )
}

pub(crate) fn format_scores(scores: Option<&ScoreSet>, json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(&scores);
    }
    Ok(scores
        .map(score_line)
        .unwrap_or_else(|| "No scores yet".to_string()))
}

pub(crate) fn format_rewrite(outcome: &RewriteOutcome, json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(&json!({
            "rewritten_text": outcome.text,
            "scores": outcome.scores,
        }));
    }
    let scores = format_scores(outcome.scores.as_ref(), false)?;
    Ok(format!("{}\n\n{}", outcome.text, scores))
}

pub(crate) fn format_suggestions(
    suggestions: &[SuggestionChunk],
    json: bool,
) -> serde_json::Result<String> {
    if json {
        return to_json(suggestions);
    }
    if suggestions.is_empty() {
        return Ok("No suggestions".to_string());
    }
    let lines: Vec<String> = suggestions
        .iter()
        .map(|chunk| {
            let id = chunk
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let rewritten = chunk
                .rewritten_text
                .as_deref()
                .map(|text| preview(text, SUGGESTION_PREVIEW_CHARS))
                .unwrap_or_default();
            format!(
                "{:>6}  {} -> {}",
                id,
                preview(&chunk.input_text_chunk, SUGGESTION_PREVIEW_CHARS),
                rewritten
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

pub(crate) fn format_history(entries: &[HistoryEntry], json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(entries);
    }
    if entries.is_empty() {
        return Ok("No history yet".to_string());
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "{:>6}  {}  {}",
                entry.id,
                entry
                    .created_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M"),
                entry_preview(entry).replace('\n', " ")
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

pub(crate) fn version_label(version: VersionRef) -> String {
    match version {
        VersionRef::Current => "current".to_string(),
        VersionRef::Entry(id) => format!("#{}", id),
    }
}

/// Parse a compare argument: `current` or a history entry id.
pub(crate) fn parse_version(raw: &str) -> Result<VersionRef, String> {
    let trimmed = raw.trim().trim_start_matches('#');
    if trimmed.eq_ignore_ascii_case("current") {
        return Ok(VersionRef::Current);
    }
    trimmed
        .parse::<i64>()
        .map(VersionRef::Entry)
        .map_err(|_| format!("'{}' is neither 'current' nor a history entry id", raw))
}

pub(crate) fn format_comparison(
    comparison: &VersionComparison,
    json: bool,
) -> serde_json::Result<String> {
    let stats = comparison.stats();
    if json {
        let segments: Vec<serde_json::Value> = comparison
            .segments
            .iter()
            .map(|segment| match segment {
                DiffSegment::Unchanged(text) => json!({ "kind": "unchanged", "text": text }),
                DiffSegment::Added(text) => json!({ "kind": "added", "text": text }),
                DiffSegment::Removed(text) => json!({ "kind": "removed", "text": text }),
            })
            .collect();
        return to_json(&json!({
            "older": version_label(comparison.older),
            "newer": version_label(comparison.newer),
            "added_words": stats.added,
            "removed_words": stats.removed,
            "segments": segments,
        }));
    }

    let header = format!(
        "{} -> {}",
        version_label(comparison.older),
        version_label(comparison.newer)
    );
    if !comparison.has_changes() {
        return Ok(format!("{}\nNo differences", header));
    }
    let body: String = comparison
        .segments
        .iter()
        .map(|segment| match segment {
            DiffSegment::Unchanged(text) => text.clone(),
            DiffSegment::Added(text) => format!("{{+{}+}}", text),
            DiffSegment::Removed(text) => format!("[-{}-]", text),
        })
        .collect();
    Ok(format!(
        "{}\n\n{}\n\n+{} -{} words",
        header, body, stats.added, stats.removed
    ))
}

pub(crate) fn format_stats(stats: &UserStats, json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(stats);
    }
    let mut lines = vec![
        format!("email: {}", stats.email),
        format!("documents: {}", stats.total_documents),
        format!("rewrites: {}", stats.total_rewrites),
        format!("time saved: {:.0} min", stats.time_saved),
    ];
    if let Some(last) = stats.last_activity.as_deref() {
        lines.push(format!("last activity: {}", last));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn format_settings(settings: DisplaySettings, json: bool) -> serde_json::Result<String> {
    if json {
        return to_json(&settings);
    }
    Ok(format!(
        "theme: {}\nfont size: {} ({}px)",
        settings.theme,
        settings.font_size,
        settings.font_size.root_px()
    ))
}
