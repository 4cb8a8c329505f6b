//! Version history panel and word-level compare.

use chrono::{DateTime, Utc};
use similar::{ChangeTag, TextDiff};
use starc_core::constants::HISTORY_PREVIEW_CHARS;
use starc_core::models::history::{sort_newest_first, HistoryEntry};
use starc_core::text::preview;

/// A version that can be selected for compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionRef {
    /// The live buffer, always treated as the newest version.
    Current,
    /// A stored snapshot, by history entry id.
    Entry(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStatus {
    Loading,
    Ready,
    Failed(String),
}

/// One run of words in a compare result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSegment {
    Unchanged(String),
    Added(String),
    Removed(String),
}

/// Word counts for a compare result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

/// Diff between two selected versions, older to newer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionComparison {
    pub older: VersionRef,
    pub newer: VersionRef,
    pub segments: Vec<DiffSegment>,
}

impl VersionComparison {
    pub fn stats(&self) -> DiffStats {
        self.segments
            .iter()
            .fold(DiffStats::default(), |mut stats, segment| {
                match segment {
                    DiffSegment::Added(text) => stats.added += text.split_whitespace().count(),
                    DiffSegment::Removed(text) => stats.removed += text.split_whitespace().count(),
                    DiffSegment::Unchanged(_) => {}
                }
                stats
            })
    }

    pub fn has_changes(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| !matches!(segment, DiffSegment::Unchanged(_)))
    }
}

/// Word-level diff from `old` to `new`, with adjacent tokens of the same kind
/// merged into one segment.
///
/// An empty side yields no segments.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffSegment> {
    if old.is_empty() || new.is_empty() {
        return Vec::new();
    }
    let diff = TextDiff::from_words(old, new);
    let mut segments: Vec<DiffSegment> = Vec::new();
    for change in diff.iter_all_changes() {
        let value = change.value();
        match (change.tag(), segments.last_mut()) {
            (ChangeTag::Equal, Some(DiffSegment::Unchanged(run)))
            | (ChangeTag::Insert, Some(DiffSegment::Added(run)))
            | (ChangeTag::Delete, Some(DiffSegment::Removed(run))) => run.push_str(value),
            (ChangeTag::Equal, _) => segments.push(DiffSegment::Unchanged(value.to_string())),
            (ChangeTag::Insert, _) => segments.push(DiffSegment::Added(value.to_string())),
            (ChangeTag::Delete, _) => segments.push(DiffSegment::Removed(value.to_string())),
        }
    }
    segments
}

/// History entries plus the current compare selection.
#[derive(Debug, Clone)]
pub struct HistoryPanel {
    entries: Vec<HistoryEntry>,
    selected: Vec<VersionRef>,
    status: HistoryStatus,
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self::loading()
    }
}

impl HistoryPanel {
    pub fn loading() -> Self {
        Self {
            entries: Vec::new(),
            selected: Vec::new(),
            status: HistoryStatus::Loading,
        }
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut panel = Self::loading();
        panel.set_entries(entries);
        panel
    }

    /// Replace the entries; selections that no longer exist are dropped.
    pub fn set_entries(&mut self, mut entries: Vec<HistoryEntry>) {
        sort_newest_first(&mut entries);
        self.entries = entries;
        self.status = HistoryStatus::Ready;
        let entries = &self.entries;
        self.selected.retain(|version| match version {
            VersionRef::Current => true,
            VersionRef::Entry(id) => entries.iter().any(|entry| entry.id == *id),
        });
    }

    pub fn set_failed(&mut self, message: impl Into<String>) {
        self.status = HistoryStatus::Failed(message.into());
    }

    pub fn status(&self) -> &HistoryStatus {
        &self.status
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn entry(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Selected versions, newest first.
    pub fn selected(&self) -> &[VersionRef] {
        &self.selected
    }

    pub fn is_selected(&self, version: VersionRef) -> bool {
        self.selected.contains(&version)
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // 0 for the live buffer, then entries in newest-first order.
    fn rank(&self, version: VersionRef) -> Option<usize> {
        match version {
            VersionRef::Current => Some(0),
            VersionRef::Entry(id) => self
                .entries
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| index + 1),
        }
    }

    /// Toggle `version` in the selection.
    ///
    /// Selecting a selected version removes it. With two already selected,
    /// the older of the two is replaced.
    ///
    /// # Returns
    /// `false` when `version` names an unknown entry.
    pub fn toggle(&mut self, version: VersionRef) -> bool {
        if self.rank(version).is_none() {
            return false;
        }
        if let Some(index) = self.selected.iter().position(|v| *v == version) {
            self.selected.remove(index);
            return true;
        }
        if self.selected.len() == 2 {
            // Kept newest-first, so the older one is last.
            self.selected.pop();
        }
        self.selected.push(version);
        let mut ranked: Vec<(usize, VersionRef)> = self
            .selected
            .iter()
            .filter_map(|v| self.rank(*v).map(|rank| (rank, *v)))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        self.selected = ranked.into_iter().map(|(_, v)| v).collect();
        true
    }

    /// Text of `version`, resolving [`VersionRef::Current`] to `current`.
    pub fn content_of<'a>(&'a self, version: VersionRef, current: &'a str) -> Option<&'a str> {
        match version {
            VersionRef::Current => Some(current),
            VersionRef::Entry(id) => self.entry(id).map(|entry| entry.content.as_str()),
        }
    }

    /// Creation time of `version`; `None` for the live buffer.
    pub fn created_at(&self, version: VersionRef) -> Option<DateTime<Utc>> {
        match version {
            VersionRef::Current => None,
            VersionRef::Entry(id) => self.entry(id).map(|entry| entry.created_at),
        }
    }

    /// Compare the two selected versions.
    ///
    /// # Returns
    /// `None` unless exactly two versions are selected.
    pub fn compare(&self, current: &str) -> Option<VersionComparison> {
        let [newer, older] = self.selected.as_slice() else {
            return None;
        };
        let old_text = self.content_of(*older, current)?;
        let new_text = self.content_of(*newer, current)?;
        Some(VersionComparison {
            older: *older,
            newer: *newer,
            segments: diff_words(old_text, new_text),
        })
    }
}

/// Short preview of an entry for list rows.
pub fn entry_preview(entry: &HistoryEntry) -> String {
    preview(&entry.content, HISTORY_PREVIEW_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: i64, day: u32, content: &str) -> HistoryEntry {
        HistoryEntry {
            id,
            document_id: 1,
            content: content.to_string(),
            created_at: Utc
                .with_ymd_and_hms(2024, 3, day, 12, 0, 0)
                .single()
                .expect("timestamp"),
        }
    }

    fn panel() -> HistoryPanel {
        HistoryPanel::with_entries(vec![
            entry(1, 1, "the plan is fine"),
            entry(3, 3, "the plan is great"),
            entry(2, 2, "the plan is good"),
        ])
    }

    #[test]
    fn entries_are_sorted_newest_first() {
        let ids: Vec<i64> = panel().entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn selection_toggles_and_stays_newest_first() {
        let mut panel = panel();
        assert!(panel.toggle(VersionRef::Entry(1)));
        assert!(panel.toggle(VersionRef::Current));
        assert_eq!(
            panel.selected(),
            &[VersionRef::Current, VersionRef::Entry(1)]
        );

        assert!(panel.toggle(VersionRef::Current));
        assert_eq!(panel.selected(), &[VersionRef::Entry(1)]);
        assert!(!panel.toggle(VersionRef::Entry(99)));
    }

    #[test]
    fn third_selection_replaces_the_older_one() {
        let mut panel = panel();
        panel.toggle(VersionRef::Entry(3));
        panel.toggle(VersionRef::Entry(1));
        panel.toggle(VersionRef::Entry(2));
        assert_eq!(
            panel.selected(),
            &[VersionRef::Entry(3), VersionRef::Entry(2)]
        );
    }

    #[test]
    fn compare_diffs_older_to_newer_by_word() {
        let mut panel = panel();
        panel.toggle(VersionRef::Entry(2));
        assert!(panel.compare("unused").is_none());
        panel.toggle(VersionRef::Current);

        let comparison = panel.compare("the plan is very good").expect("comparison");
        assert_eq!(comparison.older, VersionRef::Entry(2));
        assert_eq!(comparison.newer, VersionRef::Current);
        let added: Vec<&str> = comparison
            .segments
            .iter()
            .filter_map(|segment| match segment {
                DiffSegment::Added(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(added.concat().trim(), "very");
        assert_eq!(comparison.stats(), DiffStats { added: 1, removed: 0 });
    }

    #[test]
    fn replaced_word_counts_as_one_removed_and_one_added() {
        let segments = diff_words("the plan is fine", "the plan is great");
        let comparison = VersionComparison {
            older: VersionRef::Entry(1),
            newer: VersionRef::Entry(3),
            segments,
        };
        assert!(comparison.has_changes());
        assert_eq!(comparison.stats(), DiffStats { added: 1, removed: 1 });
    }

    #[test]
    fn empty_side_yields_no_segments() {
        assert!(diff_words("", "text").is_empty());
        assert!(diff_words("text", "").is_empty());
    }

    #[test]
    fn refreshed_entries_drop_vanished_selections() {
        let mut panel = panel();
        panel.toggle(VersionRef::Entry(1));
        panel.toggle(VersionRef::Current);
        panel.set_entries(vec![entry(3, 3, "only")]);
        assert_eq!(panel.selected(), &[VersionRef::Current]);
    }

    #[test]
    fn preview_truncates_long_entries() {
        let long = "x".repeat(250);
        let preview = entry_preview(&entry(9, 4, &long));
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));
        assert_eq!(entry_preview(&entry(9, 4, "short")), "short");
    }
}
