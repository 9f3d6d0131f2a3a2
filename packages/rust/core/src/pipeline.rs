//! End-to-end ingestion: line-delimited export → parser → store.
//!
//! The loop never aborts on a single record: malformed lines, rank
//! failures, and structural defects are counted, reported through the
//! [`IngestReporter`] callback, and skipped. Only failing to read the
//! input file at all fails the call.

use std::path::Path;

use tracing::{info, warn};

use jutsudex_engine::{ParseFailure, parse};
use jutsudex_shared::{JutsudexError, Rank, RawRecord, Result};
use jutsudex_store::{AddOutcome, IngestionStore};

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Why a raw line produced no record.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The line was not a valid JSON document.
    MalformedLine(String),
    /// No usable rank token (includes the folder sentinel).
    InvalidRank { name: String, token: String },
    /// A structurally required field was absent.
    MissingField { field: &'static str },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MalformedLine(err) => write!(f, "malformed line: {err}"),
            SkipReason::InvalidRank { name, token } => {
                write!(f, "no usable rank in `{name}` (token `{token}`)")
            }
            SkipReason::MissingField { field } => write!(f, "missing field `{field}`"),
        }
    }
}

/// Structured event callback for one ingestion pass.
///
/// Replaces console printing so callers (and tests) can observe exactly
/// what happened to each record.
pub trait IngestReporter {
    /// A record entered the store under a new name.
    fn record_admitted(&self, name: &str, rank: Rank);
    /// A record displaced a higher-ranked duplicate of the same name.
    fn record_replaced(&self, name: &str, old_rank: Rank, new_rank: Rank);
    /// A record lost the dedup comparison and was dropped.
    fn record_discarded(&self, name: &str, kept_rank: Rank, incoming_rank: Rank);
    /// A line produced no record at all.
    fn record_skipped(&self, line_no: usize, reason: &SkipReason);
    /// The pass finished.
    fn done(&self, stats: &IngestStats);
}

/// No-op reporter for headless/test usage.
pub struct SilentReporter;

impl IngestReporter for SilentReporter {
    fn record_admitted(&self, _name: &str, _rank: Rank) {}
    fn record_replaced(&self, _name: &str, _old_rank: Rank, _new_rank: Rank) {}
    fn record_discarded(&self, _name: &str, _kept_rank: Rank, _incoming_rank: Rank) {}
    fn record_skipped(&self, _line_no: usize, _reason: &SkipReason) {}
    fn done(&self, _stats: &IngestStats) {}
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters for one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestStats {
    /// Non-blank lines consumed.
    pub lines_read: usize,
    /// Lines that parsed into a record.
    pub parsed: usize,
    /// Records admitted under a new name.
    pub admitted: usize,
    /// Records that displaced a duplicate.
    pub replaced: usize,
    /// Records discarded by the dedup policy.
    pub discarded: usize,
    /// Lines skipped: unusable rank token.
    pub skipped_invalid_rank: usize,
    /// Lines skipped: missing required field.
    pub skipped_missing_field: usize,
    /// Lines skipped: not valid JSON.
    pub skipped_malformed: usize,
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Ingest a line-delimited export file into the store.
pub fn ingest_file(
    path: &Path,
    store: &mut IngestionStore,
    reporter: &dyn IngestReporter,
) -> Result<IngestStats> {
    info!(path = %path.display(), "ingesting export file");
    let content = std::fs::read_to_string(path).map_err(|e| JutsudexError::io(path, e))?;
    Ok(ingest_lines(content.lines(), store, reporter))
}

/// Ingest raw lines into the store. Blank lines are ignored; every other
/// line is one JSON document.
pub fn ingest_lines<'a, I>(
    lines: I,
    store: &mut IngestionStore,
    reporter: &dyn IngestReporter,
) -> IngestStats
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats = IngestStats::default();

    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines_read += 1;

        let raw: RawRecord = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                stats.skipped_malformed += 1;
                warn!(line_no, error = %e, "skipping malformed line");
                reporter.record_skipped(line_no, &SkipReason::MalformedLine(e.to_string()));
                continue;
            }
        };

        let record = match parse(&raw) {
            Ok(record) => record,
            Err(ParseFailure::InvalidRank { name, token }) => {
                stats.skipped_invalid_rank += 1;
                reporter.record_skipped(line_no, &SkipReason::InvalidRank { name, token });
                continue;
            }
            Err(ParseFailure::MissingField { field }) => {
                stats.skipped_missing_field += 1;
                reporter.record_skipped(line_no, &SkipReason::MissingField { field });
                continue;
            }
        };
        stats.parsed += 1;

        let name = record.name.clone();
        let rank = record.rank;
        match store.add(record) {
            AddOutcome::Admitted => {
                stats.admitted += 1;
                reporter.record_admitted(&name, rank);
            }
            AddOutcome::Replaced { retired } => {
                stats.replaced += 1;
                reporter.record_replaced(&name, retired.rank, rank);
            }
            AddOutcome::Discarded { incoming } => {
                stats.discarded += 1;
                let kept_rank = store
                    .get(&incoming.name)
                    .map(|kept| kept.rank)
                    .unwrap_or(rank);
                reporter.record_discarded(&name, kept_rank, rank);
            }
        }
    }

    info!(
        lines = stats.lines_read,
        parsed = stats.parsed,
        admitted = stats.admitted,
        replaced = stats.replaced,
        discarded = stats.discarded,
        "ingestion pass complete"
    );
    reporter.done(&stats);
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Reporter that records every event for assertions.
    #[derive(Default)]
    struct RecordingReporter {
        events: RefCell<Vec<String>>,
    }

    impl IngestReporter for RecordingReporter {
        fn record_admitted(&self, name: &str, rank: Rank) {
            self.events.borrow_mut().push(format!("admitted {name} {rank}"));
        }
        fn record_replaced(&self, name: &str, old_rank: Rank, new_rank: Rank) {
            self.events
                .borrow_mut()
                .push(format!("replaced {name} {old_rank}->{new_rank}"));
        }
        fn record_discarded(&self, name: &str, kept_rank: Rank, incoming_rank: Rank) {
            self.events
                .borrow_mut()
                .push(format!("discarded {name} kept {kept_rank} over {incoming_rank}"));
        }
        fn record_skipped(&self, line_no: usize, reason: &SkipReason) {
            self.events.borrow_mut().push(format!("skipped {line_no}: {reason}"));
        }
        fn done(&self, _stats: &IngestStats) {
            self.events.borrow_mut().push("done".to_string());
        }
    }

    fn line(name: &str, description: &str) -> String {
        serde_json::json!({
            "name": name,
            "system": { "description": { "value": description } }
        })
        .to_string()
    }

    #[test]
    fn ingest_parses_and_admits() {
        let lines = [
            line("Fireball [C]", "<p>Keywords: Ninjutsu, Fire Release</p><p>Burn.</p>"),
            line("Veil [D]", "<p>Keywords: Genjutsu</p><p>Hide.</p>"),
        ];
        let mut store = IngestionStore::new();
        let stats = ingest_lines(
            lines.iter().map(String::as_str),
            &mut store,
            &SilentReporter,
        );

        assert_eq!(stats.lines_read, 2);
        assert_eq!(stats.parsed, 2);
        assert_eq!(stats.admitted, 2);
        assert_eq!(store.len(), 2);
        assert!(store.all_keywords().contains("Fire Release"));
    }

    #[test]
    fn folder_sentinel_is_excluded_entirely() {
        let lines = [
            line("Jutsu Folder [CF_tempEntity]", ""),
            line("Fireball [C]", ""),
        ];
        let mut store = IngestionStore::new();
        let stats = ingest_lines(
            lines.iter().map(String::as_str),
            &mut store,
            &SilentReporter,
        );

        assert_eq!(stats.skipped_invalid_rank, 1);
        assert_eq!(store.len(), 1);
        assert!(!store.has("Jutsu Folder"));
    }

    #[test]
    fn malformed_line_does_not_abort_run() {
        let lines = [
            "{ this is not json".to_string(),
            line("Fireball [C]", ""),
        ];
        let mut store = IngestionStore::new();
        let stats = ingest_lines(
            lines.iter().map(String::as_str),
            &mut store,
            &SilentReporter,
        );

        assert_eq!(stats.skipped_malformed, 1);
        assert_eq!(stats.admitted, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let lines = ["".to_string(), "   ".to_string(), line("Fireball [C]", "")];
        let mut store = IngestionStore::new();
        let stats = ingest_lines(
            lines.iter().map(String::as_str),
            &mut store,
            &SilentReporter,
        );
        assert_eq!(stats.lines_read, 1);
    }

    #[test]
    fn dedup_events_are_reported() {
        let lines = [
            line("Fireball [B]", ""),
            line("Fireball [A]", ""),
            line("Fireball [S]", ""),
        ];
        let mut store = IngestionStore::new();
        let reporter = RecordingReporter::default();
        let stats = ingest_lines(lines.iter().map(String::as_str), &mut store, &reporter);

        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.replaced, 1);
        assert_eq!(stats.discarded, 1);

        let events = reporter.events.borrow();
        assert_eq!(events[0], "admitted Fireball B");
        assert_eq!(events[1], "replaced Fireball B->A");
        assert_eq!(events[2], "discarded Fireball kept A over S");
        assert_eq!(events[3], "done");

        assert_eq!(store.get("Fireball").map(|r| r.rank), Some(Rank::A));
    }

    #[test]
    fn missing_field_skips_single_record() {
        let lines = [
            r#"{"name": "No System [C]"}"#.to_string(),
            line("Fireball [C]", ""),
        ];
        let mut store = IngestionStore::new();
        let stats = ingest_lines(
            lines.iter().map(String::as_str),
            &mut store,
            &SilentReporter,
        );
        assert_eq!(stats.skipped_missing_field, 1);
        assert_eq!(stats.admitted, 1);
    }

    #[test]
    fn ingest_file_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("jutsu.db");
        let content = [
            line("Fireball [C]", "<p>Keywords: Ninjutsu</p><p>Burn.</p>"),
            line("Veil [D]", ""),
        ]
        .join("\n");
        std::fs::write(&path, content).expect("write fixture");

        let mut store = IngestionStore::new();
        let stats = ingest_file(&path, &mut store, &SilentReporter).expect("ingest");
        assert_eq!(stats.admitted, 2);
        assert_eq!(
            store.get("Fireball").and_then(|r| r.category.as_deref()),
            Some("Ninjutsu")
        );
    }

    #[test]
    fn ingest_file_missing_path_errors() {
        let mut store = IngestionStore::new();
        let result = ingest_file(
            Path::new("/nonexistent/jutsu.db"),
            &mut store,
            &SilentReporter,
        );
        assert!(result.is_err());
    }
}
