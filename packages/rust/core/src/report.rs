//! Library statistics over an ingested store.
//!
//! Mirrors what a curator wants to see after a pass: how many techniques
//! per rank, the full keyword vocabulary, and how many records each
//! keyword reaches.

use jutsudex_shared::Rank;
use jutsudex_store::IngestionStore;

/// Aggregated statistics for one ingested library.
#[derive(Debug, Clone)]
pub struct LibraryReport {
    /// Live record count.
    pub total: usize,
    /// Record counts per occupied rank, ascending.
    pub rank_counts: Vec<(Rank, usize)>,
    /// The accumulated keyword vocabulary, sorted.
    pub keywords: Vec<String>,
    /// Per-keyword record counts (substring match, case-insensitive).
    pub keyword_counts: Vec<(String, usize)>,
}

impl LibraryReport {
    /// Assemble the report from a store.
    pub fn from_store(store: &IngestionStore) -> Self {
        let keywords: Vec<String> = store.all_keywords().iter().cloned().collect();
        let keyword_counts = keywords
            .iter()
            .map(|keyword| {
                (
                    keyword.clone(),
                    store.filter_by_keyword_substring(keyword).len(),
                )
            })
            .collect();

        Self {
            total: store.len(),
            rank_counts: store.rank_counts(),
            keywords,
            keyword_counts,
        }
    }
}

impl std::fmt::Display for LibraryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (rank, count) in &self.rank_counts {
            writeln!(f, "{rank}-Rank Jutsu: {count}")?;
        }
        writeln!(f, "Total Jutsu: {}", self.total)?;
        writeln!(f)?;
        writeln!(f, "Keywords: {}", self.keywords.join(" | "))?;
        writeln!(f)?;
        writeln!(f, "Keyword Jutsu Breakdown")?;
        for (keyword, count) in &self.keyword_counts {
            writeln!(f, "{keyword}: {count}")?;
        }
        Ok(())
    }
}
