//! Ingestion store: the live, de-duplicated record set for one run.
//!
//! Records are indexed by rank and by name. Name collisions are resolved
//! by rank precedence: the store keeps exactly the lowest-precedence
//! record per name, retiring anything it displaces. Retirement is
//! expected behavior, observable through [`AddOutcome`] and the log
//! stream, never an error.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};

use jutsudex_shared::{JutsuRecord, Rank};

/// Collision precedence: alphabetical letter order, so an A-rank record
/// displaces a B-rank one and an S-rank record displaces nothing. This is
/// the comparison the legacy dataset was curated under (rank letters
/// compared as text), and changing it would silently reshuffle which
/// duplicate survives.
fn collision_precedence(rank: Rank) -> u8 {
    match rank {
        Rank::A => 0,
        Rank::B => 1,
        Rank::C => 2,
        Rank::D => 3,
        Rank::E => 4,
        Rank::S => 5,
    }
}

// ---------------------------------------------------------------------------
// AddOutcome
// ---------------------------------------------------------------------------

/// What happened to a record offered to [`IngestionStore::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// First record under this name; admitted.
    Admitted,
    /// A worse-precedence record of the same name was retired in favor
    /// of the incoming one. The retired record is handed back.
    Replaced { retired: JutsuRecord },
    /// The incoming record did not beat the live one; handed back intact.
    Discarded { incoming: JutsuRecord },
}

// ---------------------------------------------------------------------------
// IngestionStore
// ---------------------------------------------------------------------------

/// Owns the full set of live records for a run.
///
/// Invariant: every name in a rank bucket resolves in the name index to a
/// record of that rank, and every indexed record appears in exactly one
/// rank bucket. The keyword vocabulary is a pure union over every record
/// ever admitted; retirement never shrinks it.
#[derive(Debug, Default)]
pub struct IngestionStore {
    /// Name index: the owning map, exactly one live record per name.
    by_name: HashMap<String, JutsuRecord>,
    /// Rank index: names per rank, in admission order, no duplicates.
    by_rank: BTreeMap<Rank, Vec<String>>,
    /// Store-iteration order: names by first admission. A replacement
    /// keeps the name's original position.
    order: Vec<String>,
    /// Union of keywords across every admitted record.
    all_keywords: BTreeSet<String>,
}

impl IngestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a record to the store, applying the dedup policy.
    pub fn add(&mut self, record: JutsuRecord) -> AddOutcome {
        let existing_rank = self.by_name.get(&record.name).map(|live| live.rank);

        match existing_rank {
            None => {
                self.union_keywords(&record);
                self.by_rank
                    .entry(record.rank)
                    .or_default()
                    .push(record.name.clone());
                self.order.push(record.name.clone());
                debug!(name = %record.name, rank = %record.rank, "record admitted");
                self.by_name.insert(record.name.clone(), record);
                AddOutcome::Admitted
            }
            Some(old_rank)
                if collision_precedence(record.rank) < collision_precedence(old_rank) =>
            {
                self.union_keywords(&record);
                if let Some(bucket) = self.by_rank.get_mut(&old_rank) {
                    bucket.retain(|name| name != &record.name);
                }
                self.by_rank
                    .entry(record.rank)
                    .or_default()
                    .push(record.name.clone());
                info!(
                    name = %record.name,
                    old_rank = %old_rank,
                    new_rank = %record.rank,
                    "retiring outranked duplicate"
                );
                let retired = self
                    .by_name
                    .insert(record.name.clone(), record)
                    .expect("name index holds the record being replaced");
                AddOutcome::Replaced { retired }
            }
            Some(kept_rank) => {
                debug!(
                    name = %record.name,
                    kept_rank = %kept_rank,
                    incoming_rank = %record.rank,
                    "discarding duplicate"
                );
                AddOutcome::Discarded { incoming: record }
            }
        }
    }

    fn union_keywords(&mut self, record: &JutsuRecord) {
        for keyword in &record.keywords {
            self.all_keywords.insert(keyword.clone());
        }
    }

    /// Look up a live record by name.
    pub fn get(&self, name: &str) -> Option<&JutsuRecord> {
        self.by_name.get(name)
    }

    /// Whether a live record exists under this name.
    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Live records in store-iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &JutsuRecord> {
        self.order.iter().filter_map(|name| self.by_name.get(name))
    }

    /// Live records holding a given rank, in admission order.
    pub fn records_by_rank(&self, rank: Rank) -> Vec<&JutsuRecord> {
        self.by_rank
            .get(&rank)
            .into_iter()
            .flatten()
            .filter_map(|name| self.by_name.get(name))
            .collect()
    }

    /// Live record counts per rank, ascending rank order, occupied ranks only.
    pub fn rank_counts(&self) -> Vec<(Rank, usize)> {
        self.by_rank
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(rank, names)| (*rank, names.len()))
            .collect()
    }

    /// The accumulated keyword vocabulary.
    pub fn all_keywords(&self) -> &BTreeSet<String> {
        &self.all_keywords
    }

    /// Every live record with at least one keyword containing the given
    /// substring, case-insensitively, in store-iteration order, at most
    /// once per record.
    pub fn filter_by_keyword_substring(&self, keyword: &str) -> Vec<&JutsuRecord> {
        let needle = keyword.to_lowercase();
        self.iter()
            .filter(|record| {
                record
                    .keywords
                    .iter()
                    .any(|k| k.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, rank: Rank, keywords: &[&str]) -> JutsuRecord {
        JutsuRecord {
            name: name.to_string(),
            path_name: name.to_string(),
            rank,
            description: format!("{name} description"),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category: None,
            activation: None,
            img: None,
        }
    }

    #[test]
    fn add_admits_new_names() {
        let mut store = IngestionStore::new();
        assert_eq!(
            store.add(record("Fireball", Rank::C, &["Ninjutsu"])),
            AddOutcome::Admitted
        );
        assert!(store.has("Fireball"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Fireball").map(|r| r.rank), Some(Rank::C));
    }

    #[test]
    fn add_retires_duplicate_with_worse_letter() {
        let mut store = IngestionStore::new();
        store.add(record("Fireball", Rank::B, &[]));
        let outcome = store.add(record("Fireball", Rank::A, &[]));

        // A precedes B, so the incoming record wins.
        match outcome {
            AddOutcome::Replaced { retired } => assert_eq!(retired.rank, Rank::B),
            other => panic!("expected Replaced, got {other:?}"),
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Fireball").map(|r| r.rank), Some(Rank::A));
        assert!(store.records_by_rank(Rank::B).is_empty());
        assert_eq!(store.records_by_rank(Rank::A).len(), 1);
    }

    #[test]
    fn add_discards_duplicate_that_loses() {
        let mut store = IngestionStore::new();
        store.add(record("Fireball", Rank::A, &[]));
        let outcome = store.add(record("Fireball", Rank::B, &[]));

        assert!(matches!(outcome, AddOutcome::Discarded { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Fireball").map(|r| r.rank), Some(Rank::A));
    }

    #[test]
    fn s_rank_never_displaces() {
        let mut store = IngestionStore::new();
        store.add(record("Forbidden Art", Rank::E, &[]));
        let outcome = store.add(record("Forbidden Art", Rank::S, &[]));

        assert!(matches!(outcome, AddOutcome::Discarded { .. }));
        assert_eq!(store.get("Forbidden Art").map(|r| r.rank), Some(Rank::E));
    }

    #[test]
    fn indices_stay_consistent() {
        let mut store = IngestionStore::new();
        store.add(record("One", Rank::E, &[]));
        store.add(record("Two", Rank::A, &[]));
        store.add(record("Two", Rank::D, &[]));
        store.add(record("Three", Rank::D, &[]));
        store.add(record("Three", Rank::S, &[]));

        for (rank, count) in store.rank_counts() {
            let bucket = store.records_by_rank(rank);
            assert_eq!(bucket.len(), count);
            for live in bucket {
                assert_eq!(store.get(&live.name).map(|r| r.rank), Some(rank));
            }
        }
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn keywords_union_never_shrinks() {
        let mut store = IngestionStore::new();
        store.add(record("Fireball", Rank::C, &["Fire Release", "Ninjutsu"]));
        store.add(record("Fireball", Rank::A, &["Ninjutsu"]));

        // The C-rank record is retired, but its keyword survives.
        assert!(store.all_keywords().contains("Fire Release"));
        assert!(store.all_keywords().contains("Ninjutsu"));
    }

    #[test]
    fn discarded_record_contributes_no_keywords() {
        let mut store = IngestionStore::new();
        store.add(record("Fireball", Rank::A, &["Ninjutsu"]));
        store.add(record("Fireball", Rank::S, &["Forbidden"]));

        assert!(!store.all_keywords().contains("Forbidden"));
    }

    #[test]
    fn filter_matches_keyword_substring_case_insensitively() {
        let mut store = IngestionStore::new();
        store.add(record("Fireball", Rank::C, &["Fire Release"]));
        store.add(record("Gale", Rank::C, &["Wind Release"]));
        store.add(record("Ember", Rank::E, &["Fire Release", "Ninjutsu"]));

        let matches = store.filter_by_keyword_substring("fire");
        let names: Vec<&str> = matches.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Fireball", "Ember"]);
    }

    #[test]
    fn filter_returns_each_record_once() {
        let mut store = IngestionStore::new();
        store.add(record(
            "Twin Flame",
            Rank::B,
            &["Fire Release", "Fireproof"],
        ));
        assert_eq!(store.filter_by_keyword_substring("fire").len(), 1);
    }

    #[test]
    fn iteration_order_is_first_admission() {
        let mut store = IngestionStore::new();
        store.add(record("Alpha", Rank::S, &[]));
        store.add(record("Beta", Rank::E, &[]));
        store.add(record("Alpha", Rank::D, &[]));

        let names: Vec<&str> = store.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(store.get("Alpha").map(|r| r.rank), Some(Rank::D));
    }
}
