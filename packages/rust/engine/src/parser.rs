//! Record parser: one raw export document in, one normalized record out.
//!
//! Orchestrates field extraction from a [`RawRecord`]: the rank token is
//! split off the name, the name is decorated and made path-safe, the
//! description is mined for keywords and then sanitized, and the fixed
//! pass-through attributes are copied over. Parsing is stateless; a
//! failure is typed and applies to that record only.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use jutsudex_shared::{ActivationInfo, JutsuRecord, JutsudexError, Rank, RawRecord};

use crate::{keywords, sanitize};

// ---------------------------------------------------------------------------
// Failure type
// ---------------------------------------------------------------------------

/// Why a single raw record could not become a [`JutsuRecord`].
///
/// Neither case is fatal to a run: the ingestion loop skips the record
/// and continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// The name carries no recognizable rank token, or the token is the
    /// `CF_tempEntity` folder sentinel. Callers must skip the record
    /// entirely, never default a rank.
    #[error("no usable rank in `{name}` (token `{token}`)")]
    InvalidRank { name: String, token: String },

    /// A structurally required field is absent from the raw document.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
}

impl From<ParseFailure> for JutsudexError {
    fn from(failure: ParseFailure) -> Self {
        JutsudexError::parse(failure.to_string())
    }
}

// ---------------------------------------------------------------------------
// Category vocabulary
// ---------------------------------------------------------------------------

/// Coarse disciplines, scanned in this order.
const CATEGORIES: [&str; 4] = ["Ninjutsu", "Genjutsu", "Taijutsu", "Bukijutsu"];

/// Fallback discipline when none of the fixed categories matched.
const SPECIAL_CATEGORY: &str = "Hijutsu";

/// Sentinel name used by compendium exports for folder pseudo-entries.
const FOLDER_SENTINEL: &str = "CF_tempEntity";

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Parse one raw export document into a normalized record.
pub fn parse(raw: &RawRecord) -> Result<JutsuRecord, ParseFailure> {
    let raw_name = raw
        .name
        .as_deref()
        .ok_or(ParseFailure::MissingField { field: "name" })?;

    let (base_name, token) = split_rank(raw_name).ok_or_else(|| {
        warn!(name = raw_name, "name carries no bracketed rank token");
        ParseFailure::InvalidRank {
            name: raw_name.to_string(),
            token: String::new(),
        }
    })?;

    let rank = match Rank::parse(&token) {
        Some(rank) => rank,
        None => {
            if token == FOLDER_SENTINEL {
                debug!(name = raw_name, "skipping folder sentinel entry");
            } else {
                warn!(name = raw_name, token = %token, "unrecognized rank token");
            }
            return Err(ParseFailure::InvalidRank {
                name: base_name,
                token,
            });
        }
    };

    // Path safety is derived from the undecorated name, before decoration
    // introduces a colon.
    let path_name = path_safe_name(&base_name);
    let name = decorate_name(&base_name);

    let description_value = raw
        .system
        .as_ref()
        .and_then(|system| system.description.as_ref())
        .ok_or(ParseFailure::MissingField {
            field: "system.description",
        })?
        .value
        .clone()
        .unwrap_or_default();

    let (keywords, description) = if description_value.is_empty() {
        (Vec::new(), String::new())
    } else {
        let unescaped = sanitize::unescape_literal(&description_value);
        let repaired = strip_empty_lead_paragraph(&unescaped);

        // Keyword extraction must see the original leading block; the
        // destructive cleanup runs after it.
        let keywords = dedup_first_seen(keywords::extract(repaired));

        let cleaned = sanitize::strip_first_block(repaired);
        let cleaned = sanitize::normalize_bullets(&cleaned);
        let cleaned = sanitize::strip_markup(&cleaned);
        let cleaned = sanitize::breaks_to_newlines(&cleaned);
        (keywords, sanitize::trim(&cleaned))
    };

    let category = derive_category(&keywords);
    let activation = raw
        .system
        .as_ref()
        .and_then(|system| system.activation.as_ref())
        .map(ActivationInfo::from);

    Ok(JutsuRecord {
        name,
        path_name,
        rank,
        description,
        keywords,
        category,
        activation,
        img: raw.img.clone(),
    })
}

// ---------------------------------------------------------------------------
// Name handling
// ---------------------------------------------------------------------------

/// Split the last bracketed `[...]` segment off a raw name.
///
/// Returns the trimmed display name and the trimmed token, or `None` when
/// no complete bracket pair exists.
fn split_rank(name: &str) -> Option<(String, String)> {
    let open = name.rfind('[')?;
    let close = name[open..].find(']')? + open;
    let token = name[open + 1..close].trim().to_string();
    let display = name[..open].trim().to_string();
    Some((display, token))
}

/// Matches a name opening with `<word> <decorator> <rest>`.
static DECORATED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+) (release|style|art) (.+)$").expect("decoration regex")
});

/// Rewrite `Fire Release Great Fireball` as `Fire Release: Great Fireball`.
///
/// Only fires on a strict leading match; the two leading words are
/// re-cased to title case, the remainder is untouched.
fn decorate_name(name: &str) -> String {
    match DECORATED_NAME_RE.captures(name) {
        Some(caps) => format!(
            "{} {}: {}",
            title_case(&caps[1]),
            title_case(&caps[2]),
            &caps[3]
        ),
        None => name.to_string(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Characters deleted outright from the path-safe name.
const PATH_DELETE: [char; 8] = ['\'', '"', ',', '.', '!', '?', '(', ')'];

/// Derive a name safe for use as a filesystem segment: separators become
/// dashes, stray punctuation is deleted.
fn path_safe_name(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            ':' | '/' | '\\' => Some('-'),
            c if PATH_DELETE.contains(&c) => None,
            other => Some(other),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Description helpers
// ---------------------------------------------------------------------------

/// Drop the empty-paragraph artifact some exports leave at the very start.
fn strip_empty_lead_paragraph(text: &str) -> &str {
    text.strip_prefix("<p></p>").unwrap_or(text)
}

/// Keep the first occurrence of each keyword; the record models an
/// ordered set while the refiner may emit duplicates.
fn dedup_first_seen(keywords: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .filter(|keyword| seen.insert(keyword.clone()))
        .collect()
}

/// Pick the record's discipline from its refined keywords: the first of
/// the fixed vocabulary present anywhere in the list, else the special
/// case, else none.
fn derive_category(keywords: &[String]) -> Option<String> {
    CATEGORIES
        .iter()
        .find(|category| keywords.iter().any(|k| k == *category))
        .map(|category| (*category).to_string())
        .or_else(|| keywords.iter().find(|k| *k == SPECIAL_CATEGORY).cloned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
