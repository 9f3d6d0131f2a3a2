//! Keyword block extraction and refinement.
//!
//! Descriptions usually open with a block like
//! `<p>Keywords: Genjutsu, Visual, Unaware</p>`, but the formatting is
//! inconsistent: the label is sometimes missing, the word "Release" is
//! sometimes dropped or re-worded, and commas are occasionally absent so
//! several keywords run together in one fragment. Extraction finds the
//! block and splits it into raw tokens; refinement resolves the fragments
//! into the curated keyword vocabulary, favoring precision over
//! completeness.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// Words that combine with the preceding word to form one logical keyword,
/// e.g. "Artistic Style".
pub const KEYWORD_POSTFIXES: [&str; 3] = ["Release", "Style", "Branch"];

/// Names that pair naturally with "Release", even when the source text
/// omits the word. Lower-case forms.
static RELEASE_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "mist", "storm", "plasma", "steel", "yang", "dust", "ash", "earth", "lava", "magma",
        "swift", "corrosion", "paper", "vapor", "explosion", "poison", "acid", "miasma", "wood",
        "ink", "steam", "yin", "sand", "blaze", "fire", "shadow", "magnet", "salt", "mud", "ice",
        "lightning", "smoke", "water", "crystal", "bubble", "wind", "scorch", "boil", "sound",
        "snow", "medical",
    ]
    .into_iter()
    .collect()
});

fn is_release_type(word: &str) -> bool {
    RELEASE_TYPES.contains(word.to_lowercase().as_str())
}

fn is_postfix(word: &str) -> bool {
    KEYWORD_POSTFIXES.contains(&word)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Longest span accepted as a keyword block; anything longer is assumed to
/// be ordinary prose that happened to match.
const KEYWORD_BLOCK_CEILING: usize = 100;

/// Matches from a `Keyword:`/`Keywords:` label or a paragraph open up to
/// the next line-break marker, newline, or paragraph close, across lines.
static KEYWORD_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(Keywords?:|<p>).*?(?:<br[^>]*>|\n|</p>)").expect("keyword block regex")
});

/// Locate the keyword block inside a description.
///
/// Returns `None` when no block exists or when the only candidate exceeds
/// the length ceiling (a degradation signal, not an error: the record
/// simply gets no keywords).
pub fn find_keyword_block(description: &str) -> Option<String> {
    let caps = KEYWORD_BLOCK_RE.captures(description)?;
    let whole = caps.get(0).expect("whole match");

    let participating = caps.iter().skip(1).flatten().count();
    if participating > 1 {
        warn!(
            groups = participating,
            "keyword pattern matched more than one group"
        );
    }

    if whole.as_str().len() > KEYWORD_BLOCK_CEILING {
        debug!(
            len = whole.as_str().len(),
            "keyword block candidate too long, skipping"
        );
        return None;
    }

    Some(whole.as_str().to_string())
}

/// Noise deleted from the block before splitting: the label, paragraph
/// tags, line-break markers, newlines, the word "release", and periods.
static TOKEN_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Keywords?:|<p>|</p>|\n|<br[^>]*>|[Rr]elease|\.)").expect("token noise regex")
});

/// Split a keyword block into raw comma-separated tokens, trimmed, empties
/// dropped, left-to-right order preserved.
pub fn tokenize(block: &str) -> Vec<String> {
    let cleaned = TOKEN_NOISE_RE.replace_all(block, "");
    cleaned
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Refinement
// ---------------------------------------------------------------------------

/// Resolve raw tokens into the final keyword sequence.
///
/// A fold over the input producing a fresh output list:
/// - a bare release-type name gets its stripped "Release" restored;
/// - single words are kept as-is;
/// - multi-word fragments are walked pairwise: `<word> <postfix>` pairs
///   are kept whole, a word following an already-consumed postfix is
///   carried as a dangling trailing keyword, and a release-type name in
///   current position splits the fragment (the word before it stands
///   alone). Two-word fragments matching none of these are dropped as
///   extraction noise.
///
/// The dangling slot is reset at the top of every pair step, so only a
/// word set by the final pair survives the scan. Output order is first
/// emission order; duplicates are not removed here.
pub fn refine(tokens: &[String]) -> Vec<String> {
    let mut refined = Vec::new();

    for token in tokens {
        if is_release_type(token) {
            refined.push(format!("{token} Release"));
            continue;
        }

        let words: Vec<&str> = token.split(' ').collect();
        if words.len() == 1 {
            refined.push(token.clone());
            continue;
        }

        let mut dangling: Option<&str> = None;
        for pair in words.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            dangling = None;

            if is_postfix(curr) {
                refined.push(format!("{prev} {curr}"));
            } else if is_postfix(prev) {
                // The pair ending at `prev` was emitted last step; `curr`
                // stands alone unless a later pair claims it.
                dangling = Some(curr);
            } else if is_release_type(curr) {
                refined.push(prev.to_string());
                dangling = Some(curr);
            }
        }

        if let Some(word) = dangling {
            if is_release_type(word) {
                refined.push(format!("{word} Release"));
            } else {
                refined.push(word.to_string());
            }
        }
    }

    refined
}

/// Full keyword pipeline for one description: locate, tokenize, refine.
pub fn extract(description: &str) -> Vec<String> {
    match find_keyword_block(description) {
        Some(block) => refine(&tokenize(&block)),
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
