//! Sanitation passes for description text.
//!
//! Each pass is a pure function `&str -> String` applied in sequence by the
//! record parser. Order matters there: keyword extraction must see the
//! original leading block, so the destructive passes run after it.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Pass 1: Strip markup tags
// ---------------------------------------------------------------------------

/// Matches any tag-like span, non-greedily.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("tag regex"));

/// Matches a complete line-break tag, including the self-closing variant.
static BR_FULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<br[^>]*>$").expect("br regex"));

/// Remove all markup tags except line-break tags, which pass through
/// verbatim so line-oriented handling downstream still works.
///
/// Idempotent: running it on its own output changes nothing.
pub fn strip_markup(text: &str) -> String {
    TAG_RE
        .replace_all(text, |caps: &regex::Captures| {
            let tag = &caps[0];
            if BR_FULL_RE.is_match(tag) {
                tag.to_string()
            } else {
                String::new()
            }
        })
        .to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Strip the first paragraph block
// ---------------------------------------------------------------------------

/// Matches one `<p>...</p>` block, non-greedily, across lines.
static PARA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>.*?</p>").expect("paragraph regex"));

/// Remove exactly the first `<p>...</p>` block, at most once.
///
/// Used to excise the leading keyword-announcement block so it never
/// appears in the final prose.
pub fn strip_first_block(text: &str) -> String {
    PARA_RE.replace(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Normalize bullets
// ---------------------------------------------------------------------------

/// Replace the bullet glyph with a plain dash.
pub fn normalize_bullets(text: &str) -> String {
    text.replace('\u{2022}', "-")
}

// ---------------------------------------------------------------------------
// Pass 4: Unescape literal escape sequences
// ---------------------------------------------------------------------------

/// Matches a literal `\uXXXX` escape sequence left behind by the upstream
/// export's double escaping.
static UNICODE_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("escape regex"));

/// Decode literal `\uXXXX` sequences back to their characters.
///
/// Surrogate pairs are decoded together. Anything undecodable (a lone
/// surrogate, an invalid code point) passes through unchanged; this pass
/// never fails. Must run before keyword extraction, since keyword
/// boundaries are text-offset sensitive.
pub fn unescape_literal(text: &str) -> String {
    if !text.contains("\\u") {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(caps) = UNICODE_ESCAPE_RE.captures(rest) {
        let m = caps.get(0).expect("whole match");
        out.push_str(&rest[..m.start()]);
        let unit = u32::from_str_radix(&caps[1], 16).expect("four hex digits");

        if (0xD800..0xDC00).contains(&unit) {
            // High surrogate: only valid together with an immediately
            // following low surrogate.
            let tail = &rest[m.end()..];
            if let Some((low, low_end)) = leading_escape(tail) {
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(c) = char::from_u32(combined) {
                        out.push(c);
                        rest = &tail[low_end..];
                        continue;
                    }
                }
            }
            out.push_str(m.as_str());
            rest = &rest[m.end()..];
            continue;
        }

        match char::from_u32(unit) {
            Some(c) => out.push(c),
            None => out.push_str(m.as_str()),
        }
        rest = &rest[m.end()..];
    }
    out.push_str(rest);
    out
}

/// Parse a `\uXXXX` escape at the very start of `text`, returning its code
/// unit and end offset.
fn leading_escape(text: &str) -> Option<(u32, usize)> {
    let caps = UNICODE_ESCAPE_RE.captures(text)?;
    let m = caps.get(0).expect("whole match");
    if m.start() != 0 {
        return None;
    }
    let unit = u32::from_str_radix(&caps[1], 16).expect("four hex digits");
    Some((unit, m.end()))
}

// ---------------------------------------------------------------------------
// Pass 5: Line-break tags to newlines
// ---------------------------------------------------------------------------

/// Matches a line-break tag anywhere in the text.
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br[^>]*>").expect("br regex"));

/// Replace each preserved line-break tag with a plain newline.
///
/// Runs after [`strip_markup`] in the parser's final cleanup, turning the
/// markers that pass kept verbatim into real line breaks.
pub fn breaks_to_newlines(text: &str) -> String {
    BR_RE.replace_all(text, "\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: Trim
// ---------------------------------------------------------------------------

/// Remove leading and trailing whitespace.
pub fn trim(text: &str) -> String {
    text.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markup_removes_tags_keeps_text() {
        let input = "<p>Some <em>emphasized</em> text</p>";
        assert_eq!(strip_markup(input), "Some emphasized text");
    }

    #[test]
    fn strip_markup_preserves_line_breaks() {
        let input = "line one<br>line two<br/>line three<br />end";
        let result = strip_markup(input);
        assert_eq!(result, input);
    }

    #[test]
    fn strip_markup_counts_line_breaks_exactly() {
        let input = "<p>a</p><br><div>b</div><br/><span>c</span>";
        let result = strip_markup(input);
        let brs_before = BR_RE.find_iter(input).count();
        let brs_after = BR_RE.find_iter(&result).count();
        assert_eq!(brs_before, brs_after);
        assert_eq!(result, "a<br>b<br/>c");
    }

    #[test]
    fn strip_markup_is_idempotent() {
        let input = "<p>Keywords: Ninjutsu</p><br><h2>Header</h2> stray < chars > here";
        let once = strip_markup(input);
        let twice = strip_markup(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn strip_first_block_removes_only_first() {
        let input = "<p>first</p><p>second</p>";
        assert_eq!(strip_first_block(input), "<p>second</p>");
    }

    #[test]
    fn strip_first_block_spans_newlines() {
        let input = "<p>first\nstill first</p>rest";
        assert_eq!(strip_first_block(input), "rest");
    }

    #[test]
    fn strip_first_block_no_block_is_noop() {
        let input = "no paragraphs here";
        assert_eq!(strip_first_block(input), input);
    }

    #[test]
    fn normalize_bullets_replaces_glyph() {
        assert_eq!(normalize_bullets("• item"), "- item");
    }

    #[test]
    fn unescape_literal_decodes_bmp_chars() {
        assert_eq!(unescape_literal(r"caf\u00e9"), "café");
        assert_eq!(unescape_literal(r"\u4e2d\u6587"), "中文");
    }

    #[test]
    fn unescape_literal_decodes_surrogate_pairs() {
        assert_eq!(unescape_literal(r"\ud83d\udd25 blazing"), "🔥 blazing");
    }

    #[test]
    fn unescape_literal_passes_lone_surrogate_through() {
        assert_eq!(unescape_literal(r"bad \ud83d seq"), r"bad \ud83d seq");
    }

    #[test]
    fn unescape_literal_plain_text_unchanged() {
        assert_eq!(unescape_literal("nothing escaped"), "nothing escaped");
    }

    #[test]
    fn breaks_to_newlines_handles_variants() {
        assert_eq!(breaks_to_newlines("a<br>b<br/>c<BR />d"), "a\nb\nc\nd");
    }

    #[test]
    fn trim_strips_surrounding_whitespace() {
        assert_eq!(trim("  body  \n"), "body");
    }
}
