//! Core domain types for the Jutsudex library.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// Availability tier of a jutsu, from E (most common) to S (rarest).
///
/// The derived ordering follows declaration order: `E < D < C < B < A < S`,
/// the availability scale. Name-collision precedence in the ingestion
/// store is a separate policy owned by the store itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rank {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Rank {
    /// All ranks in ascending order.
    pub const ALL: [Rank; 6] = [Rank::E, Rank::D, Rank::C, Rank::B, Rank::A, Rank::S];

    /// Parse a rank token extracted from a record name.
    ///
    /// This is the single conversion point from text to [`Rank`]; anything
    /// unrecognized (including the `CF_tempEntity` folder sentinel that
    /// compendium exports embed) returns `None` and the record is skipped.
    pub fn parse(token: &str) -> Option<Rank> {
        match token {
            "E" => Some(Rank::E),
            "D" => Some(Rank::D),
            "C" => Some(Rank::C),
            "B" => Some(Rank::B),
            "A" => Some(Rank::A),
            "S" => Some(Rank::S),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
        };
        write!(f, "{letter}")
    }
}

// ---------------------------------------------------------------------------
// JutsuRecord
// ---------------------------------------------------------------------------

/// A normalized jutsu entry, produced once by the record parser and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JutsuRecord {
    /// Display name with the rank token removed and decoration applied
    /// (e.g. `Fire Release: Great Fireball`).
    pub name: String,
    /// Filesystem-safe variant of the name, derived before decoration so
    /// it never contains the decoration colon.
    pub path_name: String,
    /// Availability tier parsed from the bracketed token in the raw name.
    pub rank: Rank,
    /// Fully sanitized description text (markup stripped, keyword block
    /// excised, line breaks normalized).
    pub description: String,
    /// Refined keywords in extraction order, de-duplicated first-seen.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Coarse discipline derived from the keyword set, if any matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Pass-through activation attribute from the source record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation: Option<ActivationInfo>,
    /// Pass-through compendium icon path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// How a jutsu is activated: action economy, cost, and any extra condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationInfo {
    /// Activation type (`action`, `bonus`, `reaction`, `minute`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Activation cost, usually 1; minutes/hours use larger values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Free-text condition (e.g. "must be in a stance").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

// ---------------------------------------------------------------------------
// RawRecord (input shape)
// ---------------------------------------------------------------------------

/// One raw document from the line-delimited compendium export.
///
/// Every field is optional at the serde layer; the parser validates
/// presence and reports typed failures. The known attribute vocabulary is
/// this fixed set; anything else on the document is ignored, never copied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    /// Display name, expected to end with a bracketed rank token.
    pub name: Option<String>,
    /// Compendium icon path.
    pub img: Option<String>,
    /// Nested system attributes.
    pub system: Option<RawSystem>,
}

/// The `system` sub-document of a raw record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSystem {
    /// Description container; its presence is required by the parser.
    pub description: Option<RawDescription>,
    /// Activation attributes, passed through when present.
    pub activation: Option<RawActivation>,
}

/// The `system.description` container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDescription {
    /// HTML-bearing description text; may be absent or empty.
    pub value: Option<String>,
}

/// The `system.activation` container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActivation {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub cost: Option<f64>,
    pub condition: Option<String>,
}

impl From<&RawActivation> for ActivationInfo {
    fn from(raw: &RawActivation) -> Self {
        Self {
            kind: raw.kind.clone(),
            cost: raw.cost,
            condition: raw.condition.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_ordering_is_e_to_s() {
        assert!(Rank::E < Rank::D);
        assert!(Rank::D < Rank::C);
        assert!(Rank::C < Rank::B);
        assert!(Rank::B < Rank::A);
        assert!(Rank::A < Rank::S);
    }

    #[test]
    fn rank_parse_accepts_all_letters() {
        for rank in Rank::ALL {
            assert_eq!(Rank::parse(&rank.to_string()), Some(rank));
        }
    }

    #[test]
    fn rank_parse_rejects_sentinel_and_garbage() {
        assert_eq!(Rank::parse("CF_tempEntity"), None);
        assert_eq!(Rank::parse(""), None);
        assert_eq!(Rank::parse("F"), None);
        assert_eq!(Rank::parse("e"), None);
    }

    #[test]
    fn raw_record_deserializes_from_export_line() {
        let line = r#"{
            "name": "Fireball [C]",
            "img": "icons/fire.png",
            "type": "jutsu",
            "system": {
                "description": { "value": "<p>Keywords: Ninjutsu</p>" },
                "activation": { "type": "action", "cost": 1, "condition": "" }
            }
        }"#;
        let raw: RawRecord = serde_json::from_str(line).expect("deserialize raw record");
        assert_eq!(raw.name.as_deref(), Some("Fireball [C]"));
        let system = raw.system.expect("system present");
        let activation = system.activation.expect("activation present");
        assert_eq!(activation.kind.as_deref(), Some("action"));
        assert_eq!(activation.cost, Some(1.0));
    }

    #[test]
    fn raw_record_tolerates_missing_fields() {
        let raw: RawRecord = serde_json::from_str("{}").expect("empty document");
        assert!(raw.name.is_none());
        assert!(raw.system.is_none());
    }

    #[test]
    fn record_serialization_skips_empty_optionals() {
        let record = JutsuRecord {
            name: "Cleaver".into(),
            path_name: "Cleaver".into(),
            rank: Rank::D,
            description: "A heavy blade technique.".into(),
            keywords: vec![],
            category: None,
            activation: None,
            img: None,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(!json.contains("keywords"));
        assert!(!json.contains("category"));
        assert!(!json.contains("activation"));
    }
}
