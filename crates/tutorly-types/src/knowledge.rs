//! Knowledge levels and the response tiers they select.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// How much a user knows about a subject.
///
/// Totally ordered: `Novice < Intermediate < Advanced < Expert`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum KnowledgeLevel {
    #[default]
    Novice = 1,
    Intermediate = 2,
    Advanced = 3,
    Expert = 4,
}

impl KnowledgeLevel {
    /// The (detail, terminology) pair used to steer the answer style.
    pub fn tier(self) -> KnowledgeTier {
        match self {
            KnowledgeLevel::Novice => KnowledgeTier {
                detail: "thorough and basic",
                terminology: "simple",
            },
            KnowledgeLevel::Intermediate => KnowledgeTier {
                detail: "moderately detailed",
                terminology: "standard",
            },
            KnowledgeLevel::Advanced => KnowledgeTier {
                detail: "concise but comprehensive",
                terminology: "technical",
            },
            KnowledgeLevel::Expert => KnowledgeTier {
                detail: "concise and technical",
                terminology: "advanced technical",
            },
        }
    }

    /// Minimum of a set of levels; `Novice` for an empty set.
    pub fn least<I: IntoIterator<Item = KnowledgeLevel>>(levels: I) -> KnowledgeLevel {
        levels.into_iter().min().unwrap_or_default()
    }
}

impl fmt::Display for KnowledgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnowledgeLevel::Novice => write!(f, "novice"),
            KnowledgeLevel::Intermediate => write!(f, "intermediate"),
            KnowledgeLevel::Advanced => write!(f, "advanced"),
            KnowledgeLevel::Expert => write!(f, "expert"),
        }
    }
}

impl FromStr for KnowledgeLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "novice" => Ok(KnowledgeLevel::Novice),
            "intermediate" => Ok(KnowledgeLevel::Intermediate),
            "advanced" => Ok(KnowledgeLevel::Advanced),
            "expert" => Ok(KnowledgeLevel::Expert),
            other => Err(format!("invalid knowledge level: '{other}'")),
        }
    }
}

/// Detail and terminology wording injected into the tutoring prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeTier {
    pub detail: &'static str,
    pub terminology: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_totally_ordered() {
        assert!(KnowledgeLevel::Novice < KnowledgeLevel::Intermediate);
        assert!(KnowledgeLevel::Intermediate < KnowledgeLevel::Advanced);
        assert!(KnowledgeLevel::Advanced < KnowledgeLevel::Expert);
    }

    #[test]
    fn test_least_picks_minimum() {
        let least = KnowledgeLevel::least([KnowledgeLevel::Expert, KnowledgeLevel::Novice]);
        assert_eq!(least, KnowledgeLevel::Novice);
    }

    #[test]
    fn test_least_of_empty_is_novice() {
        assert_eq!(KnowledgeLevel::least([]), KnowledgeLevel::Novice);
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(KnowledgeLevel::Novice.tier().detail, "thorough and basic");
        assert_eq!(KnowledgeLevel::Novice.tier().terminology, "simple");
        assert_eq!(KnowledgeLevel::Intermediate.tier().terminology, "standard");
        assert_eq!(KnowledgeLevel::Advanced.tier().detail, "concise but comprehensive");
        assert_eq!(KnowledgeLevel::Expert.tier().terminology, "advanced technical");
    }

    #[test]
    fn test_level_roundtrip_and_serde() {
        for level in [
            KnowledgeLevel::Novice,
            KnowledgeLevel::Intermediate,
            KnowledgeLevel::Advanced,
            KnowledgeLevel::Expert,
        ] {
            let parsed: KnowledgeLevel = level.to_string().parse().unwrap();
            assert_eq!(parsed, level);
        }
        let json = serde_json::to_string(&KnowledgeLevel::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
    }
}
