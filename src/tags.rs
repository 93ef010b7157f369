// Safe expect: compiled patterns are static and known-valid.
#![allow(clippy::expect_used)]
//! Tag normalization: decides whether a raw phrase is kept intact or split
//! into atomic tags.
//!
//! The rules run as a strict priority chain; the first matching rule wins.
//! Vocabulary (no-split terms and special-case compounds) is injectable so
//! domain-specific terms can be extended without touching the logic.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static STANDALONE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^20\d{2}$").expect("valid regex"));
static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)(20\d{2})$").expect("valid regex"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));

/// Injectable normalization vocabulary.
///
/// `Default` carries the reference vocabulary for the sample corpus (sports
/// and entertainment tags); callers with a different domain supply their own.
#[derive(Debug, Clone)]
pub struct TagRules {
    /// Terms kept intact verbatim: abbreviations, brand names, proper nouns.
    pub no_split: HashSet<String>,
    /// Known compounds with an explicit pre-defined split.
    pub special_cases: HashMap<String, Vec<String>>,
}

impl TagRules {
    #[must_use]
    pub fn new(no_split: HashSet<String>, special_cases: HashMap<String, Vec<String>>) -> Self {
        Self {
            no_split,
            special_cases,
        }
    }

    /// Normalize one raw tag phrase into zero or more atomic tags.
    ///
    /// Priority chain, each rule short-circuiting:
    /// 1. no-split allow-list match → returned unchanged;
    /// 2. special-case compound → the pre-defined split;
    /// 3. standalone 4-digit year → dropped (years are not tags);
    /// 4. `<word><year>` suffix → fused when `<word>` is allow-listed,
    ///    otherwise `<word>` is normalized recursively and the year is
    ///    re-appended to the first resulting token;
    /// 5. camel-case boundaries split into one space-joined tag. Splitting a
    ///    phrase into *multiple* tags is the translator's phrase-level call,
    ///    not this function's.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        let tag = raw.trim();
        if tag.is_empty() {
            return Vec::new();
        }

        if self.no_split.contains(tag) {
            return vec![tag.to_string()];
        }
        if let Some(split) = self.special_cases.get(tag) {
            return split.clone();
        }
        if STANDALONE_YEAR.is_match(tag) {
            return Vec::new();
        }
        if let Some(caps) = TRAILING_YEAR.captures(tag) {
            let word = &caps[1];
            let year = &caps[2];
            if self.no_split.contains(word) {
                return vec![format!("{word} {year}")];
            }
            let normalized = self.normalize(word);
            return match normalized.first() {
                Some(first) => vec![format!("{first} {year}")],
                None => vec![format!("{word} {year}")],
            };
        }

        let spaced = CAMEL_BOUNDARY.replace_all(tag, "$1 $2");
        let result = spaced.trim();
        if result.is_empty() {
            Vec::new()
        } else {
            vec![result.to_string()]
        }
    }
}

impl Default for TagRules {
    fn default() -> Self {
        let no_split = [
            "BallonDor",
            "RCB",
            "DRS",
            "IPL",
            "CSK",
            "MI",
            "RR",
            "SRH",
            "KKR",
            "GT",
            "LSG",
            "DC",
            "PBKS",
            "Barcelona",
            "Pickleball",
            "Chattogram",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let special_cases = [
            ("IPLInjuries", vec!["IPL", "injuries"]),
            ("IPLRecords", vec!["IPL", "records"]),
            ("CricketForm", vec!["cricket", "form"]),
            ("CricketHealth", vec!["cricket", "health"]),
            ("SportsPolitics", vec!["sports", "politics"]),
            ("IndiaSports", vec!["India", "sports"]),
            ("CelebrityNews", vec!["celebrity", "news"]),
            ("BangladeshCricket", vec!["Bangladesh", "cricket"]),
            ("IPLHistory", vec!["IPL", "history"]),
            // Team-vs-team fixtures split into the two teams.
            ("RRvsMI", vec!["RR", "MI"]),
        ]
        .into_iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();

        Self {
            no_split,
            special_cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> TagRules {
        TagRules::default()
    }

    #[test]
    fn allow_listed_term_is_unchanged() {
        assert_eq!(rules().normalize("RCB"), vec!["RCB"]);
    }

    #[test]
    fn special_case_compound_uses_predefined_split() {
        assert_eq!(rules().normalize("IPLInjuries"), vec!["IPL", "injuries"]);
    }

    #[test]
    fn camel_case_name_is_spaced() {
        assert_eq!(rules().normalize("RohitSharma"), vec!["Rohit Sharma"]);
    }

    #[test]
    fn standalone_year_is_dropped() {
        assert!(rules().normalize("2024").is_empty());
    }

    #[test]
    fn allow_listed_event_keeps_year_fused() {
        assert_eq!(rules().normalize("IPL2025"), vec!["IPL 2025"]);
    }

    #[test]
    fn trailing_year_recurses_into_event_name() {
        assert_eq!(
            rules().normalize("RohitSharma2024"),
            vec!["Rohit Sharma 2024"]
        );
    }

    #[test]
    fn fixture_compound_splits_into_teams() {
        assert_eq!(rules().normalize("RRvsMI"), vec!["RR", "MI"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let rules = rules();
        let once = rules.normalize("RohitSharma");
        let twice: Vec<String> = once.iter().flat_map(|t| rules.normalize(t)).collect();
        assert_eq!(once, twice);

        let allow = rules.normalize("RCB");
        let allow_again: Vec<String> = allow.iter().flat_map(|t| rules.normalize(t)).collect();
        assert_eq!(allow, allow_again);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(rules().normalize("").is_empty());
        assert!(rules().normalize("   ").is_empty());
    }

    #[test]
    fn custom_vocabulary_is_injectable() {
        let mut no_split = HashSet::new();
        no_split.insert("WorldCup".to_string());
        let rules = TagRules::new(no_split, HashMap::new());
        assert_eq!(rules.normalize("WorldCup2022"), vec!["WorldCup 2022"]);
    }
}
