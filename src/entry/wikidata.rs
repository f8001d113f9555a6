//! Wikidata identifiers.
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A validated Wikidata identifier (`Q42`, `P31`).
///
/// Two entries sharing a [WikidataId] denote the same entity, and that is the only
/// synonym evidence the normalizer accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WikidataId(String);

impl WikidataId {
    /// `true` if `raw` is `Q` or `P` followed by at least one ASCII digit.
    pub fn is_valid(raw: &str) -> bool {
        let mut chars = raw.chars();
        matches!(chars.next(), Some('Q') | Some('P'))
            && raw.len() > 1
            && chars.all(|c| c.is_ascii_digit())
    }

    /// Parse an optional raw attribute value.
    ///
    /// Empty values are absent, invalid ones are logged and treated as absent.
    pub fn parse_lenient(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
        match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(
                    "invalid Wikidata id format: {} (must be Q or P followed by digits)",
                    raw
                );
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wikidata page for this identifier.
    pub fn url(&self) -> String {
        format!("https://www.wikidata.org/wiki/{}", self.0)
    }
}

impl FromStr for WikidataId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::parse("wikidata id", format!("`{}` is not a valid id", s)))
        }
    }
}

impl TryFrom<String> for WikidataId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WikidataId> for String {
    fn from(id: WikidataId) -> Self {
        id.0
    }
}

impl fmt::Display for WikidataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::WikidataId;

    #[test]
    fn valid_ids() {
        assert!(WikidataId::is_valid("Q7942"));
        assert!(WikidataId::is_valid("P31"));
    }

    #[test]
    fn invalid_ids() {
        for raw in ["", "Q", "q7942", "Q79a", "X12", "Q 12", "no_wikidata_id"] {
            assert!(!WikidataId::is_valid(raw), "{raw} should be invalid");
        }
    }

    #[test]
    fn lenient_parse_drops_invalid() {
        assert_eq!(WikidataId::parse_lenient(Some("  ")), None);
        assert_eq!(WikidataId::parse_lenient(Some("Qfoo")), None);
        assert_eq!(
            WikidataId::parse_lenient(Some(" Q42 ")),
            Some("Q42".parse().unwrap())
        );
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<WikidataId>("\"Q1\"").is_ok());
        assert!(serde_json::from_str::<WikidataId>("\"nope\"").is_err());
    }
}
