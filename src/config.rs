//! Runtime settings.
//!
//! Every field has a default, so a settings file only needs the keys it changes.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULT_GENERAL_TERMS: &[&str] = &[
    "air", "carbon", "change", "climate", "data", "effect", "energy", "fire", "food", "fuel",
    "gas", "heat", "ice", "impact", "land", "level", "model", "ocean", "power", "process",
    "rain", "rate", "risk", "sea", "soil", "system", "temperature", "water", "weather", "wind",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Entries handled per `process` invocation.
    pub batch_size: usize,
    /// Single words up to this many characters are general terms.
    pub general_term_max_chars: usize,
    /// Single words that are always general terms (lowercase).
    pub general_terms: Vec<String>,
    pub wikipedia_base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Max options fetched for a disambiguation page.
    pub disambiguation_option_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            general_term_max_chars: 4,
            general_terms: DEFAULT_GENERAL_TERMS.iter().map(|t| t.to_string()).collect(),
            wikipedia_base_url: "https://en.wikipedia.org".to_string(),
            user_agent: format!(
                "{}/{} (encyclopedia builder)",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 20,
            disambiguation_option_limit: 50,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let reader = BufReader::new(File::open(path)?);
        let settings: Settings = serde_json::from_reader(reader)?;
        debug!("loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Settings from `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn is_general_term(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.general_terms.iter().any(|t| *t == lower)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"batch_size": 3, "general_terms": ["Foo"]}}"#).unwrap();
        let settings = Settings::from_path(file.path()).unwrap();
        assert_eq!(settings.batch_size, 3);
        assert_eq!(settings.general_term_max_chars, 4);
        assert_eq!(settings.timeout_secs, 20);
        assert_eq!(settings.general_terms, vec!["Foo".to_string()]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/settings.json"))).is_err());
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn general_terms_case_insensitive() {
        let settings = Settings::default();
        assert!(settings.is_general_term("Energy"));
        assert!(!settings.is_general_term("albedo"));
    }
}
