//! Bit-name translation table
//!
//! Posters abbreviate bit names ("HXA" for "Hexa"); the table maps initials
//! to full names. It is loaded from a tab-separated file and injected into
//! the extractor as a plain value; a missing file means no translation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

/// Default translation file name, looked up in the working directory
pub const DEFAULT_TRANSLATIONS_FILE: &str = "InitialsName.txt";

/// Mapping from bit initials to full bit names
#[derive(Debug, Clone, Default)]
pub struct Translations {
    entries: HashMap<String, String>,
}

impl Translations {
    /// The empty mapping; every lookup falls through unchanged
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from (initials, name) pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load the table from a tab-separated file.
    ///
    /// The first line is a header and is skipped; each following line is
    /// `Initials<TAB>Name`. Lines without a tab are ignored. A missing or
    /// unreadable file yields the empty mapping with a warning, never an
    /// error.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Translation file not found at {} ({}); bit names stay abbreviated",
                    path.display(),
                    e
                );
                return Self::empty();
            }
        };

        let mut entries = HashMap::new();
        for line in content.lines().skip(1) {
            let mut parts = line.splitn(2, '\t');
            let (Some(initials), Some(name)) = (parts.next(), parts.next()) else {
                continue;
            };
            let initials = initials.trim();
            let name = name.trim();
            if !initials.is_empty() && !name.is_empty() {
                entries.insert(initials.to_string(), name.to_string());
            }
        }

        info!("Loaded {} bit name translations", entries.len());
        Self { entries }
    }

    /// Translate a bit name, trying an exact match before a
    /// case-insensitive one. Unknown names pass through unchanged.
    pub fn apply(&self, bit: &str) -> String {
        if let Some(name) = self.entries.get(bit) {
            return name.clone();
        }

        for (initials, name) in &self.entries {
            if initials.eq_ignore_ascii_case(bit) {
                return name.clone();
            }
        }

        bit.to_string()
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_apply_exact_match() {
        let t = Translations::from_pairs([("HXA", "Hexa"), ("B", "Ball")]);
        assert_eq!(t.apply("HXA"), "Hexa");
    }

    #[test]
    fn test_apply_case_insensitive_fallback() {
        let t = Translations::from_pairs([("HXA", "Hexa")]);
        assert_eq!(t.apply("hxa"), "Hexa");
    }

    #[test]
    fn test_apply_unknown_passes_through() {
        let t = Translations::from_pairs([("HXA", "Hexa")]);
        assert_eq!(t.apply("GF"), "GF");
    }

    #[test]
    fn test_load_skips_header_and_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Initials\tName").unwrap();
        writeln!(file, "HXA\tHexa").unwrap();
        writeln!(file, "no tab on this line").unwrap();
        writeln!(file, "B\tBall").unwrap();

        let t = Translations::load(file.path());
        assert_eq!(t.len(), 2);
        assert_eq!(t.apply("B"), "Ball");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let t = Translations::load(Path::new("/nonexistent/InitialsName.txt"));
        assert!(t.is_empty());
        assert_eq!(t.apply("HXA"), "HXA");
    }
}
