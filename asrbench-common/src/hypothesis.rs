//! ASR hypothesis lookup
//!
//! Transcription runs store one file per clip stem in a hypothesis
//! directory, either `{stem}.json` (object with a `transcript` field,
//! `text` also accepted) or plain `{stem}.txt`. JSON is preferred when
//! both exist. Both fuzzy reconciliation and accuracy scoring read
//! hypotheses through this store. The returned text is raw; callers
//! normalize it themselves.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Looks up hypothesis transcripts by clip stem
pub struct HypothesisStore {
    dir: PathBuf,
}

impl HypothesisStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HypothesisStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetch the hypothesis for a clip stem, if one is stored
    ///
    /// Returns the trimmed raw text. An empty string is a valid return (the
    /// recognizer produced nothing); `None` means no hypothesis file exists.
    pub fn lookup(&self, stem: &str) -> Option<String> {
        let json_path = self.dir.join(format!("{}.json", stem));
        if json_path.exists() {
            match self.read_json(&json_path) {
                Some(text) => return Some(text),
                None => {
                    debug!(stem, "JSON hypothesis unusable, trying plain text");
                }
            }
        }

        let txt_path = self.dir.join(format!("{}.txt", stem));
        if txt_path.exists() {
            match std::fs::read_to_string(&txt_path) {
                Ok(text) => return Some(text.trim().to_string()),
                Err(e) => {
                    warn!(path = %txt_path.display(), error = %e, "cannot read hypothesis file");
                }
            }
        }

        None
    }

    fn read_json(&self, path: &Path) -> Option<String> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read hypothesis file");
                return None;
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid hypothesis JSON");
                return None;
            }
        };
        value
            .get("transcript")
            .or_else(|| value.get("text"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lookup_json_transcript_field() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join("es0001.json"),
            r#"{"transcript": " hola mundo ", "language": "es"}"#,
        )
        .unwrap();

        let store = HypothesisStore::new(dir.path());
        assert_eq!(store.lookup("es0001").as_deref(), Some("hola mundo"));
    }

    #[test]
    fn test_lookup_json_text_field_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("fr0001.json"), r#"{"text": "bonjour"}"#).unwrap();

        let store = HypothesisStore::new(dir.path());
        assert_eq!(store.lookup("fr0001").as_deref(), Some("bonjour"));
    }

    #[test]
    fn test_lookup_plain_text() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("hu0002.txt"), "jo reggelt\n").unwrap();

        let store = HypothesisStore::new(dir.path());
        assert_eq!(store.lookup("hu0002").as_deref(), Some("jo reggelt"));
    }

    #[test]
    fn test_invalid_json_falls_back_to_text() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("es0002.json"), "{not valid json").unwrap();
        fs::write(dir.path().join("es0002.txt"), "desde el archivo").unwrap();

        let store = HypothesisStore::new(dir.path());
        assert_eq!(store.lookup("es0002").as_deref(), Some("desde el archivo"));
    }

    #[test]
    fn test_json_without_transcript_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("es0003.json"), r#"{"confidence": 0.4}"#).unwrap();
        fs::write(dir.path().join("es0003.txt"), "texto plano").unwrap();

        let store = HypothesisStore::new(dir.path());
        assert_eq!(store.lookup("es0003").as_deref(), Some("texto plano"));
    }

    #[test]
    fn test_missing_hypothesis_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = HypothesisStore::new(dir.path());
        assert_eq!(store.lookup("mn0001"), None);
    }

    #[test]
    fn test_empty_transcript_is_some_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("mn0002.txt"), "   \n").unwrap();

        let store = HypothesisStore::new(dir.path());
        // the recognizer ran and produced nothing, which is not the same
        // as never having run
        assert_eq!(store.lookup("mn0002").as_deref(), Some(""));
    }
}
