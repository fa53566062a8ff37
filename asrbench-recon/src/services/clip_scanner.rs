//! Local clip directory scanning
//!
//! Enumerates the locally held audio clips at run start. A file counts as a
//! clip when its extension is one of the configured audio extensions and
//! its stem parses as `{lang}{seq}` (`hu0007.mp3`). Anything else is
//! skipped. Duplicate stems resolve last-seen-wins in sorted walk order,
//! with a warning per collision.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use asrbench_common::lang::{ClipId, Language};

use crate::types::LocalClip;

/// Errors from clip scanning
#[derive(Debug, Error)]
pub enum ScanError {
    /// Clip directory does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// IO error during traversal
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scans a directory tree for benchmark clips
pub struct ClipScanner {
    extensions: Vec<String>,
    language: Option<Language>,
}

impl ClipScanner {
    /// Create a scanner recognizing the given extensions (case-insensitive),
    /// optionally restricted to one language
    pub fn new(extensions: &[String], language: Option<Language>) -> Self {
        ClipScanner {
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            language,
        }
    }

    /// Scan `dir` recursively and return clips sorted by identity
    ///
    /// The returned order (language registry order, then sequence) is the
    /// order clips are later matched in, which keeps contested-candidate
    /// assignment deterministic across runs.
    pub fn scan(&self, dir: &Path) -> Result<Vec<LocalClip>, ScanError> {
        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let mut clips: BTreeMap<ClipId, LocalClip> = BTreeMap::new();
        let mut unrecognized = 0usize;
        let mut duplicates = 0usize;

        for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if file_name.starts_with('.') {
                continue;
            }

            let extension = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) => ext.to_ascii_lowercase(),
                None => continue,
            };
            if !self.extensions.iter().any(|e| *e == extension) {
                continue;
            }

            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem,
                None => continue,
            };
            let id = match ClipId::parse_stem(stem) {
                Some(id) => id,
                None => {
                    debug!(file = file_name, "audio file stem is not a clip identity");
                    unrecognized += 1;
                    continue;
                }
            };

            if let Some(language) = self.language {
                if id.language != language {
                    continue;
                }
            }

            let clip = LocalClip::new(id, path.to_path_buf());
            if let Some(previous) = clips.insert(id, clip) {
                warn!(
                    stem = %id,
                    replaced = %previous.file_name,
                    "duplicate clip stem, keeping the later file"
                );
                duplicates += 1;
            }
        }

        info!(
            dir = %dir.display(),
            clips = clips.len(),
            unrecognized_stems = unrecognized,
            duplicate_stems = duplicates,
            "clip scan complete"
        );
        Ok(clips.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn extensions() -> Vec<String> {
        vec!["mp3".to_string(), "wav".to_string()]
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"not real audio").unwrap();
    }

    #[test]
    fn test_scan_finds_clips_sorted_by_sequence() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "es0003.mp3");
        touch(dir.path(), "es0001.mp3");
        touch(dir.path(), "es0002.wav");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "cover.jpg");

        let scanner = ClipScanner::new(&extensions(), None);
        let clips = scanner.scan(dir.path()).unwrap();

        let stems: Vec<String> = clips.iter().map(|c| c.id.stem()).collect();
        assert_eq!(stems, vec!["es0001", "es0002", "es0003"]);
    }

    #[test]
    fn test_scan_recurses_into_subdirectories() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("batch2")).unwrap();
        touch(dir.path(), "fr0001.mp3");
        touch(&dir.path().join("batch2"), "fr0002.mp3");

        let scanner = ClipScanner::new(&extensions(), None);
        let clips = scanner.scan(dir.path()).unwrap();
        assert_eq!(clips.len(), 2);
    }

    #[test]
    fn test_scan_skips_unrecognized_stems_and_hidden_files() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "hu0001.mp3");
        touch(dir.path(), "sample.mp3");
        touch(dir.path(), "de0001.mp3");
        touch(dir.path(), ".hu0002.mp3");

        let scanner = ClipScanner::new(&extensions(), None);
        let clips = scanner.scan(dir.path()).unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].id.stem(), "hu0001");
    }

    #[test]
    fn test_duplicate_stem_last_seen_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "mn0001.mp3");
        touch(dir.path(), "mn0001.wav");

        let scanner = ClipScanner::new(&extensions(), None);
        let clips = scanner.scan(dir.path()).unwrap();
        assert_eq!(clips.len(), 1);
        // sorted walk visits mn0001.mp3 before mn0001.wav
        assert_eq!(clips[0].file_name, "mn0001.wav");
    }

    #[test]
    fn test_language_filter() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "es0001.mp3");
        touch(dir.path(), "fr0001.mp3");

        let scanner = ClipScanner::new(&extensions(), Some(Language::French));
        let clips = scanner.scan(dir.path()).unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].id.language, Language::French);
    }

    #[test]
    fn test_missing_dir_is_error() {
        let scanner = ClipScanner::new(&extensions(), None);
        let result = scanner.scan(Path::new("/nonexistent/clips"));
        assert!(matches!(result, Err(ScanError::PathNotFound(_))));
    }

    #[test]
    fn test_file_path_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        touch(dir.path(), "es0001.mp3");
        let scanner = ClipScanner::new(&extensions(), None);
        let result = scanner.scan(&dir.path().join("es0001.mp3"));
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }
}
