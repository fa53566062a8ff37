//! Benchmark language registry and clip identifiers
//!
//! The harness covers four languages of varying resource level. Locally
//! held clips are named `{code}{sequence:04}` (e.g. `mn0012.mp3`), and
//! recovered reference files reuse the same stem with a `.txt` extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the four benchmark languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Mongolian (low resource)
    #[serde(rename = "mn")]
    Mongolian,
    /// Hungarian (mid resource)
    #[serde(rename = "hu")]
    Hungarian,
    /// Spanish (high resource)
    #[serde(rename = "es")]
    Spanish,
    /// French (high resource)
    #[serde(rename = "fr")]
    French,
}

impl Language {
    /// All benchmark languages, in fixed registry order
    pub const ALL: [Language; 4] = [
        Language::Mongolian,
        Language::Hungarian,
        Language::Spanish,
        Language::French,
    ];

    /// Two-letter ISO 639-1 code used in file stems
    pub fn code(&self) -> &'static str {
        match self {
            Language::Mongolian => "mn",
            Language::Hungarian => "hu",
            Language::Spanish => "es",
            Language::French => "fr",
        }
    }

    /// Human-readable English name
    pub fn name(&self) -> &'static str {
        match self {
            Language::Mongolian => "Mongolian",
            Language::Hungarian => "Hungarian",
            Language::Spanish => "Spanish",
            Language::French => "French",
        }
    }

    /// Parse a two-letter language code
    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "mn" => Some(Language::Mongolian),
            "hu" => Some(Language::Hungarian),
            "es" => Some(Language::Spanish),
            "fr" => Some(Language::French),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(&s.to_ascii_lowercase())
            .ok_or_else(|| Error::InvalidInput(format!("unknown language code: {}", s)))
    }
}

/// Identity of a locally held clip: language plus sequence index
///
/// Clip stems are the language code followed by a zero-padded sequence
/// number (`hu0007`). Sequence numbers above 9999 widen past four digits
/// rather than truncating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId {
    pub language: Language,
    pub sequence: u32,
}

impl ClipId {
    pub fn new(language: Language, sequence: u32) -> Self {
        ClipId { language, sequence }
    }

    /// File stem for this clip (`mn0012`)
    pub fn stem(&self) -> String {
        format!("{}{:04}", self.language.code(), self.sequence)
    }

    /// Reference transcript filename for this clip (`mn0012.txt`)
    pub fn reference_filename(&self) -> String {
        format!("{}{:04}.txt", self.language.code(), self.sequence)
    }

    /// Parse a file stem of the form `{code}{digits}`
    ///
    /// Returns `None` for stems that do not start with a known language
    /// code or whose remainder is not a decimal sequence number.
    pub fn parse_stem(stem: &str) -> Option<ClipId> {
        // get() rather than split_at: stems are untrusted file names and
        // byte index 2 may not be a char boundary
        let code = stem.get(..2)?;
        let digits = stem.get(2..)?;
        let language = Language::from_code(code)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let sequence = digits.parse::<u32>().ok()?;
        Some(ClipId { language, sequence })
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.language.code(), self.sequence)
    }
}
