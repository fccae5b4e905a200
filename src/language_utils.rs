/*!
 * Language utilities for ISO language code handling.
 *
 * This module provides the `LanguageDirection` type used to tag every
 * translation request and job with its source/target language pair, plus
 * validation helpers built on ISO 639-1 codes.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};

/// Validate that a language code is a known ISO 639-1 (2-letter) code
pub fn validate_language_code(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    if normalized.len() == 2 && Language::from_639_1(&normalized).is_some() {
        return Ok(normalized);
    }
    Err(anyhow!("Invalid language code: {}", code))
}

/// Get the English name of a language from its ISO 639-1 code
pub fn get_language_name(code: &str) -> Option<&'static str> {
    Language::from_639_1(&code.trim().to_lowercase()).map(|lang| lang.to_name())
}

/// A source/target language pair identifying one translation direction.
///
/// Every job dispatched to the decoder carries exactly one direction, and
/// all splits grouped into a job share it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageDirection {
    /// Source language code (ISO 639-1)
    pub source: String,

    /// Target language code (ISO 639-1)
    pub target: String,
}

impl LanguageDirection {
    /// Create a new direction, validating both codes
    pub fn new(source: &str, target: &str) -> Result<Self> {
        let source = validate_language_code(source)?;
        let target = validate_language_code(target)?;
        if source == target {
            return Err(anyhow!(
                "Source and target language must differ: {} > {}",
                source,
                target
            ));
        }
        Ok(Self { source, target })
    }

    /// Create a direction without validating the codes.
    ///
    /// Intended for internal plumbing where the codes were validated at the
    /// intake boundary.
    pub fn unchecked(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

impl fmt::Display for LanguageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.source, self.target)
    }
}

impl FromStr for LanguageDirection {
    type Err = anyhow::Error;

    /// Parse a direction from the `source>target` form (e.g. `en>fr`)
    fn from_str(s: &str) -> Result<Self> {
        let (source, target) = s
            .split_once('>')
            .ok_or_else(|| anyhow!("Invalid language direction: {} (expected 'src>tgt')", s))?;
        Self::new(source, target)
    }
}
