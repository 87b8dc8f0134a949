//! Reference table of hijaiyah letters.
//!
//! Every scoring request resolves its letter id against a [`LetterTable`].
//! The table is built once at startup, either from the built-in patterns or
//! from a TOML file, and is validated before the server accepts requests.

mod builtin;

pub use builtin::builtin_patterns;

use crate::analysis::AnalysisError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneticAttribute {
    Voiced,
    Unvoiced,
    PlosiveEcho,
    Plosive,
    Continuant,
}

impl PhoneticAttribute {
    /// Name used in tajweed teaching material.
    pub fn traditional_name(&self) -> &'static str {
        match self {
            PhoneticAttribute::Voiced => "Jahr",
            PhoneticAttribute::Unvoiced => "Hams",
            PhoneticAttribute::PlosiveEcho => "Qalqalah",
            PhoneticAttribute::Plosive => "Syiddah",
            PhoneticAttribute::Continuant => "Rakhawah",
        }
    }
}

/// Inclusive band of acceptable dominant frequencies, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min_hz: f64,
    pub max_hz: f64,
}

impl FrequencyRange {
    pub const fn new(min_hz: f64, max_hz: f64) -> Self {
        Self { min_hz, max_hz }
    }

    pub fn contains(&self, hz: f64) -> bool {
        hz >= self.min_hz && hz <= self.max_hz
    }

    /// Distance in Hz to the nearest bound, zero when inside the band.
    pub fn distance_to(&self, hz: f64) -> f64 {
        if hz < self.min_hz {
            self.min_hz - hz
        } else if hz > self.max_hz {
            hz - self.max_hz
        } else {
            0.0
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_hz + self.max_hz) / 2.0
    }
}

impl std::fmt::Display for FrequencyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} Hz", self.min_hz, self.max_hz)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterPattern {
    pub id: u32,
    pub glyph: String,
    pub latin_name: String,
    /// IPA transcription, used when matching external transcriptions.
    #[serde(default)]
    pub phoneme: String,
    pub frequency_range: FrequencyRange,
    pub expected_duration_ms: f64,
    pub articulation_point: String,
    pub attributes: Vec<PhoneticAttribute>,
    #[serde(default)]
    pub common_errors: Vec<String>,
    #[serde(default)]
    pub remediation_tips: Vec<String>,
}

impl LetterPattern {
    pub fn has_attribute(&self, attribute: PhoneticAttribute) -> bool {
        self.attributes.contains(&attribute)
    }
}

/// Compact view of a letter, attached to feedback and progress rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterInfo {
    pub id: u32,
    pub glyph: String,
    pub latin_name: String,
    pub articulation_point: String,
}

impl From<&LetterPattern> for LetterInfo {
    fn from(pattern: &LetterPattern) -> Self {
        Self {
            id: pattern.id,
            glyph: pattern.glyph.clone(),
            latin_name: pattern.latin_name.clone(),
            articulation_point: pattern.articulation_point.clone(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LetterTableError {
    #[error("Letter table is empty")]
    Empty,

    #[error("Duplicate letter id {0}")]
    DuplicateId(u32),

    #[error("Letter {id}: missing required field '{field}'")]
    MissingField { id: u32, field: &'static str },

    #[error("Letter {id}: frequency range min ({min}) must be lower than max ({max})")]
    InvalidFrequencyRange { id: u32, min: f64, max: f64 },

    #[error("Letter {id}: expected duration must be positive, got {duration}")]
    InvalidDuration { id: u32, duration: f64 },
}

#[derive(Debug, Deserialize)]
struct LetterFile {
    letters: Vec<LetterPattern>,
}

/// Immutable, validated map from letter id to its pattern.
#[derive(Debug, Clone)]
pub struct LetterTable {
    patterns: BTreeMap<u32, LetterPattern>,
}

impl LetterTable {
    pub fn from_patterns(patterns: Vec<LetterPattern>) -> Result<Self, LetterTableError> {
        if patterns.is_empty() {
            return Err(LetterTableError::Empty);
        }

        let mut map = BTreeMap::new();
        for pattern in patterns {
            validate_pattern(&pattern)?;
            let id = pattern.id;
            if map.insert(id, pattern).is_some() {
                return Err(LetterTableError::DuplicateId(id));
            }
        }

        Ok(Self { patterns: map })
    }

    pub fn builtin() -> Result<Self, LetterTableError> {
        Self::from_patterns(builtin_patterns())
    }

    /// Loads a table from a TOML file containing a `[[letters]]` array.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read letters file: {:?}", path))?;
        let file: LetterFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse letters file: {:?}", path))?;
        Self::from_patterns(file.letters)
            .with_context(|| format!("Invalid letters file: {:?}", path))
    }

    pub fn get(&self, id: u32) -> Option<&LetterPattern> {
        self.patterns.get(&id)
    }

    /// Like [`LetterTable::get`], for the scoring path.
    pub fn require(&self, id: u32) -> Result<&LetterPattern, AnalysisError> {
        self.get(id).ok_or(AnalysisError::PatternNotFound(id))
    }

    pub fn info(&self, id: u32) -> Option<LetterInfo> {
        self.get(id).map(LetterInfo::from)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &LetterPattern> {
        self.patterns.values()
    }
}

fn validate_pattern(pattern: &LetterPattern) -> Result<(), LetterTableError> {
    let id = pattern.id;
    let required = [
        ("glyph", &pattern.glyph),
        ("latin_name", &pattern.latin_name),
        ("articulation_point", &pattern.articulation_point),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(LetterTableError::MissingField { id, field });
        }
    }
    if pattern.attributes.is_empty() {
        return Err(LetterTableError::MissingField {
            id,
            field: "attributes",
        });
    }

    let range = pattern.frequency_range;
    if !(range.min_hz < range.max_hz) || range.min_hz < 0.0 {
        return Err(LetterTableError::InvalidFrequencyRange {
            id,
            min: range.min_hz,
            max: range.max_hz,
        });
    }
    if !(pattern.expected_duration_ms > 0.0) {
        return Err(LetterTableError::InvalidDuration {
            id,
            duration: pattern.expected_duration_ms,
        });
    }
    Ok(())
}
