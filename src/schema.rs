//! Structural contract for the three generated study artifacts.
//!
//! Model output is only trusted once the *whole* collection passes the
//! embedded JSON Schema for its kind. Defaults for optional fields are
//! filled in by serde afterwards, so the typed values are always complete.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{GenerationError, SchemaError, Violation};

static SCHEMA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/schemas");

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "title_case")]
pub enum ArtifactKind {
    Flashcards,
    Quiz,
    MatchingGame,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Flashcards,
        ArtifactKind::Quiz,
        ArtifactKind::MatchingGame,
    ];

    /// Exact number of items a valid collection of this kind holds
    pub fn expected_len(&self) -> usize {
        match self {
            ArtifactKind::Flashcards => 10,
            ArtifactKind::Quiz => 4,
            ArtifactKind::MatchingGame => 8,
        }
    }

    fn schema_filename(&self) -> &'static str {
        match self {
            ArtifactKind::Flashcards => "flashcards.schema.json",
            ArtifactKind::Quiz => "quiz.schema.json",
            ArtifactKind::MatchingGame => "matching-game.schema.json",
        }
    }

    /// Raw JSON Schema text, also handed to the model as the output contract
    pub fn schema_text(&self) -> Option<&'static str> {
        SCHEMA_DIR
            .get_file(self.schema_filename())
            .and_then(|f| f.contents_utf8())
    }

    /// Cycle used by the upload form
    pub fn next(&self) -> Self {
        match self {
            ArtifactKind::Flashcards => ArtifactKind::Quiz,
            ArtifactKind::Quiz => ArtifactKind::MatchingGame,
            ArtifactKind::MatchingGame => ArtifactKind::Flashcards,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    pub fn index(&self) -> usize {
        match self {
            AnswerKey::A => 0,
            AnswerKey::B => 1,
            AnswerKey::C => 2,
            AnswerKey::D => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn letter(&self) -> char {
        (b'A' + self.index() as u8) as char
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    New,
    Learning,
    Reviewing,
    Mastered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub answer: AnswerKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, deserialize_with = "whole_number")]
    pub times_reviewed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confidence_level: Confidence,
    #[serde(default)]
    pub status: CardStatus,
}

impl Flashcard {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            difficulty: Difficulty::default(),
            times_reviewed: 0,
            last_reviewed: None,
            confidence_level: Confidence::default(),
            status: CardStatus::default(),
        }
    }
}

/// Schema `integer` admits `3.0`, so accept any float with no fractional part
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = f64::deserialize(deserializer)?;
    if n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n) {
        Ok(n as u32)
    } else {
        Err(de::Error::custom(format!("{n} is not a whole review count")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub left_item: String,
    pub right_item: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Pair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left_item: left.into(),
            right_item: right.into(),
            difficulty: Difficulty::default(),
        }
    }
}

/// A validated, complete collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Flashcards(Vec<Flashcard>),
    Quiz(Vec<Question>),
    MatchingGame(Vec<Pair>),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Flashcards(_) => ArtifactKind::Flashcards,
            Artifact::Quiz(_) => ArtifactKind::Quiz,
            Artifact::MatchingGame(_) => ArtifactKind::MatchingGame,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Artifact::Flashcards(cards) => cards.len(),
            Artifact::Quiz(questions) => questions.len(),
            Artifact::MatchingGame(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            Artifact::Flashcards(cards) => serde_json::to_value(cards),
            Artifact::Quiz(questions) => serde_json::to_value(questions),
            Artifact::MatchingGame(pairs) => serde_json::to_value(pairs),
        }
    }
}

/// Validate an assembled collection against the schema for `kind`.
///
/// All violations are collected before returning; nothing is accepted
/// partially.
pub fn validate(kind: ArtifactKind, value: &Value) -> Result<Artifact, SchemaError> {
    let schema = load_schema(kind)?;
    let validator = jsonschema::options()
        .should_validate_formats(true)
        .build(&schema)
        .map_err(|e| single(format!("{kind} schema failed to compile: {e}")))?;

    let violations: Vec<Violation> = validator
        .iter_errors(value)
        .map(|e| Violation::new(e.instance_path.to_string(), e.to_string()))
        .collect();
    if !violations.is_empty() {
        return Err(SchemaError { violations });
    }

    let artifact = match kind {
        ArtifactKind::Flashcards => serde_json::from_value(value.clone()).map(Artifact::Flashcards),
        ArtifactKind::Quiz => serde_json::from_value(value.clone()).map(Artifact::Quiz),
        ArtifactKind::MatchingGame => {
            serde_json::from_value(value.clone()).map(Artifact::MatchingGame)
        }
    };
    artifact.map_err(|e| single(e.to_string()))
}

/// Parse raw model text and validate it
pub fn parse_artifact(kind: ArtifactKind, text: &str) -> Result<Artifact, GenerationError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(validate(kind, &value)?)
}

/// Guess the kind of a saved collection from the keys of its first item
pub fn infer_kind(value: &Value) -> Option<ArtifactKind> {
    let first = value.as_array()?.first()?.as_object()?;
    if first.contains_key("leftItem") {
        Some(ArtifactKind::MatchingGame)
    } else if first.contains_key("question") {
        Some(ArtifactKind::Quiz)
    } else if first.contains_key("term") {
        Some(ArtifactKind::Flashcards)
    } else {
        None
    }
}

/// Load a previously saved collection. It goes through the same validation
/// as freshly generated output.
pub fn read_artifact(path: &Path, kind: Option<ArtifactKind>) -> Result<Artifact, GenerationError> {
    let text = fs::read_to_string(path).map_err(|source| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text)?;
    let kind = kind
        .or_else(|| infer_kind(&value))
        .ok_or_else(|| single(format!("cannot tell what kind of artifact {} holds", path.display())))?;
    Ok(validate(kind, &value)?)
}

pub fn write_artifact(path: &Path, artifact: &Artifact) -> Result<(), GenerationError> {
    let data = serde_json::to_vec_pretty(&artifact.to_json()?)?;
    fs::write(path, data).map_err(|source| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_schema(kind: ArtifactKind) -> Result<Value, SchemaError> {
    let text = kind
        .schema_text()
        .ok_or_else(|| single(format!("no embedded schema for {kind}")))?;
    serde_json::from_str(text).map_err(|e| single(format!("{kind} schema is not JSON: {e}")))
}

fn single(message: String) -> SchemaError {
    SchemaError {
        violations: vec![Violation::new("", message)],
    }
}
