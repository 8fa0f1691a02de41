// ABOUTME: Talk catalog for the bitacora site
// ABOUTME: Loads the static, read-only list of talks shown by the carousel

use crate::errors::{BitacoraError, Result};
use crate::utils;
use log::{debug, info};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Dataset shipped with the binary.
const BUNDLED_TALKS: &str = include_str!("../data/charlas.json");

/// 1-based talk identifier, also the name of the talk's image folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TalkId(usize);

impl TalkId {
    /// Identifier of the talk at zero-based position `index`.
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// Parse a folder name such as `"3"`. Zero, non-numbers and padded forms
    /// like `"03"` are rejected, since they name a different folder.
    pub fn parse(folder: &str) -> Option<Self> {
        match folder.parse::<usize>() {
            Ok(n) if n > 0 && n.to_string() == folder => Some(Self(n)),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self.0 - 1
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for TalkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAnswer {
    pub question: String,
    /// Empty when no answer was recorded.
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Talk {
    #[serde(alias = "titulo")]
    pub title: String,

    #[serde(alias = "descripcion")]
    pub description: String,

    #[serde(default, alias = "reflexion", deserialize_with = "lenient_text")]
    pub reflection: Option<String>,

    #[serde(
        default,
        alias = "preguntas",
        alias = "questions",
        deserialize_with = "lenient_questions"
    )]
    pub questions_and_answers: Vec<QuestionAnswer>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub linkedin: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub instagram: Option<String>,

    #[serde(default, alias = "web", deserialize_with = "lenient_text")]
    pub website: Option<String>,
}

impl Talk {
    pub fn has_links(&self) -> bool {
        self.linkedin.is_some() || self.instagram.is_some() || self.website.is_some()
    }
}

/// Anything other than a non-blank string counts as "not available".
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Accepts plain question strings as well as `{question, answer}` objects;
/// entries of any other shape are dropped.
fn lenient_questions<'de, D>(deserializer: D) -> std::result::Result<Vec<QuestionAnswer>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(entries) = value else {
        return Ok(Vec::new());
    };

    Ok(entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(_) => text_of(entry).map(|question| QuestionAnswer {
                question,
                answer: String::new(),
            }),
            Value::Object(map) => {
                let question = map
                    .get("question")
                    .or_else(|| map.get("pregunta"))
                    .and_then(text_of)?;
                let answer = map
                    .get("answer")
                    .or_else(|| map.get("respuesta"))
                    .and_then(text_of)
                    .unwrap_or_default();
                Some(QuestionAnswer { question, answer })
            }
            _ => None,
        })
        .collect())
}

/// The ordered, immutable list of talks.
#[derive(Debug, Clone)]
pub struct Catalog {
    talks: Arc<[Talk]>,
}

impl Catalog {
    /// Load the dataset compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_TALKS)
    }

    /// Load a dataset from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        info!("Loading talks from {:?}", path);
        utils::validate_file_exists(path)?;
        let content = fs::read_to_string(path).map_err(BitacoraError::FileReadError)?;
        Self::from_json_str(&content)
    }

    /// Load the file at `path` when given, otherwise the bundled dataset
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let talks: Vec<Talk> = serde_json::from_str(json)?;
        Self::new(talks)
    }

    pub fn new(talks: Vec<Talk>) -> Result<Self> {
        if talks.is_empty() {
            return Err(BitacoraError::ConfigError(
                "The talk dataset is empty".to_string(),
            ));
        }

        for (index, talk) in talks.iter().enumerate() {
            if talk.questions_and_answers.is_empty() {
                debug!("Talk {} has no questions recorded", TalkId::from_index(index));
            }
        }

        info!("Loaded {} talks", talks.len());
        Ok(Self {
            talks: talks.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.talks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.talks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Talk> {
        self.talks.get(index)
    }

    pub fn talks(&self) -> &[Talk] {
        &self.talks
    }

    pub fn iter(&self) -> impl Iterator<Item = (TalkId, &Talk)> {
        self.talks
            .iter()
            .enumerate()
            .map(|(index, talk)| (TalkId::from_index(index), talk))
    }
}
