//! Shared data model for morphology compaction of a poem corpus.
//!
//! The input side is a list of [`Document`]s (an id plus optional raw lines).
//! The output side is a [`LemmaTable`] holding every distinct [`Analysis`] of
//! every word, and a [`CompactCorpus`] in which each token occurrence is a
//! [`Reference`] keyed by its surface word.
//!
//! Anything that can produce analyses for a word implements [`Analyzer`],
//! including plain closures:
//!
//! ```rust
//! use morph_types::{Analysis, Analyzer, AnalyzerError};
//!
//! let stub = |word: &str| -> Result<Vec<Analysis>, AnalyzerError> {
//!     Ok(vec![Analysis::new(word, word.to_lowercase(), Some("NOUN"), "NOUN,anim")])
//! };
//! let analyses = stub.analyze("Кот").unwrap();
//! assert_eq!(analyses[0].normal_form, "кот");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One candidate grammatical interpretation of a surface word.
///
/// Equality and hashing cover all four fields, which is what deduplication
/// relies on.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Analysis {
    pub word: String,
    pub normal_form: String,
    pub pos: Option<String>,
    pub grammeme: String,
}

impl Analysis {
    pub fn new(
        word: impl Into<String>,
        normal_form: impl Into<String>,
        pos: Option<&str>,
        grammeme: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            normal_form: normal_form.into(),
            pos: pos.map(str::to_owned),
            grammeme: grammeme.into(),
        }
    }
}

/// Document identifier as supplied by the input: any JSON scalar.
///
/// Rendered as a map key the way JSON writers render keys: integers as-is,
/// floats always with a fractional part (`1.0`), booleans as `true`/`false`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Int(n) => write!(f, "{n}"),
            DocumentId::UInt(n) => write!(f, "{n}"),
            DocumentId::Float(x) => write!(f, "{x:?}"),
            DocumentId::Bool(b) => write!(f, "{b}"),
            DocumentId::Text(s) => f.write_str(s),
        }
    }
}

/// A poem: identifier plus raw lines. Fields other than `id` and `lines` are
/// ignored on input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
}

impl Document {
    /// Lines to process, or `None` when the document has no `lines` field.
    pub fn lines(&self) -> Option<&[String]> {
        self.lines.as_deref()
    }
}

/// Stand-in for one token occurrence, serialized as `{"ref": word}`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "ref")]
    pub word: String,
}

impl Reference {
    pub fn new(word: impl Into<String>) -> Self {
        Self { word: word.into() }
    }
}

/// One compacted line: references in token order.
pub type CompactLine = Vec<Reference>;

/// Deduplicated mapping from surface word to its distinct analyses.
///
/// Keys serialize in sorted order. Analyses keep the order in which they were
/// first seen, which is not part of any contract.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LemmaTable {
    entries: BTreeMap<String, Vec<Analysis>>,
}

impl LemmaTable {
    pub fn get(&self, word: &str) -> Option<&[Analysis]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total analyses across all words.
    pub fn analysis_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Analysis])> + '_ {
        self.entries
            .iter()
            .map(|(word, analyses)| (word.as_str(), analyses.as_slice()))
    }
}

impl FromIterator<(String, Vec<Analysis>)> for LemmaTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Analysis>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Corpus rewritten as references: document id (as a string) to lines.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactCorpus {
    documents: BTreeMap<String, Vec<CompactLine>>,
}

impl CompactCorpus {
    /// Insert a document's compacted lines, replacing any earlier entry with
    /// the same id.
    pub fn insert(&mut self, id: &DocumentId, lines: Vec<CompactLine>) {
        self.documents.insert(id.to_string(), lines);
    }

    pub fn get(&self, id: &str) -> Option<&[CompactLine]> {
        self.documents.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CompactLine])> + '_ {
        self.documents
            .iter()
            .map(|(id, lines)| (id.as_str(), lines.as_slice()))
    }

    /// Every reference in document, line and token order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.documents.values().flatten().flatten()
    }
}

/// Failure reported by an [`Analyzer`] for a single word.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("analyzer failed on {word:?}: {message}")]
pub struct AnalyzerError {
    pub word: String,
    pub message: String,
}

impl AnalyzerError {
    pub fn new(word: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            message: message.into(),
        }
    }
}

/// Source of morphological analyses for a surface word.
///
/// Returning an empty vector means the word is known to have no analyses;
/// returning an error aborts whatever run requested it.
pub trait Analyzer {
    fn analyze(&self, word: &str) -> Result<Vec<Analysis>, AnalyzerError>;
}

impl<F> Analyzer for F
where
    F: Fn(&str) -> Result<Vec<Analysis>, AnalyzerError>,
{
    fn analyze(&self, word: &str) -> Result<Vec<Analysis>, AnalyzerError> {
        self(word)
    }
}
