//! Dictionary-backed morphological analyzer.
//!
//! A [`Lexicon`] is loaded from a tab-separated dictionary with one analysis
//! per line:
//!
//! ```text
//! # surface   normal_form   pos    grammeme
//! коты        кот           NOUN   NOUN,anim,masc plur,nomn
//! и           и             CONJ   CONJ
//! ```
//!
//! Lookups are case-insensitive; every returned [`Analysis`] carries the
//! query's original surface text in `word`.
//!
//! # How it works
//! 1. Lowercase the query and look it up.
//! 2. Dictionary hits are returned in file order.
//! 3. Misses are handled by the [`UnknownWords`] policy: nothing, or a single
//!    tagged guess (`NUMB,intg`, `LATN`, `UNKN`) with no part of speech.
//!
//! Wrap a lexicon in [`CachedAnalyzer`] to memoize lookups for one run.
//!
//! # Example
//! ```no_run
//! use morph_lexicon::{Lexicon, UnknownWords};
//! use morph_types::Analyzer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = Lexicon::load("dict/lexicon.tsv")?.with_unknown_words(UnknownWords::Tag);
//! for analysis in lexicon.analyze("Коты")? {
//!     println!("{} -> {} [{}]", analysis.word, analysis.normal_form, analysis.grammeme);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p morph-lexicon --example lookup -- <lexicon.tsv> <word>...`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use morph_types::{Analysis, Analyzer, AnalyzerError};

/// What to return for words missing from the dictionary.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UnknownWords {
    /// No analyses at all.
    Empty,
    /// One guess with no part of speech and a coarse grammeme.
    #[default]
    Tag,
}

impl UnknownWords {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "empty" => Some(UnknownWords::Empty),
            "tag" => Some(UnknownWords::Tag),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct Entry {
    normal_form: String,
    pos: Option<String>,
    grammeme: String,
}

/// In-memory morphological dictionary keyed by lowercased surface form.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, Vec<Entry>>,
    unknown: UnknownWords,
}

impl Lexicon {
    /// Load a tab-separated dictionary file.
    ///
    /// Blank lines and `#` comments are skipped. A `pos` column of `-` or an
    /// empty string means the analysis has no part of speech.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open lexicon {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut entries: HashMap<String, Vec<Entry>> = HashMap::new();
        let mut seen: HashSet<(String, Entry)> = HashSet::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line =
                line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
            let line = line.trim_end_matches('\r');
            let line = if lineno == 0 { line.trim_start_matches('\u{feff}') } else { line };
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 4 {
                bail!(
                    "{}:{} malformed lexicon line (expected 4 tab-separated fields, got {})",
                    path.display(),
                    lineno + 1,
                    fields.len()
                );
            }
            let surface = normalize(fields[0]);
            if surface.is_empty() {
                bail!("{}:{} empty surface form", path.display(), lineno + 1);
            }
            let pos = match fields[2].trim() {
                "" | "-" => None,
                tag => Some(tag.to_string()),
            };
            let entry = Entry {
                normal_form: fields[1].trim().to_string(),
                pos,
                grammeme: fields[3].trim().to_string(),
            };
            push_unique(entries.entry(surface.clone()).or_default(), &mut seen, surface, entry);
        }

        Ok(Self {
            entries,
            unknown: UnknownWords::default(),
        })
    }

    pub fn with_unknown_words(mut self, unknown: UnknownWords) -> Self {
        self.unknown = unknown;
        self
    }

    /// Number of distinct surface forms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Analyses for `word`; never fails.
    pub fn lookup(&self, word: &str) -> Vec<Analysis> {
        let key = normalize(word);
        match self.entries.get(&key) {
            Some(found) => found
                .iter()
                .map(|entry| Analysis {
                    word: word.to_string(),
                    normal_form: entry.normal_form.clone(),
                    pos: entry.pos.clone(),
                    grammeme: entry.grammeme.clone(),
                })
                .collect(),
            None => match self.unknown {
                UnknownWords::Empty => Vec::new(),
                UnknownWords::Tag => {
                    let tag = guess_tag(&key);
                    vec![Analysis::new(word, key, None, tag)]
                }
            },
        }
    }
}

impl Analyzer for Lexicon {
    fn analyze(&self, word: &str) -> Result<Vec<Analysis>, AnalyzerError> {
        Ok(self.lookup(word))
    }
}

/// Memoizes successful analyses per word; failures pass through uncached.
pub struct CachedAnalyzer<A> {
    inner: A,
    cache: RefCell<HashMap<String, Vec<Analysis>>>,
    hits: Cell<usize>,
}

impl<A: Analyzer> CachedAnalyzer<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
        }
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    /// Number of distinct words cached.
    pub fn cached_words(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: Analyzer> Analyzer for CachedAnalyzer<A> {
    fn analyze(&self, word: &str) -> Result<Vec<Analysis>, AnalyzerError> {
        if let Some(found) = self.cache.borrow().get(word) {
            self.hits.set(self.hits.get() + 1);
            return Ok(found.clone());
        }
        let analyses = self.inner.analyze(word)?;
        self.cache
            .borrow_mut()
            .insert(word.to_string(), analyses.clone());
        Ok(analyses)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn push_unique(
    out: &mut Vec<Entry>,
    seen: &mut HashSet<(String, Entry)>,
    surface: String,
    entry: Entry,
) {
    if seen.insert((surface, entry.clone())) {
        out.push(entry);
    }
}

fn guess_tag(word: &str) -> &'static str {
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
        "NUMB,intg"
    } else if !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()) {
        "LATN"
    } else {
        "UNKN"
    }
}
