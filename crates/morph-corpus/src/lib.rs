//! Read poem corpora and persist morphology artifacts.
//!
//! The corpus is a JSON array of documents (`{"id": .., "lines": [..]}`).
//! Callers choose between memory-mapping the file or reading it into an owned
//! buffer at runtime via [`LoadMode`]; either way the bytes are parsed once
//! with `serde_json`.
//!
//! Artifacts are written as pretty JSON with non-ASCII text kept verbatim.
//! [`write_artifacts`] serializes both outputs before touching the
//! filesystem, so a serialization failure never leaves one file behind.
//!
//! # Example
//! ```no_run
//! use morph_corpus::{LoadMode, load_corpus};
//!
//! # fn main() -> anyhow::Result<()> {
//! let docs = load_corpus("public/poems_minimal.json", LoadMode::Mmap)?;
//! let with_lines = docs.iter().filter(|d| d.lines().is_some()).count();
//! println!("{} documents, {} with lines", docs.len(), with_lines);
//! # Ok(()) }
//! ```

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use morph_types::{CompactCorpus, Document, LemmaTable};
use serde::de::DeserializeOwned;

/// Strategy for reading input files.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy).
    #[default]
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Load the corpus: a JSON array of documents.
pub fn load_corpus(path: impl AsRef<Path>, mode: LoadMode) -> Result<Vec<Document>> {
    load_json(path.as_ref(), mode)
}

/// Read a lemma table artifact back from disk.
pub fn load_lemmas(path: impl AsRef<Path>, mode: LoadMode) -> Result<LemmaTable> {
    load_json(path.as_ref(), mode)
}

/// Read a compact corpus artifact back from disk.
pub fn load_compact(path: impl AsRef<Path>, mode: LoadMode) -> Result<CompactCorpus> {
    load_json(path.as_ref(), mode)
}

/// Write both artifacts as pretty JSON, creating parent directories.
pub fn write_artifacts(
    lemmas_path: impl AsRef<Path>,
    lemmas: &LemmaTable,
    compact_path: impl AsRef<Path>,
    compact: &CompactCorpus,
) -> Result<()> {
    let lemmas_path = lemmas_path.as_ref();
    let compact_path = compact_path.as_ref();

    let lemma_bytes = serde_json::to_vec_pretty(lemmas).context("serialize lemma table")?;
    let compact_bytes = serde_json::to_vec_pretty(compact).context("serialize compact corpus")?;

    write_file(lemmas_path, &lemma_bytes)?;
    write_file(compact_path, &compact_bytes)?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path, mode: LoadMode) -> Result<T> {
    let buffer = load_file(path, mode)?;
    serde_json::from_slice(buffer.as_slice())
        .with_context(|| format!("parse JSON in {}", path.display()))
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            // SAFETY: read-only mapping, dropped as soon as parsing returns.
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}
