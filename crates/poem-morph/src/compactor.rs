use morph_types::{CompactCorpus, CompactLine, Document, LemmaTable, Reference};
use tracing::{debug, info};

use crate::tokenizer::tokenize;

/// Rewrite one document's lines as references, keeping line and token order.
pub fn compact_lines(lines: &[String]) -> Vec<CompactLine> {
    lines
        .iter()
        .map(|line| tokenize(line).map(|t| Reference::new(t.text)).collect())
        .collect()
}

/// Rewrite the corpus as references into `lemmas`.
///
/// The table is only consulted by a debug assertion: its keys cover every
/// token because it was collected from the same corpus with the same
/// tokenizer.
pub fn compact(corpus: &[Document], lemmas: &LemmaTable) -> CompactCorpus {
    let mut out = CompactCorpus::default();
    let mut references = 0usize;

    for doc in corpus {
        let Some(lines) = doc.lines() else {
            debug!("skipping document {} without lines", doc.id);
            continue;
        };
        let compacted = compact_lines(lines);
        references += compacted.iter().map(Vec::len).sum::<usize>();
        out.insert(&doc.id, compacted);
    }

    debug_assert!(
        unresolved_references(&out, lemmas).is_empty(),
        "compact corpus references words missing from the lemma table"
    );
    info!(
        "compacted {} documents into {} references",
        out.len(),
        references
    );
    out
}

/// Distinct reference keys with no lemma table entry, in first-seen order.
pub fn unresolved_references<'a>(compact: &'a CompactCorpus, lemmas: &LemmaTable) -> Vec<&'a str> {
    let mut missing: Vec<&'a str> = Vec::new();
    for reference in compact.references() {
        let word = reference.word.as_str();
        if !lemmas.contains_word(word) && !missing.contains(&word) {
            missing.push(word);
        }
    }
    missing
}
