use std::time::Instant;

use morph_types::{Analyzer, CompactCorpus, CompactLine, Document, LemmaTable, Reference};
use tracing::{debug, info};

use crate::collector::{CollectError, LemmaCollector};
use crate::compactor::unresolved_references;
use crate::tokenizer::tokenize;

/// Both artifacts of a run plus traversal counters.
#[derive(Debug)]
pub struct Morphology {
    pub lemmas: LemmaTable,
    pub compact: CompactCorpus,
    pub stats: BuildStats,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BuildStats {
    pub documents: usize,
    pub skipped: usize,
    pub lines: usize,
    pub tokens: usize,
}

/// Derive the lemma table and the compact corpus from one traversal.
///
/// Each line is tokenized once; every token both feeds the collector and
/// becomes a reference. Analyzer calls happen in the same order and number as
/// with [`collect`](crate::collect) followed by [`compact`](crate::compact),
/// so the outputs are identical.
pub fn build<A>(corpus: &[Document], analyzer: &A) -> Result<Morphology, CollectError>
where
    A: Analyzer + ?Sized,
{
    let start = Instant::now();
    let mut collector = LemmaCollector::new();
    let mut compact = CompactCorpus::default();
    let mut stats = BuildStats::default();

    for doc in corpus {
        let Some(lines) = doc.lines() else {
            debug!("skipping document {} without lines", doc.id);
            stats.skipped += 1;
            continue;
        };
        stats.documents += 1;

        let mut compact_lines: Vec<CompactLine> = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            let mut refs = Vec::new();
            for token in tokenize(line) {
                collector
                    .add_occurrence(token.text, analyzer)
                    .map_err(|source| CollectError::Analyzer {
                        document: doc.id.to_string(),
                        line: idx + 1,
                        source,
                    })?;
                refs.push(Reference::new(token.text));
            }
            stats.tokens += refs.len();
            compact_lines.push(refs);
        }
        stats.lines += lines.len();
        compact.insert(&doc.id, compact_lines);
    }

    let lemmas = collector.finish();
    debug_assert!(
        unresolved_references(&compact, &lemmas).is_empty(),
        "compact corpus references words missing from the lemma table"
    );
    info!(
        "processed {} documents ({} skipped), {} lines, {} tokens in {} ms",
        stats.documents,
        stats.skipped,
        stats.lines,
        stats.tokens,
        start.elapsed().as_millis()
    );
    info!(
        "lemma table: {} words, {} analyses",
        lemmas.len(),
        lemmas.analysis_count()
    );

    Ok(Morphology {
        lemmas,
        compact,
        stats,
    })
}
