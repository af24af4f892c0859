use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use morph_types::{Analysis, Analyzer, AnalyzerError, Document, LemmaTable};
use thiserror::Error;
use tracing::{debug, info};

use crate::tokenizer::tokenize;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("analysis failed in document {document}, line {line}")]
    Analyzer {
        document: String,
        line: usize,
        source: AnalyzerError,
    },
}

/// Accumulates the distinct analyses of every word it is fed.
///
/// Duplicates are detected structurally: two analyses collapse when all four
/// fields are equal, whichever occurrence produced them.
#[derive(Debug, Default)]
pub struct LemmaCollector {
    entries: BTreeMap<String, WordEntry>,
    occurrences: usize,
}

#[derive(Debug, Default)]
struct WordEntry {
    analyses: Vec<Analysis>,
    seen: HashSet<Analysis>,
}

impl LemmaCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze one occurrence of `word` and merge the result.
    ///
    /// The word gets a table entry even when the analyzer returns nothing.
    /// Returns how many previously unseen analyses were added.
    pub fn add_occurrence<A>(&mut self, word: &str, analyzer: &A) -> Result<usize, AnalyzerError>
    where
        A: Analyzer + ?Sized,
    {
        let analyses = analyzer.analyze(word)?;
        self.occurrences += 1;

        let entry = self.entries.entry(word.to_string()).or_default();
        let mut added = 0;
        for analysis in analyses {
            if entry.seen.insert(analysis.clone()) {
                entry.analyses.push(analysis);
                added += 1;
            }
        }
        Ok(added)
    }

    /// Token occurrences processed so far.
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Distinct words seen so far.
    pub fn word_count(&self) -> usize {
        self.entries.len()
    }

    pub fn finish(self) -> LemmaTable {
        self.entries
            .into_iter()
            .map(|(word, entry)| (word, entry.analyses))
            .collect()
    }
}

/// Build the lemma table for a corpus: one analyzer call per token occurrence,
/// documents without lines skipped.
pub fn collect<A>(corpus: &[Document], analyzer: &A) -> Result<LemmaTable, CollectError>
where
    A: Analyzer + ?Sized,
{
    let start = Instant::now();
    let mut collector = LemmaCollector::new();

    for doc in corpus {
        let Some(lines) = doc.lines() else {
            debug!("skipping document {} without lines", doc.id);
            continue;
        };
        for (idx, line) in lines.iter().enumerate() {
            for token in tokenize(line) {
                collector
                    .add_occurrence(token.text, analyzer)
                    .map_err(|source| CollectError::Analyzer {
                        document: doc.id.to_string(),
                        line: idx + 1,
                        source,
                    })?;
            }
        }
    }

    let occurrences = collector.occurrences();
    let table = collector.finish();
    info!(
        "collected {} words ({} analyses) from {} tokens in {} ms",
        table.len(),
        table.analysis_count(),
        occurrences,
        start.elapsed().as_millis()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use morph_types::DocumentId;

    fn doc(id: &str, lines: &[&str]) -> Document {
        Document {
            id: DocumentId::Text(id.to_string()),
            lines: Some(lines.iter().map(|l| l.to_string()).collect()),
        }
    }

    fn noun(word: &str) -> Analysis {
        Analysis::new(word, word.to_lowercase(), Some("NOUN"), "NOUN,anim")
    }

    #[test]
    fn duplicate_analyses_from_one_call_collapse() {
        let analyzer =
            |word: &str| -> Result<Vec<Analysis>, AnalyzerError> { Ok(vec![noun(word), noun(word)]) };
        let table = collect(&[doc("p1", &["кот"])], &analyzer).unwrap();
        assert_eq!(table.get("кот").unwrap().len(), 1);
    }

    #[test]
    fn repeated_occurrences_union_distinct_analyses() {
        let calls = RefCell::new(0usize);
        let analyzer = |word: &str| -> Result<Vec<Analysis>, AnalyzerError> {
            *calls.borrow_mut() += 1;
            let n = *calls.borrow();
            // Alternate between two readings to simulate an unstable backend.
            let grammeme = if n % 2 == 0 { "NOUN,inan" } else { "NOUN,anim" };
            Ok(vec![Analysis::new(word, word, Some("NOUN"), grammeme)])
        };
        let table = collect(&[doc("p1", &["мир мир", "мир"])], &analyzer).unwrap();
        assert_eq!(*calls.borrow(), 3);
        let analyses = table.get("мир").unwrap();
        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].grammeme, "NOUN,anim");
        assert_eq!(analyses[1].grammeme, "NOUN,inan");
    }

    #[test]
    fn analyses_differing_only_in_pos_are_distinct() {
        let analyzer = |word: &str| -> Result<Vec<Analysis>, AnalyzerError> {
            Ok(vec![
                Analysis::new(word, word, Some("NOUN"), "X"),
                Analysis::new(word, word, None, "X"),
            ])
        };
        let table = collect(&[doc("p1", &["ох"])], &analyzer).unwrap();
        assert_eq!(table.get("ох").unwrap().len(), 2);
    }

    #[test]
    fn words_without_analyses_keep_an_empty_entry() {
        let analyzer = |_: &str| -> Result<Vec<Analysis>, AnalyzerError> { Ok(Vec::new()) };
        let table = collect(&[doc("p1", &["zzz"])], &analyzer).unwrap();
        assert!(table.contains_word("zzz"));
        assert!(table.get("zzz").unwrap().is_empty());
    }

    #[test]
    fn case_variants_are_separate_keys() {
        let analyzer =
            |word: &str| -> Result<Vec<Analysis>, AnalyzerError> { Ok(vec![noun(word)]) };
        let table = collect(&[doc("p1", &["Кот кот"])], &analyzer).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Кот").unwrap()[0].normal_form, "кот");
    }

    #[test]
    fn skips_documents_without_lines() {
        let analyzer =
            |word: &str| -> Result<Vec<Analysis>, AnalyzerError> { Ok(vec![noun(word)]) };
        let corpus = vec![
            Document {
                id: DocumentId::Int(1),
                lines: None,
            },
            doc("p2", &["дом"]),
        ];
        let table = collect(&corpus, &analyzer).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn analyzer_failure_aborts_with_location() {
        let analyzer = |word: &str| -> Result<Vec<Analysis>, AnalyzerError> {
            if word == "сбой" {
                Err(AnalyzerError::new(word, "dictionary corrupted"))
            } else {
                Ok(vec![noun(word)])
            }
        };
        let err = collect(&[doc("p9", &["всё хорошо", "тут сбой"])], &analyzer).unwrap_err();
        let CollectError::Analyzer {
            document,
            line,
            source,
        } = err;
        assert_eq!(document, "p9");
        assert_eq!(line, 2);
        assert_eq!(source.word, "сбой");
    }

    #[test]
    fn collector_reports_new_analyses() {
        let analyzer =
            |word: &str| -> Result<Vec<Analysis>, AnalyzerError> { Ok(vec![noun(word)]) };
        let mut collector = LemmaCollector::new();
        assert_eq!(collector.add_occurrence("лес", &analyzer).unwrap(), 1);
        assert_eq!(collector.add_occurrence("лес", &analyzer).unwrap(), 0);
        assert_eq!(collector.occurrences(), 2);
        assert_eq!(collector.word_count(), 1);
    }
}
