use morph_types::{Analysis, CompactLine, LemmaTable};

/// Expand compacted lines back into per-token analyses.
///
/// A reference without a table entry resolves to an empty slice.
pub fn resolve_lines<'a>(lines: &'a [CompactLine], lemmas: &'a LemmaTable) -> Vec<Vec<&'a [Analysis]>> {
    lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|r| lemmas.get(&r.word).unwrap_or(&[]))
                .collect()
        })
        .collect()
}

/// The word and analyses at `(line, token)`, both zero-based.
pub fn resolve_token<'a>(
    lines: &'a [CompactLine],
    lemmas: &'a LemmaTable,
    line: usize,
    token: usize,
) -> Option<(&'a str, &'a [Analysis])> {
    let reference = lines.get(line)?.get(token)?;
    let analyses = lemmas.get(&reference.word).unwrap_or(&[]);
    Some((reference.word.as_str(), analyses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_types::Reference;

    #[test]
    fn resolves_each_occurrence_to_its_analyses() {
        let lemmas: LemmaTable = [
            (
                "стали".to_string(),
                vec![
                    Analysis::new("стали", "сталь", Some("NOUN"), "NOUN,inan,femn sing,gent"),
                    Analysis::new("стали", "стать", Some("VERB"), "VERB,perf plur,past"),
                ],
            ),
            ("мы".to_string(), vec![Analysis::new("мы", "мы", Some("NPRO"), "NPRO,1per plur")]),
        ]
        .into_iter()
        .collect();
        let lines = vec![vec![Reference::new("мы"), Reference::new("стали")]];

        let resolved = resolve_lines(&lines, &lemmas);
        assert_eq!(resolved[0][0].len(), 1);
        assert_eq!(resolved[0][1].len(), 2);

        let (word, analyses) = resolve_token(&lines, &lemmas, 0, 1).unwrap();
        assert_eq!(word, "стали");
        assert_eq!(analyses[1].normal_form, "стать");
        assert!(resolve_token(&lines, &lemmas, 0, 2).is_none());
        assert!(resolve_token(&lines, &lemmas, 1, 0).is_none());
    }

    #[test]
    fn unknown_reference_resolves_empty() {
        let lines = vec![vec![Reference::new("нигде")]];
        let empty = LemmaTable::default();
        let resolved = resolve_lines(&lines, &empty);
        assert!(resolved[0][0].is_empty());
    }
}
