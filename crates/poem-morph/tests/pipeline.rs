use morph_corpus::{LoadMode, load_compact, load_corpus, load_lemmas, write_artifacts};
use morph_lexicon::{CachedAnalyzer, Lexicon, UnknownWords};
use morph_types::{Analysis, AnalyzerError, Document};
use poem_morph::{build, collect, compact, tokenize, unresolved_references};

fn stub(word: &str) -> Result<Vec<Analysis>, AnalyzerError> {
    let analysis = if word == "и" {
        Analysis::new(word, word.to_lowercase(), Some("CONJ"), "CONJ")
    } else {
        Analysis::new(word, word.to_lowercase(), Some("NOUN"), "NOUN,anim")
    };
    Ok(vec![analysis])
}

fn parse(raw: &str) -> Vec<Document> {
    serde_json::from_str(raw).expect("valid corpus")
}

#[test]
fn cat_and_dog_example() {
    let docs = parse(r#"[{"id": "p1", "lines": ["кот и пёс"]}]"#);
    let lemmas = collect(&docs, &stub).unwrap();
    let compacted = compact(&docs, &lemmas);

    assert_eq!(lemmas.len(), 3);
    for word in ["кот", "и", "пёс"] {
        assert_eq!(lemmas.get(word).unwrap().len(), 1, "{word}");
    }
    assert_eq!(lemmas.get("и").unwrap()[0].pos.as_deref(), Some("CONJ"));

    let json = serde_json::to_value(&compacted).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"p1": [[{"ref": "кот"}, {"ref": "и"}, {"ref": "пёс"}]]})
    );
}

#[test]
fn every_reference_resolves_and_order_is_preserved() {
    let docs = parse(
        r#"[
            {"id": 1, "lines": ["Я помню чудное мгновенье:", "Передо мной явилась ты,"]},
            {"id": 2},
            {"id": 3, "lines": ["Как мимолётное виденье,", "Как гений чистой красоты.", "…"]}
        ]"#,
    );
    let out = build(&docs, &stub).unwrap();
    assert!(unresolved_references(&out.compact, &out.lemmas).is_empty());

    for doc in &docs {
        let key = doc.id.to_string();
        let Some(lines) = doc.lines() else {
            assert!(out.compact.get(&key).is_none());
            continue;
        };
        let compacted = out.compact.get(&key).unwrap();
        assert_eq!(compacted.len(), lines.len());
        for (line, refs) in lines.iter().zip(compacted) {
            let expected: Vec<&str> = tokenize(line).map(|t| t.text).collect();
            let actual: Vec<&str> = refs.iter().map(|r| r.word.as_str()).collect();
            assert_eq!(actual, expected);
        }
    }
}

#[test]
fn quirky_analyzer_duplicates_are_dropped() {
    let quirky = |word: &str| -> Result<Vec<Analysis>, AnalyzerError> {
        let same = Analysis::new(word, "день", Some("NOUN"), "NOUN,inan,masc sing,nomn");
        Ok(vec![same.clone(), same])
    };
    let docs = parse(r#"[{"id": 1, "lines": ["день", "день за днём, день"]}]"#);
    let out = build(&docs, &quirky).unwrap();
    assert_eq!(out.lemmas.get("день").unwrap().len(), 1);
}

#[test]
fn lexicon_build_writes_and_reloads_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let lexicon_path = dir.path().join("lexicon.tsv");
    std::fs::write(
        &lexicon_path,
        "мороз\tмороз\tNOUN\tNOUN,inan,masc sing,nomn\n\
         и\tи\tCONJ\tCONJ\n\
         солнце\tсолнце\tNOUN\tNOUN,inan,neut sing,nomn\n\
         солнце\tсолнце\tNOUN\tNOUN,inan,neut sing,accs\n",
    )
    .unwrap();
    let corpus_path = dir.path().join("poems.json");
    std::fs::write(
        &corpus_path,
        r#"[{"id": 1, "lines": ["Мороз и солнце;", "и солнце 1829"]}]"#,
    )
    .unwrap();

    let lexicon = Lexicon::load(&lexicon_path)
        .unwrap()
        .with_unknown_words(UnknownWords::Tag);
    let analyzer = CachedAnalyzer::new(lexicon);
    let docs = load_corpus(&corpus_path, LoadMode::Mmap).unwrap();
    let out = build(&docs, &analyzer).unwrap();

    assert_eq!(out.lemmas.get("солнце").unwrap().len(), 2);
    assert_eq!(out.lemmas.get("Мороз").unwrap()[0].word, "Мороз");
    assert_eq!(out.lemmas.get("1829").unwrap()[0].grammeme, "NUMB,intg");
    assert_eq!(analyzer.hits(), 2);

    let lemmas_path = dir.path().join("lemmas.json");
    let compact_path = dir.path().join("compact.json");
    write_artifacts(&lemmas_path, &out.lemmas, &compact_path, &out.compact).unwrap();
    assert_eq!(load_lemmas(&lemmas_path, LoadMode::Owned).unwrap(), out.lemmas);
    assert_eq!(load_compact(&compact_path, LoadMode::Owned).unwrap(), out.compact);
}
