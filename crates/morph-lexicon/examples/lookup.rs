use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use morph_lexicon::{Lexicon, UnknownWords};
use morph_types::Analyzer;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let lexicon_path = args.next().map(PathBuf::from).context(
        "usage: cargo run -p morph-lexicon --example lookup -- <lexicon.tsv> <word>...",
    )?;
    let words: Vec<String> = args.collect();
    if words.is_empty() {
        bail!("usage: cargo run -p morph-lexicon --example lookup -- <lexicon.tsv> <word>...");
    }

    let lexicon = Lexicon::load(&lexicon_path)
        .with_context(|| format!("loading lexicon from {}", lexicon_path.display()))?
        .with_unknown_words(UnknownWords::Tag);

    println!("Lexicon: {} ({} surface forms)", lexicon_path.display(), lexicon.len());

    for word in words {
        println!("\nSurface: {}", word);
        for analysis in lexicon.analyze(&word)? {
            println!(
                "  {:<12} {:<6} {}",
                analysis.normal_form,
                analysis.pos.as_deref().unwrap_or("-"),
                analysis.grammeme
            );
        }
    }

    Ok(())
}
