use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use morph_corpus::{LoadMode, load_compact, load_corpus, load_lemmas, write_artifacts};
use morph_lexicon::{CachedAnalyzer, Lexicon, UnknownWords};
use morph_types::{Analyzer, Document};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use poem_morph::{AppState, Morphology, build, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_INPUT: &str = "public/poems_minimal.json";
const DEFAULT_LEMMAS: &str = "public/lemmas.json";
const DEFAULT_COMPACT: &str = "public/poems_morphology_compact.json";
const DEFAULT_LEXICON: &str = "dict/lexicon.tsv";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Command {
    Build,
    Serve,
}

#[derive(Debug, Clone)]
struct Config {
    command: Command,
    host: String,
    port: u16,
    input_path: PathBuf,
    lemmas_path: PathBuf,
    compact_path: PathBuf,
    lexicon_path: PathBuf,
    load_mode: LoadMode,
    unknown_words: UnknownWords,
    analyzer_cache: bool,
    disable_cache: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    match config.command {
        Command::Build => run_build(&config),
        Command::Serve => serve(&config).await,
    }
}

fn run_build(config: &Config) -> anyhow::Result<()> {
    info!("reading corpus from {}", config.input_path.display());
    info!(
        "using lexicon at {} (unknown words: {:?}, mode: {:?})",
        config.lexicon_path.display(),
        config.unknown_words,
        config.load_mode
    );

    let start = Instant::now();
    let lexicon = load_lexicon(&config.lexicon_path)?.with_unknown_words(config.unknown_words);
    info!(
        "lexicon loaded with {} surface forms in {} ms",
        lexicon.len(),
        start.elapsed().as_millis()
    );

    let docs = load_corpus(&config.input_path, config.load_mode)?;
    info!("loaded {} documents", docs.len());

    let output = if config.analyzer_cache {
        let cached = CachedAnalyzer::new(lexicon);
        let output = analyze(&docs, &cached)?;
        info!(
            "analyzer cache answered {} lookups for {} words",
            cached.hits(),
            cached.cached_words()
        );
        output
    } else {
        analyze(&docs, &lexicon)?
    };

    write_artifacts(
        &config.lemmas_path,
        &output.lemmas,
        &config.compact_path,
        &output.compact,
    )?;
    info!(
        "wrote {} and {}",
        config.lemmas_path.display(),
        config.compact_path.display()
    );
    Ok(())
}

fn analyze<A: Analyzer>(docs: &[Document], analyzer: &A) -> anyhow::Result<Morphology> {
    build(docs, analyzer).context("building morphology artifacts")
}

fn load_lexicon(path: &Path) -> anyhow::Result<Lexicon> {
    if !path.exists() {
        warn!(
            "lexicon {} not found; every word will be treated as unknown",
            path.display()
        );
        return Ok(Lexicon::default());
    }
    Lexicon::load(path)
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    info!("binding to {}:{}", config.host, config.port);
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    let lemmas = load_lemmas(&config.lemmas_path, config.load_mode)?;
    let compact = load_compact(&config.compact_path, config.load_mode)?;
    info!(
        "loaded {} words and {} poems in {} ms",
        lemmas.len(),
        compact.len(),
        start.elapsed().as_millis()
    );

    let state = AppState {
        lemmas: Arc::new(lemmas),
        compact: Arc::new(compact),
        disable_cache: config.disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    let mut command = Command::Build;
    let mut disable_cache = false;
    let mut analyzer_cache = true;
    let mut cli_input: Option<PathBuf> = None;
    let mut cli_lemmas: Option<PathBuf> = None;
    let mut cli_compact: Option<PathBuf> = None;
    let mut cli_lexicon: Option<PathBuf> = None;
    let mut cli_load_mode: Option<LoadMode> = None;
    let mut cli_unknown: Option<UnknownWords> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "build" => command = Command::Build,
            "serve" => command = Command::Serve,
            "--no-cache" => disable_cache = true,
            "--no-analyzer-cache" => analyzer_cache = false,
            _ => {
                if let Some(path) = arg.strip_prefix("--input=") {
                    cli_input = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--lemmas=") {
                    cli_lemmas = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--compact=") {
                    cli_compact = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--lexicon=") {
                    cli_lexicon = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli_load_mode = Some(
                        LoadMode::parse(mode)
                            .with_context(|| format!("unknown load mode {mode}"))?,
                    );
                } else if let Some(policy) = arg.strip_prefix("--unknown=") {
                    cli_unknown = Some(
                        UnknownWords::parse(policy)
                            .with_context(|| format!("unknown word policy {policy}"))?,
                    );
                } else {
                    bail!("unrecognized argument: {arg}");
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let input_path = path_setting(cli_input, "POEMS_PATH", DEFAULT_INPUT);
    let lemmas_path = path_setting(cli_lemmas, "LEMMAS_PATH", DEFAULT_LEMMAS);
    let compact_path = path_setting(cli_compact, "COMPACT_PATH", DEFAULT_COMPACT);
    let lexicon_path = path_setting(cli_lexicon, "LEXICON_PATH", DEFAULT_LEXICON);
    let load_mode = cli_load_mode
        .or_else(|| {
            env::var("CORPUS_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(LoadMode::parse)
        })
        .unwrap_or_default();
    let unknown_words = cli_unknown
        .or_else(|| {
            env::var("UNKNOWN_WORDS")
                .ok()
                .as_deref()
                .and_then(UnknownWords::parse)
        })
        .unwrap_or_default();

    Ok(Config {
        command,
        host,
        port,
        input_path,
        lemmas_path,
        compact_path,
        lexicon_path,
        load_mode,
        unknown_words,
        analyzer_cache,
        disable_cache,
    })
}

fn path_setting(cli: Option<PathBuf>, var: &str, default: &str) -> PathBuf {
    cli.or_else(|| env::var(var).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn init_tracing() {
    let directives = env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_target(false)
        .with_level(true)
        .init();
}

/// `RUST_LOG`-style directives, falling back to `info` when absent or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
