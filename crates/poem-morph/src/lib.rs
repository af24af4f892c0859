pub mod collector;
pub mod compactor;
pub mod handlers;
pub mod pipeline;
pub mod resolve;
pub mod tokenizer;

pub use collector::{CollectError, LemmaCollector, collect};
pub use compactor::{compact, compact_lines, unresolved_references};
pub use handlers::{AppState, router};
pub use pipeline::{BuildStats, Morphology, build};
pub use resolve::{resolve_lines, resolve_token};
pub use tokenizer::{Token, Tokens, is_word_char, tokenize};
