use std::iter::FusedIterator;

use unicode_normalization::char::is_combining_mark;

/// A word occurrence inside a line. Only `text` identifies the word; `offset`
/// is the byte position for diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Lazy scan over the word tokens of one line. Clone to fork the scan at its
/// current position; call [`tokenize`] again to restart.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    line: &'a str,
    pos: usize,
}

/// Letters, digits (any script) and `_`. Everything else separates words,
/// including combining marks such as stress accents and vowel signs, which
/// `char::is_alphanumeric` would otherwise accept via `Other_Alphabetic`.
pub fn is_word_char(c: char) -> bool {
    c == '_' || (c.is_alphanumeric() && !is_combining_mark(c))
}

/// Tokenize a line into maximal runs of word characters, left to right.
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens { line, pos: 0 }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.line[self.pos..];
        let Some(skip) = rest.find(is_word_char) else {
            self.pos = self.line.len();
            return None;
        };
        let start = self.pos + skip;
        let tail = &self.line[start..];
        let len = tail.find(|c: char| !is_word_char(c)).unwrap_or(tail.len());
        self.pos = start + len;
        Some(Token {
            text: &self.line[start..start + len],
            offset: start,
        })
    }
}

impl FusedIterator for Tokens<'_> {}
