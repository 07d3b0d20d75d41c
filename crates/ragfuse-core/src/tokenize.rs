//! Word tokenizer shared by BM25 indexing and querying.
//!
//! Text is lowercased, then every maximal run of ASCII letters and digits
//! becomes one token. Anything else separates tokens. There is no stop-word
//! list and no stemming: adding either would silently change document
//! frequencies of an already-built index, so it must ship as a new tokenizer.

use regex::Regex;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("static word pattern"));

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// Tokenize every input in order and keep the first occurrence of each term.
pub fn unique_terms<'a, I>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for text in texts {
        for token in tokenize(text) {
            if seen.insert(token.clone()) {
                out.push(token);
            }
        }
    }
    out
}
