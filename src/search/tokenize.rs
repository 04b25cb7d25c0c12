//! Text normalization and tokenization with locale-aware stopwords.

use ahash::AHashSet;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Byte range of a token inside the normalized string.
pub type Span = (usize, usize);

/// Maximal runs of Unicode word characters.
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Portuguese stopwords, pre-normalized.
///
/// Skewed toward request phrasing ("quero", "preciso", "gostaria") since the
/// input is user utterances, not documents.
const STOPWORDS_PT: [&str; 38] = [
    "a", "o", "os", "as", "de", "do", "da", "das", "dos", "pra", "para", "por", "que", "com", "e",
    "eu", "me", "meu", "minha", "meus", "minhas", "em", "um", "uma", "uns", "umas", "no", "na",
    "nos", "nas", "ao", "aos", "vou", "quero", "preciso", "gostaria", "desejo", "favor",
];

/// English stopwords, same register as the Portuguese table.
const STOPWORDS_EN: [&str; 23] = [
    "a", "an", "the", "to", "for", "with", "and", "or", "but", "i", "me", "my", "you", "want",
    "would", "like", "need", "please", "from", "on", "in", "at", "of",
];

/// Stopword table for a locale code, keyed by the language component
/// (everything before the first `-`, lowercased). Unknown locales have none.
fn locale_table(locale: &str) -> Option<&'static [&'static str]> {
    let key = locale.split('-').next().unwrap_or("").to_lowercase();
    match key.as_str() {
        "pt" => Some(&STOPWORDS_PT),
        "en" => Some(&STOPWORDS_EN),
        _ => None,
    }
}

/// Union of the stopword tables for the given locale codes.
pub fn stopwords<I, S>(locales: I) -> AHashSet<&'static str>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut acc = AHashSet::new();
    for locale in locales {
        if let Some(bucket) = locale_table(locale.as_ref()) {
            acc.extend(bucket.iter().copied());
        }
    }
    acc
}

/// Normalize text for matching: casefold, apply compatibility decomposition,
/// drop combining marks, and collapse whitespace runs to single spaces.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokens that carry no lexical signal: all-digit runs, single
/// non-alphabetic characters, and long single-character repeats.
fn is_noise(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    if token.chars().all(char::is_numeric) {
        return true;
    }
    let rest = chars.clone().count();
    if rest == 0 && !first.is_alphabetic() {
        return true;
    }
    rest + 1 >= 4 && chars.all(|ch| ch == first)
}

/// Options for [`tokens_with_spans`] and [`tokens`].
#[derive(Debug, Clone)]
pub struct TokenizeOptions {
    /// Drop tokens found in the locale stopword tables
    pub drop_stopwords: bool,
    /// Locale codes whose stopword tables apply
    pub locales: Vec<String>,
    /// Drop noise tokens (digits, punctuation leftovers, repeats)
    pub remove_noise: bool,
    /// Additional caller-supplied stopwords
    pub extra_stopwords: Vec<String>,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            drop_stopwords: false,
            locales: vec!["pt".to_string(), "en".to_string()],
            remove_noise: true,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Tokenize text into word tokens with their spans.
///
/// Spans are byte offsets into the string returned by [`normalize`], and are
/// non-overlapping and monotonically increasing. Pure: never fails, and
/// empty input yields an empty vector.
pub fn tokens_with_spans(text: &str, opts: &TokenizeOptions) -> Vec<(String, Span)> {
    let norm = normalize(text);
    let stopword_set = if opts.drop_stopwords {
        let mut set: AHashSet<&str> =
            stopwords(opts.locales.iter().map(String::as_str));
        set.extend(opts.extra_stopwords.iter().map(String::as_str));
        set
    } else {
        AHashSet::new()
    };

    let mut items = Vec::new();
    for found in WORD.find_iter(&norm) {
        let tok = found.as_str();
        if opts.remove_noise && is_noise(tok) {
            continue;
        }
        if opts.drop_stopwords && stopword_set.contains(tok) {
            continue;
        }
        items.push((tok.to_string(), (found.start(), found.end())));
    }
    items
}

/// Convenience wrapper returning tokens only.
pub fn tokens(text: &str, opts: &TokenizeOptions) -> Vec<String> {
    tokens_with_spans(text, opts)
        .into_iter()
        .map(|(tok, _)| tok)
        .collect()
}
