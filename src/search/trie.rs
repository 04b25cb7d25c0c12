//! Character trie over catalog terms for incomplete-token expansion.

use ahash::AHashMap;

#[derive(Debug, Default)]
struct TrieNode {
    children: AHashMap<char, TrieNode>,
    terminal: bool,
    /// Every term passing through this node, in insertion order.
    desc_terms: Vec<String>,
}

/// Prefix trie over complete terms.
///
/// Each node tracks its descendant terms so prefix enumeration is
/// O(|prefix| + k) for k reported results. Enumeration follows insertion
/// order for determinism, but callers must not rely on any particular order.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct terms inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `term` was inserted as a complete term.
    pub fn contains(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        let mut node = &self.root;
        for ch in term.chars() {
            match node.children.get(&ch) {
                Some(next) => node = next,
                None => return false,
            }
        }
        node.terminal
    }

    /// Insert a term, recording it on every node along its path (root
    /// included). Duplicate inserts are no-ops; the empty term is ignored.
    pub fn insert(&mut self, term: &str) {
        if term.is_empty() || self.contains(term) {
            return;
        }
        self.len += 1;
        let mut node = &mut self.root;
        node.desc_terms.push(term.to_string());
        for ch in term.chars() {
            node = node.children.entry(ch).or_default();
            node.desc_terms.push(term.to_string());
        }
        node.terminal = true;
    }

    pub fn bulk_insert<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            self.insert(term.as_ref());
        }
    }

    /// All inserted terms sharing `prefix`, truncated to `limit`.
    ///
    /// Returns empty when the prefix walks off the trie. An empty prefix
    /// enumerates every term.
    pub fn prefix_terms(&self, prefix: &str, limit: Option<usize>) -> Vec<String> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }
        let take = limit.unwrap_or(node.desc_terms.len());
        node.desc_terms.iter().take(take).cloned().collect()
    }
}
