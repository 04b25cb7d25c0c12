//! Lexical search infrastructure for tool suggestion.
//!
//! This module provides the normalizing tokenizer, the prefix trie used for
//! incomplete-token expansion, and the field-aware TF-IDF inverted index.

// Module declarations
mod index;
mod tokenize;
mod trie;

// Re-exports for public API
pub use index::{InvertedIndex, QueryParams, RankedTool, TermsByField};
pub use tokenize::{Span, TokenizeOptions, normalize, stopwords, tokens, tokens_with_spans};
pub use trie::Trie;
