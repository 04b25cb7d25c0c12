//! Suggestion engine: catalog ownership, intent-window segmentation, index
//! queries, and cross-window fusion.

use crate::config::{CombineStrategy, DEFAULT_INTENT_SEPARATORS, EngineConfig};
use crate::error::ConfigError;
use crate::search::{
    InvertedIndex, QueryParams, TermsByField, TokenizeOptions, Trie, normalize, stopwords, tokens,
    tokens_with_spans,
};
use crate::types::{Field, Suggestion, SuggestionKind, SuggestionMetadata, ToolSpec};
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};

/// Cap on trie expansions of the trailing partial token.
const PREFIX_EXPANSION_LIMIT: usize = 64;

/// A contiguous token range of the utterance from which one index query is
/// formed.
#[derive(Debug)]
struct IntentWindow {
    /// Terms the user finished typing (all but the last retained token)
    complete_terms: Vec<String>,
    /// Trailing partial token, expanded via the trie
    last_prefix: String,
    /// Tokens in the window found in the anchor vocabulary
    anchor_hits: usize,
}

/// Per-tool accumulator for cross-window fusion.
#[derive(Debug, Default)]
struct FusedEntry {
    score: f64,
    hits: usize,
    /// term → fields, merged across windows in first-observation order
    reasons: BTreeMap<String, Vec<Field>>,
}

/// Lexical tool-suggestion engine.
///
/// Owns the catalog, the prefix trie, the inverted index, and per-session
/// text buffers. Single-threaded by contract: callers needing parallelism
/// wrap an instance in external synchronization.
#[derive(Debug)]
pub struct SuggestionEngine {
    config: EngineConfig,
    /// Normalized separator tokens from the config (or the defaults)
    separator_set: AHashSet<String>,
    /// Resolved stopword set; empty when `drop_stopwords` is off
    stopword_set: AHashSet<String>,
    sessions: AHashMap<String, String>,
    catalog: AHashMap<String, ToolSpec>,
    trie: Trie,
    index: InvertedIndex,
    /// Normalized tokens appearing in any tool's anchor fields
    anchor_vocab: AHashSet<String>,
}

impl SuggestionEngine {
    /// Build an engine over `tools` with the given configuration.
    ///
    /// Fails fast on invalid configuration; tools without a name are
    /// silently skipped.
    pub fn new(tools: Vec<ToolSpec>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let raw_separators: Vec<String> = config.intent_separator_tokens.clone().unwrap_or_else(
            || {
                DEFAULT_INTENT_SEPARATORS
                    .iter()
                    .map(|sep| (*sep).to_string())
                    .collect()
            },
        );
        let separator_set: AHashSet<String> = raw_separators
            .iter()
            .map(|sep| normalize(sep))
            .filter(|sep| !sep.is_empty())
            .collect();

        let stopword_set: AHashSet<String> = if config.drop_stopwords {
            stopwords(config.locales.iter().map(String::as_str))
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            AHashSet::new()
        };

        let mut engine = Self {
            config,
            separator_set,
            stopword_set,
            sessions: AHashMap::new(),
            catalog: AHashMap::new(),
            trie: Trie::new(),
            index: InvertedIndex::new(),
            anchor_vocab: AHashSet::new(),
        };
        engine.add_tools(tools);
        Ok(engine)
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Session API ---

    /// Append `delta` to the session buffer (creating the session if absent)
    /// and rank suggestions against the full buffer.
    pub fn feed(&mut self, delta: &str, session_id: &str) -> Vec<Suggestion> {
        let buffer = self.sessions.entry(session_id.to_string()).or_default();
        buffer.push_str(delta);
        let text = buffer.clone();
        self.suggest(&text)
    }

    /// Replace the session buffer with `text` and rank suggestions.
    pub fn submit(&mut self, text: &str, session_id: &str) -> Vec<Suggestion> {
        self.sessions
            .insert(session_id.to_string(), text.to_string());
        self.suggest(text)
    }

    /// Drop the session. Idempotent.
    pub fn reset(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    // --- Catalog API ---

    /// Register tools: store specs, insert extracted terms into the trie,
    /// and update the inverted index and anchor vocabulary.
    pub fn add_tools(&mut self, tools: Vec<ToolSpec>) {
        for tool in tools {
            if tool.name.is_empty() {
                tracing::debug!("skipping catalog entry without a name");
                continue;
            }
            self.index_tool(&tool);
            self.catalog.insert(tool.name.clone(), tool);
        }
    }

    /// Remove a tool by name, rebuilding the trie, inverted index, and
    /// anchor vocabulary from the remaining catalog. No-op for unknown
    /// names.
    pub fn remove_tool(&mut self, name: &str) {
        if self.catalog.remove(name).is_none() {
            return;
        }
        tracing::debug!(tool = name, "removed tool; rebuilding indexes");
        self.trie = Trie::new();
        self.index = InvertedIndex::new();
        self.anchor_vocab.clear();
        let specs: Vec<ToolSpec> = self.catalog.values().cloned().collect();
        for tool in &specs {
            self.index_tool(tool);
        }
    }

    /// Registered tools, sorted by name for stable listings.
    pub fn catalog(&self) -> Vec<&ToolSpec> {
        let mut specs: Vec<&ToolSpec> = self.catalog.values().collect();
        specs.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    // --- Internals ---

    fn index_tool(&mut self, tool: &ToolSpec) {
        let by_field = Self::extract_terms_by_field(tool);
        self.trie.bulk_insert(Self::extract_terms(&by_field));
        for field in Field::ANCHORS {
            self.anchor_vocab
                .extend(by_field.terms(field).iter().cloned());
        }
        self.index.add_tool(&tool.name, &by_field);
    }

    /// Normalized tokens of every descriptor field, grouped by field.
    fn extract_terms_by_field(tool: &ToolSpec) -> TermsByField {
        let opts = TokenizeOptions::default();
        let mut by_field = TermsByField {
            name: tokens(&tool.name, &opts),
            description: tokens(tool.description.as_deref().unwrap_or(""), &opts),
            ..TermsByField::default()
        };
        for phrase in &tool.keywords {
            by_field.keywords.extend(tokens(phrase, &opts));
        }
        for phrase in &tool.aliases {
            by_field.aliases.extend(tokens(phrase, &opts));
        }
        by_field
    }

    /// Distinct terms across all fields, sorted, for trie insertion.
    fn extract_terms(by_field: &TermsByField) -> Vec<String> {
        let mut distinct = BTreeSet::new();
        for field in Field::ALL {
            for term in by_field.terms(field) {
                distinct.insert(term.clone());
            }
        }
        distinct.into_iter().collect()
    }

    /// Slice the utterance into intent windows.
    ///
    /// Separator tokens and `,`/`;` punctuation split the token stream into
    /// segments; within each segment, windows are centered on anchor tokens
    /// with `window_radius` context on each side (overlapping ranges
    /// merged), falling back to the whole segment when no anchor is present.
    /// Anchored windows come first, then non-anchored, truncated to
    /// `max_intents`.
    fn intent_windows(&self, text: &str) -> Vec<IntentWindow> {
        let stream = tokens_with_spans(
            text,
            &TokenizeOptions {
                drop_stopwords: false,
                locales: self.config.locales.clone(),
                remove_noise: true,
                extra_stopwords: Vec::new(),
            },
        );
        if stream.is_empty() {
            return Vec::new();
        }

        let normalized = normalize(text);
        let token_count = stream.len();

        let mut is_stop = Vec::with_capacity(token_count);
        let mut is_anchor = Vec::with_capacity(token_count);
        let mut is_separator = Vec::with_capacity(token_count);
        for (tok, _) in &stream {
            is_stop.push(self.config.drop_stopwords && self.stopword_set.contains(tok));
            is_anchor.push(self.anchor_vocab.contains(tok));
            is_separator.push(self.separator_set.contains(tok));
        }

        // A comma or semicolon in the gap before a token marks a boundary.
        let mut punctuation_boundary = vec![false; token_count];
        let mut prev_end = 0;
        for (idx, (_, span)) in stream.iter().enumerate() {
            let gap = &normalized[prev_end..span.0];
            if gap.contains(',') || gap.contains(';') {
                punctuation_boundary[idx] = true;
            }
            prev_end = span.1;
        }

        let mut segments: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;
        for idx in 0..token_count {
            if is_separator[idx] {
                if start < idx {
                    segments.push((start, idx));
                }
                start = idx + 1;
                continue;
            }
            if punctuation_boundary[idx] && start < idx {
                segments.push((start, idx));
                start = idx;
            }
        }
        if start < token_count {
            segments.push((start, token_count));
        }
        if segments.is_empty() {
            segments.push((0, token_count));
        }

        let mut windows = Vec::new();
        for (seg_start, seg_end) in segments {
            let anchor_indices: Vec<usize> =
                (seg_start..seg_end).filter(|idx| is_anchor[*idx]).collect();

            let mut ranges: Vec<(usize, usize)> = Vec::new();
            if anchor_indices.is_empty() {
                ranges.push((seg_start, seg_end));
            } else {
                for anchor_idx in anchor_indices {
                    let radius = self.config.window_radius;
                    let win_start = seg_start.max(anchor_idx.saturating_sub(radius));
                    let win_end = seg_end.min(anchor_idx + radius + 1);
                    match ranges.last_mut() {
                        Some((_, prev_end)) if win_start <= *prev_end => {
                            *prev_end = (*prev_end).max(win_end);
                        }
                        _ => ranges.push((win_start, win_end)),
                    }
                }
            }

            for (win_start, win_end) in ranges {
                let mut scoped: Vec<String> = Vec::new();
                let mut anchor_hits = 0;
                for idx in win_start..win_end {
                    if is_anchor[idx] {
                        anchor_hits += 1;
                    }
                    if is_stop[idx] {
                        continue;
                    }
                    scoped.push(stream[idx].0.clone());
                }
                let Some(last_prefix) = scoped.pop() else {
                    continue;
                };
                windows.push(IntentWindow {
                    complete_terms: scoped,
                    last_prefix,
                    anchor_hits,
                });
            }
        }

        let (anchored, fallback): (Vec<IntentWindow>, Vec<IntentWindow>) =
            windows.into_iter().partition(|win| win.anchor_hits > 0);
        let mut ordered = anchored;
        ordered.extend(fallback);
        ordered.truncate(self.config.max_intents);
        ordered
    }

    /// Completion threshold for a window: scaled against the anchor count
    /// when the window is anchored, against the complete-term count
    /// otherwise, and absent when there are no complete terms.
    fn min_complete_hits(&self, anchor_hits: usize, complete_len: usize) -> Option<usize> {
        if complete_len == 0 {
            return None;
        }
        let required = if anchor_hits > 0 {
            (anchor_hits as f64 * self.config.anchor_alpha.max(0.0)).ceil() as usize
        } else {
            (complete_len as f64 * self.config.alpha.clamp(0.0, 1.0)).ceil() as usize
        };
        Some(required.max(1))
    }

    /// Rank suggestions for an utterance: query the index once per intent
    /// window, fuse per-tool scores across windows, and emit explained
    /// suggestions.
    fn suggest(&self, text: &str) -> Vec<Suggestion> {
        let windows = self.intent_windows(text);
        if windows.is_empty() {
            return Vec::new();
        }
        tracing::trace!(windows = windows.len(), "segmented utterance");

        let window_top_k = if self.config.max_intents <= 1 {
            self.config.top_k
        } else {
            self.config.top_k.max(self.config.top_k * self.config.max_intents)
        };

        let mut fused: AHashMap<String, FusedEntry> = AHashMap::new();
        let mut order: Vec<String> = Vec::new();

        for (window_idx, window) in windows.iter().enumerate() {
            let expanded: AHashSet<String> = if window.last_prefix.is_empty() {
                AHashSet::new()
            } else {
                self.trie
                    .prefix_terms(&window.last_prefix, Some(PREFIX_EXPANSION_LIMIT))
                    .into_iter()
                    .collect()
            };

            let complete: AHashSet<String> = window.complete_terms.iter().cloned().collect();
            let query_terms: AHashSet<String> = complete.union(&expanded).cloned().collect();
            if query_terms.is_empty() {
                continue;
            }

            let ranked = self.index.query(&QueryParams {
                complete_terms: &complete,
                expanded_terms: &expanded,
                require_anchor: self.config.require_anchor,
                anchor_fields: &self.config.anchor_fields,
                alpha: self.config.alpha,
                min_score: self.config.min_score,
                top_k: window_top_k,
                min_complete_hits: self
                    .min_complete_hits(window.anchor_hits, window.complete_terms.len()),
                query_terms: Some(&query_terms),
            });
            if ranked.is_empty() {
                continue;
            }

            let decay = 1.0 / (window_idx + 1) as f64;
            for result in ranked {
                if !fused.contains_key(&result.tool) {
                    order.push(result.tool.clone());
                }
                let entry = fused.entry(result.tool).or_default();
                match self.config.combine_strategy {
                    CombineStrategy::Max => entry.score = entry.score.max(result.score),
                    CombineStrategy::Sum => entry.score += result.score * decay,
                }
                entry.hits += 1;
                for (term, fields) in result.contributions {
                    let merged = entry.reasons.entry(term).or_default();
                    for field in fields {
                        if !merged.contains(&field) {
                            merged.push(field);
                        }
                    }
                }
            }
        }

        if fused.is_empty() {
            return Vec::new();
        }

        for entry in fused.values_mut() {
            if entry.hits > 1 && self.config.multi_intent_bonus != 0.0 {
                entry.score += self.config.multi_intent_bonus * (entry.hits - 1) as f64;
            }
        }

        // First-seen order plus a stable sort keeps ties deterministic.
        let mut ranked: Vec<(String, FusedEntry)> = order
            .into_iter()
            .filter_map(|tool| fused.remove(&tool).map(|entry| (tool, entry)))
            .collect();
        ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));
        ranked.truncate(self.config.top_k);

        ranked
            .into_iter()
            .map(|(tool, entry)| self.emit(tool, &entry))
            .collect()
    }

    fn emit(&self, tool: String, entry: &FusedEntry) -> Suggestion {
        let mut parts = Vec::with_capacity(entry.reasons.len());
        for (term, fields) in &entry.reasons {
            let mut names: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
            names.sort_unstable();
            parts.push(format!("{term}: {}", names.join(",")));
        }
        let spec = self.catalog.get(&tool);
        Suggestion {
            label: spec.map_or_else(|| tool.clone(), |spec| spec.name.clone()),
            metadata: SuggestionMetadata {
                tags: spec.map(|spec| spec.tags.clone()).unwrap_or_default(),
            },
            id: tool,
            kind: SuggestionKind::Tool,
            score: entry.score,
            reason: parts.join("; "),
            arguments_template: serde_json::Map::new(),
        }
    }
}
