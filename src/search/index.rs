//! Field-aware inverted index with TF-IDF scoring over catalog terms.

use crate::types::Field;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;

/// Smoothing term keeping the IDF denominator strictly positive.
const IDF_EPSILON: f64 = 1e-9;

/// Per-tool term frequencies, one counter per descriptor field.
#[derive(Debug, Clone, Copy, Default)]
struct FieldCounts([u32; 4]);

impl FieldCounts {
    fn bump(&mut self, field: Field) {
        self.0[field as usize] += 1;
    }

    fn get(self, field: Field) -> u32 {
        self.0[field as usize]
    }

    fn total(self) -> u32 {
        self.0.iter().sum()
    }

    /// Non-zero counters in fixed field order.
    fn iter(self) -> impl Iterator<Item = (Field, u32)> {
        Field::ALL
            .into_iter()
            .filter_map(move |field| (self.get(field) > 0).then(|| (field, self.get(field))))
    }
}

/// Pre-tokenized descriptor terms grouped by field.
#[derive(Debug, Clone, Default)]
pub struct TermsByField {
    pub name: Vec<String>,
    pub keywords: Vec<String>,
    pub aliases: Vec<String>,
    pub description: Vec<String>,
}

impl TermsByField {
    pub fn terms(&self, field: Field) -> &[String] {
        match field {
            Field::Name => &self.name,
            Field::Keywords => &self.keywords,
            Field::Aliases => &self.aliases,
            Field::Description => &self.description,
        }
    }
}

/// Parameters for [`InvertedIndex::query`].
#[derive(Debug, Clone)]
pub struct QueryParams<'a> {
    /// Tokens the user has finished typing; gate candidates via the
    /// completion threshold
    pub complete_terms: &'a AHashSet<String>,
    /// Trie expansions of the trailing partial token
    pub expanded_terms: &'a AHashSet<String>,
    /// Require at least one match in an anchor field
    pub require_anchor: bool,
    pub anchor_fields: &'a [Field],
    /// Fraction of complete terms a tool must match when no explicit
    /// threshold is given
    pub alpha: f64,
    pub min_score: f64,
    /// Truncation bound; `0` disables truncation
    pub top_k: usize,
    /// Explicit completion threshold overriding the `alpha` derivation
    pub min_complete_hits: Option<usize>,
    /// Explicit query term set; defaults to `complete ∪ expanded`
    pub query_terms: Option<&'a AHashSet<String>>,
}

impl<'a> QueryParams<'a> {
    /// Query with the engine's baseline gates.
    pub fn new(
        complete_terms: &'a AHashSet<String>,
        expanded_terms: &'a AHashSet<String>,
    ) -> Self {
        Self {
            complete_terms,
            expanded_terms,
            require_anchor: true,
            anchor_fields: &Field::ANCHORS,
            alpha: 0.6,
            min_score: 1.0,
            top_k: 3,
            min_complete_hits: None,
            query_terms: None,
        }
    }
}

/// A scored candidate returned by [`InvertedIndex::query`].
#[derive(Debug, Clone)]
pub struct RankedTool {
    pub tool: String,
    pub score: f64,
    /// Matched term → fields it matched in, in first-observation order.
    /// Callers that display must sort field names; only set equality is
    /// guaranteed.
    pub contributions: BTreeMap<String, Vec<Field>>,
}

/// Inverted index mapping term → tool → field → term frequency, with
/// field-weighted TF-IDF scoring.
///
/// Default field weights: name 3.0, keywords 2.0, aliases 1.8,
/// description 1.0.
#[derive(Debug)]
pub struct InvertedIndex {
    postings: AHashMap<String, AHashMap<String, FieldCounts>>,
    df: AHashMap<String, u32>,
    tools: AHashSet<String>,
    /// Indexed by `Field::ALL` order
    field_weights: [f64; 4],
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self {
            postings: AHashMap::new(),
            df: AHashMap::new(),
            tools: AHashSet::new(),
            field_weights: [3.0, 2.0, 1.8, 1.0],
        }
    }
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool's pre-tokenized terms.
    ///
    /// Document frequency is bumped once per distinct term per tool,
    /// regardless of how many fields carry it.
    pub fn add_tool(&mut self, tool_id: &str, terms: &TermsByField) {
        self.tools.insert(tool_id.to_string());

        let mut seen_for_df: AHashSet<&str> = AHashSet::new();
        for field in Field::ALL {
            for term in terms.terms(field) {
                if term.is_empty() {
                    continue;
                }
                self.postings
                    .entry(term.clone())
                    .or_default()
                    .entry(tool_id.to_string())
                    .or_default()
                    .bump(field);
                if seen_for_df.insert(term.as_str()) {
                    *self.df.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }
    }

    /// Number of registered tools (the `N` in IDF).
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Number of distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Number of distinct tools containing `term`.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.df.get(term).copied().unwrap_or(0)
    }

    /// Term frequency of `term` in one field of one tool.
    pub fn term_frequency(&self, term: &str, tool: &str, field: Field) -> u32 {
        self.postings
            .get(term)
            .and_then(|tools| tools.get(tool))
            .map_or(0, |counts| counts.get(field))
    }

    /// Total occurrences of `term` across all of a tool's fields.
    pub fn total_term_frequency(&self, term: &str, tool: &str) -> u32 {
        self.postings
            .get(term)
            .and_then(|tools| tools.get(tool))
            .map_or(0, |counts| counts.total())
    }

    /// Smoothed inverse document frequency:
    /// `1 + ln((1 + N) / (1 + df + ε))`.
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.tools.len() as f64;
        let df = f64::from(self.document_frequency(term));
        1.0 + ((1.0 + n) / (1.0 + df + IDF_EPSILON)).ln()
    }

    /// Rank tools for a query term set.
    ///
    /// Candidates are every tool holding a posting for any query term. Each
    /// is scored as `Σ tf × field_weight × idf(term)` over its matching
    /// terms, then gated on the anchor requirement, the completion
    /// threshold, and `min_score`. Candidates are evaluated in lexicographic
    /// tool order and the final sort is stable, so rankings are
    /// deterministic.
    pub fn query(&self, params: &QueryParams<'_>) -> Vec<RankedTool> {
        let union: AHashSet<String>;
        let query_set: &AHashSet<String> = match params.query_terms {
            Some(terms) => terms,
            None => {
                union = params
                    .complete_terms
                    .union(params.expanded_terms)
                    .cloned()
                    .collect();
                &union
            }
        };
        if query_set.is_empty() {
            return Vec::new();
        }

        let mut query_terms: Vec<&String> = query_set.iter().collect();
        query_terms.sort_unstable();

        let mut candidate_set: AHashSet<&String> = AHashSet::new();
        for term in &query_terms {
            if let Some(tools) = self.postings.get(*term) {
                candidate_set.extend(tools.keys());
            }
        }
        let mut candidates: Vec<&String> = candidate_set.into_iter().collect();
        candidates.sort_unstable();

        let required = params.min_complete_hits.unwrap_or_else(|| {
            (params.complete_terms.len() as f64 * params.alpha.clamp(0.0, 1.0)).ceil() as usize
        });

        let mut results = Vec::new();
        for tool in candidates {
            let mut score = 0.0;
            let mut matched_complete = 0usize;
            let mut anchor_hit = false;
            let mut contributions: BTreeMap<String, Vec<Field>> = BTreeMap::new();

            for term in &query_terms {
                let Some(counts) = self.postings.get(*term).and_then(|tools| tools.get(tool))
                else {
                    continue;
                };
                for (field, tf) in counts.iter() {
                    if params.anchor_fields.contains(&field) {
                        anchor_hit = true;
                    }
                    score += f64::from(tf) * self.field_weights[field as usize] * self.idf(term);
                    let fields = contributions.entry((*term).clone()).or_default();
                    if !fields.contains(&field) {
                        fields.push(field);
                    }
                }
                if params.complete_terms.contains(*term) {
                    matched_complete += 1;
                }
            }

            if params.require_anchor && !anchor_hit {
                continue;
            }
            if matched_complete < required {
                continue;
            }
            if score < params.min_score {
                continue;
            }
            results.push(RankedTool {
                tool: tool.clone(),
                score,
                contributions,
            });
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        if params.top_k > 0 {
            results.truncate(params.top_k);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn set(items: &[&str]) -> AHashSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn sample_index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_tool(
            "export_csv",
            &TermsByField {
                name: terms(&["export_csv"]),
                description: terms(&["exporta", "dados", "csv"]),
                keywords: terms(&["exportar", "csv", "arquivo"]),
                aliases: terms(&["baixar", "csv"]),
            },
        );
        index.add_tool(
            "plot_chart",
            &TermsByField {
                name: terms(&["plot_chart"]),
                description: terms(&["gera", "grafico"]),
                keywords: terms(&["grafico", "plotar"]),
                aliases: Vec::new(),
            },
        );
        index
    }

    #[test]
    fn anchor_match_ranks_export_csv_first() {
        let index = sample_index();
        let complete = set(&["exportar"]);
        let expanded = set(&["csv"]);
        let ranked = index.query(&QueryParams::new(&complete, &expanded));
        check!(!ranked.is_empty());
        check!(ranked[0].tool == "export_csv");
    }

    #[test]
    fn description_only_match_is_gated_by_anchor_requirement() {
        let index = sample_index();
        let complete = set(&["dados"]);
        let expanded = set(&[]);
        let ranked = index.query(&QueryParams::new(&complete, &expanded));
        check!(ranked.is_empty());
    }

    #[test]
    fn document_frequency_counts_tools_not_fields() {
        let index = sample_index();
        // "csv" appears in three fields of export_csv but only one tool
        check!(index.document_frequency("csv") == 1);
        // "grafico" appears twice inside plot_chart, still one tool
        check!(index.document_frequency("grafico") == 1);
        for term in ["csv", "grafico", "exportar", "dados"] {
            check!(index.document_frequency(term) as usize <= index.tool_count());
        }
    }

    #[test]
    fn per_field_frequencies_sum_to_total_occurrences() {
        let index = sample_index();
        let per_field: u32 = Field::ALL
            .into_iter()
            .map(|field| index.term_frequency("csv", "export_csv", field))
            .sum();
        check!(per_field == index.total_term_frequency("csv", "export_csv"));
        check!(per_field == 3);
    }

    #[test]
    fn completion_threshold_filters_partial_matches() {
        let index = sample_index();
        let complete = set(&["exportar", "grafico"]);
        let expanded = set(&[]);
        // Requiring both complete terms leaves nothing: no tool holds both.
        let ranked = index.query(&QueryParams {
            min_complete_hits: Some(2),
            ..QueryParams::new(&complete, &expanded)
        });
        check!(ranked.is_empty());
        // A threshold of one keeps both tools.
        let ranked = index.query(&QueryParams {
            min_complete_hits: Some(1),
            ..QueryParams::new(&complete, &expanded)
        });
        check!(ranked.len() == 2);
    }

    #[test]
    fn min_score_gates_weak_candidates() {
        let index = sample_index();
        let complete = set(&["exportar"]);
        let expanded = set(&[]);
        let ranked = index.query(&QueryParams {
            min_score: 1_000.0,
            ..QueryParams::new(&complete, &expanded)
        });
        check!(ranked.is_empty());
    }

    #[test]
    fn results_are_sorted_descending_and_truncated() {
        let index = sample_index();
        let complete = set(&["csv", "grafico"]);
        let expanded = set(&[]);
        let ranked = index.query(&QueryParams {
            min_complete_hits: Some(1),
            top_k: 5,
            ..QueryParams::new(&complete, &expanded)
        });
        check!(ranked.len() == 2);
        check!(ranked[0].score >= ranked[1].score);

        let truncated = index.query(&QueryParams {
            min_complete_hits: Some(1),
            top_k: 1,
            ..QueryParams::new(&complete, &expanded)
        });
        check!(truncated.len() == 1);
        check!(truncated[0].tool == ranked[0].tool);
    }

    #[test]
    fn contributions_report_matched_fields() {
        let index = sample_index();
        let complete = set(&["exportar"]);
        let expanded = set(&["csv"]);
        let ranked = index.query(&QueryParams::new(&complete, &expanded));
        let contributions = &ranked[0].contributions;
        check!(contributions["exportar"] == vec![Field::Keywords]);
        let mut csv_fields = contributions["csv"].clone();
        csv_fields.sort_unstable();
        check!(csv_fields == vec![Field::Keywords, Field::Aliases, Field::Description]);
    }

    #[test]
    fn empty_query_returns_empty() {
        let index = sample_index();
        let empty = set(&[]);
        check!(index.query(&QueryParams::new(&empty, &empty)).is_empty());
    }

    #[test]
    fn idf_decreases_with_document_frequency() {
        let mut index = InvertedIndex::new();
        for tool in ["a", "b", "c"] {
            index.add_tool(
                tool,
                &TermsByField {
                    name: terms(&["common"]),
                    ..TermsByField::default()
                },
            );
        }
        index.add_tool(
            "d",
            &TermsByField {
                name: terms(&["rare"]),
                ..TermsByField::default()
            },
        );
        check!(index.idf("rare") > index.idf("common"));
    }
}
