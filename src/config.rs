//! Engine configuration with defaulted fields and fail-fast validation.

use crate::error::ConfigError;
use crate::types::Field;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connective tokens that split an utterance into intent segments when no
/// custom list is configured. Portuguese and English, pre-normalized.
pub const DEFAULT_INTENT_SEPARATORS: [&str; 8] = [
    "e", "depois", "entao", "tambem", "and", "then", "after", "also",
];

/// How per-window scores for the same tool are fused across intent windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineStrategy {
    /// Keep the best per-window score.
    #[default]
    Max,
    /// Accumulate per-window scores, decayed by `1/(i+1)` for the i-th window.
    Sum,
}

impl CombineStrategy {
    /// Returns the lowercase strategy name.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Sum => "sum",
        }
    }
}

impl fmt::Display for CombineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombineStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            _ => Err(ConfigError::InvalidCombineStrategy {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration record for [`crate::engine::SuggestionEngine`].
///
/// All fields default to the engine's documented baseline. Reconfiguration
/// is modeled as "build a new engine with the new config and swap"; there is
/// no in-place mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Language codes whose stopword tables apply
    pub locales: Vec<String>,
    /// Maximum suggestions returned per query
    pub top_k: usize,
    /// Minimum fused score for a tool to surface
    pub min_score: f64,
    /// Require at least one match in an anchor field
    pub require_anchor: bool,
    /// Fields whose matches count as anchors
    pub anchor_fields: Vec<Field>,
    /// Fraction of complete terms a tool must match in non-anchored windows
    pub alpha: f64,
    /// Threshold scaling against anchor count in anchored windows
    pub anchor_alpha: f64,
    /// Tokens of context kept on each side of an anchor
    pub window_radius: usize,
    /// Drop stopwords from window term lists
    pub drop_stopwords: bool,
    /// Maximum intent windows processed per utterance
    pub max_intents: usize,
    /// Connective tokens that split the utterance; `None` uses the defaults
    pub intent_separator_tokens: Option<Vec<String>>,
    /// How per-window scores are fused
    pub combine_strategy: CombineStrategy,
    /// Additive bonus per extra window a tool appeared in
    pub multi_intent_bonus: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locales: vec!["pt".to_string(), "en".to_string()],
            top_k: 3,
            min_score: 1.0,
            require_anchor: true,
            anchor_fields: Field::ANCHORS.to_vec(),
            alpha: 0.6,
            anchor_alpha: 0.5,
            window_radius: 3,
            drop_stopwords: true,
            max_intents: 1,
            intent_separator_tokens: None,
            combine_strategy: CombineStrategy::Max,
            multi_intent_bonus: 0.0,
        }
    }
}

impl EngineConfig {
    /// Validate the numeric bindings enforced at the engine boundary.
    ///
    /// `top_k` must lie in `[1, 20]`, `max_intents` in `[1, 10]`, and
    /// `min_score` must be non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        range("top_k", self.top_k, 1, 20)?;
        range("max_intents", self.max_intents, 1, 10)?;
        if self.min_score < 0.0 {
            return Err(ConfigError::BelowMinimum {
                param: "min_score",
                value: self.min_score,
                min: 0.0,
            });
        }
        Ok(())
    }
}

fn range(param: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            param,
            value: value as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

/// Split a comma-separated separator list into trimmed, non-empty entries.
///
/// Adapters accept separator tokens either as a list or as a single
/// comma-separated string; this handles the latter form.
pub fn parse_separator_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        check!(EngineConfig::default().validate().is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(21)]
    fn top_k_out_of_range_is_rejected(#[case] top_k: usize) {
        let config = EngineConfig {
            top_k,
            ..EngineConfig::default()
        };
        check!(config.validate().is_err());
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    fn max_intents_out_of_range_is_rejected(#[case] max_intents: usize) {
        let config = EngineConfig {
            max_intents,
            ..EngineConfig::default()
        };
        check!(config.validate().is_err());
    }

    #[test]
    fn negative_min_score_is_rejected() {
        let config = EngineConfig {
            min_score: -0.5,
            ..EngineConfig::default()
        };
        check!(matches!(
            config.validate(),
            Err(ConfigError::BelowMinimum { param: "min_score", .. })
        ));
    }

    #[rstest]
    #[case("max", CombineStrategy::Max)]
    #[case("SUM", CombineStrategy::Sum)]
    fn combine_strategy_parses_case_insensitively(
        #[case] input: &str,
        #[case] expected: CombineStrategy,
    ) {
        check!(input.parse::<CombineStrategy>().unwrap() == expected);
    }

    #[test]
    fn unknown_combine_strategy_is_rejected() {
        let err = "mean".parse::<CombineStrategy>().unwrap_err();
        check!(matches!(err, ConfigError::InvalidCombineStrategy { .. }));
    }

    #[rstest]
    #[case("e, depois ,entao", vec!["e", "depois", "entao"])]
    #[case("  ,  , ", vec![])]
    #[case("and", vec!["and"])]
    fn separator_list_splits_and_trims(#[case] raw: &str, #[case] expected: Vec<&str>) {
        check!(parse_separator_list(raw) == expected);
    }
}
