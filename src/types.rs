//! Wire-facing data types: catalog entries, descriptor fields, and emitted
//! suggestions.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tool descriptor as ingested from the catalog.
///
/// Only `name` is required; entries with an empty name are silently skipped
/// at ingest. `locales` and `tags` are advisory pass-through metadata and do
/// not affect ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ToolSpec {
    /// Unique identifier for the tool
    pub name: String,
    /// Free-text description of what the tool does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keyword phrases that should strongly match this tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Alternative names or phrases for the tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Advisory language codes; unused by ranking
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locales: Vec<String>,
    /// Opaque metadata passed through to suggestions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Descriptor field a term was drawn from.
///
/// `Name`, `Keywords`, and `Aliases` are anchor fields: a match in one of
/// them is what lets a tool pass the anchor gate. `Description` matches only
/// ever contribute score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Keywords,
    Aliases,
    Description,
}

impl Field {
    /// All fields, in the order descriptor extraction visits them.
    pub const ALL: [Self; 4] = [Self::Name, Self::Keywords, Self::Aliases, Self::Description];

    /// The anchor fields (every field except `Description`).
    pub const ANCHORS: [Self; 3] = [Self::Name, Self::Keywords, Self::Aliases];

    /// Returns the lowercase field name used in reasons and schemas.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Keywords => "keywords",
            Self::Aliases => "aliases",
            Self::Description => "description",
        }
    }

    /// Whether a match in this field satisfies the anchor requirement.
    #[inline]
    pub fn is_anchor(self) -> bool {
        !matches!(self, Self::Description)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind discriminator carried by every suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    #[default]
    Tool,
}

/// Pass-through metadata attached to a suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionMetadata {
    pub tags: Vec<String>,
}

/// A ranked suggestion emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Catalog name of the suggested tool
    pub id: String,
    pub kind: SuggestionKind,
    /// Fused relevance score; suggestions are emitted in non-increasing order
    pub score: f64,
    /// Display label (the tool's name)
    pub label: String,
    /// Explanation: `"term: field,field; term: field"` with terms sorted and
    /// field names alphabetical
    pub reason: String,
    /// Reserved for argument pre-filling; always empty today
    pub arguments_template: serde_json::Map<String, serde_json::Value>,
    pub metadata: SuggestionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn tool_spec_deserializes_with_optional_fields_missing() {
        let spec: ToolSpec = serde_json::from_str(r#"{"name": "export_csv"}"#).unwrap();
        check!(spec.name == "export_csv");
        check!(spec.description.is_none());
        check!(spec.keywords.is_empty());
        check!(spec.tags.is_empty());
    }

    #[test]
    fn field_serializes_lowercase() {
        check!(serde_json::to_string(&Field::Keywords).unwrap() == "\"keywords\"");
        check!(Field::Description.as_str() == "description");
    }

    #[test]
    fn description_is_not_an_anchor_field() {
        check!(!Field::Description.is_anchor());
        for field in Field::ANCHORS {
            check!(field.is_anchor());
        }
    }

    #[test]
    fn suggestion_kind_serializes_as_tool() {
        check!(serde_json::to_string(&SuggestionKind::Tool).unwrap() == "\"tool\"");
    }
}
