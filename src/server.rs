//! MCP gateway exposing the suggestion engine over stdio.
//!
//! The engine itself is single-threaded; one instance sits behind an async
//! mutex so catalog mutation, reconfiguration, and session queries are
//! serialized.

use crate::config::parse_separator_list;
use crate::engine::SuggestionEngine;
use crate::error::ConfigError;
use crate::types::ToolSpec;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_handler, tool_router,
};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::Mutex;

fn default_session() -> String {
    "default".to_string()
}

/// Parameters for the feed tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct FeedRequest {
    /// Text delta appended to the session buffer
    pub delta: String,
    /// Session handle; created implicitly if unknown
    #[serde(default = "default_session")]
    pub session_id: String,
}

/// Parameters for the submit tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SubmitRequest {
    /// Full utterance replacing the session buffer
    pub text: String,
    #[serde(default = "default_session")]
    pub session_id: String,
}

/// Parameters for the reset tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ResetRequest {
    #[serde(default = "default_session")]
    pub session_id: String,
}

/// Parameters for the add_tools tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddToolsRequest {
    /// Tool descriptors to register; entries without a name are skipped
    pub tools: Vec<ToolSpec>,
}

/// Parameters for the remove_tool tool
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RemoveToolRequest {
    /// Catalog name of the tool to remove
    pub name: String,
}

/// Separator tokens accepted either as a list or as a comma-separated
/// string.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum SeparatorTokens {
    List(Vec<String>),
    Csv(String),
}

impl SeparatorTokens {
    fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            Self::Csv(raw) => parse_separator_list(&raw),
        }
    }
}

/// Parameters for the configure tool; omitted fields keep their current
/// values
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct ConfigureRequest {
    /// Maximum suggestions per query (1-20)
    pub top_k: Option<usize>,
    /// Maximum intent windows per utterance (1-10)
    pub max_intents: Option<usize>,
    /// Minimum fused score for a tool to surface (>= 0)
    pub min_score: Option<f64>,
    /// Score fusion strategy: "max" or "sum"
    pub combine_strategy: Option<String>,
    /// Language codes whose stopword tables apply
    pub locales: Option<Vec<String>>,
    /// Separator tokens as a list or comma-separated string; empty restores
    /// the defaults
    pub intent_separator_tokens: Option<SeparatorTokens>,
}

/// MCP server for lexical tool suggestion
#[derive(Clone)]
pub struct SuggestServer {
    /// Engine behind an exclusive lock (single-threaded contract)
    engine: Arc<Mutex<SuggestionEngine>>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SuggestServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestServer").finish_non_exhaustive()
    }
}

#[tool_router]
impl SuggestServer {
    /// Create a server around a constructed engine.
    pub fn new(engine: SuggestionEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Append a text delta to a session buffer and return ranked tool suggestions for the accumulated text. Creates the session if it does not exist. Use while the user is still typing."
    )]
    async fn feed(
        &self,
        Parameters(FeedRequest { delta, session_id }): Parameters<FeedRequest>,
    ) -> std::result::Result<String, String> {
        let mut engine = self.engine.lock().await;
        let suggestions = engine.feed(&delta, &session_id);
        serde_json::to_string_pretty(&suggestions).map_err(|e| e.to_string())
    }

    #[tool(
        description = "Replace a session buffer with the full utterance and return ranked tool suggestions. Handles multilingual text and multiple intents joined by connectives."
    )]
    async fn submit(
        &self,
        Parameters(SubmitRequest { text, session_id }): Parameters<SubmitRequest>,
    ) -> std::result::Result<String, String> {
        let mut engine = self.engine.lock().await;
        let suggestions = engine.submit(&text, &session_id);
        serde_json::to_string_pretty(&suggestions).map_err(|e| e.to_string())
    }

    #[tool(description = "Drop a session and its accumulated text buffer. Idempotent.")]
    async fn reset(
        &self,
        Parameters(ResetRequest { session_id }): Parameters<ResetRequest>,
    ) -> std::result::Result<String, String> {
        self.engine.lock().await.reset(&session_id);
        Ok(format!("Session '{session_id}' reset"))
    }

    #[tool(description = "List the registered tool catalog.")]
    async fn list_catalog(&self) -> std::result::Result<String, String> {
        let engine = self.engine.lock().await;
        serde_json::to_string_pretty(&engine.catalog()).map_err(|e| e.to_string())
    }

    #[tool(
        description = "Register tool descriptors: name (required), description, keywords, aliases, locales, tags. Entries without a name are skipped."
    )]
    async fn add_tools(
        &self,
        Parameters(AddToolsRequest { tools }): Parameters<AddToolsRequest>,
    ) -> std::result::Result<String, String> {
        let count = tools.len();
        let mut engine = self.engine.lock().await;
        engine.add_tools(tools);
        Ok(format!(
            "Registered {count} tool(s); catalog now holds {}",
            engine.catalog().len()
        ))
    }

    #[tool(description = "Remove a tool from the catalog by name and rebuild the indexes.")]
    async fn remove_tool(
        &self,
        Parameters(RemoveToolRequest { name }): Parameters<RemoveToolRequest>,
    ) -> std::result::Result<String, String> {
        let mut engine = self.engine.lock().await;
        engine.remove_tool(&name);
        Ok(format!(
            "Removed '{name}'; catalog now holds {}",
            engine.catalog().len()
        ))
    }

    #[tool(
        description = "Update engine configuration (top_k, max_intents, min_score, combine_strategy, locales, intent_separator_tokens) and rebuild the engine over the current catalog. Omitted fields keep their values. Sessions are discarded."
    )]
    async fn configure(
        &self,
        Parameters(request): Parameters<ConfigureRequest>,
    ) -> std::result::Result<String, String> {
        let mut guard = self.engine.lock().await;
        let mut config = guard.config().clone();

        if let Some(top_k) = request.top_k {
            config.top_k = top_k;
        }
        if let Some(max_intents) = request.max_intents {
            config.max_intents = max_intents;
        }
        if let Some(min_score) = request.min_score {
            config.min_score = min_score;
        }
        if let Some(strategy) = request.combine_strategy {
            config.combine_strategy = strategy
                .parse()
                .map_err(|e: ConfigError| e.user_message())?;
        }
        if let Some(locales) = request.locales {
            config.locales = locales
                .iter()
                .map(|locale| locale.trim())
                .filter(|locale| !locale.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(separators) = request.intent_separator_tokens {
            let list = separators.into_list();
            config.intent_separator_tokens = if list.is_empty() { None } else { Some(list) };
        }

        // Swap wholesale: the engine is rebuilt over the existing catalog so
        // a validation failure leaves the running engine untouched.
        let tools: Vec<ToolSpec> = guard.catalog().into_iter().cloned().collect();
        let next = SuggestionEngine::new(tools, config).map_err(|e| e.user_message())?;
        *guard = next;

        tracing::info!("engine reconfigured");
        serde_json::to_string_pretty(guard.config()).map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for SuggestServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "suggest-mcp: lexical tool suggestion over a catalog of tool descriptors. \
                 Feed partial text with feed as the user types, or submit a full utterance; \
                 both return ranked, explained suggestions. Manage the catalog with \
                 add_tools/remove_tool and tune ranking with configure.",
            )
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// Returns `Cow::Borrowed` if no expansion is needed.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
