//! Shared catalog fixtures for integration tests.

use suggest_mcp::{EngineConfig, SuggestionEngine, ToolSpec};

/// Build a tool spec from its parts.
#[allow(dead_code)] // Helpers used across different integration test crates
pub fn tool(name: &str, description: &str, keywords: &[&str], aliases: &[&str]) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: Some(description.to_string()),
        keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
        aliases: aliases.iter().map(|s| (*s).to_string()).collect(),
        ..ToolSpec::default()
    }
}

/// Single-tool catalog used by the prefix-completion scenarios.
#[allow(dead_code)]
pub fn export_catalog() -> Vec<ToolSpec> {
    vec![tool(
        "export_csv",
        "Exporta dados para CSV",
        &["exportar", "csv", "arquivo"],
        &[],
    )]
}

/// Two-tool catalog with rich keywords for free-text scenarios.
#[allow(dead_code)]
pub fn free_text_catalog() -> Vec<ToolSpec> {
    vec![
        tool(
            "export_csv",
            "Exporta dados tabulares",
            &["exportar", "csv", "tabela", "dados"],
            &["gerar csv", "baixar csv"],
        ),
        tool("plot_chart", "Mostra graficos", &["grafico", "plotar"], &[]),
    ]
}

/// Four-tool catalog for multi-intent scenarios; `multi_tool` spans two
/// intents.
#[allow(dead_code)]
pub fn multi_intent_catalog() -> Vec<ToolSpec> {
    vec![
        tool(
            "export_csv",
            "Exporta dados para arquivos csv",
            &["exportar", "csv", "arquivo"],
            &[],
        ),
        tool(
            "create_report",
            "Gera relatorios automatizados",
            &["relatorio", "relatorio mensal", "gerar relatorio"],
            &[],
        ),
        tool(
            "send_email",
            "Envia emails com anexos",
            &["email", "enviar", "mensagem"],
            &[],
        ),
        tool(
            "multi_tool",
            "Exporta e gera relatorios no mesmo fluxo",
            &["exportar", "relatorio"],
            &[],
        ),
    ]
}

/// Engine over `tools` with the default configuration.
#[allow(dead_code)]
pub fn engine(tools: Vec<ToolSpec>) -> SuggestionEngine {
    SuggestionEngine::new(tools, EngineConfig::default()).expect("default config is valid")
}

/// Engine over `tools` with a caller-tweaked configuration.
#[allow(dead_code)]
pub fn engine_with(tools: Vec<ToolSpec>, config: EngineConfig) -> SuggestionEngine {
    SuggestionEngine::new(tools, config).expect("test config is valid")
}
