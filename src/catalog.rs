//! Tool catalog loading.

use crate::error::CatalogError;
use crate::types::ToolSpec;
use std::path::Path;

/// Load a catalog from a JSON file containing an array of tool specs.
pub fn load_tools(path: &Path) -> Result<Vec<ToolSpec>, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tools: Vec<ToolSpec> = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), tools = tools.len(), "loaded tool catalog");
    Ok(tools)
}

/// Built-in fallback catalog used when no catalog file is supplied.
pub fn sample_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "export_csv".to_string(),
            description: Some("Exporta dados para arquivo CSV".to_string()),
            keywords: ["exportar", "csv", "salvar", "dados", "planilha"]
                .map(String::from)
                .to_vec(),
            aliases: ["baixar csv", "gerar csv"].map(String::from).to_vec(),
            locales: ["pt", "en"].map(String::from).to_vec(),
            tags: ["data", "io"].map(String::from).to_vec(),
        },
        ToolSpec {
            name: "send_email".to_string(),
            description: Some("Envia email com anexos".to_string()),
            keywords: ["enviar", "email", "mensagem", "correio"]
                .map(String::from)
                .to_vec(),
            aliases: ["mandar email"].map(String::from).to_vec(),
            locales: ["pt", "en"].map(String::from).to_vec(),
            tags: ["communication"].map(String::from).to_vec(),
        },
    ]
}
