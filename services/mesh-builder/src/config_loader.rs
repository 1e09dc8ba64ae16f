//! Mesh configuration loading.
//!
//! Reads a mesh configuration from a YAML or JSON file, chosen by file
//! extension, after substituting environment variables written as
//! `${VAR}` or `${VAR:-default}`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mesh_generation::MeshConfig;

/// Serialization format of a configuration or mesh file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Format implied by the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => anyhow::bail!(
                "Cannot tell the format of {:?}: expected a .yaml, .yml or .json file",
                path
            ),
        }
    }
}

/// Load, expand and validate a mesh configuration file.
///
/// Environment overrides (`MESH_SPLIT_DEPTH`, `MESH_MIN_DATAPOINTS`) are
/// applied before validation.
pub fn load_mesh_config<P: AsRef<Path>>(path: P) -> Result<MeshConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mesh config from {:?}", path))?;

    let mut config = parse_mesh_config(&content, format)
        .with_context(|| format!("Failed to parse mesh config from {:?}", path))?;

    config.apply_env_overrides();
    config
        .validate()
        .with_context(|| format!("Invalid mesh config in {:?}", path))?;

    Ok(config)
}

/// Parse configuration text in the given format.
pub fn parse_mesh_config(content: &str, format: ConfigFormat) -> Result<MeshConfig> {
    let expanded = expand_env_vars(content)?;

    // Both formats go through a JSON value so that documents wrapped in
    // `mesh_info` load the same way.
    let value: serde_json::Value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&expanded)?,
        ConfigFormat::Json => serde_json::from_str(&expanded)?,
    };

    Ok(MeshConfig::from_value(&value)?)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Tests
// ============================================================================
