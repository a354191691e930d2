//! Runtime tool path resolution
//!
//! For each external tool (e.g. `amf-adm`) we:
//! 1. Check for an environment variable `{TOOL}_BIN` (e.g. `AMF_ADM_BIN`),
//!    with the tool name uppercased and `-` mapped to `_`
//! 2. Fall back to PATH-based invocation if the envvar is not set
//!
//! This lets packaging point at exact binaries while development machines
//! keep using whatever is on PATH. Tests override the envvar to mock a tool.

use std::env;

/// Environment variable consulted for a tool
pub fn tool_env_var(tool: &str) -> String {
    format!("{}_BIN", tool.to_uppercase().replace('-', "_"))
}

/// Get the path to an external tool
///
/// Returns the value of `{TOOL}_BIN` when set, otherwise the tool name itself.
pub fn get_tool_path(tool: &str) -> String {
    env::var(tool_env_var(tool)).unwrap_or_else(|_| tool.to_string())
}

/// Like `get_tool_path`, but a configured path wins over the environment
pub fn resolve_tool(tool: &str, configured: Option<&str>) -> String {
    match configured {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => get_tool_path(tool),
    }
}

/// Common tool names
pub mod tools {
    pub const AMF_ADM: &str = "amf-adm";
    pub const IMMADM: &str = "immadm";
}
