//! Compile source files and fragments on behalf of the binary.

use super::CliError;
use crate::compiler::{compile_fragment, compile_source};
use crate::functions::FunctionMap;
use crate::output::{to_json, to_text};
use std::sync::Arc;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Source text of a whole compilation unit
    pub source: String,
    /// Name used in error positions (usually the file name)
    pub name: Option<String>,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Compilation passed; carries the number of alias definitions found
    Compiled(usize),
}

/// Compile a whole source file against the standard function table.
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let source = options.name.as_deref().map(Arc::from);
    let scripts = compile_source(&options.source, source, &FunctionMap::standard())?;
    Ok(CheckResult::Compiled(scripts.len()))
}

/// Output format for the ast command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AstFormat {
    /// Call notation on one line
    #[default]
    Text,
    /// Compact JSON
    Json,
    /// Indented JSON
    PrettyJson,
}

/// Options for the ast command
#[derive(Debug, Clone, Default)]
pub struct AstOptions {
    /// A bare code fragment, compiled without alias structure
    pub fragment: String,
    pub format: AstFormat,
}

/// Compile one fragment and render its tree.
pub fn execute_ast(options: &AstOptions) -> Result<String, CliError> {
    let tree = compile_fragment(&options.fragment, None, &FunctionMap::standard())?;
    let rendered = match options.format {
        AstFormat::Text => to_text(&tree),
        AstFormat::Json => to_json(&tree).to_string(),
        AstFormat::PrettyJson => serde_json::to_string_pretty(&to_json(&tree))
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?,
    };
    Ok(rendered)
}
