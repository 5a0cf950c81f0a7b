use crate::ast::Target;
use std::fmt;

/// The single error family for the whole front end.
///
/// Every stage aborts its current unit on the first violation; there is
/// no warning tier and no partial output. The message templates are part
/// of the user-facing contract and are stable.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub target: Target,
}

impl CompileError {
    pub fn new(message: impl Into<String>, target: Target) -> Self {
        CompileError {
            message: message.into(),
            target,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.target)
    }
}

impl std::error::Error for CompileError {}
