pub mod ast;
pub mod compiler;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod preprocessor;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{
    CallTag, Construct, NodeId, ParseTree, Target, Token, TokenKind, resolve_construct,
};
pub use compiler::{CompiledScript, compile, compile_fragment, compile_source};
pub use error::CompileError;
pub use functions::{Arity, FunctionMap, FunctionRegistry};
pub use lexer::lex;
pub use output::{to_json, to_text};
pub use preprocessor::{Script, preprocess};
