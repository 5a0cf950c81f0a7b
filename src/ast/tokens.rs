use std::fmt;
use std::sync::Arc;

/// Source position attached to every token and compile error.
///
/// `source` is an identifier for the compilation unit (usually a file
/// name), shared rather than copied because every token carries a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub line: usize,
    pub column: usize,
    pub source: Option<Arc<str>>,
}

impl Target {
    pub fn new(line: usize, column: usize, source: Option<Arc<str>>) -> Self {
        Target {
            line,
            column,
            source,
        }
    }

    /// Sentinel target for synthetic tokens and nodes.
    pub fn unknown() -> Self {
        Target {
            line: 0,
            column: 0,
            source: None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(s) => write!(f, "{}:{}.{}", s, self.line, self.column),
            None => write!(f, "{}.{}", self.line, self.column),
        }
    }
}

/// Token kinds produced by the lexer.
///
/// `Unknown` is the pre-classification kind for bare words; the post-lex
/// normalization pass replaces every `Unknown` with one of `Command`,
/// `Separator`, `Variable`, `IVariable`, `FinalVar`, or `Lit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unclassified bare word (only before normalization)
    Unknown,
    /// Plain literal: number, boolean, null, or bare string
    Lit,
    /// Single-quoted string, escapes already resolved
    String,
    /// Command word beginning with `/`
    Command,
    /// Command-line variable `$name`
    Variable,
    /// Instance variable `@name`
    IVariable,
    /// The final-variable marker, a bare `$`
    FinalVar,
    /// Function name, always immediately before `FuncStart`
    FuncName,
    /// `(`
    FuncStart,
    /// `)`
    FuncEnd,
    /// `[`
    LSquareBracket,
    /// `]`
    RSquareBracket,
    /// `=` inside an option variable (`[$var=default]`)
    OptVarAssign,
    /// `=` separating an alias trigger from its body
    AliasEnd,
    /// `,`
    Comma,
    /// `..`
    Slice,
    /// `.`, `->`, or `::`
    Deref,
    /// `:` between a label and its value
    LabelSep,
    /// `\n`
    Newline,
    /// Standalone `\`, the explicit line-continuation marker
    Separator,
    /// `>>>`
    MultilineStart,
    /// `<<<`
    MultilineEnd,

    // Operators. No precedence is assigned at this layer; they pass
    // through the tree builder as plain symbol leaves.
    Plus,
    Minus,
    Mult,
    Div,
    Modulo,
    Increment,
    Decrement,
    Gt,
    Lt,
    Gte,
    Lte,
    Equals,
    NotEquals,
    StrictEquals,
    StrictNotEquals,
    LogicalAnd,
    LogicalOr,
    LogicalNot,
    BitAnd,
    BitOr,
    BitXor,
}

impl TokenKind {
    /// True for every operator kind.
    pub fn is_symbol(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Plus | Minus
                | Mult
                | Div
                | Modulo
                | Increment
                | Decrement
                | Gt
                | Lt
                | Gte
                | Lte
                | Equals
                | NotEquals
                | StrictEquals
                | StrictNotEquals
                | LogicalAnd
                | LogicalOr
                | LogicalNot
                | BitAnd
                | BitOr
                | BitXor
        )
    }

    /// Operators that can act as a unary prefix. `Plus` and `Minus`
    /// qualify because of signed literals; everything else in
    /// `is_symbol` is binary-only.
    pub fn is_unary(self) -> bool {
        use TokenKind::*;
        matches!(self, Increment | Decrement | LogicalNot | Plus | Minus)
    }

    pub fn is_plus_minus(self) -> bool {
        matches!(self, TokenKind::Plus | TokenKind::Minus)
    }

    /// Value-like kinds. Used to tell a subtraction (`a - 1`) apart from
    /// a signed literal (`= -1`) during unary sign absorption.
    pub fn is_identifier(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Unknown | Lit | String | Command | Variable | IVariable | FinalVar
        )
    }
}

/// One lexed token: kind, raw text, and source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub target: Target,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, target: Target) -> Self {
        Token {
            kind,
            value: value.into(),
            target,
        }
    }

    pub fn val(&self) -> &str {
        &self.value
    }
}
