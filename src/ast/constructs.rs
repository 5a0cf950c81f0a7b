use crate::ast::TokenKind;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static INTERNAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^_[^_].*$").unwrap());

/// How a function call relates to the registry.
///
/// Decided once when the call node is created: names with exactly one
/// leading underscore (`_foo`, but not `__foo`) are library-internal and
/// bypass both the existence and the arity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTag {
    /// Normal call, validated against the registry
    Checked,
    /// Library-internal call, exempt from validation
    Internal,
}

impl CallTag {
    pub fn for_name(name: &str) -> CallTag {
        if INTERNAL_PATTERN.is_match(name) {
            CallTag::Internal
        } else {
            CallTag::Checked
        }
    }
}

/// Typed payload carried by a parse tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Construct {
    Null,
    Boolean(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Array literal marker. Not produced by the tree builder; reserved
    /// for the evaluation stage.
    Array,
    /// Function call; the node's children are its arguments.
    Function { name: String, tag: CallTag },
    /// Operator leaf. The original token kind is kept so the evaluator
    /// can dispatch without re-lexing the text.
    Symbol { text: String, kind: TokenKind },
    /// A `start..finish` range, standalone or as array-index sugar.
    Slice { start: i64, finish: i64 },
    /// Label half of a `key: value` pair; wraps the classified key.
    Label(Box<Construct>),
    /// Command-line variable `$name`, or the final `$` when `is_final`.
    Variable { name: String, is_final: bool },
    /// Instance variable `@name`.
    IVariable(String),
}

impl Construct {
    pub fn is_function(&self) -> bool {
        matches!(self, Construct::Function { .. })
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Null => write!(f, "null"),
            Construct::Boolean(b) => write!(f, "{}", b),
            Construct::Int(n) => write!(f, "{}", n),
            Construct::Double(n) => write!(f, "{}", n),
            Construct::String(s) => write!(f, "'{}'", s),
            Construct::Array => write!(f, "array"),
            Construct::Function { name, .. } => write!(f, "{}", name),
            Construct::Symbol { text, .. } => write!(f, "{}", text),
            Construct::Slice { start, finish } => write!(f, "{}..{}", start, finish),
            Construct::Label(inner) => write!(f, "{}:", inner),
            Construct::Variable { name, .. } => write!(f, "{}", name),
            Construct::IVariable(name) => write!(f, "{}", name),
        }
    }
}

/// Classify raw literal text into a typed construct.
///
/// `null`, `true`, and `false` are keywords; text that plausibly starts a
/// number is parsed as `i64` first and `f64` second; everything else is a
/// bare string. Signed prefixes produced by unary absorption classify
/// here (`"-2"` becomes `Int(-2)`).
pub fn resolve_construct(text: &str) -> Construct {
    match text {
        "null" => return Construct::Null,
        "true" => return Construct::Boolean(true),
        "false" => return Construct::Boolean(false),
        _ => {}
    }
    // Words like "inf" and "NaN" must stay strings, so only attempt a
    // numeric parse when the first character can start a number.
    if text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
    {
        if let Ok(n) = text.parse::<i64>() {
            return Construct::Int(n);
        }
        if let Ok(n) = text.parse::<f64>() {
            return Construct::Double(n);
        }
    }
    Construct::String(text.to_string())
}
