//! Function registry consulted by the tree builder.
//!
//! The builder only needs two facts about a function: whether the name
//! exists and which argument counts it accepts. Anything else (actual
//! behavior, return types) belongs to the evaluation stage and is out of
//! scope here.

use std::collections::HashMap;

/// One accepted argument count for a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Accepts any number of arguments.
    Unbounded,
}

impl Arity {
    pub fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => n == argc,
            Arity::Unbounded => true,
        }
    }
}

/// What the tree builder asks of the surrounding library.
///
/// Registries must be immutable for the duration of a compile; the
/// builder checks existence when it sees a call and arity when the call
/// closes, and both checks must agree.
pub trait FunctionRegistry: Sync {
    fn exists(&self, name: &str) -> bool;

    /// Accepted argument counts for `name`; empty when unknown.
    fn accepted_arities(&self, name: &str) -> Vec<Arity>;
}

/// A plain name-to-arity table.
#[derive(Debug, Clone, Default)]
pub struct FunctionMap {
    entries: HashMap<String, Vec<Arity>>,
}

impl FunctionMap {
    pub fn new() -> Self {
        FunctionMap::default()
    }

    /// Register `name` with its accepted arities, replacing any previous
    /// registration.
    pub fn define(&mut self, name: impl Into<String>, arities: Vec<Arity>) -> &mut Self {
        self.entries.insert(name.into(), arities);
        self
    }

    /// The baseline table every embedding needs.
    ///
    /// `p` is the identity wrapper the lexer and builder synthesize, and
    /// `__autoconcat__` is the adjacency wrapper, so both must always
    /// resolve. The rest is a small convenience set; embeddings with a
    /// real library should build their own map.
    pub fn standard() -> Self {
        let mut map = FunctionMap::new();
        map.define("p", vec![Arity::Unbounded])
            .define("__autoconcat__", vec![Arity::Unbounded])
            .define("array_get", vec![Arity::Exact(2)])
            .define("array_set", vec![Arity::Exact(3)])
            .define("array", vec![Arity::Unbounded])
            .define("concat", vec![Arity::Unbounded])
            .define("msg", vec![Arity::Unbounded])
            .define("die", vec![Arity::Exact(0), Arity::Exact(1)])
            .define("if", vec![Arity::Exact(2), Arity::Exact(3)])
            .define("equals", vec![Arity::Exact(2)])
            .define("add", vec![Arity::Exact(2)])
            .define("subtract", vec![Arity::Exact(2)])
            .define("data_values", vec![Arity::Exact(1)])
            .define("player", vec![Arity::Exact(0)]);
        map
    }
}

impl FunctionRegistry for FunctionMap {
    fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn accepted_arities(&self, name: &str) -> Vec<Arity> {
        self.entries.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_map_resolves_synthetic_wrappers() {
        let map = FunctionMap::standard();
        assert!(map.exists("p"));
        assert!(map.exists("__autoconcat__"));
        assert!(!map.exists("no_such_function"));
    }

    #[test]
    fn arity_matching() {
        let map = FunctionMap::standard();
        let arities = map.accepted_arities("if");
        assert!(arities.iter().any(|a| a.accepts(2)));
        assert!(arities.iter().any(|a| a.accepts(3)));
        assert!(!arities.iter().any(|a| a.accepts(4)));
    }
}
