//! # MScript - syntax tree types
//!
//! Data model shared by the lexer, preprocessor, and tree builder:
//!
//! - **[tokens]** - lexical tokens and source positions
//! - **[constructs]** - typed node payloads and the literal classifier
//! - **[tree]** - the arena-backed rooted parse tree
//!
//! ## Core concepts
//!
//! An MScript file is a list of aliases. Each alias has a trigger on the
//! left of an `=` and a body of code on the right:
//!
//! ```text
//! /greet $who = msg(concat('hello ', $who))
//! ```
//!
//! The front end turns the body into a rooted tree of [`Construct`]
//! nodes. No operator precedence is resolved here: symbols pass through
//! as leaves for a later evaluation stage to order.

pub mod constructs;
pub mod tokens;
pub mod tree;

pub use constructs::{resolve_construct, CallTag, Construct};
pub use tokens::{Target, Token, TokenKind};
pub use tree::{NodeId, ParseTree};
