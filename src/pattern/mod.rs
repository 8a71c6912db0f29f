//! Phrase template compilation.
//!
//! A template like `"say hello (to my little) friend"` is tokenized into a
//! small AST (`ast`) and then compiled into an anchored, case-insensitive
//! matcher (`compile`). Templates support `:name` single-token parameters,
//! `*name` greedy splat parameters, and `(optional words)` segments.

pub mod ast;
pub mod compile;

pub use ast::Node;
pub use compile::Matcher;
