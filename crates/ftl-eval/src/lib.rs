//! ftl-eval - Evaluation of parsed Fluent resources.
//!
//! This crate turns the AST built by `ftl-par` into formatted strings. It
//! owns the per-call [`EvaluationContext`] (variables, functions and the
//! parent stack used for cycle detection), the typed function registry with
//! its declaration builder, and the tree-walking evaluator itself.

pub mod context;
pub mod evaluator;
pub mod functions;

pub use context::{ContextBuilder, ContextInit, EvaluationContext, StackEntry};
pub use evaluator::{evaluate_attribute, evaluate_entry, evaluate_expression, evaluate_pattern};
pub use functions::{FluentFunction, FunctionBuilder, FunctionRegistry, Parameter};
