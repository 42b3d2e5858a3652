//! ftl-util - Foundation types shared across the ftl pipeline.
//!
//! This crate provides the source-provenance types every AST node carries
//! ([`TokenRange`], [`SourceRange`]) and the error enum surfaced by every
//! stage of the library ([`Error`]).

pub mod error;
pub mod span;

pub use error::{Error, Result};
pub use span::{Located, SourcePos, SourceRange, TokenRange};

// Re-export commonly used hash containers so downstream crates agree on the
// hasher without each depending on rustc-hash directly.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
