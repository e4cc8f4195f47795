//! Contractc - semantic front end for a small statically typed contract language
//!
//! This library takes the syntax tree of one contract and decides whether it
//! is well formed, producing a symbol table and annotation maps for later
//! stages.
//!
//! ## Architecture
//!
//! The analysis is organized into:
//! - **AST** (`ast/`): Syntax tree consumed by the analysis, plus a builder
//! - **Semantic analysis** (`sema/`): Symbol table and the four phases
//! - **Driver** (`driver/`): Phase ordering, gating and configuration
//! - **Common** (`common/`): Shared infrastructure (errors, spans)
//!
//! ## Example
//!
//! ```
//! use contract_compiler::ast::TreeBuilder;
//! use contract_compiler::analyze;
//!
//! let b = TreeBuilder::new();
//! let contract = b.contract("Counter").with_field(b.field(b.ty("int"), "count", Some(b.int(0))));
//! let analysis = analyze(&b.program(Some(contract)));
//! assert!(analysis.is_complete());
//! ```

pub mod common;
pub mod ast;
pub mod sema;
pub mod driver;

// Re-exports for convenience
pub use common::{CompileError, DiagnosticReporter, ErrorKind, Span};
pub use driver::{analyze, Analysis, AnalysisConfig, Phase, PhaseFailure, Pipeline};
pub use sema::SymbolTable;
