//! Semantic analysis module
//!
//! Four phases share one [`SymbolTable`]:
//! 1. [`SymbolCollector`] declares every entity and checks identifiers
//! 2. [`TypeResolver`] resolves type annotations
//! 3. [`DesignatorResolver`] binds name references to declarations
//! 4. [`TypeChecker`] enforces the compatibility rules and types expressions
//!
//! Each phase returns the errors it found; the driver decides whether the
//! next one runs.

mod scope;
mod symbol;
mod table;
mod collect;
mod resolve;
mod designate;
mod typeck;

pub use scope::{Scope, ScopeId, ScopeKind, SymbolId};
pub use symbol::{BasicType, ContractInfo, FunctionInfo, Name, Symbol, SymbolKind};
pub use table::{SymbolTable, CONSTRUCTOR_NAME};
pub use collect::{SymbolCollector, RESERVED_KEYWORDS};
pub use resolve::{TypeResolver, MAX_RETURN_VALUES};
pub use designate::DesignatorResolver;
pub use typeck::TypeChecker;
