//! Common infrastructure shared by every analysis phase

mod error;
mod span;

pub use error::{CompileError, DiagnosticReporter, ErrorKind};
pub use span::Span;
