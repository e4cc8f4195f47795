//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, NoColor, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;

/// Semantic diagnostic with source location
///
/// One variant per error class. Everything except `Structure` is
/// recoverable: a phase collects as many as it finds and the pipeline stops
/// before the next phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Structural error at {span}: {message}")]
    Structure { message: String, span: Span },

    #[error("Declaration error at {span}: {message}")]
    Declaration { message: String, span: Span },

    #[error("Type resolution error at {span}: {message}")]
    TypeResolution { message: String, span: Span },

    #[error("Name resolution error at {span}: {message}")]
    Designator { message: String, span: Span },

    #[error("Type error at {span}: {message}")]
    Type { message: String, span: Span },
}

/// Error class without the payload, handy for matching in callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structure,
    Declaration,
    TypeResolution,
    Designator,
    Type,
}

impl CompileError {
    pub fn structure(message: impl Into<String>, span: Span) -> Self {
        Self::Structure {
            message: message.into(),
            span,
        }
    }

    pub fn declaration(message: impl Into<String>, span: Span) -> Self {
        Self::Declaration {
            message: message.into(),
            span,
        }
    }

    pub fn type_resolution(message: impl Into<String>, span: Span) -> Self {
        Self::TypeResolution {
            message: message.into(),
            span,
        }
    }

    pub fn designator(message: impl Into<String>, span: Span) -> Self {
        Self::Designator {
            message: message.into(),
            span,
        }
    }

    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::Type {
            message: message.into(),
            span,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Structure { .. } => ErrorKind::Structure,
            CompileError::Declaration { .. } => ErrorKind::Declaration,
            CompileError::TypeResolution { .. } => ErrorKind::TypeResolution,
            CompileError::Designator { .. } => ErrorKind::Designator,
            CompileError::Type { .. } => ErrorKind::Type,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Structure { message, .. }
            | CompileError::Declaration { message, .. }
            | CompileError::TypeResolution { message, .. }
            | CompileError::Designator { message, .. }
            | CompileError::Type { message, .. } => message,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::Structure { span, .. }
            | CompileError::Declaration { span, .. }
            | CompileError::TypeResolution { span, .. }
            | CompileError::Designator { span, .. }
            | CompileError::Type { span, .. } => *span,
        }
    }

    fn title(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Structure => "Structural error",
            ErrorKind::Declaration => "Declaration error",
            ErrorKind::TypeResolution => "Unresolved type",
            ErrorKind::Designator => "Name resolution error",
            ErrorKind::Type => "Type error",
        }
    }
}

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    fn to_diagnostic(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(error.title())
            .with_labels(vec![
                Label::primary(file_id, error.span().range()).with_message(error.message())
            ])
    }

    fn emit(&self, writer: &mut dyn WriteColor, file_id: usize, errors: &[CompileError]) {
        for error in errors {
            let diagnostic = Self::to_diagnostic(file_id, error);
            let _ = term::emit(writer, &self.config, &self.files, &diagnostic);
        }
    }

    /// Write every error to stderr
    pub fn report_errors(&self, file_id: usize, errors: &[CompileError]) {
        let stream = StandardStream::stderr(ColorChoice::Auto);
        self.emit(&mut stream.lock(), file_id, errors);
    }

    /// Render every error without colors
    pub fn render(&self, file_id: usize, errors: &[CompileError]) -> String {
        let mut buffer = NoColor::new(Vec::new());
        self.emit(&mut buffer, file_id, errors);
        String::from_utf8_lossy(&buffer.into_inner()).into_owned()
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
