//! Analysis driver and phase orchestration

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::ast::Program;
use crate::common::{CompileError, DiagnosticReporter};
use crate::sema::{DesignatorResolver, SymbolCollector, SymbolTable, TypeChecker, TypeResolver};

/// The four analysis phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    SymbolConstruction,
    TypeResolution,
    DesignatorResolution,
    TypeChecking,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::SymbolConstruction,
        Phase::TypeResolution,
        Phase::DesignatorResolution,
        Phase::TypeChecking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::SymbolConstruction => "symbol construction",
            Phase::TypeResolution => "type resolution",
            Phase::DesignatorResolution => "designator resolution",
            Phase::TypeChecking => "type checking",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration options for one analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    /// Log phase summaries at info level instead of debug
    pub verbose: bool,
    /// Log the symbol table after the last phase that ran
    pub dump_symbols: bool,
    /// End the run after this phase even when it succeeds
    pub stop_after: Option<Phase>,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_dump_symbols(mut self, dump_symbols: bool) -> Self {
        self.dump_symbols = dump_symbols;
        self
    }

    pub fn with_stop_after(mut self, phase: Phase) -> Self {
        self.stop_after = Some(phase);
        self
    }
}

/// Errors of the phase that halted the analysis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{phase} failed with {} error(s)", .errors.len())]
pub struct PhaseFailure {
    pub phase: Phase,
    pub errors: Vec<CompileError>,
}

/// Outcome of an analysis run
#[derive(Debug)]
pub struct Analysis {
    /// Symbols, scopes and annotation maps, as far as the run got
    pub table: SymbolTable,
    /// Diagnostics of the halting phase, in discovery order
    pub diagnostics: Vec<CompileError>,
    /// Phase that reported errors, if any
    pub failed_phase: Option<Phase>,
    /// Last phase that ran
    pub last_phase: Phase,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.failed_phase.is_none()
    }

    /// Whether every phase ran without errors
    pub fn is_complete(&self) -> bool {
        self.is_ok() && self.last_phase == Phase::TypeChecking
    }

    /// Write the diagnostics through a reporter
    pub fn report(&self, reporter: &DiagnosticReporter, file_id: usize) {
        reporter.report_errors(file_id, &self.diagnostics);
    }

    pub fn into_result(self) -> Result<SymbolTable, PhaseFailure> {
        match self.failed_phase {
            Some(phase) => Err(PhaseFailure {
                phase,
                errors: self.diagnostics,
            }),
            None => Ok(self.table),
        }
    }
}

/// Analysis pipeline that runs the phases over one program
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the phases in order, stopping after the first one that reports
    /// errors
    #[instrument(skip_all)]
    pub fn run(&self, program: &Program) -> Analysis {
        let mut table = SymbolTable::new();
        let mut last_phase = Phase::SymbolConstruction;

        for phase in Phase::ALL {
            last_phase = phase;
            let errors = Self::run_phase(phase, &mut table, program);
            self.log_phase(phase, errors.len());

            if !errors.is_empty() {
                self.dump(&table);
                return Analysis {
                    table,
                    diagnostics: errors,
                    failed_phase: Some(phase),
                    last_phase,
                };
            }
            if self.config.stop_after == Some(phase) {
                break;
            }
        }

        self.dump(&table);
        Analysis {
            table,
            diagnostics: Vec::new(),
            failed_phase: None,
            last_phase,
        }
    }

    fn run_phase(phase: Phase, table: &mut SymbolTable, program: &Program) -> Vec<CompileError> {
        match phase {
            Phase::SymbolConstruction => SymbolCollector::new(table).collect(program),
            Phase::TypeResolution => TypeResolver::new(table).resolve(program),
            Phase::DesignatorResolution => DesignatorResolver::new(table).resolve(program),
            Phase::TypeChecking => TypeChecker::new(table).check(program),
        }
    }

    fn log_phase(&self, phase: Phase, errors: usize) {
        if self.config.verbose {
            info!(%phase, errors, "phase finished");
        } else {
            debug!(%phase, errors, "phase finished");
        }
    }

    fn dump(&self, table: &SymbolTable) {
        if self.config.dump_symbols {
            debug!("symbol table:\n{}", table);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Run every phase with the default configuration
pub fn analyze(program: &Program) -> Analysis {
    Pipeline::new().run(program)
}
