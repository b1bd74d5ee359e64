//! Diagnostics raised while processing statements.  Every component reports
//! an input error as a [`Diagnostic`]: a typed [`DiagCode`], the message
//! arguments, and the source [`Range`] it applies to.  Rendering the final
//! message is left to a [`Writer`].
//!
//! Components collect their own diagnostics and hand them over when the
//! driving loop asks for them, so a failed statement never interrupts the
//! processing of the statements after it.
use serde::Serialize;

use super::source::Range;

mod logger;
mod tests;

pub use logger::Logger;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Every diagnostic the core can raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagCode {
    UndefinedSymbol,
    DuplicateSymbolicParameter,
    UnknownKeywordParameter,
    SymbolRedefinition,
    CircularDependency,
    MissingMacroName,
    InvalidPrototypeVariable,
    IllegalPrototypeLabel,
    DuplicateSequenceSymbol,
    UnterminatedMacro,
    InvalidPrototypeOperand,
    UndefinedOperationCode,
    EquWithoutLabel,
    InvalidStorageLength,
    InvalidExpression,
    OperandCount,
    RegisterOutOfRange,
    DisplacementOutOfRange,
    ImmediateOutOfRange,
    LengthOutOfRange,
    OperandKind,
}

impl DiagCode {
    /// The catalog code of this diagnostic
    pub fn code(&self) -> &'static str {
        use DiagCode::*;
        match self {
            UndefinedSymbol => "E010",
            DuplicateSymbolicParameter => "E011",
            UnknownKeywordParameter => "E014",
            SymbolRedefinition => "E031",
            CircularDependency => "E033",
            MissingMacroName => "E042",
            InvalidPrototypeVariable => "E043",
            IllegalPrototypeLabel => "E044",
            DuplicateSequenceSymbol => "E045",
            UnterminatedMacro => "E046",
            InvalidPrototypeOperand => "E047",
            UndefinedOperationCode => "E049",
            EquWithoutLabel => "E053",
            InvalidStorageLength => "A010",
            InvalidExpression => "CE001",
            OperandCount => "M000",
            RegisterOutOfRange => "M001",
            DisplacementOutOfRange => "M002",
            ImmediateOutOfRange => "M003",
            LengthOutOfRange => "M004",
            OperandKind => "M005",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagCode::UnknownKeywordParameter => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// A one line summary used when no message catalog is attached
    pub fn summary(&self) -> &'static str {
        use DiagCode::*;
        match self {
            UndefinedSymbol => "Undefined symbol",
            DuplicateSymbolicParameter => "Symbolic parameter already defined",
            UnknownKeywordParameter => "Keyword parameter not declared in prototype",
            SymbolRedefinition => "Symbol already defined",
            CircularDependency => "Circular dependency",
            MissingMacroName => "Macro name missing from prototype",
            InvalidPrototypeVariable => "Invalid variable symbol in macro prototype",
            IllegalPrototypeLabel => "Illegal name field in macro prototype",
            DuplicateSequenceSymbol => "Sequence symbol already defined",
            UnterminatedMacro => "Macro definition not terminated by MEND",
            InvalidPrototypeOperand => "Invalid macro prototype operand",
            UndefinedOperationCode => "Operation code not found",
            EquWithoutLabel => "EQU requires a label",
            InvalidStorageLength => "Invalid storage length",
            InvalidExpression => "Invalid expression",
            OperandCount => "Wrong number of operands",
            RegisterOutOfRange => "Register operand out of range",
            DisplacementOutOfRange => "Displacement out of range",
            ImmediateOutOfRange => "Immediate operand out of range",
            LengthOutOfRange => "Length operand out of range",
            OperandKind => "Operand has the wrong form",
        }
    }
}

impl std::fmt::Display for DiagCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub args: Vec<String>,
    pub range: Range,
}

impl Diagnostic {
    pub fn new(code: DiagCode, range: Range) -> Diagnostic {
        Diagnostic {
            code,
            args: vec![],
            range,
        }
    }

    pub fn with_args(code: DiagCode, args: Vec<String>, range: Range) -> Diagnostic {
        Diagnostic { code, args, range }
    }

    /// Renders the summary followed by any message arguments
    pub fn message(&self) -> String {
        if self.args.is_empty() {
            self.code.summary().into()
        } else {
            format!("{}: {}", self.code.summary(), self.args.join(", "))
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{} {}: {}",
            self.range,
            self.code,
            self.message()
        ))
    }
}

/// Implemented by every component that collects diagnostics between the
/// points where the driving loop drains them.
pub trait Diagnosable {
    fn diags_mut(&mut self) -> &mut Vec<Diagnostic>;

    fn add_diagnostic(&mut self, diag: Diagnostic) {
        self.diags_mut().push(diag)
    }

    /// Removes and returns everything collected so far
    fn take_diags(&mut self) -> Vec<Diagnostic> {
        std::mem::take(self.diags_mut())
    }
}

/// Defines a way for the [`Logger`] to write diagnostics to the user.
pub trait Writer {
    /// Write one diagnostic
    fn write_diagnostic(&self, diag: &Diagnostic);

    /// Called once after the last diagnostic has been written
    fn finish(&self) {}
}
