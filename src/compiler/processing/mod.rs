//! Statement processors and the loop which drives them.
//!
//! A processor receives one statement at a time from the
//! [`ProcessingManager`].  Before a statement is handed over, the active
//! processor decides how its operands are to be read
//! ([`StatementProcessor::get_processing_status`]).  Open code is handled by
//! the [`OrdinaryProcessor`]; a macro definition pushes a
//! [`MacrodefProcessor`] which collects statements until the matching MEND.

mod asm_processor;
mod checker;
mod mach_processor;
mod macrodef_processor;
mod manager;
mod ordinary_processor;
mod processor;
mod reparser;
mod tests;

pub use asm_processor::AsmProcessor;
pub use mach_processor::MachProcessor;
pub use macrodef_processor::MacrodefProcessor;
pub use manager::{ProcessingManager, ProcessingState};
pub use ordinary_processor::OrdinaryProcessor;
pub use processor::{MacrodefStartData, ProcessingStateListener, StatementProcessor};
pub use reparser::{
    parse_instruction, parse_label, resolve_statement, ReparseResult, SimpleFieldReparser,
    StatementFieldReparser,
};

use super::stringtable::StringId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessingKind {
    Ordinary,
    Macro,
}

/// The format the operand field of a statement is read in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessingForm {
    Mach,
    Asm,
    Mac,
    Ca,
    Deferred,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandOccurrence {
    Present,
    Absent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessingFormat {
    pub kind: ProcessingKind,
    pub form: ProcessingForm,
    pub occurrence: OperandOccurrence,
}

impl ProcessingFormat {
    pub fn new(kind: ProcessingKind, form: ProcessingForm) -> ProcessingFormat {
        ProcessingFormat {
            kind,
            form,
            occurrence: OperandOccurrence::Present,
        }
    }

    pub fn with_occurrence(
        kind: ProcessingKind,
        form: ProcessingForm,
        occurrence: OperandOccurrence,
    ) -> ProcessingFormat {
        ProcessingFormat {
            kind,
            form,
            occurrence,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionType {
    Undef,
    Ca,
    Mach,
    Asm,
    Mac,
}

impl Default for InstructionType {
    fn default() -> Self {
        InstructionType::Undef
    }
}

/// The operation code of a statement once it has been looked up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCode {
    pub value: Option<StringId>,
    pub ty: InstructionType,
}

impl OpCode {
    pub fn new(value: StringId, ty: InstructionType) -> OpCode {
        OpCode {
            value: Some(value),
            ty,
        }
    }
}

pub type ProcessingStatus = (ProcessingFormat, OpCode);

/// Where statements come from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementProviderKind {
    Macro,
    Copy,
    Open,
}
