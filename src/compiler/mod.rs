//! The semantic core of the assembler.
//!
//! Statements arrive already split into their fields.  The
//! [`processing`] layer decides how each statement's operands are read,
//! hands machine and assembler instructions to the processors which update
//! the ordinal [`context`], and collects macro definitions.  Symbols which
//! are used before they are defined are tracked by the ordinal context; the
//! statements waiting on them are replayed once they are defined.
//!
//! Input errors never stop processing.  Every component records a
//! [`diagnostics::Diagnostic`] and continues with the next statement; a
//! panic always means a broken internal contract.

pub mod context;
pub mod diagnostics;
mod error;
pub mod expressions;
pub mod instructions;
pub mod processing;
pub mod semantics;
pub mod source;
pub mod stringtable;

pub use error::{CompilerDisplay, CompilerDisplayError};
pub use stringtable::{StringId, StringTable};
