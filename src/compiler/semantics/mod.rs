//! The semantic model of a statement: its label, operation and operand fields,
//! variable symbol references, and the concatenation chains which describe
//! text built by substitution.

mod concatenation;
mod statement;
mod tests;
mod variable_symbol;

pub use concatenation::{clear_concat_chain, concat_chain_to_string, ConcatChain, ConcatPoint};
pub use statement::{
    DeferredStatement, InstructionField, Label, MachineOperand, Operand, ResolvedStatement,
    SequenceSymbol, Statement,
};
pub use variable_symbol::{VariableName, VariableSymbol};
