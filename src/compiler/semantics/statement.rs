use crate::compiler::{
    expressions::MachExpr, processing::OpCode, source::Range, stringtable::StringId,
};

use super::{ConcatChain, VariableSymbol};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceSymbol {
    pub name: StringId,
    pub range: Range,
}

/// The name field of a statement
#[derive(Clone, Debug, PartialEq)]
pub enum Label {
    Empty,
    Ordinary(StringId, Range),
    Sequence(SequenceSymbol),
    Variable(VariableSymbol),
    Concat(ConcatChain, Range),
}

impl Label {
    pub fn range(&self) -> Option<Range> {
        match self {
            Label::Empty => None,
            Label::Ordinary(_, r) | Label::Concat(_, r) => Some(*r),
            Label::Sequence(s) => Some(s.range),
            Label::Variable(v) => Some(v.range),
        }
    }
}

/// The operation field of a statement
#[derive(Clone, Debug, PartialEq)]
pub enum InstructionField {
    Empty(Range),
    Ordinary(StringId, Range),

    /// The operation is built by substitution and is only known once the
    /// statement is expanded.
    Concat(ConcatChain, Range),
}

impl InstructionField {
    pub fn range(&self) -> Range {
        match self {
            InstructionField::Empty(r)
            | InstructionField::Ordinary(_, r)
            | InstructionField::Concat(_, r) => *r,
        }
    }
}

/// Operand of a machine instruction
#[derive(Clone, Debug, PartialEq)]
pub enum MachineOperand {
    Expr(MachExpr),

    /// `D(X,B)`, `D(L,B)` or `D(B)`. The first register slot is `None` for
    /// `D(,B)`.
    Address {
        displacement: MachExpr,
        first: Option<MachExpr>,
        second: Option<MachExpr>,
    },
}

impl MachineOperand {
    pub fn expressions(&self) -> Vec<&MachExpr> {
        match self {
            MachineOperand::Expr(e) => vec![e],
            MachineOperand::Address {
                displacement,
                first,
                second,
            } => std::iter::once(displacement)
                .chain(first.iter())
                .chain(second.iter())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Empty(Range),
    Machine(MachineOperand, Range),

    /// Operand of an assembler instruction
    Expr(MachExpr, Range),

    /// Operand of a macro call or a macro prototype
    Macro(ConcatChain, Range),
}

impl Operand {
    pub fn range(&self) -> Range {
        match self {
            Operand::Empty(r)
            | Operand::Machine(_, r)
            | Operand::Expr(_, r)
            | Operand::Macro(_, r) => *r,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Operand::Empty(_))
    }

    pub fn access_mac(&self) -> Option<&ConcatChain> {
        match self {
            Operand::Macro(chain, _) => Some(chain),
            _ => None,
        }
    }

    pub fn access_expr(&self) -> Option<&MachExpr> {
        match self {
            Operand::Expr(e, _) | Operand::Machine(MachineOperand::Expr(e), _) => Some(e),
            _ => None,
        }
    }
}

/// A statement whose operands have been parsed in the format the instruction
/// requires.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStatement {
    pub label: Label,
    pub instruction: InstructionField,
    pub opcode: OpCode,
    pub operands: Vec<Operand>,
    pub range: Range,
}

/// A statement whose operand field is kept as text because its format was
/// not known when the statement was read.
#[derive(Clone, Debug, PartialEq)]
pub struct DeferredStatement {
    pub label: Label,
    pub instruction: InstructionField,
    pub opcode: OpCode,
    pub operand_field: String,
    pub operand_range: Range,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Resolved(ResolvedStatement),
    Deferred(DeferredStatement),
}

impl Statement {
    pub fn access_resolved(&self) -> Option<&ResolvedStatement> {
        match self {
            Statement::Resolved(s) => Some(s),
            Statement::Deferred(_) => None,
        }
    }

    pub fn access_deferred(&self) -> Option<&DeferredStatement> {
        match self {
            Statement::Resolved(_) => None,
            Statement::Deferred(s) => Some(s),
        }
    }

    pub fn label(&self) -> &Label {
        match self {
            Statement::Resolved(s) => &s.label,
            Statement::Deferred(s) => &s.label,
        }
    }

    pub fn instruction(&self) -> &InstructionField {
        match self {
            Statement::Resolved(s) => &s.instruction,
            Statement::Deferred(s) => &s.instruction,
        }
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            Statement::Resolved(s) => s.opcode,
            Statement::Deferred(s) => s.opcode,
        }
    }

    pub fn set_opcode(&mut self, opcode: OpCode) {
        match self {
            Statement::Resolved(s) => s.opcode = opcode,
            Statement::Deferred(s) => s.opcode = opcode,
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Statement::Resolved(s) => s.range,
            Statement::Deferred(s) => s.range,
        }
    }
}
