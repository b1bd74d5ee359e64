//! Expressions appearing in statement operands.
//!
//! Conditional assembly expressions ([`CaExpr`]) are built from a flat list of
//! terms by [`resolve_terms`], which consults the operator table of one value
//! domain through a [`CaExprPolicy`].  Machine expressions ([`MachExpr`]) are
//! the ordinary symbol arithmetic found in instruction operands; they are
//! evaluated against the ordinal context.

mod evaluate;
mod functions;
mod mach_expr;
mod policy;
mod resolve;

pub use functions::{CaExprFunc, FunctionEntry};
pub use mach_expr::{MachExpr, MachExprError, MachOp};
pub use policy::{
    ArithmeticPolicy, Arity, BinaryPolicy, CaExprOp, CaExprPolicy, CharacterPolicy,
    OperatorEntry,
};
pub use resolve::{resolve_terms, Term};

use super::{
    semantics::VariableSymbol, source::Range, stringtable::StringId, CompilerDisplay,
    CompilerDisplayError, StringTable,
};

/// The three value domains of conditional assembly
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetType {
    A,
    B,
    C,
}

impl std::fmt::Display for SetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetType::A => f.write_str("A"),
            SetType::B => f.write_str("B"),
            SetType::C => f.write_str("C"),
        }
    }
}

/// A value of a SET symbol or of a conditional assembly expression
#[derive(Clone, Debug, PartialEq)]
pub enum SetValue {
    A(i32),
    B(bool),
    C(String),
}

impl SetValue {
    pub fn get_type(&self) -> SetType {
        match self {
            SetValue::A(_) => SetType::A,
            SetValue::B(_) => SetType::B,
            SetValue::C(_) => SetType::C,
        }
    }
}

impl std::fmt::Display for SetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetValue::A(i) => f.write_fmt(format_args!("{}", i)),
            SetValue::B(b) => f.write_str(if *b { "1" } else { "0" }),
            SetValue::C(s) => f.write_str(s),
        }
    }
}

/// A conditional assembly expression tree
#[derive(Clone, Debug, PartialEq)]
pub enum CaExpr {
    Constant(i32, Range),
    String(String, Range),
    Var(Box<VariableSymbol>),
    Unary(CaExprOp, Box<CaExpr>, Range),
    Binary(CaExprOp, Box<CaExpr>, Box<CaExpr>, Range),
    Function(CaExprFunc, Vec<CaExpr>, Range),
}

impl CaExpr {
    pub fn range(&self) -> Range {
        match self {
            CaExpr::Constant(_, r)
            | CaExpr::String(_, r)
            | CaExpr::Unary(_, _, r)
            | CaExpr::Binary(_, _, _, r)
            | CaExpr::Function(_, _, r) => *r,
            CaExpr::Var(v) => v.range,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaExprError {
    MissingOperand(Range),
    ExpectedOperator(Range),
    ExpectedOperand(String, Range),
    TypeMismatch(CaExprOp),
    Overflow(CaExprOp),
    ShiftOutOfRange(i32),
    UndefinedVariable(StringId),
    UndefinedCreatedVariable,
    FunctionArity(CaExprFunc, usize),
    InvalidArgument(CaExprFunc),
    FunctionNotEvaluable(CaExprFunc),
}

impl CompilerDisplay for CaExprError {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        use CaExprError::*;
        let msg = match self {
            MissingOperand(_) => "Expected an operand".into(),
            ExpectedOperator(_) => "Expected an operator".into(),
            ExpectedOperand(w, _) => format!("Expected an operand but found {}", w),
            TypeMismatch(op) => format!("Operands of {} have the wrong type", op),
            Overflow(op) => format!("Result of {} overflows", op),
            ShiftOutOfRange(n) => format!("Shift count {} out of range", n),
            UndefinedVariable(sid) => format!("Undefined variable symbol &{}", st.get(*sid)?),
            UndefinedCreatedVariable => "Created variable symbol is not defined".into(),
            FunctionArity(func, got) => format!(
                "{} expects {} arguments but got {}",
                func,
                func.entry().arity,
                got
            ),
            InvalidArgument(func) => format!("Invalid argument to {}", func),
            FunctionNotEvaluable(func) => {
                format!("{} cannot be evaluated without assembler state", func)
            }
        };
        Ok(msg)
    }
}
