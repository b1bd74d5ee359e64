use crate::compiler::{
    context::{DependencyCollector, OrdinalContext, SymbolValue},
    source::Range,
    stringtable::StringId,
    CompilerDisplay, CompilerDisplayError, StringTable,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for MachOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachOp::Add => f.write_str("+"),
            MachOp::Sub => f.write_str("-"),
            MachOp::Mul => f.write_str("*"),
            MachOp::Div => f.write_str("/"),
        }
    }
}

/// An expression over ordinary symbols and self-defining terms
#[derive(Clone, Debug, PartialEq)]
pub enum MachExpr {
    Constant(i32, Range),
    Symbol(StringId, Range),
    Negate(Box<MachExpr>, Range),
    Binary(MachOp, Box<MachExpr>, Box<MachExpr>, Range),
}

#[derive(Clone, Debug, PartialEq)]
pub enum MachExprError {
    UndefinedSymbol(StringId),

    /// `*` and `/` only accept absolute operands
    RelocatableOperand(MachOp),

    /// The difference of addresses in different sections or behind
    /// different spaces
    IncompatibleAddresses,
}

impl CompilerDisplay for MachExprError {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        let msg = match self {
            MachExprError::UndefinedSymbol(name) => format!("Undefined symbol {}", st.get(*name)?),
            MachExprError::RelocatableOperand(op) => {
                format!("Operand of {} must be absolute", op)
            }
            MachExprError::IncompatibleAddresses => "Addresses cannot be combined".into(),
        };
        Ok(msg)
    }
}

impl MachExpr {
    pub fn range(&self) -> Range {
        match self {
            MachExpr::Constant(_, r)
            | MachExpr::Symbol(_, r)
            | MachExpr::Negate(_, r)
            | MachExpr::Binary(_, _, _, r) => *r,
        }
    }

    /// Collects the symbols without a value and the unresolved spaces which
    /// this expression needs
    pub fn get_dependencies(&self, ctx: &OrdinalContext) -> DependencyCollector {
        let mut deps = DependencyCollector::default();
        self.collect_dependencies(ctx, &mut deps);
        deps
    }

    fn collect_dependencies(&self, ctx: &OrdinalContext, deps: &mut DependencyCollector) {
        match self {
            MachExpr::Constant(..) => (),
            MachExpr::Symbol(name, _) => match ctx.get_symbol(*name).map(|s| &s.value) {
                None | Some(SymbolValue::Undefined) => {
                    deps.undefined_symbols.insert(*name);
                }
                Some(SymbolValue::Relocatable(addr)) => {
                    deps.unresolved_spaces
                        .extend(ctx.normalize(addr).spaces.into_iter());
                }
                Some(SymbolValue::Absolute(_)) => (),
            },
            MachExpr::Negate(e, _) => e.collect_dependencies(ctx, deps),
            MachExpr::Binary(_, l, r, _) => {
                l.collect_dependencies(ctx, deps);
                r.collect_dependencies(ctx, deps);
            }
        }
    }

    /// Computes the value of this expression.  Division by zero yields zero.
    pub fn evaluate(&self, ctx: &OrdinalContext) -> Result<SymbolValue, MachExprError> {
        use SymbolValue::*;

        match self {
            MachExpr::Constant(i, _) => Ok(Absolute(*i)),
            MachExpr::Symbol(name, _) => match ctx.get_symbol(*name).map(|s| &s.value) {
                None | Some(Undefined) => Err(MachExprError::UndefinedSymbol(*name)),
                Some(Absolute(i)) => Ok(Absolute(*i)),
                Some(Relocatable(addr)) => Ok(Relocatable(ctx.normalize(addr))),
            },
            MachExpr::Negate(e, _) => match e.evaluate(ctx)? {
                Absolute(i) => Ok(Absolute(i.wrapping_neg())),
                _ => Err(MachExprError::RelocatableOperand(MachOp::Sub)),
            },
            MachExpr::Binary(op, l, r, _) => {
                let l = l.evaluate(ctx)?;
                let r = r.evaluate(ctx)?;
                match (op, l, r) {
                    (_, Undefined, _) | (_, _, Undefined) => Err(MachExprError::IncompatibleAddresses),
                    (MachOp::Add, Absolute(l), Absolute(r)) => Ok(Absolute(l.wrapping_add(r))),
                    (MachOp::Sub, Absolute(l), Absolute(r)) => Ok(Absolute(l.wrapping_sub(r))),
                    (MachOp::Mul, Absolute(l), Absolute(r)) => Ok(Absolute(l.wrapping_mul(r))),
                    (MachOp::Div, Absolute(l), Absolute(r)) => {
                        Ok(Absolute(if r == 0 { 0 } else { l.wrapping_div(r) }))
                    }
                    (MachOp::Add, Relocatable(a), Absolute(i))
                    | (MachOp::Add, Absolute(i), Relocatable(a)) => Ok(Relocatable(a.shifted(i))),
                    (MachOp::Sub, Relocatable(a), Absolute(i)) => {
                        Ok(Relocatable(a.shifted(i.wrapping_neg())))
                    }
                    (MachOp::Sub, Relocatable(a), Relocatable(b)) if a.same_spaces(&b) => {
                        Ok(Absolute(a.offset.wrapping_sub(b.offset)))
                    }
                    (MachOp::Mul, ..) | (MachOp::Div, ..) => {
                        Err(MachExprError::RelocatableOperand(*op))
                    }
                    _ => Err(MachExprError::IncompatibleAddresses),
                }
            }
        }
    }
}
