use crate::compiler::{
    context::{OrdinalContext, SymbolValue},
    diagnostics::{DiagCode, Diagnostic},
    expressions::MachExpr,
    instructions::OperandFormat,
    semantics::{MachineOperand, Operand},
    source::Range,
};

/**
Checks the operands of a machine instruction against the formats the
instruction expects.  Every operand is evaluated with the ordinal context as
it is when the check runs, so a statement must only be checked once the
symbols its operands use are defined.
 */
pub fn check_operands(
    operands: &[Operand],
    formats: &[OperandFormat],
    ctx: &OrdinalContext,
    range: Range,
) -> Vec<Diagnostic> {
    // A statement without operands is parsed as one empty operand
    let operands: &[Operand] = match operands {
        [Operand::Empty(_)] if formats.is_empty() => &[],
        _ => operands,
    };

    if operands.len() != formats.len() {
        return vec![Diagnostic::with_args(
            DiagCode::OperandCount,
            vec![formats.len().to_string(), operands.len().to_string()],
            range,
        )];
    }

    let mut diags = vec![];
    for (operand, format) in operands.iter().zip(formats.iter()) {
        if let Err(diag) = check_operand(operand, *format, ctx) {
            diags.push(diag);
        }
    }
    diags
}

fn check_operand(operand: &Operand, format: OperandFormat, ctx: &OrdinalContext) -> Result<(), Diagnostic> {
    let range = operand.range();
    let machine = match operand {
        Operand::Machine(m, _) => m,
        _ => return Err(Diagnostic::new(DiagCode::OperandKind, range)),
    };

    match (format, machine) {
        (OperandFormat::Reg, MachineOperand::Expr(e)) => {
            check_absolute(e, 0, 15, DiagCode::RegisterOutOfRange, ctx)
        }
        (OperandFormat::Mask, MachineOperand::Expr(e)) => {
            check_absolute(e, 0, 15, DiagCode::ImmediateOutOfRange, ctx)
        }
        (OperandFormat::Imm { bits, signed }, MachineOperand::Expr(e)) => {
            let (min, max) = if signed {
                (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
            } else {
                (0, (1i64 << bits) - 1)
            };
            check_absolute(e, min, max, DiagCode::ImmediateOutOfRange, ctx)
        }
        (OperandFormat::Rel, MachineOperand::Expr(e)) => match evaluate(e, ctx)? {
            SymbolValue::Relocatable(_) => Ok(()),
            SymbolValue::Absolute(i) if i % 2 == 0 => Ok(()),
            _ => Err(Diagnostic::new(DiagCode::OperandKind, e.range())),
        },

        // An address written as a plain expression is resolved through a
        // base register at assembly time
        (OperandFormat::AddrIndexed, MachineOperand::Expr(e))
        | (OperandFormat::AddrBase, MachineOperand::Expr(e))
        | (OperandFormat::AddrLength, MachineOperand::Expr(e)) => match evaluate(e, ctx)? {
            SymbolValue::Relocatable(_) => Ok(()),
            _ => check_absolute(e, 0, 4095, DiagCode::DisplacementOutOfRange, ctx),
        },

        (
            OperandFormat::AddrIndexed,
            MachineOperand::Address {
                displacement,
                first,
                second,
            },
        ) => {
            check_absolute(displacement, 0, 4095, DiagCode::DisplacementOutOfRange, ctx)?;
            check_register(first, ctx)?;
            check_register(second, ctx)
        }
        (
            OperandFormat::AddrBase,
            MachineOperand::Address {
                displacement,
                first,
                second: None,
            },
        ) => {
            check_absolute(displacement, 0, 4095, DiagCode::DisplacementOutOfRange, ctx)?;
            check_register(first, ctx)
        }
        (
            OperandFormat::AddrLength,
            MachineOperand::Address {
                displacement,
                first,
                second,
            },
        ) => {
            check_absolute(displacement, 0, 4095, DiagCode::DisplacementOutOfRange, ctx)?;
            if let Some(length) = first {
                check_absolute(length, 1, 256, DiagCode::LengthOutOfRange, ctx)?;
            }
            check_register(second, ctx)
        }
        _ => Err(Diagnostic::new(DiagCode::OperandKind, range)),
    }
}

fn evaluate(e: &MachExpr, ctx: &OrdinalContext) -> Result<SymbolValue, Diagnostic> {
    e.evaluate(ctx)
        .map_err(|_| Diagnostic::new(DiagCode::InvalidExpression, e.range()))
}

fn check_absolute(
    e: &MachExpr,
    min: i64,
    max: i64,
    code: DiagCode,
    ctx: &OrdinalContext,
) -> Result<(), Diagnostic> {
    match evaluate(e, ctx)? {
        SymbolValue::Absolute(i) if (min..=max).contains(&(i as i64)) => Ok(()),
        SymbolValue::Absolute(i) => Err(Diagnostic::with_args(code, vec![i.to_string()], e.range())),
        _ => Err(Diagnostic::new(DiagCode::OperandKind, e.range())),
    }
}

fn check_register(reg: &Option<MachExpr>, ctx: &OrdinalContext) -> Result<(), Diagnostic> {
    match reg {
        Some(r) => check_absolute(r, 0, 15, DiagCode::RegisterOutOfRange, ctx),
        None => Ok(()),
    }
}
