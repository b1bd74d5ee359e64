use std::{cmp::Ordering, convert::TryFrom};

use crate::compiler::semantics::VariableSymbol;

use super::{CaExpr, CaExprError, CaExprFunc, CaExprOp, SetValue};

impl CaExpr {
    /**
    Evaluates this expression.  Variable symbols are read through `lookup`,
    which returns `None` when the variable has no value.

    Built-in functions which need the symbol table or an EBCDIC code page
    are reported as [`CaExprError::FunctionNotEvaluable`].
     */
    pub fn evaluate<F>(&self, lookup: &F) -> Result<SetValue, CaExprError>
    where
        F: Fn(&VariableSymbol) -> Option<SetValue>,
    {
        match self {
            CaExpr::Constant(i, _) => Ok(SetValue::A(*i)),
            CaExpr::String(s, _) => Ok(SetValue::C(s.clone())),
            CaExpr::Var(var) => lookup(var).ok_or_else(|| match var.access_basic() {
                Some(name) => CaExprError::UndefinedVariable(name),
                None => CaExprError::UndefinedCreatedVariable,
            }),
            CaExpr::Unary(op, operand, _) => unary(*op, operand.evaluate(lookup)?),
            CaExpr::Binary(op, l, r, _) => binary(*op, l.evaluate(lookup)?, r.evaluate(lookup)?),
            CaExpr::Function(func, args, _) => {
                if args.len() != func.entry().arity {
                    return Err(CaExprError::FunctionArity(*func, args.len()));
                }
                let args = args
                    .iter()
                    .map(|a| a.evaluate(lookup))
                    .collect::<Result<Vec<_>, _>>()?;
                function(*func, args)
            }
        }
    }
}

fn unary(op: CaExprOp, value: SetValue) -> Result<SetValue, CaExprError> {
    use SetValue::*;
    match (op, value) {
        (CaExprOp::Not, A(i)) => Ok(A(!i)),
        (CaExprOp::Not, B(b)) => Ok(B(!b)),
        (CaExprOp::Byte, A(i)) => byte(i).ok_or(CaExprError::Overflow(op)),
        (CaExprOp::Double, C(s)) => Ok(C(double(&s))),
        (CaExprOp::Lower, C(s)) => Ok(C(s.to_ascii_lowercase())),
        (CaExprOp::Upper, C(s)) => Ok(C(s.to_ascii_uppercase())),
        (CaExprOp::Signed, A(i)) => Ok(C(i.to_string())),
        _ => Err(CaExprError::TypeMismatch(op)),
    }
}

fn binary(op: CaExprOp, l: SetValue, r: SetValue) -> Result<SetValue, CaExprError> {
    use CaExprOp::*;
    use SetValue::*;
    match (op, l, r) {
        (Sla, A(l), A(r)) => shift_left_arithmetic(l, r),
        (Sll, A(l), A(r)) => Ok(A(logical_shift(l, r, u32::checked_shl)?)),
        (Srl, A(l), A(r)) => Ok(A(logical_shift(l, r, u32::checked_shr)?)),
        (Sra, A(l), A(r)) => Ok(A(l >> shift_count(r)?.min(31))),

        (And, A(l), A(r)) => Ok(A(l & r)),
        (Or, A(l), A(r)) => Ok(A(l | r)),
        (Xor, A(l), A(r)) => Ok(A(l ^ r)),
        (AndNot, A(l), A(r)) => Ok(A(l & !r)),
        (OrNot, A(l), A(r)) => Ok(A(l | !r)),
        (XorNot, A(l), A(r)) => Ok(A(l ^ !r)),

        (And, B(l), B(r)) => Ok(B(l && r)),
        (Or, B(l), B(r)) => Ok(B(l || r)),
        (Xor, B(l), B(r)) => Ok(B(l ^ r)),
        (AndNot, B(l), B(r)) => Ok(B(l && !r)),
        (OrNot, B(l), B(r)) => Ok(B(l || !r)),
        (XorNot, B(l), B(r)) => Ok(B(l ^ !r)),

        (Find, C(l), C(r)) => Ok(A(find(&l, &r))),
        (Index, C(l), C(r)) => Ok(A(index(&l, &r))),

        (Eq, l, r) | (Ne, l, r) | (Le, l, r) | (Lt, l, r) | (Ge, l, r) | (Gt, l, r) => {
            let ord = compare(&l, &r).ok_or(CaExprError::TypeMismatch(op))?;
            let result = match op {
                Eq => ord == Ordering::Equal,
                Ne => ord != Ordering::Equal,
                Le => ord != Ordering::Greater,
                Lt => ord == Ordering::Less,
                Ge => ord != Ordering::Less,
                _ => ord == Ordering::Greater,
            };
            Ok(B(result))
        }
        _ => Err(CaExprError::TypeMismatch(op)),
    }
}

fn shift_count(count: i32) -> Result<u32, CaExprError> {
    if (0..=63).contains(&count) {
        Ok(count as u32)
    } else {
        Err(CaExprError::ShiftOutOfRange(count))
    }
}

fn shift_left_arithmetic(value: i32, count: i32) -> Result<SetValue, CaExprError> {
    let count = shift_count(count)?;
    if value == 0 {
        return Ok(SetValue::A(0));
    }
    let shifted = (value as i64)
        .checked_shl(count)
        .filter(|s| s >> count == value as i64)
        .and_then(|s| i32::try_from(s).ok());
    shifted
        .map(SetValue::A)
        .ok_or(CaExprError::Overflow(CaExprOp::Sla))
}

fn logical_shift(
    value: i32,
    count: i32,
    shift: fn(u32, u32) -> Option<u32>,
) -> Result<i32, CaExprError> {
    let count = shift_count(count)?;
    Ok(shift(value as u32, count).unwrap_or(0) as i32)
}

/// Strings of different lengths order by length before their contents
fn compare(l: &SetValue, r: &SetValue) -> Option<Ordering> {
    match (l, r) {
        (SetValue::A(l), SetValue::A(r)) => Some(l.cmp(r)),
        (SetValue::C(l), SetValue::C(r)) => Some(l.len().cmp(&r.len()).then_with(|| l.cmp(r))),
        _ => None,
    }
}

/// 1-based position of the first character of `s` which also occurs in `set`
fn find(s: &str, set: &str) -> i32 {
    s.chars()
        .position(|c| set.contains(c))
        .map_or(0, |p| p as i32 + 1)
}

/// 1-based position of the first occurrence of `needle` in `s`
fn index(s: &str, needle: &str) -> i32 {
    if needle.is_empty() {
        return 0;
    }
    s.find(needle).map_or(0, |p| s[..p].chars().count() as i32 + 1)
}

fn double(s: &str) -> String {
    s.replace('\'', "''").replace('&', "&&")
}

fn byte(i: i32) -> Option<SetValue> {
    u8::try_from(i)
        .ok()
        .map(|b| SetValue::C(char::from(b).to_string()))
}

fn function(func: CaExprFunc, args: Vec<SetValue>) -> Result<SetValue, CaExprError> {
    use CaExprFunc as F;
    use SetValue::*;

    let invalid = || CaExprError::InvalidArgument(func);
    let mut args = args.into_iter();
    let first = args.next().ok_or_else(invalid)?;

    match (func, first) {
        (F::B2A, C(s)) => radix_to_i32(&s, 2).map(A).ok_or_else(invalid),
        (F::D2A, C(s)) => s.trim().parse::<i32>().map(A).map_err(|_| invalid()),
        (F::Dclen, C(s)) => Ok(A(dequote_len(&s))),
        (F::Find, C(s)) | (F::Index, C(s)) => match args.next() {
            Some(C(r)) if func == F::Find => Ok(A(find(&s, &r))),
            Some(C(r)) => Ok(A(index(&s, &r))),
            _ => Err(invalid()),
        },
        (F::Isbin, C(s)) => Ok(B(is_radix(&s, 2, 32))),
        (F::Isdec, C(s)) => Ok(B(is_decimal(&s))),
        (F::Ishex, C(s)) => Ok(B(is_radix(&s, 16, 8))),
        (F::A2B, A(i)) => Ok(C(format!("{:032b}", i as u32))),
        (F::A2D, A(i)) => Ok(C(if i < 0 { i.to_string() } else { format!("+{}", i) })),
        (F::A2X, A(i)) => Ok(C(format!("{:08X}", i as u32))),
        (F::B2D, C(s)) => radix_to_i32(&s, 2)
            .map(|i| C(if i < 0 { i.to_string() } else { format!("+{}", i) }))
            .ok_or_else(invalid),
        (F::B2X, C(s)) => radix_to_i32(&s, 2)
            .map(|i| C(format!("{:X}", i as u32)))
            .ok_or_else(invalid),
        (F::Byte, A(i)) => byte(i).ok_or_else(invalid),
        (F::D2B, C(s)) => s
            .trim()
            .parse::<i32>()
            .map(|i| C(format!("{:032b}", i as u32)))
            .map_err(|_| invalid()),
        (F::D2X, C(s)) => s
            .trim()
            .parse::<i32>()
            .map(|i| C(format!("{:X}", i as u32)))
            .map_err(|_| invalid()),
        (F::Dequote, C(s)) => Ok(C(dequote(&s))),
        (F::Double, C(s)) => Ok(C(double(&s))),
        (F::Lower, C(s)) => Ok(C(s.to_ascii_lowercase())),
        (F::Signed, A(i)) => Ok(C(i.to_string())),
        (F::Upper, C(s)) => Ok(C(s.to_ascii_uppercase())),
        (F::X2B, C(s)) => radix_to_i32(&s, 16)
            .map(|i| C(format!("{:0width$b}", i as u32, width = s.len() * 4)))
            .ok_or_else(invalid),
        (F::X2D, C(s)) => radix_to_i32(&s, 16)
            .map(|i| C(if i < 0 { i.to_string() } else { format!("+{}", i) }))
            .ok_or_else(invalid),
        (F::C2A, _)
        | (F::C2B, _)
        | (F::C2D, _)
        | (F::C2X, _)
        | (F::A2C, _)
        | (F::B2C, _)
        | (F::D2C, _)
        | (F::X2C, _)
        | (F::Issym, _)
        | (F::Esym, _)
        | (F::Dcval, _)
        | (F::Sysattra, _)
        | (F::Sysattrp, _) => Err(CaExprError::FunctionNotEvaluable(func)),
        _ => Err(invalid()),
    }
}

/// Parses an unsigned bit pattern of at most 32 bits into its two's
/// complement value
fn radix_to_i32(s: &str, radix: u32) -> Option<i32> {
    if s.is_empty() {
        return Some(0);
    }
    u32::from_str_radix(s, radix).ok().map(|u| u as i32)
}

fn is_radix(s: &str, radix: u32, max_len: usize) -> bool {
    !s.is_empty() && s.len() <= max_len && s.chars().all(|c| c.is_digit(radix))
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 10
        && s.chars().all(|c| c.is_ascii_digit())
        && s.parse::<i64>().map_or(false, |v| v <= i32::MAX as i64)
}

fn dequote(s: &str) -> String {
    let s = s.strip_prefix('\'').unwrap_or(s);
    s.strip_suffix('\'').unwrap_or(s).into()
}

/// Length of a string once paired quotes and ampersands are counted once
fn dequote_len(s: &str) -> i32 {
    s.replace("''", "'").replace("&&", "&").chars().count() as i32
}
