use crate::compiler::{CompilerDisplay, CompilerDisplayError, StringTable};

use super::VariableSymbol;

/// Fragments of a character string which is assembled out of literal text and
/// variable symbol substitutions.
pub type ConcatChain = Vec<ConcatPoint>;

#[derive(Clone, Debug, PartialEq)]
pub enum ConcatPoint {
    /// Literal text
    Str(String),

    /// A variable symbol to be substituted
    Var(VariableSymbol),

    /// The concatenation dot which ends a variable symbol reference
    Dot,

    /// The `=` of a keyword operand
    Equals,

    /// A parenthesized, comma separated list of chains
    Sublist(Vec<ConcatChain>),
}

impl ConcatPoint {
    pub fn is_var(&self) -> bool {
        matches!(self, ConcatPoint::Var(_))
    }

    pub fn access_var(&self) -> Option<&VariableSymbol> {
        match self {
            ConcatPoint::Var(v) => Some(v),
            _ => None,
        }
    }
}

/// Removes literal fragments which carry no text.  They are left behind by
/// the parser when a field is split around substitutions and would otherwise
/// change the shape of the chain.
pub fn clear_concat_chain(chain: &mut ConcatChain) {
    chain.retain(|p| !matches!(p, ConcatPoint::Str(s) if s.is_empty()));
    for point in chain.iter_mut() {
        if let ConcatPoint::Sublist(list) = point {
            list.iter_mut().for_each(clear_concat_chain);
        }
    }
}

/// Renders the chain the way it was written, without substituting variables
pub fn concat_chain_to_string(
    chain: &[ConcatPoint],
    st: &StringTable,
) -> Result<String, CompilerDisplayError> {
    let mut s = String::new();
    for point in chain {
        match point {
            ConcatPoint::Str(text) => s.push_str(text),
            ConcatPoint::Var(var) => s.push_str(&var.fmt(st)?),
            ConcatPoint::Dot => s.push('.'),
            ConcatPoint::Equals => s.push('='),
            ConcatPoint::Sublist(list) => {
                let items = list
                    .iter()
                    .map(|c| concat_chain_to_string(c, st))
                    .collect::<Result<Vec<_>, _>>()?;
                s.push('(');
                s.push_str(&items.join(","));
                s.push(')');
            }
        }
    }
    Ok(s)
}
