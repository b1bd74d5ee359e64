use crate::compiler::{
    expressions::CaExpr, source::Range, stringtable::StringId, CompilerDisplay,
    CompilerDisplayError, StringTable,
};

use super::{concat_chain_to_string, ConcatChain};

/// How the name of a variable symbol is given
#[derive(Clone, Debug, PartialEq)]
pub enum VariableName {
    /// `&NAME`
    Basic(StringId),

    /// `&(...)`: the name is the value of a concatenation
    Created(ConcatChain),
}

/**
A reference to a variable symbol: a SET symbol or a symbolic parameter.

The reference is either basic, naming the variable directly, or created,
computing its name from a concatenation at the time the reference is
evaluated.  Either form may carry a subscript.  A reference never changes
after it is built.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct VariableSymbol {
    pub name: VariableName,
    pub subscript: Vec<CaExpr>,
    pub range: Range,
}

impl VariableSymbol {
    pub fn basic(name: StringId, subscript: Vec<CaExpr>, range: Range) -> VariableSymbol {
        VariableSymbol {
            name: VariableName::Basic(name),
            subscript,
            range,
        }
    }

    pub fn created(chain: ConcatChain, subscript: Vec<CaExpr>, range: Range) -> VariableSymbol {
        VariableSymbol {
            name: VariableName::Created(chain),
            subscript,
            range,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self.name, VariableName::Created(_))
    }

    pub fn access_basic(&self) -> Option<StringId> {
        match &self.name {
            VariableName::Basic(name) => Some(*name),
            VariableName::Created(_) => None,
        }
    }

    pub fn access_created(&self) -> Option<&ConcatChain> {
        match &self.name {
            VariableName::Basic(_) => None,
            VariableName::Created(chain) => Some(chain),
        }
    }

    pub fn subscript(&self) -> &[CaExpr] {
        &self.subscript
    }

    pub fn range(&self) -> Range {
        self.range
    }
}

impl CompilerDisplay for VariableSymbol {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        let name = match &self.name {
            VariableName::Basic(name) => format!("&{}", st.get(*name)?),
            VariableName::Created(chain) => format!("&({})", concat_chain_to_string(chain, st)?),
        };
        if self.subscript.is_empty() {
            Ok(name)
        } else {
            Ok(format!("{}(...)", name))
        }
    }
}
