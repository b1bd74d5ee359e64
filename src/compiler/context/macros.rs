use std::collections::HashMap;

use log::{debug, info};

use crate::compiler::{
    diagnostics::{DiagCode, Diagnostic},
    semantics::{concat_chain_to_string, ConcatPoint, Statement},
    source::{Location, Range},
    stringtable::StringId,
    CompilerDisplayError, StringTable,
};

/// The value of a macro argument.  Arguments written with parentheses become
/// composites whose children are the comma separated elements.
#[derive(Clone, Debug, PartialEq)]
pub enum MacroData {
    /// An omitted argument
    Dummy,
    Single(String),
    Composite(Vec<MacroData>),
}

impl MacroData {
    /**
    Converts a concatenation into macro data.  A chain consisting of exactly
    one sublist becomes a composite with one child per sublist element; any
    other chain becomes a single value holding its text.
     */
    pub fn from_chain(
        chain: &[ConcatPoint],
        st: &StringTable,
    ) -> Result<MacroData, CompilerDisplayError> {
        match chain {
            [ConcatPoint::Sublist(list)] => {
                let children = list
                    .iter()
                    .map(|element| MacroData::from_chain(element, st))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MacroData::Composite(children))
            }
            _ => Ok(MacroData::Single(concat_chain_to_string(chain, st)?)),
        }
    }

    /// The text of the argument as it would be substituted
    pub fn get_value(&self) -> String {
        match self {
            MacroData::Dummy => String::new(),
            MacroData::Single(s) => s.clone(),
            MacroData::Composite(children) => format!(
                "({})",
                children
                    .iter()
                    .map(|c| c.get_value())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }

    /// The `n`th element of a sublist, counting from 1.  A single value is its
    /// own first element.
    pub fn get_ith(&self, n: usize) -> Option<&MacroData> {
        match (self, n) {
            (MacroData::Composite(children), n) if n > 0 => children.get(n - 1),
            (MacroData::Single(_), 1) => Some(self),
            _ => None,
        }
    }

    /// Number of sublist elements
    pub fn number(&self) -> usize {
        match self {
            MacroData::Dummy => 0,
            MacroData::Single(_) => 1,
            MacroData::Composite(children) => children.len(),
        }
    }
}

/// A symbolic parameter slot of a prototype.  A slot with neither name nor
/// default is a placeholder which keeps the positions of the following
/// operands.
#[derive(Clone, Debug, PartialEq)]
pub struct MacroParam {
    pub name: Option<StringId>,
    pub default: Option<MacroData>,
}

impl MacroParam {
    pub fn placeholder() -> MacroParam {
        MacroParam {
            name: None,
            default: None,
        }
    }

    pub fn positional(name: StringId) -> MacroParam {
        MacroParam {
            name: Some(name),
            default: None,
        }
    }

    pub fn keyword(name: StringId, default: MacroData) -> MacroParam {
        MacroParam {
            name: Some(name),
            default: Some(default),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name.is_none() && self.default.is_none()
    }

    pub fn is_keyword(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MacroPrototype {
    pub macro_name: Option<StringId>,
    pub name_param: Option<StringId>,
    pub symbolic_params: Vec<MacroParam>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MacroSequenceSymbol {
    pub name: StringId,
    pub location: Location,

    /// Index of the body statement which carries the sequence symbol
    pub offset: usize,
}

/// Everything collected while reading one macro definition
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MacroDefinitionResult {
    pub prototype: MacroPrototype,
    pub definition: Vec<Statement>,
    pub sequence_symbols: HashMap<StringId, MacroSequenceSymbol>,
    pub definition_location: Location,
}

/// An operand of a macro call
#[derive(Clone, Debug, PartialEq)]
pub enum MacroArg {
    Positional(MacroData),
    Keyword(StringId, MacroData),
}

/// The arguments of one macro call bound to the parameters of the definition
#[derive(Clone, Debug, PartialEq)]
pub struct MacroInvocation {
    pub name: StringId,
    pub named_params: HashMap<StringId, MacroData>,

    /// `&SYSLIST`: element 0 is the name field, the rest are the positional
    /// operands
    pub syslist: Vec<MacroData>,
}

impl MacroInvocation {
    pub fn param(&self, name: StringId) -> Option<&MacroData> {
        self.named_params.get(&name)
    }
}

/// A macro definition as stored in the registry
#[derive(Clone, Debug, PartialEq)]
pub struct MacroDefinition {
    pub name: StringId,
    pub prototype: MacroPrototype,
    pub body: Vec<Statement>,
    pub sequence_symbols: HashMap<StringId, MacroSequenceSymbol>,
    pub location: Location,
}

impl MacroDefinition {
    pub fn from_result(name: StringId, result: MacroDefinitionResult) -> MacroDefinition {
        MacroDefinition {
            name,
            prototype: result.prototype,
            body: result.definition,
            sequence_symbols: result.sequence_symbols,
            location: result.definition_location,
        }
    }

    pub fn sequence_symbol(&self, name: StringId) -> Option<&MacroSequenceSymbol> {
        self.sequence_symbols.get(&name)
    }

    /**
    Binds the operands of a call.  Positional arguments fill the positional
    slots of the prototype in order and any surplus is only reachable through
    `&SYSLIST`.  Keyword arguments replace the default of the keyword
    parameter with the same name; a keyword which the prototype does not
    declare is reported and treated as a positional argument.
     */
    pub fn call(
        &self,
        label: MacroData,
        args: Vec<(MacroArg, Range)>,
        st: &StringTable,
    ) -> (MacroInvocation, Vec<Diagnostic>) {
        let mut diags = vec![];
        let mut named_params = HashMap::new();
        let mut positional = vec![];

        for param in &self.prototype.symbolic_params {
            if let MacroParam {
                name: Some(name),
                default: Some(default),
            } = param
            {
                named_params.insert(*name, default.clone());
            }
        }

        for (arg, range) in args {
            match arg {
                MacroArg::Positional(data) => positional.push(data),
                MacroArg::Keyword(key, data) => {
                    let declared = self
                        .prototype
                        .symbolic_params
                        .iter()
                        .any(|p| p.is_keyword() && p.name == Some(key));
                    if declared {
                        named_params.insert(key, data);
                    } else {
                        let key = st.get(key).unwrap_or_else(|_| key.to_string());
                        diags.push(Diagnostic::with_args(
                            DiagCode::UnknownKeywordParameter,
                            vec![key.clone()],
                            range,
                        ));
                        positional.push(MacroData::Single(format!("{}={}", key, data.get_value())));
                    }
                }
            }
        }

        let mut slots = self
            .prototype
            .symbolic_params
            .iter()
            .filter(|p| !p.is_keyword());
        for (idx, data) in positional.iter().enumerate() {
            match slots.next() {
                Some(MacroParam { name: Some(name), .. }) => {
                    named_params.insert(*name, data.clone());
                }
                Some(_) => (),
                None => debug!("Positional argument {} has no parameter", idx + 1),
            }
        }
        for slot in slots {
            if let Some(name) = slot.name {
                named_params.insert(name, MacroData::Dummy);
            }
        }

        if let Some(name) = self.prototype.name_param {
            named_params.insert(name, label.clone());
        }

        let mut syslist = vec![label];
        syslist.extend(positional);

        (
            MacroInvocation {
                name: self.name,
                named_params,
                syslist,
            },
            diags,
        )
    }
}

/// Every macro definition read so far, by name.  A later definition replaces
/// an earlier one.
#[derive(Debug, Default)]
pub struct MacroRegistry {
    macros: HashMap<StringId, MacroDefinition>,
}

impl MacroRegistry {
    pub fn new() -> MacroRegistry {
        MacroRegistry::default()
    }

    /// Stores the definition.  A result whose prototype has no name cannot
    /// be called and is dropped.
    pub fn add(&mut self, result: MacroDefinitionResult) -> Option<StringId> {
        let name = result.prototype.macro_name?;
        info!("Macro {} defined with {} statements", name, result.definition.len());
        self.macros
            .insert(name, MacroDefinition::from_result(name, result));
        Some(name)
    }

    pub fn get(&self, name: StringId) -> Option<&MacroDefinition> {
        self.macros.get(&name)
    }

    pub fn contains(&self, name: StringId) -> bool {
        self.macros.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}
