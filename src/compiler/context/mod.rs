//! State shared by the statement processors: the interned ids, the ordinal
//! context, the macro registry, and the stack of source locations which led
//! to the statement being processed.

mod address;
mod dependency;
mod macros;
mod ordinal;
mod tests;

pub use address::{Address, Alignment, SpaceId, DOUBLEWORD, FULLWORD, HALFWORD, NO_ALIGN};
pub use dependency::{Dependable, Dependant, DependencyCollector, PostponedStatement};
pub use macros::{
    MacroArg, MacroData, MacroDefinition, MacroDefinitionResult, MacroInvocation, MacroParam,
    MacroPrototype, MacroRegistry, MacroSequenceSymbol,
};
pub use ordinal::{
    OrdinalContext, OrdinalError, OrdinalSymbol, SymbolAttributes, SymbolOrigin, SymbolValue,
};

use super::{
    diagnostics::Diagnostic,
    source::{Location, Position},
    stringtable::StringId,
    StringTable,
};

pub struct HlasmContext {
    ids: StringTable,
    pub ord_ctx: OrdinalContext,
    pub macros: MacroRegistry,

    /// The outermost frame is the open code file
    processing_stack: Vec<Location>,
}

impl HlasmContext {
    pub fn new(file: &str) -> HlasmContext {
        HlasmContext {
            ids: StringTable::new(),
            ord_ctx: OrdinalContext::new(),
            macros: MacroRegistry::new(),
            processing_stack: vec![Location::new(file, Position::default())],
        }
    }

    pub fn ids(&self) -> &StringTable {
        &self.ids
    }

    /// Interns `s`
    pub fn id(&self, s: &str) -> StringId {
        self.ids.insert(s)
    }

    /// The text of `id`, or its number if it was never interned
    pub fn name_of(&self, id: StringId) -> String {
        self.ids.get(id).unwrap_or_else(|_| id.to_string())
    }

    pub fn processing_stack(&self) -> &[Location] {
        &self.processing_stack
    }

    pub fn current_location(&self) -> Location {
        self.processing_stack.last().cloned().unwrap_or_default()
    }

    /// Moves the innermost frame to `pos`
    pub fn set_position(&mut self, pos: Position) {
        if let Some(top) = self.processing_stack.last_mut() {
            top.pos = pos;
        }
    }

    /// Installs `stack` as the processing stack and returns the one it
    /// replaced
    pub fn replace_stack(&mut self, stack: Vec<Location>) -> Vec<Location> {
        std::mem::replace(&mut self.processing_stack, stack)
    }

    /// Removes the errors the ordinal context raised so far and renders them
    /// with the interned names
    pub fn take_ordinal_diags(&mut self) -> Vec<Diagnostic> {
        self.ord_ctx.take_diags(&self.ids)
    }
}
