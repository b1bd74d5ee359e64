use std::collections::BTreeSet;

use crate::compiler::{
    expressions::{MachExpr, MachExprError},
    semantics::ResolvedStatement,
    source::{Location, Range},
    stringtable::StringId,
};

use super::{Address, OrdinalContext, SpaceId, SymbolValue};

/// What keeps an expression or address from being evaluated
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DependencyCollector {
    pub undefined_symbols: BTreeSet<StringId>,
    pub unresolved_spaces: BTreeSet<SpaceId>,
}

impl DependencyCollector {
    pub fn contains_dependencies(&self) -> bool {
        !self.undefined_symbols.is_empty() || !self.unresolved_spaces.is_empty()
    }

    pub fn merge(&mut self, other: DependencyCollector) {
        self.undefined_symbols.extend(other.undefined_symbols);
        self.unresolved_spaces.extend(other.unresolved_spaces);
    }

    pub(super) fn dependants(&self) -> impl Iterator<Item = Dependant> + '_ {
        self.undefined_symbols
            .iter()
            .map(|s| Dependant::Symbol(*s))
            .chain(self.unresolved_spaces.iter().map(|s| Dependant::Space(*s)))
    }
}

/// Something whose value is waited upon
#[derive(Clone, Debug, PartialEq)]
pub enum Dependable {
    Expr(MachExpr),
    Address(Address),
}

impl Dependable {
    pub fn get_dependencies(&self, ctx: &OrdinalContext) -> DependencyCollector {
        match self {
            Dependable::Expr(e) => e.get_dependencies(ctx),
            Dependable::Address(a) => DependencyCollector {
                undefined_symbols: BTreeSet::new(),
                unresolved_spaces: ctx.normalize(a).spaces.into_iter().collect(),
            },
        }
    }

    pub fn resolve(&self, ctx: &OrdinalContext) -> Result<SymbolValue, MachExprError> {
        match self {
            Dependable::Expr(e) => e.evaluate(ctx),
            Dependable::Address(a) => Ok(SymbolValue::Relocatable(ctx.normalize(a))),
        }
    }
}

/// Something whose value is computed once its sources resolve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dependant {
    Symbol(StringId),
    Space(SpaceId),
}

/// A statement whose checking waits for symbols which were not defined when
/// it was processed.  The processing stack is captured so that diagnostics
/// raised on replay point to where the statement came from.
#[derive(Clone, Debug, PartialEq)]
pub struct PostponedStatement {
    pub statement: ResolvedStatement,
    pub stack: Vec<Location>,
}

impl PostponedStatement {
    pub fn new(statement: ResolvedStatement, stack: Vec<Location>) -> PostponedStatement {
        PostponedStatement { statement, stack }
    }
}

/// One registration with the solver
#[derive(Debug)]
pub(super) struct DependencyEntry {
    pub dependant: Option<Dependant>,
    pub sources: Vec<Dependable>,
    pub postponed: Option<PostponedStatement>,
    pub range: Range,
}

impl DependencyEntry {
    pub fn dependencies(&self, ctx: &OrdinalContext) -> DependencyCollector {
        let mut deps = DependencyCollector::default();
        for s in &self.sources {
            deps.merge(s.get_dependencies(ctx));
        }
        deps
    }
}
