use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;

use crate::compiler::{
    diagnostics::{DiagCode, Diagnostic},
    expressions::{MachExpr, MachExprError},
    source::{Location, Range},
    stringtable::StringId,
    CompilerDisplay, CompilerDisplayError, StringTable,
};

use super::{
    address::{Space, SpaceKind},
    dependency::{DependencyEntry, Dependant},
    Address, Alignment, Dependable, DependencyCollector, PostponedStatement, SpaceId,
};

#[derive(Clone, Debug, PartialEq)]
pub enum SymbolValue {
    Absolute(i32),
    Relocatable(Address),

    /// The symbol is defined but its value waits on other symbols
    Undefined,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolOrigin {
    Machine,
    Equ,
    Storage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolAttributes {
    pub length: Option<u32>,
    pub ty: char,
    pub origin: SymbolOrigin,
}

impl SymbolAttributes {
    pub fn machine(length: u32) -> SymbolAttributes {
        SymbolAttributes {
            length: Some(length),
            ty: 'I',
            origin: SymbolOrigin::Machine,
        }
    }

    pub fn equ(length: Option<u32>) -> SymbolAttributes {
        SymbolAttributes {
            length,
            ty: 'U',
            origin: SymbolOrigin::Equ,
        }
    }

    pub fn storage(length: Option<u32>) -> SymbolAttributes {
        SymbolAttributes {
            length,
            ty: 'F',
            origin: SymbolOrigin::Storage,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrdinalSymbol {
    pub name: StringId,
    pub value: SymbolValue,
    pub attributes: SymbolAttributes,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrdinalError {
    Redefinition(StringId),
    CircularDependency(Option<StringId>),
    UndefinedSymbol(StringId),
    InvalidLength,
    InvalidValue(MachExprError),
}

impl OrdinalError {
    pub fn code(&self) -> DiagCode {
        match self {
            OrdinalError::Redefinition(_) => DiagCode::SymbolRedefinition,
            OrdinalError::CircularDependency(_) => DiagCode::CircularDependency,
            OrdinalError::UndefinedSymbol(_) => DiagCode::UndefinedSymbol,
            OrdinalError::InvalidLength => DiagCode::InvalidStorageLength,
            OrdinalError::InvalidValue(_) => DiagCode::InvalidExpression,
        }
    }

    pub fn to_diagnostic(&self, range: Range, st: &StringTable) -> Diagnostic {
        let args = match self {
            OrdinalError::Redefinition(name)
            | OrdinalError::UndefinedSymbol(name)
            | OrdinalError::CircularDependency(Some(name)) => vec![name_of(*name, st)],
            OrdinalError::InvalidValue(e) => vec![e.fmt(st).unwrap_or_else(|e| e.to_string())],
            OrdinalError::CircularDependency(None) | OrdinalError::InvalidLength => vec![],
        };
        Diagnostic::with_args(self.code(), args, range)
    }
}

impl CompilerDisplay for OrdinalError {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        let msg = match self {
            OrdinalError::Redefinition(name) => format!("Symbol {} already defined", st.get(*name)?),
            OrdinalError::CircularDependency(Some(name)) => {
                format!("Circular dependency involving {}", st.get(*name)?)
            }
            OrdinalError::CircularDependency(None) => "Circular dependency".into(),
            OrdinalError::UndefinedSymbol(name) => format!("Undefined symbol {}", st.get(*name)?),
            OrdinalError::InvalidLength => "Invalid storage length".into(),
            OrdinalError::InvalidValue(e) => e.fmt(st)?,
        };
        Ok(msg)
    }
}

fn name_of(id: StringId, st: &StringTable) -> String {
    st.get(id).unwrap_or_else(|_| id.to_string())
}

/**
Owns everything derived from the order of statements: the ordinary symbol
table, the location counter, the spaces, and the dependency solver.

Entries registered with [`OrdinalContext::add_dependency`] wait until every
source they list can be evaluated.  Whenever something becomes known the
solver walks the entries in the order they were registered and completes the
ones which are ready, repeating until a pass completes nothing.  Postponed
statements carried by completed entries are queued for [`take_ready`].

[`take_ready`]: OrdinalContext::take_ready
 */
#[derive(Debug, Default)]
pub struct OrdinalContext {
    symbols: HashMap<StringId, OrdinalSymbol>,
    loctr: Address,
    spaces: Vec<Space>,
    entries: Vec<DependencyEntry>,
    ready: Vec<PostponedStatement>,
    errors: Vec<(Range, OrdinalError)>,
}

impl OrdinalContext {
    pub fn new() -> OrdinalContext {
        OrdinalContext::default()
    }

    pub fn symbol_defined(&self, name: StringId) -> bool {
        self.symbols.contains_key(&name)
    }

    pub fn get_symbol(&self, name: StringId) -> Option<&OrdinalSymbol> {
        self.symbols.get(&name)
    }

    pub fn create_symbol(
        &mut self,
        name: StringId,
        value: SymbolValue,
        attributes: SymbolAttributes,
        location: Location,
    ) -> Result<(), OrdinalError> {
        if self.symbol_defined(name) {
            return Err(OrdinalError::Redefinition(name));
        }

        self.symbols.insert(
            name,
            OrdinalSymbol {
                name,
                value,
                attributes,
                location,
            },
        );
        self.resolve_pending();
        Ok(())
    }

    /// The current value of the location counter
    pub fn loctr(&self) -> Address {
        self.normalize(&self.loctr)
    }

    /// Aligns the location counter and returns the aligned address.  When
    /// the location counter is not known yet the padding becomes a space.
    pub fn align(&mut self, alignment: Alignment) -> Address {
        if alignment.boundary > 1 {
            let mut loctr = self.normalize(&self.loctr);
            if loctr.has_spaces() {
                let id = self.new_space(SpaceKind::Alignment {
                    anchor: loctr.clone(),
                    alignment,
                });
                loctr.spaces.push(id);
            } else {
                loctr.offset += alignment.padding(loctr.offset);
            }
            self.loctr = loctr;
        }
        self.loctr.clone()
    }

    /// Aligns the location counter and advances it by `size` bytes.
    /// Returns the address of the reserved area.
    pub fn reserve_storage_area(&mut self, size: u32, alignment: Alignment) -> Address {
        let addr = self.align(alignment);
        self.loctr.offset = self.loctr.offset.wrapping_add(size as i32);
        addr
    }

    /// Reserves an area whose length is given by `length`, which cannot be
    /// evaluated yet.  The location counter continues after a space which is
    /// resolved once `length` is.
    pub fn reserve_deferred_storage_area(
        &mut self,
        length: MachExpr,
        alignment: Alignment,
        range: Range,
    ) -> Address {
        let addr = self.align(alignment);
        let id = self.new_space(SpaceKind::Length);
        self.loctr.spaces.push(id);
        self.register(
            range,
            Some(Dependant::Space(id)),
            vec![Dependable::Expr(length)],
            None,
        );
        addr
    }

    /**
    Registers that the value of `dependant`, or the checking of `postponed`
    when no name is given, waits on `sources`.

    A named dependant whose sources already depend on it is rejected with a
    circular dependency error and nothing is registered.
     */
    pub fn add_dependency(
        &mut self,
        range: Range,
        dependant: Option<StringId>,
        sources: Vec<Dependable>,
        postponed: Option<PostponedStatement>,
    ) {
        self.register(range, dependant.map(Dependant::Symbol), sources, postponed)
    }

    /// Removes and returns the postponed statements whose dependencies were
    /// resolved, in the order they became ready.
    pub fn take_ready(&mut self) -> Vec<PostponedStatement> {
        std::mem::take(&mut self.ready)
    }

    pub fn has_pending(&self) -> bool {
        !self.entries.is_empty()
    }

    /**
    End of input: everything which can still be resolved is, and every entry
    left afterwards is abandoned.  An entry which waits on a symbol that was
    never defined, directly or through other entries and spaces, reports
    that symbol.  Any other entry can only be waiting on a cycle and reports
    a circular dependency.
     */
    pub fn finish(&mut self) {
        self.resolve_pending();

        let abandoned: Vec<_> = self
            .entries
            .iter()
            .map(|entry| {
                let undefined: BTreeSet<StringId> = self
                    .reachable(&entry.dependencies(self))
                    .into_iter()
                    .filter_map(|d| match d {
                        Dependant::Symbol(name) if !self.symbol_defined(name) => Some(name),
                        _ => None,
                    })
                    .collect();
                (entry.range, entry.dependant, undefined)
            })
            .collect();
        self.entries.clear();

        for (range, dependant, undefined) in abandoned {
            debug!("Abandoning dependency of {:?} at {}", dependant, range);
            if undefined.is_empty() {
                let name = match dependant {
                    Some(Dependant::Symbol(name)) => Some(name),
                    _ => None,
                };
                self.errors.push((range, OrdinalError::CircularDependency(name)));
            } else {
                for name in undefined {
                    self.errors.push((range, OrdinalError::UndefinedSymbol(name)));
                }
            }
        }
    }

    /// Removes the errors raised so far and renders them as diagnostics
    pub fn take_diags(&mut self, st: &StringTable) -> Vec<Diagnostic> {
        std::mem::take(&mut self.errors)
            .into_iter()
            .map(|(range, e)| e.to_diagnostic(range, st))
            .collect()
    }

    /// Replaces every resolved space in `addr` with its size
    pub fn normalize(&self, addr: &Address) -> Address {
        let mut normalized = Address::new(addr.offset);
        for sp in &addr.spaces {
            match self.spaces.get(sp.index()).and_then(|s| s.resolved) {
                Some(len) => normalized.offset = normalized.offset.wrapping_add(len),
                None => normalized.spaces.push(*sp),
            }
        }
        normalized
    }

    fn new_space(&mut self, kind: SpaceKind) -> SpaceId {
        self.spaces.push(Space {
            kind,
            resolved: None,
        });
        SpaceId(self.spaces.len() as u32 - 1)
    }

    fn register(
        &mut self,
        range: Range,
        dependant: Option<Dependant>,
        sources: Vec<Dependable>,
        postponed: Option<PostponedStatement>,
    ) {
        let entry = DependencyEntry {
            dependant,
            sources,
            postponed,
            range,
        };

        if let Some(d) = dependant {
            if self.depends_on(d, &entry.dependencies(self)) {
                let name = match d {
                    Dependant::Symbol(name) => Some(name),
                    Dependant::Space(_) => None,
                };
                debug!("Rejecting circular dependency of {:?} at {}", d, range);
                self.errors
                    .push((range, OrdinalError::CircularDependency(name)));
                return;
            }
        }

        self.entries.push(entry);
        self.resolve_pending();
    }

    /// True when resolving `deps` transitively requires `target`
    fn depends_on(&self, target: Dependant, deps: &DependencyCollector) -> bool {
        self.reachable(deps).contains(&target)
    }

    /// Everything resolving `deps` waits on: the direct dependants, what the
    /// entries registered for them wait on, and the spaces an alignment
    /// space is anchored behind
    fn reachable(&self, deps: &DependencyCollector) -> HashSet<Dependant> {
        let mut stack: Vec<Dependant> = deps.dependants().collect();
        let mut visited = HashSet::new();

        while let Some(d) = stack.pop() {
            if !visited.insert(d) {
                continue;
            }

            for entry in self.entries.iter().filter(|e| e.dependant == Some(d)) {
                stack.extend(entry.dependencies(self).dependants());
            }

            if let Dependant::Space(id) = d {
                if let Some(Space {
                    kind: SpaceKind::Alignment { anchor, .. },
                    ..
                }) = self.spaces.get(id.index())
                {
                    stack.extend(self.normalize(anchor).spaces.into_iter().map(Dependant::Space));
                }
            }
        }

        visited
    }

    fn resolve_pending(&mut self) {
        loop {
            let mut progressed = self.resolve_alignment_spaces();

            let mut idx = 0;
            while idx < self.entries.len() {
                if self.entries[idx].dependencies(self).contains_dependencies() {
                    idx += 1;
                } else {
                    let entry = self.entries.remove(idx);
                    self.complete(entry);
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }
    }

    fn resolve_alignment_spaces(&mut self) -> bool {
        let mut progressed = false;
        for idx in 0..self.spaces.len() {
            let padding = match &self.spaces[idx] {
                Space {
                    kind: SpaceKind::Alignment { anchor, alignment },
                    resolved: None,
                } => {
                    let anchor = self.normalize(anchor);
                    if anchor.has_spaces() {
                        None
                    } else {
                        Some(alignment.padding(anchor.offset))
                    }
                }
                _ => None,
            };

            if let Some(padding) = padding {
                self.spaces[idx].resolved = Some(padding);
                progressed = true;
            }
        }
        progressed
    }

    fn complete(&mut self, entry: DependencyEntry) {
        match entry.dependant {
            Some(Dependant::Symbol(name)) => {
                let value = match entry.sources.first() {
                    Some(source) => source.resolve(self),
                    None => Ok(SymbolValue::Undefined),
                };
                match value {
                    Ok(value) => {
                        if let Some(symbol) = self.symbols.get_mut(&name) {
                            symbol.value = value;
                        }
                    }
                    Err(e) => self.errors.push((entry.range, OrdinalError::InvalidValue(e))),
                }
            }
            Some(Dependant::Space(id)) => {
                let length = match entry.sources.first().map(|s| s.resolve(self)) {
                    Some(Ok(SymbolValue::Absolute(len))) if len >= 0 => len,
                    _ => {
                        self.errors.push((entry.range, OrdinalError::InvalidLength));
                        0
                    }
                };
                if let Some(space) = self.spaces.get_mut(id.index()) {
                    debug_assert!(space.resolved.is_none());
                    space.resolved = Some(length);
                }
            }
            None => (),
        }

        if let Some(postponed) = entry.postponed {
            debug!("Statement at {} is ready for replay", entry.range);
            self.ready.push(postponed);
        }
    }
}
