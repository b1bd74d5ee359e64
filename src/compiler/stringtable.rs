use std::{cell::RefCell, collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};

use super::{CompilerDisplay, CompilerDisplayError};

#[derive(Debug, PartialEq)]
pub enum StringTableError {
    NotFound(StringId),
}

impl Display for StringTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StringTableError::NotFound(id) => {
                f.write_fmt(format_args!("StringId {} Not Found", id))
            }
        }
    }
}

/**
Interns every distinct name seen by the assembler: ordinary symbols, macro
names, symbolic parameters, sequence symbols and opcodes.

The processors compare names through [`StringId`]s only.  Inserting a string
that is already present returns the ID that was assigned the first time, so
two spellings of the same name always compare equal.

Insertion takes `&self` so that a read-only processing context can still
intern names discovered while classifying a statement.
 */
#[derive(Debug, Default)]
pub struct StringTable {
    /// Maps the raw string to its [`StringId`]
    table: RefCell<HashMap<String, StringId>>,

    /// Index of every interned string by the numeric value of its [`StringId`]
    strings: RefCell<Vec<String>>,
}

impl StringTable {
    pub fn new() -> StringTable {
        StringTable::default()
    }

    /// Inserts a string into the table and returns the assigned ID for that
    /// string value.  If the string is already in the table, then this will
    /// return the already assigned ID.
    pub fn insert(&self, s: &str) -> StringId {
        if let Some(id) = self.find(s) {
            return id;
        }

        let mut strings = self.strings.borrow_mut();
        let id = StringId(strings.len() as u32);
        strings.push(s.into());
        self.table.borrow_mut().insert(s.into(), id);
        id
    }

    /// Search the string table for the given string and, if found, return the
    /// associated [`StringId`]. If not found, then return [`None`](Option::None).
    pub fn find(&self, s: &str) -> Option<StringId> {
        self.table.borrow().get(s).copied()
    }

    /// Given an ID, if it is assigned to a string, then return the associated
    /// string.
    pub fn get(&self, id: StringId) -> Result<String, StringTableError> {
        self.strings
            .borrow()
            .get(id.0 as usize)
            .cloned()
            .ok_or(StringTableError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(
    Clone, Copy, PartialEq, Debug, Default, Hash, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StringId(u32);

impl StringId {
    pub fn new() -> StringId {
        Self::default()
    }
}

impl CompilerDisplay for StringId {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError> {
        st.get(*self).map_err(|e| e.into())
    }
}

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_returns_same_id_for_same_string() {
        let st = StringTable::new();
        let a = st.insert("LABEL");
        let b = st.insert("OTHER");
        let c = st.insert("LABEL");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(st.len(), 2);
    }

    #[test]
    fn get_returns_inserted_string() {
        let st = StringTable::new();
        let id = st.insert("MACNAME");
        assert_eq!(st.get(id), Ok("MACNAME".to_string()));
        assert_eq!(st.find("MACNAME"), Some(id));
        assert_eq!(st.find("missing"), None);
    }

    #[test]
    fn get_unknown_id_fails() {
        let st = StringTable::new();
        let other = StringTable::new();
        other.insert("A");
        let id = other.insert("B");
        assert_eq!(st.get(id), Err(StringTableError::NotFound(id)));
    }
}
