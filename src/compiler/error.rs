use super::{stringtable::StringTableError, StringTable};

/// Formats a value which holds [`StringId`](super::StringId)s into a human
/// readable message.  Every error type raised by the compiler implements this
/// so that interned names can be rendered with their text.
pub trait CompilerDisplay {
    fn fmt(&self, st: &StringTable) -> Result<String, CompilerDisplayError>;
}

/// Failure to render a [`CompilerDisplay`] value.
#[derive(Debug, PartialEq)]
pub enum CompilerDisplayError {
    StringTableError(StringTableError),
}

impl From<StringTableError> for CompilerDisplayError {
    fn from(ste: StringTableError) -> Self {
        Self::StringTableError(ste)
    }
}

impl std::fmt::Display for CompilerDisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilerDisplayError::StringTableError(ste) => ste.fmt(f),
        }
    }
}
