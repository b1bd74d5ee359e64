use super::SetType;

/// Built-in conditional assembly functions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaExprFunc {
    B2A,
    C2A,
    D2A,
    Dclen,
    Find,
    Index,
    Isbin,
    Isdec,
    Ishex,
    Issym,
    A2B,
    A2C,
    A2D,
    A2X,
    B2C,
    B2D,
    B2X,
    Byte,
    C2B,
    C2D,
    C2X,
    D2B,
    D2C,
    D2X,
    Dcval,
    Dequote,
    Double,
    Esym,
    Lower,
    Signed,
    Sysattra,
    Sysattrp,
    Upper,
    X2B,
    X2C,
    X2D,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FunctionEntry {
    pub name: &'static str,
    pub func: CaExprFunc,
    pub arity: usize,
    pub result: SetType,
}

impl FunctionEntry {
    const fn new(name: &'static str, func: CaExprFunc, arity: usize, result: SetType) -> Self {
        FunctionEntry {
            name,
            func,
            arity,
            result,
        }
    }
}

use CaExprFunc as F;
use SetType::*;

const FUNCTIONS: [FunctionEntry; 36] = [
    FunctionEntry::new("B2A", F::B2A, 1, A),
    FunctionEntry::new("C2A", F::C2A, 1, A),
    FunctionEntry::new("D2A", F::D2A, 1, A),
    FunctionEntry::new("DCLEN", F::Dclen, 1, A),
    FunctionEntry::new("FIND", F::Find, 2, A),
    FunctionEntry::new("INDEX", F::Index, 2, A),
    FunctionEntry::new("ISBIN", F::Isbin, 1, B),
    FunctionEntry::new("ISDEC", F::Isdec, 1, B),
    FunctionEntry::new("ISHEX", F::Ishex, 1, B),
    FunctionEntry::new("ISSYM", F::Issym, 1, B),
    FunctionEntry::new("A2B", F::A2B, 1, C),
    FunctionEntry::new("A2C", F::A2C, 1, C),
    FunctionEntry::new("A2D", F::A2D, 1, C),
    FunctionEntry::new("A2X", F::A2X, 1, C),
    FunctionEntry::new("B2C", F::B2C, 1, C),
    FunctionEntry::new("B2D", F::B2D, 1, C),
    FunctionEntry::new("B2X", F::B2X, 1, C),
    FunctionEntry::new("BYTE", F::Byte, 1, C),
    FunctionEntry::new("C2B", F::C2B, 1, C),
    FunctionEntry::new("C2D", F::C2D, 1, C),
    FunctionEntry::new("C2X", F::C2X, 1, C),
    FunctionEntry::new("D2B", F::D2B, 1, C),
    FunctionEntry::new("D2C", F::D2C, 1, C),
    FunctionEntry::new("D2X", F::D2X, 1, C),
    FunctionEntry::new("DCVAL", F::Dcval, 1, C),
    FunctionEntry::new("DEQUOTE", F::Dequote, 1, C),
    FunctionEntry::new("DOUBLE", F::Double, 1, C),
    FunctionEntry::new("ESYM", F::Esym, 1, C),
    FunctionEntry::new("LOWER", F::Lower, 1, C),
    FunctionEntry::new("SIGNED", F::Signed, 1, C),
    FunctionEntry::new("SYSATTRA", F::Sysattra, 1, C),
    FunctionEntry::new("SYSATTRP", F::Sysattrp, 1, C),
    FunctionEntry::new("UPPER", F::Upper, 1, C),
    FunctionEntry::new("X2B", F::X2B, 1, C),
    FunctionEntry::new("X2C", F::X2C, 1, C),
    FunctionEntry::new("X2D", F::X2D, 1, C),
];

impl CaExprFunc {
    /// Finds the function called `name`, ignoring case.  Returns `None` when
    /// `name` is not a built-in function.
    pub fn lookup(name: &str) -> Option<CaExprFunc> {
        FUNCTIONS
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.func)
    }

    pub fn entry(&self) -> &'static FunctionEntry {
        FUNCTIONS
            .iter()
            .find(|e| e.func == *self)
            .unwrap_or_else(|| panic!("{:?} is missing from the function table", self))
    }

    pub fn result_type(&self) -> SetType {
        self.entry().result
    }
}

impl std::fmt::Display for CaExprFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entry().name)
    }
}
