use super::SetType;

/// Canonical tag of every conditional assembly operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaExprOp {
    // arithmetic
    Sla,
    Sll,
    Sra,
    Srl,
    Find,
    Index,

    // logical
    AndNot,
    OrNot,
    XorNot,
    Eq,
    Ne,
    Le,
    Lt,
    Ge,
    Gt,

    // arithmetic & logical
    And,
    Or,
    Xor,
    Not,

    // character
    Byte,
    Double,
    Lower,
    Signed,
    Upper,
}

impl std::fmt::Display for CaExprOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CaExprOp::*;
        let s = match self {
            Sla => "SLA",
            Sll => "SLL",
            Sra => "SRA",
            Srl => "SRL",
            Find => "FIND",
            Index => "INDEX",
            AndNot => "AND NOT",
            OrNot => "OR NOT",
            XorNot => "XOR NOT",
            Eq => "EQ",
            Ne => "NE",
            Le => "LE",
            Lt => "LT",
            Ge => "GE",
            Gt => "GT",
            And => "AND",
            Or => "OR",
            Xor => "XOR",
            Not => "NOT",
            Byte => "BYTE",
            Double => "DOUBLE",
            Lower => "LOWER",
            Signed => "SIGNED",
            Upper => "UPPER",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
}

/// One row of an operator table.  Multi-word operators are stored with their
/// words separated by a single space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperatorEntry {
    pub lexeme: &'static str,
    pub op: CaExprOp,
    pub arity: Arity,
    pub priority: u8,
}

impl OperatorEntry {
    const fn new(lexeme: &'static str, op: CaExprOp, arity: Arity, priority: u8) -> OperatorEntry {
        OperatorEntry {
            lexeme,
            op,
            arity,
            priority,
        }
    }

    pub fn multiple_words(&self) -> bool {
        self.lexeme.contains(' ')
    }
}

/**
Classification of the operators of one conditional assembly value domain.

Every domain owns a disjoint operator table; an expression of one domain
never consults the table of another.  A lexeme which is not in the table is
not an error here: the caller treats it as an operand or a function name.

Priorities: a higher value binds tighter, ties associate to the left.
 */
pub trait CaExprPolicy {
    const SET_TYPE: SetType;
    const OPERATORS: &'static [OperatorEntry];

    fn entry(symbol: &str) -> Option<&'static OperatorEntry> {
        let symbol = normalize(symbol);
        Self::OPERATORS.iter().find(|e| e.lexeme == symbol)
    }

    fn is_unary(symbol: &str) -> bool {
        Self::entry(symbol).map_or(false, |e| e.arity == Arity::Unary)
    }

    fn is_binary(symbol: &str) -> bool {
        Self::entry(symbol).map_or(false, |e| e.arity == Arity::Binary)
    }

    fn is_operator(symbol: &str) -> bool {
        Self::entry(symbol).is_some()
    }

    fn multiple_words(symbol: &str) -> bool {
        Self::entry(symbol).map_or(false, |e| e.multiple_words())
    }

    fn get_priority(symbol: &str) -> Option<u8> {
        Self::entry(symbol).map(|e| e.priority)
    }

    fn get_operator(symbol: &str) -> Option<CaExprOp> {
        Self::entry(symbol).map(|e| e.op)
    }
}

/// Upper cases the lexeme and collapses the white space between the words of
/// a multi-word operator.
fn normalize(symbol: &str) -> String {
    symbol
        .split_whitespace()
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

use Arity::*;
use CaExprOp as Op;

const ARITHMETIC_OPERATORS: [OperatorEntry; 19] = [
    OperatorEntry::new("NOT", Op::Not, Unary, 7),
    OperatorEntry::new("SLA", Op::Sla, Binary, 6),
    OperatorEntry::new("SLL", Op::Sll, Binary, 6),
    OperatorEntry::new("SRA", Op::Sra, Binary, 6),
    OperatorEntry::new("SRL", Op::Srl, Binary, 6),
    OperatorEntry::new("FIND", Op::Find, Binary, 6),
    OperatorEntry::new("INDEX", Op::Index, Binary, 6),
    OperatorEntry::new("EQ", Op::Eq, Binary, 3),
    OperatorEntry::new("NE", Op::Ne, Binary, 3),
    OperatorEntry::new("LE", Op::Le, Binary, 3),
    OperatorEntry::new("LT", Op::Lt, Binary, 3),
    OperatorEntry::new("GE", Op::Ge, Binary, 3),
    OperatorEntry::new("GT", Op::Gt, Binary, 3),
    OperatorEntry::new("AND", Op::And, Binary, 2),
    OperatorEntry::new("AND NOT", Op::AndNot, Binary, 2),
    OperatorEntry::new("OR", Op::Or, Binary, 1),
    OperatorEntry::new("OR NOT", Op::OrNot, Binary, 1),
    OperatorEntry::new("XOR", Op::Xor, Binary, 1),
    OperatorEntry::new("XOR NOT", Op::XorNot, Binary, 1),
];

const BINARY_OPERATORS: [OperatorEntry; 13] = [
    OperatorEntry::new("EQ", Op::Eq, Binary, 4),
    OperatorEntry::new("NE", Op::Ne, Binary, 4),
    OperatorEntry::new("LE", Op::Le, Binary, 4),
    OperatorEntry::new("LT", Op::Lt, Binary, 4),
    OperatorEntry::new("GE", Op::Ge, Binary, 4),
    OperatorEntry::new("GT", Op::Gt, Binary, 4),
    OperatorEntry::new("NOT", Op::Not, Unary, 3),
    OperatorEntry::new("AND", Op::And, Binary, 2),
    OperatorEntry::new("AND NOT", Op::AndNot, Binary, 2),
    OperatorEntry::new("OR", Op::Or, Binary, 1),
    OperatorEntry::new("OR NOT", Op::OrNot, Binary, 1),
    OperatorEntry::new("XOR", Op::Xor, Binary, 1),
    OperatorEntry::new("XOR NOT", Op::XorNot, Binary, 1),
];

const CHARACTER_OPERATORS: [OperatorEntry; 5] = [
    OperatorEntry::new("BYTE", Op::Byte, Unary, 1),
    OperatorEntry::new("DOUBLE", Op::Double, Unary, 1),
    OperatorEntry::new("LOWER", Op::Lower, Unary, 1),
    OperatorEntry::new("SIGNED", Op::Signed, Unary, 1),
    OperatorEntry::new("UPPER", Op::Upper, Unary, 1),
];

/// Operators of SETA expressions
pub struct ArithmeticPolicy;

impl CaExprPolicy for ArithmeticPolicy {
    const SET_TYPE: SetType = SetType::A;
    const OPERATORS: &'static [OperatorEntry] = &ARITHMETIC_OPERATORS;
}

/// Operators of SETB expressions
pub struct BinaryPolicy;

impl CaExprPolicy for BinaryPolicy {
    const SET_TYPE: SetType = SetType::B;
    const OPERATORS: &'static [OperatorEntry] = &BINARY_OPERATORS;
}

/// Operators of SETC expressions.  Character values are composed by
/// concatenation, so the table only holds unary conversions.
pub struct CharacterPolicy;

impl CaExprPolicy for CharacterPolicy {
    const SET_TYPE: SetType = SetType::C;
    const OPERATORS: &'static [OperatorEntry] = &CHARACTER_OPERATORS;
}
