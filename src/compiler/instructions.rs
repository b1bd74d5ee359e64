//! Read-only tables of the instructions the processors know about.  Lookups
//! ignore case.

/// The kind of value an operand of a machine instruction takes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandFormat {
    /// General register 0..=15
    Reg,

    /// Branch condition mask 0..=15
    Mask,

    /// Immediate value of the given width in bits
    Imm { bits: u8, signed: bool },

    /// Relative offset to a location in the program
    Rel,

    /// `D(X,B)`: displacement, index and base
    AddrIndexed,

    /// `D(B)`: displacement and base
    AddrBase,

    /// `D(L,B)`: displacement, length and base
    AddrLength,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachFormat {
    RR,
    RX,
    RS,
    SI,
    SS,
    RI,
}

#[derive(Debug, PartialEq)]
pub struct MachineInstruction {
    pub name: &'static str,
    pub format: MachFormat,

    /// Length of the encoded instruction in bits
    pub size_for_alloc: u32,
    pub operands: &'static [OperandFormat],
}

/// An extended mnemonic: an instruction with some operands fixed
#[derive(Debug, PartialEq)]
pub struct Mnemonic {
    pub name: &'static str,
    pub instruction: &'static str,
    pub operands: &'static [OperandFormat],
}

#[derive(Debug, PartialEq)]
pub struct CaInstruction {
    pub name: &'static str,

    /// The instruction takes no operands
    pub operandless: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsmInstruction {
    Equ,
    Ds,
    Copy,
    Other,
}

#[derive(Debug, PartialEq)]
pub struct AssemblerInstruction {
    pub name: &'static str,
    pub kind: AsmInstruction,
}

/// Which table an operation code was found in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionKind {
    Ca,
    Mach,
    Mnemonic,
    Asm,
}

use OperandFormat::*;

const RR_REGS: &[OperandFormat] = &[Reg, Reg];
const RR_MASK: &[OperandFormat] = &[Mask, Reg];
const RX_REG: &[OperandFormat] = &[Reg, AddrIndexed];
const RX_MASK: &[OperandFormat] = &[Mask, AddrIndexed];
const RS_REGS: &[OperandFormat] = &[Reg, Reg, AddrBase];
const SI_IMM: &[OperandFormat] = &[
    AddrBase,
    Imm {
        bits: 8,
        signed: false,
    },
];
const SS_LEN: &[OperandFormat] = &[AddrLength, AddrBase];
const RI_IMM: &[OperandFormat] = &[
    Reg,
    Imm {
        bits: 16,
        signed: true,
    },
];
const RI_REL: &[OperandFormat] = &[Mask, Rel];

const fn mach(
    name: &'static str,
    format: MachFormat,
    size_for_alloc: u32,
    operands: &'static [OperandFormat],
) -> MachineInstruction {
    MachineInstruction {
        name,
        format,
        size_for_alloc,
        operands,
    }
}

pub const MACHINE_INSTRUCTIONS: &[MachineInstruction] = &[
    mach("AR", MachFormat::RR, 16, RR_REGS),
    mach("BALR", MachFormat::RR, 16, RR_REGS),
    mach("BCR", MachFormat::RR, 16, RR_MASK),
    mach("CR", MachFormat::RR, 16, RR_REGS),
    mach("LR", MachFormat::RR, 16, RR_REGS),
    mach("SR", MachFormat::RR, 16, RR_REGS),
    mach("A", MachFormat::RX, 32, RX_REG),
    mach("BAL", MachFormat::RX, 32, RX_REG),
    mach("BC", MachFormat::RX, 32, RX_MASK),
    mach("C", MachFormat::RX, 32, RX_REG),
    mach("IC", MachFormat::RX, 32, RX_REG),
    mach("L", MachFormat::RX, 32, RX_REG),
    mach("LA", MachFormat::RX, 32, RX_REG),
    mach("LH", MachFormat::RX, 32, RX_REG),
    mach("S", MachFormat::RX, 32, RX_REG),
    mach("ST", MachFormat::RX, 32, RX_REG),
    mach("STC", MachFormat::RX, 32, RX_REG),
    mach("STH", MachFormat::RX, 32, RX_REG),
    mach("LM", MachFormat::RS, 32, RS_REGS),
    mach("STM", MachFormat::RS, 32, RS_REGS),
    mach("CLI", MachFormat::SI, 32, SI_IMM),
    mach("MVI", MachFormat::SI, 32, SI_IMM),
    mach("CLC", MachFormat::SS, 48, SS_LEN),
    mach("MVC", MachFormat::SS, 48, SS_LEN),
    mach("AHI", MachFormat::RI, 32, RI_IMM),
    mach("LHI", MachFormat::RI, 32, RI_IMM),
    mach("BRC", MachFormat::RI, 32, RI_REL),
];

pub const MNEMONICS: &[Mnemonic] = &[
    Mnemonic {
        name: "B",
        instruction: "BC",
        operands: &[AddrIndexed],
    },
    Mnemonic {
        name: "BE",
        instruction: "BC",
        operands: &[AddrIndexed],
    },
    Mnemonic {
        name: "BNE",
        instruction: "BC",
        operands: &[AddrIndexed],
    },
    Mnemonic {
        name: "NOP",
        instruction: "BC",
        operands: &[AddrIndexed],
    },
    Mnemonic {
        name: "BR",
        instruction: "BCR",
        operands: &[Reg],
    },
    Mnemonic {
        name: "NOPR",
        instruction: "BCR",
        operands: &[Reg],
    },
    Mnemonic {
        name: "J",
        instruction: "BRC",
        operands: &[Rel],
    },
];

const fn ca(name: &'static str, operandless: bool) -> CaInstruction {
    CaInstruction { name, operandless }
}

pub const CA_INSTRUCTIONS: &[CaInstruction] = &[
    ca("ACTR", false),
    ca("AEJECT", true),
    ca("AGO", false),
    ca("AIF", false),
    ca("AINSERT", false),
    ca("ANOP", true),
    ca("AREAD", false),
    ca("GBLA", false),
    ca("GBLB", false),
    ca("GBLC", false),
    ca("LCLA", false),
    ca("LCLB", false),
    ca("LCLC", false),
    ca("MACRO", true),
    ca("MEND", true),
    ca("MEXIT", true),
    ca("MHELP", false),
    ca("SETA", false),
    ca("SETB", false),
    ca("SETC", false),
];

const fn asm(name: &'static str, kind: AsmInstruction) -> AssemblerInstruction {
    AssemblerInstruction { name, kind }
}

pub const ASSEMBLER_INSTRUCTIONS: &[AssemblerInstruction] = &[
    asm("COPY", AsmInstruction::Copy),
    asm("CSECT", AsmInstruction::Other),
    asm("DC", AsmInstruction::Other),
    asm("DROP", AsmInstruction::Other),
    asm("DS", AsmInstruction::Ds),
    asm("END", AsmInstruction::Other),
    asm("EQU", AsmInstruction::Equ),
    asm("USING", AsmInstruction::Other),
];

pub fn find_machine(name: &str) -> Option<&'static MachineInstruction> {
    MACHINE_INSTRUCTIONS
        .iter()
        .find(|i| i.name.eq_ignore_ascii_case(name))
}

pub fn find_mnemonic(name: &str) -> Option<&'static Mnemonic> {
    MNEMONICS.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

pub fn find_ca(name: &str) -> Option<&'static CaInstruction> {
    CA_INSTRUCTIONS
        .iter()
        .find(|i| i.name.eq_ignore_ascii_case(name))
}

pub fn find_asm(name: &str) -> Option<&'static AssemblerInstruction> {
    ASSEMBLER_INSTRUCTIONS
        .iter()
        .find(|i| i.name.eq_ignore_ascii_case(name))
}

/// Finds the table `name` belongs to
pub fn instruction_kind(name: &str) -> Option<InstructionKind> {
    if find_ca(name).is_some() {
        Some(InstructionKind::Ca)
    } else if find_machine(name).is_some() {
        Some(InstructionKind::Mach)
    } else if find_mnemonic(name).is_some() {
        Some(InstructionKind::Mnemonic)
    } else if find_asm(name).is_some() {
        Some(InstructionKind::Asm)
    } else {
        None
    }
}

/// The machine instruction `name` stands for, together with the operands the
/// statement must supply.  Extended mnemonics resolve to the instruction
/// they abbreviate.
pub fn resolve_machine(
    name: &str,
) -> Option<(&'static MachineInstruction, &'static [OperandFormat])> {
    match find_mnemonic(name) {
        Some(m) => find_machine(m.instruction).map(|i| (i, m.operands)),
        None => find_machine(name).map(|i| (i, i.operands)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics_name_real_instructions() {
        for m in MNEMONICS {
            assert!(find_machine(m.instruction).is_some(), "{}", m.name);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(instruction_kind("lr"), Some(InstructionKind::Mach));
        assert_eq!(instruction_kind("Macro"), Some(InstructionKind::Ca));
        assert_eq!(instruction_kind("br"), Some(InstructionKind::Mnemonic));
        assert_eq!(instruction_kind("equ"), Some(InstructionKind::Asm));
        assert_eq!(instruction_kind("NOTANOP"), None);
    }

    #[test]
    fn mnemonic_resolves_to_instruction() {
        let (instr, operands) = resolve_machine("J").unwrap();
        assert_eq!(instr.name, "BRC");
        assert_eq!(operands, &[OperandFormat::Rel]);
        assert_eq!(instr.size_for_alloc, 32);
    }
}
