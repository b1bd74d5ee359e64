use std::rc::Rc;

use log::{debug, warn};

use crate::compiler::{
    context::{HlasmContext, MacroArg, MacroData, PostponedStatement},
    diagnostics::{DiagCode, Diagnosable, Diagnostic},
    instructions::{find_ca, instruction_kind, InstructionKind},
    semantics::{
        clear_concat_chain, concat_chain_to_string, ConcatChain, ConcatPoint, InstructionField,
        Label, Operand, ResolvedStatement, Statement,
    },
    source::Range,
    CompilerDisplay,
};

use super::{
    resolve_statement, AsmProcessor, InstructionType, MachProcessor, MacrodefStartData, OpCode,
    OperandOccurrence, ProcessingForm, ProcessingFormat, ProcessingKind, ProcessingStateListener,
    ProcessingStatus, StatementFieldReparser, StatementProcessor, StatementProviderKind,
};

/**
Processes open code.  Machine and assembler instructions are passed on to
the processors which handle them, a MACRO statement asks the listener to
start a macro definition, and a call of a defined macro binds its operands.
 */
pub struct OrdinaryProcessor {
    mach: MachProcessor,
    asm: AsmProcessor,
    reparser: Rc<dyn StatementFieldReparser>,
    diags: Vec<Diagnostic>,
}

impl OrdinaryProcessor {
    pub fn new(reparser: Rc<dyn StatementFieldReparser>) -> OrdinaryProcessor {
        OrdinaryProcessor {
            mach: MachProcessor::new(reparser.clone()),
            asm: AsmProcessor::new(reparser.clone()),
            reparser,
            diags: vec![],
        }
    }

    /// Finishes a statement handed back by the ordinal context once the
    /// symbols it waited on are defined
    pub fn resolve_postponed(&mut self, postponed: PostponedStatement, ctx: &mut HlasmContext) {
        match postponed.statement.opcode.ty {
            InstructionType::Mach => self.mach.resolve_postponed(postponed, ctx),
            ty => warn!(
                "Postponed statement at {} of type {:?} is not replayed",
                postponed.statement.range, ty
            ),
        }
    }

    fn process_ca(&mut self, statement: Statement, ctx: &HlasmContext, listener: &mut dyn ProcessingStateListener) {
        let name = statement
            .opcode()
            .value
            .map(|id| ctx.name_of(id).to_ascii_uppercase())
            .unwrap_or_default();
        if name == "MACRO" {
            listener.start_macro_definition(MacrodefStartData {
                location: ctx.current_location(),
            });
        } else {
            debug!("Conditional assembly {} at {} is left to the CA processor", name, statement.range());
        }
    }

    fn call_macro(
        &mut self,
        statement: Statement,
        ctx: &HlasmContext,
        listener: &mut dyn ProcessingStateListener,
    ) {
        let (stmt, diags) = resolve_statement(
            self.reparser.as_ref(),
            statement,
            ProcessingForm::Mac,
            ctx.ids(),
        );
        self.diags.extend(diags);

        let ResolvedStatement {
            label,
            opcode,
            operands,
            range,
            ..
        } = stmt;

        let def = match opcode.value.and_then(|id| ctx.macros.get(id)) {
            Some(def) => def,
            None => panic!("Macro call at {} names no defined macro", range),
        };

        let label = Self::label_data(&label, ctx);
        let args = operands
            .into_iter()
            .filter_map(|op| Self::macro_arg(op, ctx))
            .collect();

        let (invocation, diags) = def.call(label, args, ctx.ids());
        self.diags.extend(diags);
        debug!(
            "Macro {} called at {} with {} operands",
            ctx.name_of(invocation.name),
            range,
            invocation.syslist.len() - 1
        );
        listener.macro_called(invocation);
    }

    fn label_data(label: &Label, ctx: &HlasmContext) -> MacroData {
        let text = match label {
            Label::Empty | Label::Sequence(_) => return MacroData::Dummy,
            Label::Ordinary(id, _) => Ok(ctx.name_of(*id)),
            Label::Variable(var) => var.fmt(ctx.ids()),
            Label::Concat(chain, _) => concat_chain_to_string(chain, ctx.ids()),
        };
        match text {
            Ok(text) => MacroData::Single(text),
            Err(e) => {
                warn!("Cannot render name field of macro call: {}", e);
                MacroData::Dummy
            }
        }
    }

    /// Reads one call operand.  `KEY=value` names a keyword parameter,
    /// everything else is positional.
    fn macro_arg(operand: Operand, ctx: &HlasmContext) -> Option<(MacroArg, Range)> {
        let (mut chain, range): (ConcatChain, Range) = match operand {
            Operand::Macro(chain, range) => (chain, range),
            Operand::Empty(range) => return Some((MacroArg::Positional(MacroData::Dummy), range)),
            other => {
                warn!("Operand at {} is not a macro operand", other.range());
                return None;
            }
        };
        clear_concat_chain(&mut chain);

        let data = |chain: &[ConcatPoint]| match MacroData::from_chain(chain, ctx.ids()) {
            Ok(data) => data,
            Err(e) => {
                warn!("Cannot render macro operand: {}", e);
                MacroData::Dummy
            }
        };

        let arg = match chain.as_slice() {
            [ConcatPoint::Str(key), ConcatPoint::Equals, value @ ..]
                if key.chars().all(|c| c.is_ascii_alphanumeric() || "@#$_".contains(c)) =>
            {
                MacroArg::Keyword(ctx.id(&key.to_ascii_uppercase()), data(value))
            }
            _ => MacroArg::Positional(data(chain.as_slice())),
        };
        Some((arg, range))
    }

    fn undefined_opcode(&mut self, instruction: &InstructionField, ctx: &HlasmContext) {
        match instruction {
            InstructionField::Ordinary(id, range) => self.add_diagnostic(Diagnostic::with_args(
                DiagCode::UndefinedOperationCode,
                vec![ctx.name_of(*id)],
                *range,
            )),
            InstructionField::Concat(_, range) => {
                debug!("Operation field at {} needs variable substitution", range)
            }
            InstructionField::Empty(range) => self.add_diagnostic(Diagnostic::with_args(
                DiagCode::UndefinedOperationCode,
                vec![String::new()],
                *range,
            )),
        }
    }
}

impl Diagnosable for OrdinaryProcessor {
    fn diags_mut(&mut self) -> &mut Vec<Diagnostic> {
        &mut self.diags
    }
}

impl StatementProcessor for OrdinaryProcessor {
    fn kind(&self) -> ProcessingKind {
        ProcessingKind::Ordinary
    }

    fn get_processing_status(
        &mut self,
        instruction: &InstructionField,
        ctx: &HlasmContext,
    ) -> ProcessingStatus {
        let id = match instruction {
            InstructionField::Ordinary(id, _) => *id,
            InstructionField::Concat(..) => {
                return (
                    ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Deferred),
                    OpCode::default(),
                )
            }
            InstructionField::Empty(_) => {
                return (
                    ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Unknown),
                    OpCode::default(),
                )
            }
        };

        // A macro definition replaces an instruction of the same name
        if ctx.macros.contains(id) {
            return (
                ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Mac),
                OpCode::new(id, InstructionType::Mac),
            );
        }

        let name = ctx.name_of(id);
        match instruction_kind(&name) {
            Some(InstructionKind::Ca) => {
                let occurrence = match find_ca(&name) {
                    Some(ca) if ca.operandless => OperandOccurrence::Absent,
                    _ => OperandOccurrence::Present,
                };
                (
                    ProcessingFormat::with_occurrence(
                        ProcessingKind::Ordinary,
                        ProcessingForm::Ca,
                        occurrence,
                    ),
                    OpCode::new(id, InstructionType::Ca),
                )
            }
            Some(InstructionKind::Mach) | Some(InstructionKind::Mnemonic) => self.mach.get_processing_status(instruction, ctx),
            Some(InstructionKind::Asm) => (
                ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Asm),
                OpCode::new(id, InstructionType::Asm),
            ),
            None => (
                ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Unknown),
                OpCode::new(id, InstructionType::Undef),
            ),
        }
    }

    fn process_statement(
        &mut self,
        statement: Statement,
        ctx: &mut HlasmContext,
        listener: &mut dyn ProcessingStateListener,
    ) {
        match statement.opcode().ty {
            InstructionType::Ca => self.process_ca(statement, ctx, listener),
            InstructionType::Mach => self.mach.process(statement, ctx),
            InstructionType::Asm => self.asm.process(statement, ctx),
            InstructionType::Mac => self.call_macro(statement, ctx, listener),
            InstructionType::Undef => self.undefined_opcode(statement.instruction(), ctx),
        }
    }

    fn end_processing(&mut self, _ctx: &mut HlasmContext, _listener: &mut dyn ProcessingStateListener) {}

    fn terminal_condition(&self, provider: StatementProviderKind) -> bool {
        provider == StatementProviderKind::Open
    }

    fn finished(&self) -> bool {
        false
    }

    fn collect_diags(&mut self) -> Vec<Diagnostic> {
        let mut diags = self.take_diags();
        diags.extend(self.mach.take_diags());
        diags.extend(self.asm.take_diags());
        diags
    }
}
