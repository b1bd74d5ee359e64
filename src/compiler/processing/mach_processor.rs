use std::rc::Rc;

use log::debug;

use crate::compiler::{
    context::{
        Dependable, HlasmContext, PostponedStatement, SymbolAttributes, SymbolValue, HALFWORD,
        NO_ALIGN,
    },
    diagnostics::{DiagCode, Diagnosable, Diagnostic},
    instructions::{resolve_machine, MachineInstruction, OperandFormat},
    semantics::{InstructionField, Label, Operand, ResolvedStatement, Statement},
};

use super::{
    checker::check_operands, resolve_statement, InstructionType, OpCode, ProcessingFormat,
    ProcessingForm, ProcessingKind, ProcessingStateListener, ProcessingStatus,
    StatementFieldReparser, StatementProcessor, StatementProviderKind,
};

/**
Processes machine instructions: defines the label, reserves the storage the
instruction occupies, and checks the operands.  A statement whose operands
use symbols which are not defined yet is postponed and checked when the
ordinal context hands it back.
 */
pub struct MachProcessor {
    reparser: Rc<dyn StatementFieldReparser>,
    diags: Vec<Diagnostic>,
}

impl MachProcessor {
    pub fn new(reparser: Rc<dyn StatementFieldReparser>) -> MachProcessor {
        MachProcessor {
            reparser,
            diags: vec![],
        }
    }

    pub fn process(&mut self, statement: Statement, ctx: &mut HlasmContext) {
        let (stmt, diags) = resolve_statement(
            self.reparser.as_ref(),
            statement,
            ProcessingForm::Mach,
            ctx.ids(),
        );
        self.diags.extend(diags);

        let (instr, formats) = Self::instruction(&stmt, ctx);

        if let Label::Ordinary(name, range) = &stmt.label {
            let (name, range) = (*name, *range);
            if ctx.ord_ctx.symbol_defined(name) {
                self.add_diagnostic(Diagnostic::with_args(
                    DiagCode::SymbolRedefinition,
                    vec![ctx.name_of(name)],
                    range,
                ));
            } else {
                let addr = ctx.ord_ctx.align(HALFWORD);
                let location = ctx.current_location();
                let created = ctx.ord_ctx.create_symbol(
                    name,
                    SymbolValue::Relocatable(addr.clone()),
                    SymbolAttributes::machine(instr.size_for_alloc / 8),
                    location,
                );
                match created {
                    Ok(()) if addr.has_spaces() => ctx.ord_ctx.add_dependency(
                        range,
                        Some(name),
                        vec![Dependable::Address(addr)],
                        None,
                    ),
                    Ok(()) => (),
                    Err(e) => self.add_diagnostic(e.to_diagnostic(range, ctx.ids())),
                }
            }
        }

        let dependencies: Vec<Dependable> = stmt
            .operands
            .iter()
            .filter_map(|op| match op {
                Operand::Machine(m, _) => Some(m.expressions()),
                _ => None,
            })
            .flatten()
            .filter(|e| e.get_dependencies(&ctx.ord_ctx).contains_dependencies())
            .map(|e| Dependable::Expr(e.clone()))
            .collect();

        if dependencies.is_empty() {
            self.check(&stmt, formats, ctx);
        } else {
            debug!(
                "Postponing {} at {}: {} operand expressions wait on symbols",
                instr.name,
                stmt.range,
                dependencies.len()
            );
            let range = stmt.range;
            let postponed = PostponedStatement::new(stmt, ctx.processing_stack().to_vec());
            ctx.ord_ctx
                .add_dependency(range, None, dependencies, Some(postponed));
        }

        ctx.ord_ctx
            .reserve_storage_area(instr.size_for_alloc / 8, NO_ALIGN);
    }

    /// Checks a statement which was postponed while its operands depended on
    /// undefined symbols
    pub fn resolve_postponed(&mut self, postponed: PostponedStatement, ctx: &mut HlasmContext) {
        let saved = ctx.replace_stack(postponed.stack);
        let (_, formats) = Self::instruction(&postponed.statement, ctx);
        debug!("Replaying statement at {}", postponed.statement.range);
        self.check(&postponed.statement, formats, ctx);
        ctx.replace_stack(saved);
    }

    fn instruction(
        stmt: &ResolvedStatement,
        ctx: &HlasmContext,
    ) -> (&'static MachineInstruction, &'static [OperandFormat]) {
        let name = match stmt.opcode.value {
            Some(id) => ctx.name_of(id),
            None => panic!("Machine statement at {} has no operation code", stmt.range),
        };
        match resolve_machine(&name) {
            Some(found) => found,
            None => panic!("Machine instruction {} is missing from the instruction tables", name),
        }
    }

    fn check(&mut self, stmt: &ResolvedStatement, formats: &[OperandFormat], ctx: &HlasmContext) {
        let diags = check_operands(&stmt.operands, formats, &ctx.ord_ctx, stmt.range);
        self.diags.extend(diags);
    }
}

impl Diagnosable for MachProcessor {
    fn diags_mut(&mut self) -> &mut Vec<Diagnostic> {
        &mut self.diags
    }
}

impl StatementProcessor for MachProcessor {
    fn kind(&self) -> ProcessingKind {
        ProcessingKind::Ordinary
    }

    fn get_processing_status(
        &mut self,
        instruction: &InstructionField,
        ctx: &HlasmContext,
    ) -> ProcessingStatus {
        match instruction {
            InstructionField::Ordinary(id, _) if resolve_machine(&ctx.name_of(*id)).is_some() => (
                ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Mach),
                OpCode::new(*id, InstructionType::Mach),
            ),
            InstructionField::Ordinary(id, _) => (
                ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Unknown),
                OpCode::new(*id, InstructionType::Undef),
            ),
            _ => (
                ProcessingFormat::new(ProcessingKind::Ordinary, ProcessingForm::Unknown),
                OpCode::default(),
            ),
        }
    }

    fn process_statement(
        &mut self,
        statement: Statement,
        ctx: &mut HlasmContext,
        _listener: &mut dyn ProcessingStateListener,
    ) {
        self.process(statement, ctx)
    }

    fn end_processing(&mut self, _ctx: &mut HlasmContext, _listener: &mut dyn ProcessingStateListener) {}

    fn terminal_condition(&self, provider: StatementProviderKind) -> bool {
        provider == StatementProviderKind::Open
    }

    fn finished(&self) -> bool {
        false
    }

    fn collect_diags(&mut self) -> Vec<Diagnostic> {
        self.take_diags()
    }
}
