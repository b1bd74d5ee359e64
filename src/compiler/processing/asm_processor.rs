use std::rc::Rc;

use log::debug;

use crate::compiler::{
    context::{
        Address, Dependable, HlasmContext, SymbolAttributes, SymbolValue, NO_ALIGN,
    },
    diagnostics::{DiagCode, Diagnosable, Diagnostic},
    expressions::MachExpr,
    instructions::{find_asm, AsmInstruction},
    semantics::{Label, Operand, ResolvedStatement, Statement},
    source::Range,
    stringtable::StringId,
};

use super::{resolve_statement, ProcessingForm, StatementFieldReparser};

/// Processes the assembler instructions which affect the ordinal context
pub struct AsmProcessor {
    reparser: Rc<dyn StatementFieldReparser>,
    diags: Vec<Diagnostic>,
}

impl AsmProcessor {
    pub fn new(reparser: Rc<dyn StatementFieldReparser>) -> AsmProcessor {
        AsmProcessor {
            reparser,
            diags: vec![],
        }
    }

    pub fn process(&mut self, statement: Statement, ctx: &mut HlasmContext) {
        let (stmt, diags) = resolve_statement(
            self.reparser.as_ref(),
            statement,
            ProcessingForm::Asm,
            ctx.ids(),
        );
        self.diags.extend(diags);

        let name = stmt.opcode.value.map(|id| ctx.name_of(id)).unwrap_or_default();
        match find_asm(&name).map(|i| i.kind) {
            Some(AsmInstruction::Equ) => self.process_equ(&stmt, ctx),
            Some(AsmInstruction::Ds) => self.process_ds(&stmt, ctx),
            Some(AsmInstruction::Copy) => debug!("COPY at {} is expanded by the statement provider", stmt.range),
            Some(AsmInstruction::Other) | None => debug!("{} at {} has no effect on the ordinal context", name, stmt.range),
        }
    }

    fn process_equ(&mut self, stmt: &ResolvedStatement, ctx: &mut HlasmContext) {
        let (name, label_range) = match self.ordinary_label(stmt, ctx) {
            Some(label) => label,
            None => {
                if let Label::Empty = stmt.label {
                    self.add_diagnostic(Diagnostic::new(DiagCode::EquWithoutLabel, stmt.range));
                }
                return;
            }
        };

        let value = match Self::operand_expr(stmt, 0) {
            Some(e) => e,
            None => {
                self.add_diagnostic(Diagnostic::new(DiagCode::InvalidExpression, stmt.range));
                return;
            }
        };

        let length = Self::operand_expr(stmt, 1).and_then(|e| match e.evaluate(&ctx.ord_ctx) {
            Ok(SymbolValue::Absolute(len)) if len >= 0 => Some(len as u32),
            _ => None,
        });

        let location = ctx.current_location();
        if value.get_dependencies(&ctx.ord_ctx).contains_dependencies() {
            debug!("Value of {} waits on undefined symbols", ctx.name_of(name));
            if let Err(e) = ctx.ord_ctx.create_symbol(
                name,
                SymbolValue::Undefined,
                SymbolAttributes::equ(length),
                location,
            ) {
                self.add_diagnostic(e.to_diagnostic(label_range, ctx.ids()));
                return;
            }
            ctx.ord_ctx.add_dependency(
                stmt.range,
                Some(name),
                vec![Dependable::Expr(value.clone())],
                None,
            );
        } else {
            match value.evaluate(&ctx.ord_ctx) {
                Ok(v) => {
                    if let Err(e) =
                        ctx.ord_ctx
                            .create_symbol(name, v, SymbolAttributes::equ(length), location)
                    {
                        self.add_diagnostic(e.to_diagnostic(label_range, ctx.ids()));
                    }
                }
                Err(_) => {
                    self.add_diagnostic(Diagnostic::new(DiagCode::InvalidExpression, value.range()))
                }
            }
        }
    }

    fn process_ds(&mut self, stmt: &ResolvedStatement, ctx: &mut HlasmContext) {
        let label = self.ordinary_label(stmt, ctx);

        let length = match Self::operand_expr(stmt, 0) {
            Some(e) => e,
            None => {
                self.add_diagnostic(Diagnostic::new(DiagCode::InvalidStorageLength, stmt.range));
                return;
            }
        };

        let (addr, size) = if length.get_dependencies(&ctx.ord_ctx).contains_dependencies() {
            let addr = ctx
                .ord_ctx
                .reserve_deferred_storage_area(length.clone(), NO_ALIGN, stmt.range);
            (addr, None)
        } else {
            match length.evaluate(&ctx.ord_ctx) {
                Ok(SymbolValue::Absolute(len)) if len >= 0 => {
                    let addr = ctx.ord_ctx.reserve_storage_area(len as u32, NO_ALIGN);
                    (addr, Some(len as u32))
                }
                _ => {
                    self.add_diagnostic(Diagnostic::new(
                        DiagCode::InvalidStorageLength,
                        length.range(),
                    ));
                    (ctx.ord_ctx.align(NO_ALIGN), None)
                }
            }
        };

        if let Some((name, range)) = label {
            self.define_label(name, range, addr, SymbolAttributes::storage(size), ctx);
        }
    }

    fn define_label(
        &mut self,
        name: StringId,
        range: Range,
        addr: Address,
        attributes: SymbolAttributes,
        ctx: &mut HlasmContext,
    ) {
        let location = ctx.current_location();
        match ctx.ord_ctx.create_symbol(
            name,
            SymbolValue::Relocatable(addr.clone()),
            attributes,
            location,
        ) {
            Ok(()) if addr.has_spaces() => {
                ctx.ord_ctx
                    .add_dependency(range, Some(name), vec![Dependable::Address(addr)], None)
            }
            Ok(()) => (),
            Err(e) => self.add_diagnostic(e.to_diagnostic(range, ctx.ids())),
        }
    }

    /// The name of an ordinary label which is not defined yet.  A label
    /// which is already defined is reported.
    fn ordinary_label(
        &mut self,
        stmt: &ResolvedStatement,
        ctx: &HlasmContext,
    ) -> Option<(StringId, Range)> {
        match &stmt.label {
            Label::Ordinary(name, range) if ctx.ord_ctx.symbol_defined(*name) => {
                self.add_diagnostic(Diagnostic::with_args(
                    DiagCode::SymbolRedefinition,
                    vec![ctx.name_of(*name)],
                    *range,
                ));
                None
            }
            Label::Ordinary(name, range) => Some((*name, *range)),
            _ => None,
        }
    }

    fn operand_expr(stmt: &ResolvedStatement, idx: usize) -> Option<&MachExpr> {
        stmt.operands.get(idx).and_then(Operand::access_expr)
    }
}

impl Diagnosable for AsmProcessor {
    fn diags_mut(&mut self) -> &mut Vec<Diagnostic> {
        &mut self.diags
    }
}
