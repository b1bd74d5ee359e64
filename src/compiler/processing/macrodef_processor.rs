use std::{collections::hash_map::Entry, rc::Rc};

use log::{debug, info, warn};

use crate::compiler::{
    context::{HlasmContext, MacroData, MacroDefinitionResult, MacroParam, MacroSequenceSymbol},
    diagnostics::{DiagCode, Diagnosable, Diagnostic},
    instructions::find_ca,
    semantics::{
        clear_concat_chain, concat_chain_to_string, ConcatChain, ConcatPoint, InstructionField,
        Label, Operand, ResolvedStatement, Statement, VariableSymbol,
    },
    source::Range,
    stringtable::StringId,
};

use super::{
    resolve_statement, InstructionType, MacrodefStartData, OpCode, OperandOccurrence,
    ProcessingForm, ProcessingFormat, ProcessingKind, ProcessingStateListener, ProcessingStatus,
    StatementFieldReparser, StatementProcessor, StatementProviderKind,
};

/// The name a prototype without an operation field is registered under
const MISSING_NAME: &str = "ASPACE";

/**
Collects one macro definition: the prototype statement which follows MACRO
and every statement up to the MEND which closes it.  Inner MACRO/MEND pairs
are kept in the body and only change the nesting depth.

The result is handed to the [`ProcessingStateListener`] exactly once, from
[`StatementProcessor::end_processing`], whether or not the definition was
terminated.
 */
pub struct MacrodefProcessor {
    reparser: Rc<dyn StatementFieldReparser>,
    nest_depth: usize,
    curr_line: usize,
    expecting_prototype: bool,
    finished: bool,
    delivered: bool,
    result: MacroDefinitionResult,
    diags: Vec<Diagnostic>,
}

impl MacrodefProcessor {
    pub fn new(
        start: MacrodefStartData,
        reparser: Rc<dyn StatementFieldReparser>,
    ) -> MacrodefProcessor {
        debug!("Macro definition started at {}", start.location.pos);
        MacrodefProcessor {
            reparser,
            nest_depth: 1,
            curr_line: 0,
            expecting_prototype: true,
            finished: false,
            delivered: false,
            result: MacroDefinitionResult {
                definition_location: start.location,
                ..MacroDefinitionResult::default()
            },
            diags: vec![],
        }
    }

    /// How many MACRO statements are open, counting the one which started
    /// this definition
    pub fn nest_depth(&self) -> usize {
        self.nest_depth
    }

    fn process_prototype(&mut self, statement: Statement, ctx: &HlasmContext) {
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
            ..
        } = stmt;

        let mut param_names = vec![];
        match label {
            Label::Variable(var) => match Self::basic_name(&var) {
                Some(name) => {
                    self.result.prototype.name_param = Some(name);
                    param_names.push(name);
                }
                None => self.add_diagnostic(Diagnostic::new(
                    DiagCode::InvalidPrototypeVariable,
                    var.range(),
                )),
            },
            Label::Empty => (),
            other => {
                let range = other.range().unwrap_or_else(Range::zero);
                self.add_diagnostic(Diagnostic::new(DiagCode::IllegalPrototypeLabel, range))
            }
        }

        self.result.prototype.macro_name = opcode.value;

        for operand in operands {
            let param = self.prototype_param(operand, &mut param_names, ctx);
            self.result.prototype.symbolic_params.push(param);
        }

        info!(
            "Prototype of {} declares {} parameters",
            opcode.value.map(|id| ctx.name_of(id)).unwrap_or_default(),
            self.result.prototype.symbolic_params.len()
        );
    }

    /// Reads one operand of the prototype.  An operand which does not
    /// declare a parameter still takes its position in the list.
    fn prototype_param(
        &mut self,
        operand: Operand,
        param_names: &mut Vec<StringId>,
        ctx: &HlasmContext,
    ) -> MacroParam {
        let (mut chain, range) = match operand {
            Operand::Macro(chain, range) => (chain, range),
            Operand::Empty(_) => return MacroParam::placeholder(),
            other => {
                self.add_diagnostic(Diagnostic::new(
                    DiagCode::InvalidPrototypeOperand,
                    other.range(),
                ));
                return MacroParam::placeholder();
            }
        };

        clear_concat_chain(&mut chain);

        match chain.as_slice() {
            [] => MacroParam::placeholder(),
            [ConcatPoint::Var(var)] => match self.declare(var, range, param_names) {
                Some(name) => MacroParam::positional(name),
                None => MacroParam::placeholder(),
            },
            [ConcatPoint::Var(var), ConcatPoint::Equals, default @ ..] => {
                match self.declare(var, range, param_names) {
                    Some(name) => match MacroData::from_chain(default, ctx.ids()) {
                        Ok(data) => MacroParam::keyword(name, data),
                        Err(e) => {
                            warn!("Cannot render default of keyword parameter: {:?}", e);
                            MacroParam::keyword(name, MacroData::Dummy)
                        }
                    },
                    None => MacroParam::placeholder(),
                }
            }
            _ => {
                self.add_diagnostic(Diagnostic::new(DiagCode::InvalidPrototypeOperand, range));
                MacroParam::placeholder()
            }
        }
    }

    /// Registers the name of a symbolic parameter, reporting names which
    /// cannot be parameters and names which are already taken
    fn declare(
        &mut self,
        var: &VariableSymbol,
        range: Range,
        param_names: &mut Vec<StringId>,
    ) -> Option<StringId> {
        let name = match Self::basic_name(var) {
            Some(name) => name,
            None => {
                self.add_diagnostic(Diagnostic::new(
                    DiagCode::InvalidPrototypeVariable,
                    var.range(),
                ));
                return None;
            }
        };

        if param_names.contains(&name) {
            self.add_diagnostic(Diagnostic::with_args(
                DiagCode::DuplicateSymbolicParameter,
                vec!["Symbolic parameter".into()],
                range,
            ));
            None
        } else {
            param_names.push(name);
            Some(name)
        }
    }

    /// The name of a variable symbol usable as a parameter: neither created
    /// nor subscripted
    fn basic_name(var: &VariableSymbol) -> Option<StringId> {
        if var.subscript().is_empty() {
            var.access_basic()
        } else {
            None
        }
    }

    fn process_body_statement(&mut self, statement: Statement, ctx: &HlasmContext) {
        if let Label::Sequence(seq) = statement.label() {
            let seq = *seq;
            self.process_sequence_symbol(seq.name, seq.range, ctx);
        }

        let name = match statement.instruction() {
            InstructionField::Ordinary(id, _) => Some(ctx.name_of(*id).to_ascii_uppercase()),
            _ => None,
        };
        match name.as_deref() {
            Some("MACRO") => {
                self.nest_depth += 1;
                debug!("Inner macro definition, depth {}", self.nest_depth);
            }
            Some("MEND") => {
                self.nest_depth -= 1;
                if self.nest_depth == 0 {
                    self.finished = true;
                    debug!("Macro definition closed at {}", statement.range());
                    return;
                }
            }
            // Copy members are expanded by the statement provider
            Some("COPY") => (),
            _ => (),
        }

        self.result.definition.push(statement);
        self.curr_line += 1;
    }

    fn process_sequence_symbol(&mut self, name: StringId, range: Range, ctx: &HlasmContext) {
        match self.result.sequence_symbols.entry(name) {
            Entry::Occupied(_) => self.diags.push(Diagnostic::with_args(
                DiagCode::DuplicateSequenceSymbol,
                vec![ctx.name_of(name)],
                range,
            )),
            Entry::Vacant(v) => {
                v.insert(MacroSequenceSymbol {
                    name,
                    location: ctx.current_location(),
                    offset: self.curr_line,
                });
            }
        }
    }

    fn prototype_status(&mut self, instruction: &InstructionField, ctx: &HlasmContext) -> ProcessingStatus {
        let format = ProcessingFormat::new(ProcessingKind::Macro, ProcessingForm::Mac);
        let id = match instruction {
            InstructionField::Ordinary(id, _) => *id,
            InstructionField::Empty(range) => {
                self.add_diagnostic(Diagnostic::new(DiagCode::MissingMacroName, *range));
                ctx.id(MISSING_NAME)
            }
            InstructionField::Concat(chain, _) => ctx.id(&Self::chain_text(chain, ctx)),
        };
        (format, OpCode::new(id, InstructionType::Mac))
    }

    fn chain_text(chain: &ConcatChain, ctx: &HlasmContext) -> String {
        match concat_chain_to_string(chain, ctx.ids()) {
            Ok(text) => text,
            Err(e) => {
                warn!("Cannot render operation field: {:?}", e);
                MISSING_NAME.into()
            }
        }
    }
}

impl Diagnosable for MacrodefProcessor {
    fn diags_mut(&mut self) -> &mut Vec<Diagnostic> {
        &mut self.diags
    }
}

impl StatementProcessor for MacrodefProcessor {
    fn kind(&self) -> ProcessingKind {
        ProcessingKind::Macro
    }

    fn get_processing_status(
        &mut self,
        instruction: &InstructionField,
        ctx: &HlasmContext,
    ) -> ProcessingStatus {
        if self.expecting_prototype {
            return self.prototype_status(instruction, ctx);
        }

        if let InstructionField::Ordinary(id, _) = instruction {
            if let Some(ca) = find_ca(&ctx.name_of(*id)) {
                let occurrence = if ca.operandless {
                    OperandOccurrence::Absent
                } else {
                    OperandOccurrence::Present
                };
                return (
                    ProcessingFormat::with_occurrence(
                        ProcessingKind::Macro,
                        ProcessingForm::Ca,
                        occurrence,
                    ),
                    OpCode::new(*id, InstructionType::Ca),
                );
            }
        }

        (
            ProcessingFormat::new(ProcessingKind::Macro, ProcessingForm::Deferred),
            OpCode::default(),
        )
    }

    fn process_statement(
        &mut self,
        statement: Statement,
        ctx: &mut HlasmContext,
        _listener: &mut dyn ProcessingStateListener,
    ) {
        if self.finished {
            panic!("Statement at {} given to a finished macro definition", statement.range());
        }

        if self.expecting_prototype {
            self.expecting_prototype = false;
            self.process_prototype(statement, ctx);
        } else {
            self.process_body_statement(statement, ctx);
        }
    }

    fn end_processing(&mut self, ctx: &mut HlasmContext, listener: &mut dyn ProcessingStateListener) {
        if self.delivered {
            return;
        }

        if !self.finished {
            let name = self
                .result
                .prototype
                .macro_name
                .map(|id| ctx.name_of(id))
                .unwrap_or_default();
            let pos = ctx.current_location().pos;
            self.add_diagnostic(Diagnostic::with_args(
                DiagCode::UnterminatedMacro,
                vec![name],
                Range::at(pos),
            ));
        }

        listener.finish_macro_definition(std::mem::take(&mut self.result));
        self.finished = true;
        self.delivered = true;
    }

    fn terminal_condition(&self, provider: StatementProviderKind) -> bool {
        matches!(
            provider,
            StatementProviderKind::Macro | StatementProviderKind::Open
        )
    }

    fn finished(&self) -> bool {
        self.finished
    }

    fn collect_diags(&mut self) -> Vec<Diagnostic> {
        self.take_diags()
    }
}
