use std::rc::Rc;

use log::{debug, info};
use stdext::function_name;

use crate::{
    compiler::{
        context::{HlasmContext, MacroDefinitionResult, MacroInvocation},
        diagnostics::Diagnostic,
        semantics::{InstructionField, Statement},
    },
    diagnostics::config::{Tracing, TracingConfig},
    trace,
};

use super::{
    MacrodefProcessor, MacrodefStartData, OrdinaryProcessor, ProcessingStateListener,
    StatementFieldReparser, StatementProcessor, StatementProviderKind,
};

/// Collects what the processors report through the listener until the
/// manager acts on it
#[derive(Debug, Default)]
pub struct ProcessingState {
    pending_start: Option<MacrodefStartData>,
    finished_definitions: Vec<MacroDefinitionResult>,
    invocations: Vec<MacroInvocation>,
}

impl ProcessingState {
    pub fn new() -> ProcessingState {
        ProcessingState::default()
    }

    /// Every macro call seen so far, in source order
    pub fn invocations(&self) -> &[MacroInvocation] {
        &self.invocations
    }
}

impl ProcessingStateListener for ProcessingState {
    fn start_macro_definition(&mut self, start: MacrodefStartData) {
        self.pending_start = Some(start);
    }

    fn finish_macro_definition(&mut self, result: MacroDefinitionResult) {
        self.finished_definitions.push(result);
    }

    fn macro_called(&mut self, invocation: MacroInvocation) {
        self.invocations.push(invocation);
    }
}

/**
Drives the statement processors.  Open code is handled by the
[`OrdinaryProcessor`]; any nested processor (a macro definition being
collected) sits on a stack above it and receives statements until it
reports that it is finished.

After each statement the manager starts a requested macro definition,
registers completed ones, hands statements the ordinal context released
back to the ordinary processor, and gathers the diagnostics raised.
 */
pub struct ProcessingManager {
    ctx: HlasmContext,
    open_code: OrdinaryProcessor,
    procs: Vec<Box<dyn StatementProcessor>>,
    state: ProcessingState,
    reparser: Rc<dyn StatementFieldReparser>,
    diags: Vec<Diagnostic>,

    tracing: TracingConfig,
    line: u32,
    subject: String,
}

impl ProcessingManager {
    pub fn new(file: &str, reparser: Rc<dyn StatementFieldReparser>) -> ProcessingManager {
        ProcessingManager {
            ctx: HlasmContext::new(file),
            open_code: OrdinaryProcessor::new(reparser.clone()),
            procs: vec![],
            state: ProcessingState::new(),
            reparser,
            diags: vec![],
            tracing: TracingConfig::Off,
            line: 0,
            subject: String::new(),
        }
    }

    pub fn context(&self) -> &HlasmContext {
        &self.ctx
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    pub fn diags(&self) -> &[Diagnostic] {
        &self.diags
    }

    pub fn take_diags(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diags)
    }

    /// Number of processors stacked above open code
    pub fn depth(&self) -> usize {
        self.procs.len()
    }

    pub fn process(&mut self, mut statement: Statement) {
        let range = statement.range();
        self.line = range.start.line + 1;
        self.subject = self.describe(statement.instruction());
        trace!(self);

        self.ctx.set_position(range.start);

        let proc: &mut dyn StatementProcessor = match self.procs.last_mut() {
            Some(p) => p.as_mut(),
            None => &mut self.open_code,
        };

        let (format, opcode) = proc.get_processing_status(statement.instruction(), &self.ctx);
        debug!(
            "{:?} processor reads statement at {} as {:?}",
            proc.kind(),
            range,
            format.form
        );
        statement.set_opcode(opcode);
        proc.process_statement(statement, &mut self.ctx, &mut self.state);

        let finished = proc.finished();
        if finished {
            proc.end_processing(&mut self.ctx, &mut self.state);
            let diags = proc.collect_diags();
            self.diags.extend(diags);
            self.procs.pop();
        }

        self.after_statement();
    }

    /// The statement provider of kind `kind` ran out of statements.  Every
    /// processor which ends with that provider is ended.
    pub fn provider_finished(&mut self, kind: StatementProviderKind) {
        while let Some(proc) = self.procs.last_mut() {
            if !proc.terminal_condition(kind) {
                break;
            }
            proc.end_processing(&mut self.ctx, &mut self.state);
            let diags = proc.collect_diags();
            self.diags.extend(diags);
            self.procs.pop();
            self.after_statement();
        }
    }

    /// End of input.  Ends every remaining processor and abandons the
    /// dependencies which can no longer be resolved.
    pub fn finish(&mut self) {
        self.provider_finished(StatementProviderKind::Open);
        while let Some(mut proc) = self.procs.pop() {
            proc.end_processing(&mut self.ctx, &mut self.state);
            self.diags.extend(proc.collect_diags());
        }
        self.after_statement();

        self.ctx.ord_ctx.finish();
        self.replay();
        self.collect();
        info!("Processing finished with {} diagnostics", self.diags.len());
    }

    fn after_statement(&mut self) {
        if let Some(start) = self.state.pending_start.take() {
            self.procs
                .push(Box::new(MacrodefProcessor::new(start, self.reparser.clone())));
        }

        for result in self.state.finished_definitions.drain(..) {
            match self.ctx.macros.add(result) {
                Some(name) => debug!("Registered macro {}", self.ctx.name_of(name)),
                None => debug!("Dropped a macro definition without a name"),
            }
        }

        self.replay();
        self.collect();
    }

    fn replay(&mut self) {
        loop {
            let ready = self.ctx.ord_ctx.take_ready();
            if ready.is_empty() {
                break;
            }
            for postponed in ready {
                self.open_code.resolve_postponed(postponed, &mut self.ctx);
            }
        }
    }

    fn collect(&mut self) {
        for proc in self.procs.iter_mut() {
            self.diags.extend(proc.collect_diags());
        }
        self.diags.extend(self.open_code.collect_diags());
        self.diags.extend(self.ctx.take_ordinal_diags());
    }

    fn describe(&self, instruction: &InstructionField) -> String {
        match instruction {
            InstructionField::Ordinary(id, _) => self.ctx.name_of(*id),
            InstructionField::Concat(..) => "<concatenation>".into(),
            InstructionField::Empty(_) => "<empty>".into(),
        }
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn trace_subject(&self) -> &str {
        &self.subject
    }
}

impl Tracing for ProcessingManager {
    fn set_tracing(&mut self, config: TracingConfig) {
        self.tracing = config;
    }
}
