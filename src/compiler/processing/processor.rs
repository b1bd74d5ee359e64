use crate::compiler::{
    context::{HlasmContext, MacroDefinitionResult, MacroInvocation},
    diagnostics::Diagnostic,
    semantics::{InstructionField, Statement},
    source::Location,
};

use super::{ProcessingKind, ProcessingStatus, StatementProviderKind};

/// What a MACRO statement found in open code asks for
#[derive(Clone, Debug, PartialEq)]
pub struct MacrodefStartData {
    pub location: Location,
}

/// Receives the results of processing which outlive the processor producing
/// them.
pub trait ProcessingStateListener {
    fn start_macro_definition(&mut self, start: MacrodefStartData);

    /// Called exactly once for every macro definition, terminated or not
    fn finish_macro_definition(&mut self, result: MacroDefinitionResult);

    fn macro_called(&mut self, invocation: MacroInvocation);
}

/**
A processor consumes statements until its region of the source ends.

The driving loop asks the active processor for the processing status of each
statement's operation field, sets the resulting operation code on the
statement, and hands the statement to [`process_statement`].  A processor
which reports [`finished`] is ended with [`end_processing`] and removed; a
processor whose statement provider runs dry is ended when
[`terminal_condition`] accepts that provider.

[`process_statement`]: StatementProcessor::process_statement
[`finished`]: StatementProcessor::finished
[`end_processing`]: StatementProcessor::end_processing
[`terminal_condition`]: StatementProcessor::terminal_condition
 */
pub trait StatementProcessor {
    fn kind(&self) -> ProcessingKind;

    fn get_processing_status(
        &mut self,
        instruction: &InstructionField,
        ctx: &HlasmContext,
    ) -> ProcessingStatus;

    fn process_statement(
        &mut self,
        statement: Statement,
        ctx: &mut HlasmContext,
        listener: &mut dyn ProcessingStateListener,
    );

    fn end_processing(&mut self, ctx: &mut HlasmContext, listener: &mut dyn ProcessingStateListener);

    /// True when running out of statements from `provider` ends this
    /// processor
    fn terminal_condition(&self, provider: StatementProviderKind) -> bool;

    fn finished(&self) -> bool;

    /// Removes and returns the diagnostics raised since the last call
    fn collect_diags(&mut self) -> Vec<Diagnostic>;
}
