use std::path::Path;

use serde::Deserialize;

use crate::compiler::{
    processing::{parse_instruction, parse_label, OpCode},
    semantics::{DeferredStatement, Statement},
    source::Range,
    StringTable,
};

/**
One source statement as it appears in an input file: the label, instruction
and operand fields already split apart.  Missing fields are empty.  When
`line` is omitted the statement takes its position in the file.
 */
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct SourceStatement {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub operands: String,
    #[serde(default)]
    pub line: Option<u32>,
}

impl SourceStatement {
    /**
    Converts the statement into a deferred statement whose fields sit on
    `line` in the columns they would occupy in a source line: the label
    first, each field separated from the next by one space.
     */
    pub fn to_statement(&self, line: u32, ids: &StringTable) -> Statement {
        let line = self.line.unwrap_or(line);
        let label_end = self.label.len() as u32;
        let instr_start = label_end + 1;
        let instr_end = instr_start + self.instruction.len() as u32;
        let op_start = instr_end + 1;
        let op_end = op_start + self.operands.len() as u32;

        Statement::Deferred(DeferredStatement {
            label: parse_label(&self.label, Range::on_line(line, 0, label_end), ids),
            instruction: parse_instruction(
                &self.instruction,
                Range::on_line(line, instr_start, instr_end),
                ids,
            ),
            opcode: OpCode::default(),
            operand_field: self.operands.clone(),
            operand_range: Range::on_line(line, op_start, op_end),
            range: Range::on_line(line, 0, op_end),
        })
    }
}

pub fn parse_statements(text: &str) -> Result<Vec<SourceStatement>, String> {
    serde_yaml::from_str(text).map_err(|e| format!("Could not parse statements: {}", e))
}

/// Reads the YAML list of statements stored at `path`
pub fn read_statements(path: &Path) -> Result<Vec<SourceStatement>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
    parse_statements(&text)
}
