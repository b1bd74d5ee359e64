use crate::compiler::{
    diagnostics::{DiagCode, Diagnostic},
    expressions::{CaExpr, MachExpr, MachOp},
    semantics::{
        ConcatChain, ConcatPoint, InstructionField, Label, MachineOperand, Operand,
        ResolvedStatement, SequenceSymbol, Statement, VariableSymbol,
    },
    source::Range,
    StringTable,
};

use super::ProcessingForm;

pub struct ReparseResult {
    pub operands: Vec<Operand>,
    pub diags: Vec<Diagnostic>,
}

/// Parses the text of an operand field once the format it is written in is
/// known.
pub trait StatementFieldReparser {
    fn reparse_operand_field(
        &self,
        field: &str,
        range: Range,
        form: ProcessingForm,
        ids: &StringTable,
    ) -> ReparseResult;
}

/**
Reparser for single line operand fields.

Operands are separated by commas outside of parentheses and quotes, and the
field ends at the first blank outside of quotes.  Machine operands are
expressions or `D(X,B)` addresses, assembler operands are expressions, and
macro operands are concatenation chains.  Other forms are not reparsed.
 */
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleFieldReparser;

impl StatementFieldReparser for SimpleFieldReparser {
    fn reparse_operand_field(
        &self,
        field: &str,
        range: Range,
        form: ProcessingForm,
        ids: &StringTable,
    ) -> ReparseResult {
        let mut result = ReparseResult {
            operands: vec![],
            diags: vec![],
        };

        for (offset, text) in split_operands(field) {
            let start = column(range, offset);
            let op_range = Range::on_line(range.start.line, start, start + text.chars().count() as u32);

            let operand = if text.is_empty() {
                Ok(Operand::Empty(op_range))
            } else {
                match form {
                    ProcessingForm::Mach => parse_mach_operand(text, op_range, ids)
                        .map(|m| Operand::Machine(m, op_range)),
                    ProcessingForm::Asm => parse_mach_expr(text, op_range, ids)
                        .map(|e| Operand::Expr(e, op_range)),
                    ProcessingForm::Mac => Ok(Operand::Macro(parse_chain(text, op_range, ids), op_range)),
                    _ => Ok(Operand::Empty(op_range)),
                }
            };

            match operand {
                Ok(operand) => result.operands.push(operand),
                Err(diag) => {
                    result.diags.push(diag);
                    result.operands.push(Operand::Empty(op_range));
                }
            }
        }

        result
    }
}

/// Builds the name field out of its text
pub fn parse_label(text: &str, range: Range, ids: &StringTable) -> Label {
    if text.is_empty() {
        Label::Empty
    } else if let Some(name) = text.strip_prefix('.') {
        Label::Sequence(SequenceSymbol {
            name: ids.insert(&name.to_ascii_uppercase()),
            range,
        })
    } else if text.contains('&') {
        let mut chain = parse_chain(text, range, ids);
        if chain.len() == 1 && chain[0].is_var() {
            if let Some(ConcatPoint::Var(var)) = chain.pop() {
                return Label::Variable(var);
            }
        }
        Label::Concat(chain, range)
    } else {
        Label::Ordinary(ids.insert(&text.to_ascii_uppercase()), range)
    }
}

/// Builds the operation field out of its text
pub fn parse_instruction(text: &str, range: Range, ids: &StringTable) -> InstructionField {
    if text.is_empty() {
        InstructionField::Empty(range)
    } else if text.contains('&') {
        InstructionField::Concat(parse_chain(text, range, ids), range)
    } else {
        InstructionField::Ordinary(ids.insert(&text.to_ascii_uppercase()), range)
    }
}

fn column(range: Range, offset: usize) -> u32 {
    range.start.column + offset as u32
}

fn invalid(text: &str, range: Range) -> Diagnostic {
    Diagnostic::with_args(DiagCode::InvalidExpression, vec![text.into()], range)
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '#' | '$' | '_')
}

/// Splits at top level commas.  Returns each operand with its character
/// offset in the field.
fn split_operands(field: &str) -> Vec<(usize, &str)> {
    let mut operands = vec![];
    if field.is_empty() {
        return operands;
    }

    let mut depth = 0i32;
    let mut quoted = false;
    let mut start = 0;
    let mut start_chars = 0;
    let mut end = field.len();

    for (chars, (idx, c)) in field.char_indices().enumerate() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            ',' if !quoted && depth == 0 => {
                operands.push((start_chars, &field[start..idx]));
                start = idx + 1;
                start_chars = chars + 1;
            }
            ' ' if !quoted => {
                end = idx;
                break;
            }
            _ => (),
        }
    }
    operands.push((start_chars, &field[start..end]));
    operands
}

/// Finds the parenthesis matching the one at `open`
fn matching_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut quoted = false;
    for (idx, c) in chars.iter().enumerate().skip(open) {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => (),
        }
    }
    None
}

fn sub_range(range: Range, from: usize, to: usize) -> Range {
    Range::on_line(range.start.line, column(range, from), column(range, to))
}

fn parse_mach_operand(text: &str, range: Range, ids: &StringTable) -> Result<MachineOperand, Diagnostic> {
    let chars: Vec<char> = text.chars().collect();

    if chars.last() == Some(&')') {
        // Find the group which closes at the end of the operand
        let open = (0..chars.len())
            .filter(|idx| chars[*idx] == '(')
            .find(|idx| matching_paren(&chars, *idx) == Some(chars.len() - 1));

        if let Some(open) = open.filter(|o| *o > 0) {
            let disp_text: String = chars[..open].iter().collect();
            let inner: String = chars[open + 1..chars.len() - 1].iter().collect();
            let parts = split_operands(&inner);

            let displacement = parse_mach_expr(&disp_text, sub_range(range, 0, open), ids);
            let mut regs = vec![];
            for (offset, part) in &parts {
                let from = open + 1 + offset;
                let r = sub_range(range, from, from + part.chars().count());
                regs.push(if part.is_empty() {
                    Ok(None)
                } else {
                    parse_mach_expr(part, r, ids).map(Some)
                });
            }

            if let (Ok(displacement), true) = (displacement, regs.iter().all(|r| r.is_ok())) {
                let mut regs = regs.into_iter().filter_map(|r| r.ok());
                let first = regs.next().flatten();
                let second = regs.next().flatten();
                if parts.len() <= 2 && (first.is_some() || second.is_some()) {
                    return Ok(MachineOperand::Address {
                        displacement,
                        first,
                        second,
                    });
                }
            }
        }
    }

    parse_mach_expr(text, range, ids).map(MachineOperand::Expr)
}

/// Parses an expression over symbols and self-defining terms
pub(crate) fn parse_mach_expr(text: &str, range: Range, ids: &StringTable) -> Result<MachExpr, Diagnostic> {
    let mut parser = ExprParser {
        chars: text.chars().collect(),
        pos: 0,
        range,
        ids,
    };
    match parser.expr() {
        Some(e) if parser.pos == parser.chars.len() => Ok(e),
        _ => Err(invalid(text, range)),
    }
}

struct ExprParser<'a> {
    chars: Vec<char>,
    pos: usize,
    range: Range,
    ids: &'a StringTable,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn span(&self, from: usize) -> Range {
        sub_range(self.range, from, self.pos)
    }

    fn additive(&self) -> Option<MachOp> {
        match self.peek()? {
            '+' => Some(MachOp::Add),
            '-' => Some(MachOp::Sub),
            _ => None,
        }
    }

    fn multiplicative(&self) -> Option<MachOp> {
        match self.peek()? {
            '*' => Some(MachOp::Mul),
            '/' => Some(MachOp::Div),
            _ => None,
        }
    }

    fn expr(&mut self) -> Option<MachExpr> {
        let start = self.pos;
        let mut lhs = self.term()?;
        while let Some(op) = self.additive() {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = MachExpr::Binary(op, Box::new(lhs), Box::new(rhs), self.span(start));
        }
        Some(lhs)
    }

    fn term(&mut self) -> Option<MachExpr> {
        let start = self.pos;
        let mut lhs = self.unary()?;
        while let Some(op) = self.multiplicative() {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = MachExpr::Binary(op, Box::new(lhs), Box::new(rhs), self.span(start));
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<MachExpr> {
        let start = self.pos;
        match self.peek()? {
            '+' => {
                self.pos += 1;
                self.unary()
            }
            '-' => {
                self.pos += 1;
                let operand = self.unary()?;
                Some(MachExpr::Negate(Box::new(operand), self.span(start)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<MachExpr> {
        let start = self.pos;
        let c = self.peek()?;

        if c == '(' {
            self.pos += 1;
            let e = self.expr()?;
            if self.peek() != Some(')') {
                return None;
            }
            self.pos += 1;
            return Some(e);
        }

        if c.is_ascii_digit() {
            let digits = self.take_while(|c| c.is_ascii_digit());
            return digits
                .parse::<i32>()
                .ok()
                .map(|i| MachExpr::Constant(i, self.span(start)));
        }

        if self.chars.get(self.pos + 1) == Some(&'\'') {
            if let Some(value) = self.self_defining_term(c) {
                return Some(MachExpr::Constant(value, self.span(start)));
            }
            self.pos = start;
        }

        if is_symbol_char(c) {
            let name = self.take_while(is_symbol_char);
            let id = self.ids.insert(&name.to_ascii_uppercase());
            return Some(MachExpr::Symbol(id, self.span(start)));
        }

        None
    }

    /// `X'..'`, `B'..'` and `C'..'`
    fn self_defining_term(&mut self, kind: char) -> Option<i32> {
        self.pos += 2;
        let body = self.take_while(|c| c != '\'');
        if self.peek() != Some('\'') {
            return None;
        }
        self.pos += 1;

        match kind.to_ascii_uppercase() {
            'X' => u32::from_str_radix(&body, 16).ok().map(|v| v as i32),
            'B' => u32::from_str_radix(&body, 2).ok().map(|v| v as i32),
            'C' if !body.is_empty() && body.len() <= 4 => Some(
                body.bytes()
                    .fold(0u32, |acc, b| (acc << 8) | b as u32) as i32,
            ),
            _ => None,
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().map_or(false, &pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}

/// Parses macro operand text into a concatenation chain
pub(crate) fn parse_chain(text: &str, range: Range, ids: &StringTable) -> ConcatChain {
    let chars: Vec<char> = text.chars().collect();
    ChainParser {
        chars: &chars,
        range,
        ids,
    }
    .chain(0, chars.len())
}

struct ChainParser<'a> {
    chars: &'a [char],
    range: Range,
    ids: &'a StringTable,
}

impl<'a> ChainParser<'a> {
    fn chain(&self, from: usize, to: usize) -> ConcatChain {
        let mut chain = vec![];
        let mut text = String::new();
        let mut pos = from;

        let flush = |text: &mut String, chain: &mut ConcatChain| {
            if !text.is_empty() {
                chain.push(ConcatPoint::Str(std::mem::take(text)));
            }
        };

        while pos < to {
            let c = self.chars[pos];
            match c {
                '&' if self.chars.get(pos + 1) == Some(&'&') => {
                    text.push_str("&&");
                    pos += 2;
                }
                '&' => match self.variable(pos, to) {
                    Some((var, next)) => {
                        flush(&mut text, &mut chain);
                        chain.push(ConcatPoint::Var(var));
                        pos = next;
                    }
                    None => {
                        text.push(c);
                        pos += 1;
                    }
                },
                '.' => {
                    flush(&mut text, &mut chain);
                    chain.push(ConcatPoint::Dot);
                    pos += 1;
                }
                '=' => {
                    flush(&mut text, &mut chain);
                    chain.push(ConcatPoint::Equals);
                    pos += 1;
                }
                '(' => match matching_paren(self.chars, pos).filter(|close| *close < to) {
                    Some(close) => {
                        flush(&mut text, &mut chain);
                        chain.push(ConcatPoint::Sublist(self.sublist(pos + 1, close)));
                        pos = close + 1;
                    }
                    None => {
                        text.push(c);
                        pos += 1;
                    }
                },
                '\'' => {
                    // Quoted strings are copied as they are
                    text.push(c);
                    pos += 1;
                    while pos < to {
                        text.push(self.chars[pos]);
                        pos += 1;
                        if self.chars[pos - 1] == '\'' {
                            if self.chars.get(pos) == Some(&'\'') && pos < to {
                                text.push('\'');
                                pos += 1;
                            } else {
                                break;
                            }
                        }
                    }
                }
                _ => {
                    text.push(c);
                    pos += 1;
                }
            }
        }

        flush(&mut text, &mut chain);
        chain
    }

    fn sublist(&self, from: usize, to: usize) -> Vec<ConcatChain> {
        let inner: String = self.chars[from..to].iter().collect();
        split_operands(&inner)
            .into_iter()
            .map(|(offset, part)| self.chain(from + offset, from + offset + part.chars().count()))
            .collect()
    }

    /// Parses the variable symbol starting with the `&` at `pos`.  Returns
    /// the symbol and the position after it.
    fn variable(&self, pos: usize, to: usize) -> Option<(VariableSymbol, usize)> {
        let mut next = pos + 1;

        let created = if self.chars.get(next) == Some(&'(') {
            let close = matching_paren(self.chars, next).filter(|c| *c < to)?;
            let chain = self.chain(next + 1, close);
            next = close + 1;
            Some(chain)
        } else {
            None
        };

        let name = if created.is_none() {
            let start = next;
            while next < to && is_symbol_char(self.chars[next]) {
                next += 1;
            }
            if next == start || self.chars[start].is_ascii_digit() {
                return None;
            }
            let name: String = self.chars[start..next].iter().collect();
            Some(self.ids.insert(&name.to_ascii_uppercase()))
        } else {
            None
        };

        let mut subscript = vec![];
        if self.chars.get(next) == Some(&'(') {
            if let Some(close) = matching_paren(self.chars, next).filter(|c| *c < to) {
                subscript = self.subscript(next + 1, close);
                next = close + 1;
            }
        }

        let range = sub_range(self.range, pos, next);
        let var = match (name, created) {
            (Some(name), _) => VariableSymbol::basic(name, subscript, range),
            (None, Some(chain)) => VariableSymbol::created(chain, subscript, range),
            (None, None) => return None,
        };
        Some((var, next))
    }

    fn subscript(&self, from: usize, to: usize) -> Vec<CaExpr> {
        let inner: String = self.chars[from..to].iter().collect();
        split_operands(&inner)
            .into_iter()
            .map(|(offset, part)| {
                let start = from + offset;
                let end = start + part.chars().count();
                let range = sub_range(self.range, start, end);
                if let Ok(i) = part.parse::<i32>() {
                    CaExpr::Constant(i, range)
                } else if part.starts_with('&') {
                    match self.variable(start, end) {
                        Some((var, next)) if next == end => CaExpr::Var(Box::new(var)),
                        _ => CaExpr::String(part.into(), range),
                    }
                } else {
                    CaExpr::String(part.into(), range)
                }
            })
            .collect()
    }
}

/// Gives a deferred statement the operands its operation code expects.  A
/// resolved statement is returned as it is.
pub fn resolve_statement(
    reparser: &dyn StatementFieldReparser,
    statement: Statement,
    form: ProcessingForm,
    ids: &StringTable,
) -> (ResolvedStatement, Vec<Diagnostic>) {
    match statement {
        Statement::Resolved(resolved) => (resolved, vec![]),
        Statement::Deferred(deferred) => {
            let result = reparser.reparse_operand_field(
                &deferred.operand_field,
                deferred.operand_range,
                form,
                ids,
            );
            let resolved = ResolvedStatement {
                label: deferred.label,
                instruction: deferred.instruction,
                opcode: deferred.opcode,
                operands: result.operands,
                range: deferred.range,
            };
            (resolved, result.diags)
        }
    }
}
