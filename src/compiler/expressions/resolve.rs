use crate::compiler::source::Range;

use super::{CaExpr, CaExprError, CaExprPolicy};

/// An element of a flat conditional assembly term list: either an operand
/// which has already been parsed or a word which may be an operator.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Operand(CaExpr),
    Word(String, Range),
}

impl Term {
    fn range(&self) -> Range {
        match self {
            Term::Operand(e) => e.range(),
            Term::Word(_, r) => *r,
        }
    }
}

/**
Builds an expression tree out of a term list using the operator table of the
domain `P`.

Pairs of words which form a two word operator in `P` (e.g. `AND NOT`) are
merged before parsing.  Unary operators apply to the expression which follows
them up to the first operator of lower priority.  Binary operators associate
to the left.
 */
pub fn resolve_terms<P: CaExprPolicy>(terms: Vec<Term>) -> Result<CaExpr, CaExprError> {
    let terms = merge_words::<P>(terms);
    let end = terms.last().map(|t| t.range()).unwrap_or_default();
    let mut resolver = TermResolver::<P> {
        terms: terms.into_iter().peekable(),
        end,
        _policy: std::marker::PhantomData,
    };

    let expr = resolver.expression(0)?;
    match resolver.terms.next() {
        None => Ok(expr),
        Some(t) => Err(CaExprError::ExpectedOperator(t.range())),
    }
}

fn merge_words<P: CaExprPolicy>(terms: Vec<Term>) -> Vec<Term> {
    let mut merged: Vec<Term> = Vec::with_capacity(terms.len());
    for term in terms {
        if let (Term::Word(next, next_range), Some(Term::Word(prev, prev_range))) =
            (&term, merged.last_mut())
        {
            let candidate = format!("{} {}", prev, next);
            if P::multiple_words(&candidate) {
                *prev = candidate;
                *prev_range = prev_range.join(*next_range);
                continue;
            }
        }
        merged.push(term);
    }
    merged
}

struct TermResolver<P: CaExprPolicy> {
    terms: std::iter::Peekable<std::vec::IntoIter<Term>>,
    end: Range,
    _policy: std::marker::PhantomData<P>,
}

impl<P: CaExprPolicy> TermResolver<P> {
    fn expression(&mut self, min_priority: u8) -> Result<CaExpr, CaExprError> {
        let mut lhs = self.unary()?;

        while let Some(Term::Word(w, _)) = self.terms.peek() {
            let priority = match P::get_priority(w) {
                Some(p) if P::is_binary(w) && p >= min_priority => p,
                _ => break,
            };
            let op = P::get_operator(w).ok_or_else(|| CaExprError::ExpectedOperator(lhs.range()))?;
            self.terms.next();

            let rhs = self.expression(priority + 1)?;
            let range = lhs.range().join(rhs.range());
            lhs = CaExpr::Binary(op, Box::new(lhs), Box::new(rhs), range);
        }

        Ok(lhs)
    }

    fn unary(&mut self) -> Result<CaExpr, CaExprError> {
        match self.terms.next() {
            Some(Term::Operand(e)) => Ok(e),
            Some(Term::Word(w, range)) if P::is_unary(&w) => {
                let op = P::get_operator(&w).ok_or(CaExprError::ExpectedOperand(w.clone(), range))?;
                let priority = P::get_priority(&w).unwrap_or_default();
                let operand = self.expression(priority)?;
                let range = range.join(operand.range());
                Ok(CaExpr::Unary(op, Box::new(operand), range))
            }
            Some(Term::Word(w, range)) => Err(CaExprError::ExpectedOperand(w, range)),
            None => Err(CaExprError::MissingOperand(self.end)),
        }
    }
}
