use thiserror::Error;

use super::{DerivationRule, Symbol};
use super::ll1_parsing_table::PredictionCell;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    #[error("the grammar does not define any rule")]
    NoRules,
    #[error("FIRST({0}) depends on itself through nullable prefixes; the grammar is still left recursive")]
    LeftRecursiveCycle(Symbol),
    #[error("the grammar is not LL(1): cell {cell} holds `{existing}` and would also receive `{conflicting}`")]
    NotLL1 {
        cell: PredictionCell,
        existing: DerivationRule,
        conflicting: DerivationRule,
    },
}

impl GrammarError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        GrammarError::MalformedLine {
            line,
            reason: reason.into(),
        }
    }
}
