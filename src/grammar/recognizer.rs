use serde::Serialize;

use super::{DerivationRule, LL1ParsingTable, Symbol};

/// Outcome of running the recognizer over one token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub accepted: bool,
    /// Rules applied by table-driven expansions, in application order.
    pub trace: Vec<DerivationRule>,
}

#[derive(Serialize)]
pub struct RecognitionOutput {
    accepted: bool,
    trace: Vec<String>,
}

impl Recognition {
    pub fn to_output(&self) -> RecognitionOutput {
        RecognitionOutput {
            accepted: self.accepted,
            trace: self.trace.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Splits a token source into tokens: one literal per line, blank lines ignored.
pub fn parse_tokens(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl LL1ParsingTable {
    pub fn recognize<S: AsRef<str>>(&self, tokens: &[S]) -> Recognition {
        let mut trace = Vec::new();
        let accepted = self.recognize_with(tokens, |rule| trace.push(rule.clone()));
        Recognition { accepted, trace }
    }

    /// Runs the predictive stack machine over `tokens`, calling `on_rule` for
    /// every expansion. The first mismatch rejects; an empty stream is always
    /// rejected.
    pub fn recognize_with<S: AsRef<str>>(
        &self,
        tokens: &[S],
        mut on_rule: impl FnMut(&DerivationRule),
    ) -> bool {
        if tokens.is_empty() {
            log::debug!("empty token stream, rejected");
            return false;
        }

        let end_mark = Symbol::end_mark();
        let mut input: Vec<Symbol> = tokens.iter().map(|t| Symbol::terminal(t.as_ref())).collect();
        input.push(end_mark.clone());

        let mut stack: Vec<Symbol> = vec![end_mark.clone(), self.start_symbol().clone()];
        let mut pos = 0;

        while stack.len() > 1 {
            let Some(top) = stack.last() else { break };
            let cur = input.get(pos).unwrap_or(&end_mark);
            log::trace!("stack top {}, input {}", top, cur);

            if top == cur {
                stack.pop();
                pos += 1;
            } else if !self.is_non_terminal(top) {
                log::debug!("expected {}, found {}", top, cur);
                return false;
            } else if let Some(rule) = self.get(top, cur) {
                on_rule(rule);
                stack.pop();
                stack.extend(
                    rule.right
                        .symbols()
                        .iter()
                        .rev()
                        .filter(|s| !s.is_epsilon())
                        .cloned(),
                );
            } else {
                log::debug!("no prediction for {} on {}", top, cur);
                return false;
            }
        }

        let accepted = pos == tokens.len();
        if !accepted {
            log::debug!("derivation finished with {} unread tokens", tokens.len().saturating_sub(pos));
        }
        accepted
    }
}
