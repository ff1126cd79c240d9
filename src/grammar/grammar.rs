use std::fmt;

use indexmap::{IndexMap, IndexSet};

use super::{END_MARK, EPSILON_NAME};

/// A grammar symbol, identified only by its content.
///
/// Nonterminals keep their angle brackets (`<Expr>`) and terminals keep their
/// quotes (`"id"`), so the two kinds never share content. Whether a symbol is a
/// nonterminal is decided by the grammar it is used in, not by the symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn non_terminal(name: &str) -> Self {
        Self(format!("<{}>", name))
    }

    pub fn terminal(literal: &str) -> Self {
        Self(format!("\"{}\"", literal))
    }

    pub fn epsilon() -> Self {
        Self(String::new())
    }

    pub fn end_mark() -> Self {
        Self(END_MARK.to_string())
    }

    pub fn content(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_epsilon(&self) -> bool {
        self.0.is_empty()
    }

    /// `<A>` -> `<A'>`, anything else just gets a trailing `'`.
    pub(crate) fn primed(&self) -> Self {
        match self.0.strip_suffix('>') {
            Some(stem) if self.0.starts_with('<') => Self(format!("{}'>", stem)),
            _ => Self(format!("{}'", self.0)),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_epsilon() {
            f.write_str(EPSILON_NAME)
        } else {
            f.write_str(&self.0)
        }
    }
}

/// One alternative right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Expression(Vec<Symbol>);

impl Expression {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn epsilon() -> Self {
        Self(vec![Symbol::epsilon()])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn first_symbol(&self) -> Option<&Symbol> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_epsilon(&self) -> bool {
        self.0.len() == 1 && self.0[0].is_epsilon()
    }

    pub fn starts_with(&self, symbol: &Symbol) -> bool {
        !symbol.is_epsilon() && self.first_symbol() == Some(symbol)
    }

    /// Everything after the leading symbol.
    pub fn rest(&self) -> &[Symbol] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// `self` followed by `tail`. Epsilon only survives when nothing else is left.
    pub fn concat(&self, tail: &[Symbol]) -> Self {
        let symbols: Vec<Symbol> = self
            .0
            .iter()
            .chain(tail.iter())
            .filter(|s| !s.is_epsilon())
            .cloned()
            .collect();
        if symbols.is_empty() {
            Self::epsilon()
        } else {
            Self(symbols)
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        f.write_str(&parts.join(" "))
    }
}

/// A single production `left -> right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationRule {
    pub left: Symbol,
    pub right: Expression,
}

impl DerivationRule {
    pub fn new(left: Symbol, right: Expression) -> Self {
        Self { left, right }
    }
}

impl fmt::Display for DerivationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.left, self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    /// Alternatives per nonterminal, in definition order.
    pub rules: IndexMap<Symbol, Vec<Expression>>,
    pub start_symbol: Symbol,
}

impl Grammar {
    pub fn new(start_symbol: Symbol) -> Self {
        let mut rules = IndexMap::new();
        rules.insert(start_symbol.clone(), Vec::new());
        Self {
            rules,
            start_symbol,
        }
    }

    /// Appends alternatives to `left`, creating the rule if it is new.
    pub fn add_productions(&mut self, left: Symbol, right: impl IntoIterator<Item = Expression>) {
        self.rules.entry(left).or_default().extend(right);
    }

    pub fn is_non_terminal(&self, symbol: &Symbol) -> bool {
        self.rules.contains_key(symbol)
    }

    pub fn productions(&self, symbol: &Symbol) -> &[Expression] {
        self.rules.get(symbol).map(|p| p.as_slice()).unwrap_or(&[])
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &Symbol> {
        self.rules.keys()
    }

    /// Right-hand side symbols that are not rule keys, in order of appearance.
    /// Epsilon is not listed.
    pub fn terminal_iter(&self) -> impl Iterator<Item = &Symbol> {
        let mut seen: IndexSet<&Symbol> = IndexSet::new();
        for production in self.rules.values().flatten() {
            for symbol in production.symbols() {
                if !symbol.is_epsilon() && !self.is_non_terminal(symbol) {
                    seen.insert(symbol);
                }
            }
        }
        seen.into_iter()
    }

    pub fn rule_iter(&self) -> impl Iterator<Item = DerivationRule> + '_ {
        self.rules.iter().flat_map(|(left, productions)| {
            productions
                .iter()
                .map(move |right| DerivationRule::new(left.clone(), right.clone()))
        })
    }

    /// Every symbol of the grammar: rule keys first, then right-hand sides.
    pub fn symbol_iter(&self) -> impl Iterator<Item = &Symbol> {
        let mut seen: IndexSet<&Symbol> = self.rules.keys().collect();
        for production in self.rules.values().flatten() {
            seen.extend(production.symbols());
        }
        seen.into_iter()
    }
}
