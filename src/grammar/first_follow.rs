use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};

use super::{Expression, Grammar, GrammarError, Symbol};

/// FIRST/FOLLOW state for one analysis of one grammar.
///
/// Caches live as long as the session and are dropped with it.
#[derive(Debug)]
pub struct FirstFollow<'a> {
    grammar: &'a Grammar,
    symbol_first: HashMap<Symbol, IndexSet<Symbol>>,
    expression_first: HashMap<Expression, IndexSet<Symbol>>,
    in_progress: HashSet<Symbol>,
    follow: IndexMap<Symbol, IndexSet<Symbol>>,
}

impl<'a> FirstFollow<'a> {
    /// Computes FIRST for every nonterminal and alternative, then FOLLOW for
    /// every nonterminal.
    pub fn new(grammar: &'a Grammar) -> Result<Self, GrammarError> {
        let mut ff = Self {
            grammar,
            symbol_first: HashMap::new(),
            expression_first: HashMap::new(),
            in_progress: HashSet::new(),
            follow: IndexMap::new(),
        };

        for (left, productions) in &grammar.rules {
            ff.first_of_symbol(left)?;
            for production in productions {
                ff.first_of_expression(production)?;
            }
        }
        ff.calculate_follow()?;

        Ok(ff)
    }

    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    /// FIRST of a single symbol. A terminal (or epsilon) is its own FIRST set.
    pub fn first_of_symbol(&mut self, symbol: &Symbol) -> Result<IndexSet<Symbol>, GrammarError> {
        if !self.grammar.is_non_terminal(symbol) {
            return Ok(IndexSet::from([symbol.clone()]));
        }
        if let Some(first) = self.symbol_first.get(symbol) {
            return Ok(first.clone());
        }
        if !self.in_progress.insert(symbol.clone()) {
            return Err(GrammarError::LeftRecursiveCycle(symbol.clone()));
        }

        let grammar = self.grammar;
        let mut first = IndexSet::new();
        for production in grammar.productions(symbol) {
            first.extend(self.first_of_expression(production)?);
        }

        self.in_progress.remove(symbol);
        self.symbol_first.insert(symbol.clone(), first.clone());
        Ok(first)
    }

    /// FIRST of a symbol sequence. Epsilon is included only when every symbol
    /// can derive it, which is also the case for the empty sequence.
    pub fn first_of_expression(
        &mut self,
        expression: &Expression,
    ) -> Result<IndexSet<Symbol>, GrammarError> {
        if let Some(first) = self.expression_first.get(expression) {
            return Ok(first.clone());
        }

        let mut first = IndexSet::new();
        let mut nullable = true;
        for symbol in expression.symbols() {
            let symbol_first = self.first_of_symbol(symbol)?;
            first.extend(symbol_first.iter().filter(|s| !s.is_epsilon()).cloned());
            if !symbol_first.iter().any(Symbol::is_epsilon) {
                nullable = false;
                break;
            }
        }
        if nullable {
            first.insert(Symbol::epsilon());
        }

        self.expression_first
            .insert(expression.clone(), first.clone());
        Ok(first)
    }

    /// Adds `items` to FOLLOW(`target`), returning whether it grew.
    fn extend_follow(&mut self, target: &Symbol, items: impl IntoIterator<Item = Symbol>) -> bool {
        let follow = self.follow.entry(target.clone()).or_default();
        let before = follow.len();
        follow.extend(items);
        follow.len() != before
    }

    fn calculate_follow(&mut self) -> Result<(), GrammarError> {
        let grammar = self.grammar;
        for nt in grammar.non_terminal_iter() {
            self.follow.insert(nt.clone(), IndexSet::new());
        }
        self.extend_follow(&grammar.start_symbol, [Symbol::end_mark()]);

        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;
            for (left, productions) in &grammar.rules {
                for production in productions {
                    // FIRST of everything right of the current symbol, minus epsilon
                    let mut suffix_first: IndexSet<Symbol> = IndexSet::new();
                    let mut suffix_nullable = true;

                    for symbol in production.symbols().iter().rev() {
                        if grammar.is_non_terminal(symbol) {
                            changed |= self.extend_follow(symbol, suffix_first.iter().cloned());
                            if suffix_nullable && symbol != left {
                                let left_follow = self.follow.get(left).cloned().unwrap_or_default();
                                changed |= self.extend_follow(symbol, left_follow);
                            }
                        }

                        let first = self.first_of_symbol(symbol)?;
                        if !first.iter().any(Symbol::is_epsilon) {
                            suffix_first.clear();
                            suffix_nullable = false;
                        }
                        suffix_first.extend(first.into_iter().filter(|s| !s.is_epsilon()));
                    }
                }
            }
        }
        log::debug!("FOLLOW sets settled after {} rounds", rounds);

        Ok(())
    }

    /// FIRST of a nonterminal computed by [`FirstFollow::new`].
    pub fn first(&self, symbol: &Symbol) -> Option<&IndexSet<Symbol>> {
        self.symbol_first.get(symbol)
    }

    /// FIRST of an alternative computed by [`FirstFollow::new`].
    pub fn first_of_production(&self, production: &Expression) -> Option<&IndexSet<Symbol>> {
        self.expression_first.get(production)
    }

    pub fn follow(&self, symbol: &Symbol) -> Option<&IndexSet<Symbol>> {
        self.follow.get(symbol)
    }

    pub fn is_nullable(&self, symbol: &Symbol) -> bool {
        self.first(symbol)
            .is_some_and(|first| first.iter().any(Symbol::is_epsilon))
    }
}
