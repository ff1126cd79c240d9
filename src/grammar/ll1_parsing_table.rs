use std::collections::HashSet;
use std::fmt;

use crowbook_text_processing::escape::tex as escape_tex;
use indexmap::IndexMap;
use serde::Serialize;

use crate::Grammar;

use super::{DerivationRule, FirstFollow, GrammarError, Symbol};

/// Index of a prediction table cell: (nonterminal, lookahead terminal).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredictionCell {
    pub non_terminal: Symbol,
    pub lookahead: Symbol,
}

impl PredictionCell {
    pub fn new(non_terminal: Symbol, lookahead: Symbol) -> Self {
        Self {
            non_terminal,
            lookahead,
        }
    }
}

impl fmt::Display for PredictionCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.non_terminal, self.lookahead)
    }
}

#[derive(Debug, Clone)]
pub struct LL1ParsingTable {
    start_symbol: Symbol,
    terminals: Vec<Symbol>,
    non_terminals: Vec<Symbol>,
    cells: IndexMap<PredictionCell, DerivationRule>,
}

impl LL1ParsingTable {
    /// Fills the table from FIRST/FOLLOW data. Fails on the first cell that
    /// would hold two different rules.
    pub fn build(ff: &FirstFollow) -> Result<Self, GrammarError> {
        let grammar = ff.grammar();
        let mut terminals: Vec<Symbol> = grammar.terminal_iter().cloned().collect();
        terminals.push(Symbol::end_mark());

        let mut table = Self {
            start_symbol: grammar.start_symbol.clone(),
            terminals,
            non_terminals: grammar.non_terminal_iter().cloned().collect(),
            cells: IndexMap::new(),
        };

        for rule in grammar.rule_iter() {
            let Some(first) = ff.first_of_production(&rule.right) else {
                continue;
            };
            for t in first.iter().filter(|s| !s.is_epsilon()) {
                table.insert(PredictionCell::new(rule.left.clone(), t.clone()), &rule)?;
            }
            if first.iter().any(Symbol::is_epsilon) {
                for t in ff.follow(&rule.left).into_iter().flatten() {
                    table.insert(PredictionCell::new(rule.left.clone(), t.clone()), &rule)?;
                }
            }
        }

        log::debug!("LL(1) table has {} occupied cells", table.cells.len());
        Ok(table)
    }

    fn insert(&mut self, cell: PredictionCell, rule: &DerivationRule) -> Result<(), GrammarError> {
        match self.cells.get(&cell) {
            Some(existing) if existing != rule => Err(GrammarError::NotLL1 {
                existing: existing.clone(),
                conflicting: rule.clone(),
                cell,
            }),
            Some(_) => Ok(()),
            None => {
                self.cells.insert(cell, rule.clone());
                Ok(())
            }
        }
    }

    pub fn get(&self, non_terminal: &Symbol, lookahead: &Symbol) -> Option<&DerivationRule> {
        self.cells
            .get(&PredictionCell::new(non_terminal.clone(), lookahead.clone()))
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.start_symbol
    }

    pub fn is_non_terminal(&self, symbol: &Symbol) -> bool {
        self.non_terminals.contains(symbol)
    }

    pub fn terminals(&self) -> &[Symbol] {
        &self.terminals
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn rows(&self) -> impl Iterator<Item = (&Symbol, Vec<Option<&DerivationRule>>)> {
        self.non_terminals.iter().map(move |nt| {
            let row = self.terminals.iter().map(|t| self.get(nt, t)).collect();
            (nt, row)
        })
    }

    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in self.rows() {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|rule| match rule {
                Some(rule) => format!("-> {}", rule.right),
                None => String::new(),
            }));
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| output.iter().map(|line| line[j].chars().count()).max().unwrap_or(0))
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape_tex(t.content()))),
        );
        let header = header.join(" & ");

        let terminal_set: HashSet<&Symbol> = self.terminals.iter().collect();
        let mut output: Vec<String> = Vec::new();
        for (left, row) in self.rows() {
            let mut line: Vec<String> = vec![escape_tex(left.content()).to_string()];
            line.extend(row.iter().map(|rule| match rule {
                Some(rule) => rule_to_latex(rule, &terminal_set),
                None => String::new(),
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }

    pub fn to_output(&self) -> LL1ParsingTableOutput {
        LL1ParsingTableOutput {
            terminals: self.terminals.iter().map(|t| t.to_string()).collect(),
            rows: self
                .rows()
                .map(|(left, row)| LL1ParsingTableRow {
                    non_terminal: left.to_string(),
                    rules: row.iter().map(|r| r.map(|r| r.to_string())).collect(),
                })
                .collect(),
        }
    }
}

pub(crate) fn rule_to_latex(rule: &DerivationRule, terminal_set: &HashSet<&Symbol>) -> String {
    let right = rule
        .right
        .symbols()
        .iter()
        .map(|s| {
            if s.is_epsilon() {
                "\\epsilon".to_string()
            } else if terminal_set.contains(s) {
                format!("\\text{{{}}}", escape_tex(s.content()))
            } else {
                escape_tex(s.content()).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" \\ ");
    format!("{} \\rightarrow {}", escape_tex(rule.left.content()), right)
}

#[derive(Serialize)]
pub struct LL1ParsingTableRow {
    non_terminal: String,
    rules: Vec<Option<String>>,
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput {
    terminals: Vec<String>,
    rows: Vec<LL1ParsingTableRow>,
}

impl Grammar {
    /// Runs a fresh FIRST/FOLLOW analysis and builds the LL(1) table from it.
    pub fn generate_ll1_parsing_table(&self) -> Result<LL1ParsingTable, GrammarError> {
        let ff = FirstFollow::new(self)?;
        LL1ParsingTable::build(&ff)
    }
}
