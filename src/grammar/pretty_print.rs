use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    ll1_parsing_table::rule_to_latex, DerivationRule, FirstFollow, Grammar, Symbol, EPSILON_NAME,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput {
    pub left: String,
    pub rights: Vec<String>,
    #[serde(skip)]
    rules: Vec<DerivationRule>,
}

impl ProductionOutput {
    pub fn to_plaintext(&self, left_width: usize) -> String {
        if self.rights.is_empty() {
            return format!("{:>width$} ::=", self.left, width = left_width);
        }
        self.rights
            .iter()
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} ::= {}", self.left, right, width = left_width)
                } else {
                    format!("{:>width$}   | {}", "", right, width = left_width)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self, terminal_set: &HashSet<&Symbol>) -> String {
        if self.rules.is_empty() {
            return format!("{} & \\rightarrow & \\emptyset", escape::tex(self.left.as_str()));
        }
        self.rules
            .iter()
            .map(|rule| {
                rule_to_latex(rule, terminal_set).replacen(" \\rightarrow ", " & \\rightarrow & ", 1)
            })
            .collect::<Vec<_>>()
            .join("\\\\\n")
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput>,
    #[serde(skip)]
    terminals: HashSet<&'a Symbol>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(&self.terminals)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .rules
            .iter()
            .map(|(left, rights)| ProductionOutput {
                left: left.to_string(),
                rights: rights.iter().map(|right| right.to_string()).collect(),
                rules: rights
                    .iter()
                    .map(|right| DerivationRule::new(left.clone(), right.clone()))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminal_iter().collect(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput {
    name: String,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }
    fn to_latex(&self) -> String {
        fn f(a: &[String]) -> String {
            a.iter()
                .map(|s| {
                    if s == EPSILON_NAME {
                        r"$\epsilon$".to_string()
                    } else {
                        escape::tex(s.as_str()).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name.as_str()),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec {
    data: Vec<NonTerminalOutput>,
}

impl NonTerminalOutputVec {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl FirstFollow<'_> {
    /// Nullable, FIRST and FOLLOW of every nonterminal, sets sorted by name.
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        fn names<'s>(set: impl Iterator<Item = &'s Symbol>) -> Vec<String> {
            let mut v: Vec<String> = set.map(|s| s.to_string()).collect();
            v.sort();
            v
        }

        let data = self
            .grammar()
            .non_terminal_iter()
            .map(|nt| {
                let nullable = self.is_nullable(nt);
                let mut first = names(self.first(nt).into_iter().flatten().filter(|s| !s.is_epsilon()));
                if nullable {
                    first.push(EPSILON_NAME.to_string());
                }
                NonTerminalOutput {
                    name: nt.to_string(),
                    nullable,
                    first,
                    follow: names(self.follow(nt).into_iter().flatten()),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}
