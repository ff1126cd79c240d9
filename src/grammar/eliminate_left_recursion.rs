use std::collections::HashSet;

use super::{Expression, Grammar, Symbol};

impl Grammar {
    /// Rewrites the grammar so no nonterminal derives a sentential form that
    /// starts with itself.
    ///
    /// Nonterminals are numbered once, in definition order. For the i-th one,
    /// every alternative starting with a lower-numbered nonterminal j is
    /// expanded with the current alternatives of j, then immediate left
    /// recursion on i is removed with a fresh `i'` helper. Helpers are appended
    /// after the original rules. A grammar without left recursion is left
    /// untouched.
    pub fn eliminate_left_recursion(&mut self) {
        if !self.has_left_recursion() {
            log::debug!("no left recursion, grammar kept as is");
            return;
        }

        let non_terminals: Vec<Symbol> = self.rules.keys().cloned().collect();
        let mut bodies: Vec<Vec<Expression>> = non_terminals
            .iter()
            .map(|nt| self.rules.get(nt).cloned().unwrap_or_default())
            .collect();

        let mut taken: HashSet<Symbol> = self.symbol_iter().cloned().collect();
        let mut new_non_terminals: Vec<(Symbol, Vec<Expression>)> = Vec::new();

        for i in 0..non_terminals.len() {
            if bodies[i].is_empty() {
                continue;
            }

            for j in 0..i {
                let (replace, rest) = bodies.split_at_mut(i);
                let productions = &mut rest[0];
                if !productions.iter().any(|p| p.starts_with(&non_terminals[j])) {
                    continue;
                }

                let old_productions = std::mem::take(productions);
                let (leading, others): (Vec<_>, Vec<_>) = old_productions
                    .into_iter()
                    .partition(|p| p.starts_with(&non_terminals[j]));
                for production in &leading {
                    for prefix in &replace[j] {
                        productions.push(prefix.concat(production.rest()));
                    }
                }
                productions.extend(others);
                log::debug!(
                    "substituted {} into {}: {} alternatives",
                    non_terminals[j],
                    non_terminals[i],
                    productions.len()
                );
            }

            let nt = &non_terminals[i];
            let (recursive, mut productions): (Vec<_>, Vec<_>) = std::mem::take(&mut bodies[i])
                .into_iter()
                .partition(|p| p.starts_with(nt));
            // `A -> A` adds nothing to the language
            let mut recursive_productions: Vec<Expression> = recursive
                .iter()
                .filter(|p| p.len() > 1)
                .map(|p| Expression::new(p.rest().to_vec()))
                .collect();

            if recursive_productions.is_empty() {
                bodies[i] = productions;
                continue;
            }

            let mut nt_prime = nt.primed();
            while taken.contains(&nt_prime) {
                nt_prime = nt_prime.primed();
            }
            taken.insert(nt_prime.clone());
            log::info!("introduced {} to remove left recursion on {}", nt_prime, nt);

            let helper = [nt_prime.clone()];
            for production in &mut productions {
                *production = production.concat(&helper);
            }
            for production in &mut recursive_productions {
                *production = production.concat(&helper);
            }
            recursive_productions.push(Expression::epsilon());

            bodies[i] = productions;
            new_non_terminals.push((nt_prime, recursive_productions));
        }

        for (nt, productions) in non_terminals.into_iter().zip(bodies) {
            self.rules.insert(nt, productions);
        }
        for (nt, productions) in new_non_terminals {
            self.rules.insert(nt, productions);
        }
    }

    /// True if some nonterminal can reach itself through leading nonterminals.
    /// Nullable prefixes are not looked through.
    pub fn has_left_recursion(&self) -> bool {
        self.non_terminal_iter().any(|origin| {
            let mut visited: HashSet<&Symbol> = HashSet::new();
            let mut stack: Vec<&Symbol> = vec![origin];
            while let Some(symbol) = stack.pop() {
                for production in self.productions(symbol) {
                    let Some(head) = production.first_symbol() else {
                        continue;
                    };
                    if !self.is_non_terminal(head) {
                        continue;
                    }
                    if head == origin {
                        return true;
                    }
                    if visited.insert(head) {
                        stack.push(head);
                    }
                }
            }
            false
        })
    }
}
