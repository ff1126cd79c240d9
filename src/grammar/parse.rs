use std::str::CharIndices;

use super::{Expression, Grammar, GrammarError, Symbol};

const DEFINE: &str = "::=";

impl Grammar {
    /// Parses BNF text of the form `<Name> ::= <A> "x" | "" | ...`.
    ///
    /// Lines starting with `|` add alternatives to the previous rule. The left
    /// side of the first rule becomes the start symbol.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut raw_productions: Vec<(Symbol, Vec<Expression>)> = Vec::new();

        let mut previous_left: Option<Symbol> = None;
        for (i, line) in grammar.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (left, rights) = if let Some(rest) = line.strip_prefix('|') {
                match &previous_left {
                    Some(left) => (left.clone(), rest),
                    None => {
                        return Err(GrammarError::malformed(line_no, "cannot find left side"));
                    }
                }
            } else {
                let (left_str, rights) = line.split_once(DEFINE).ok_or_else(|| {
                    GrammarError::malformed(line_no, format!("missing \"{}\"", DEFINE))
                })?;
                (parse_left(left_str.trim(), line_no)?, rights)
            };

            let alternatives = parse_alternatives(rights, line_no)?;
            previous_left = Some(left.clone());
            raw_productions.push((left, alternatives));
        }

        let mut raw_productions = raw_productions.into_iter();
        let (start, alternatives) = raw_productions.next().ok_or(GrammarError::NoRules)?;
        let mut g = Self::new(start.clone());
        g.add_productions(start, alternatives);
        for (left, alternatives) in raw_productions {
            g.add_productions(left, alternatives);
        }

        log::debug!(
            "parsed {} nonterminals, start symbol {}",
            g.rules.len(),
            g.start_symbol
        );
        Ok(g)
    }
}

fn parse_left(left: &str, line_no: usize) -> Result<Symbol, GrammarError> {
    if left.is_empty() {
        return Err(GrammarError::malformed(line_no, "empty left side"));
    }
    let name = left
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| {
            GrammarError::malformed(line_no, format!("left side `{}` is not a <nonterminal>", left))
        })?;
    if name.is_empty() || name.contains(|c: char| c == '<' || c == '>') {
        return Err(GrammarError::malformed(
            line_no,
            format!("left side `{}` is not a single <nonterminal>", left),
        ));
    }
    Ok(Symbol::non_terminal(name))
}

/// Splits the right side into `|`-separated alternatives of `<...>` and `"..."`
/// elements. An alternative without elements is epsilon.
fn parse_alternatives(rights: &str, line_no: usize) -> Result<Vec<Expression>, GrammarError> {
    let mut alternatives = Vec::new();
    let mut current: Vec<Symbol> = Vec::new();
    let mut chars = rights.char_indices();

    while let Some((pos, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '|' => alternatives.push(finish_alternative(std::mem::take(&mut current))),
            '<' => {
                let name = take_until(&mut chars, rights, pos + 1, '>').ok_or_else(|| {
                    GrammarError::malformed(line_no, "unterminated <nonterminal>")
                })?;
                if name.is_empty() || name.contains('<') {
                    return Err(GrammarError::malformed(
                        line_no,
                        format!("invalid nonterminal `<{}>`", name),
                    ));
                }
                current.push(Symbol::non_terminal(name));
            }
            '"' => {
                let literal = take_until(&mut chars, rights, pos + 1, '"').ok_or_else(|| {
                    GrammarError::malformed(line_no, "unterminated \"literal\"")
                })?;
                if literal.is_empty() {
                    current.push(Symbol::epsilon());
                } else {
                    current.push(Symbol::terminal(literal));
                }
            }
            c => {
                return Err(GrammarError::malformed(
                    line_no,
                    format!("unexpected character `{}` at column {}", c, pos + 1),
                ))
            }
        }
    }
    alternatives.push(finish_alternative(current));
    Ok(alternatives)
}

fn finish_alternative(symbols: Vec<Symbol>) -> Expression {
    if symbols.is_empty() {
        Expression::epsilon()
    } else {
        Expression::new(symbols)
    }
}

/// Consumes characters up to and including `end`, returning the text in between.
fn take_until<'a>(
    chars: &mut CharIndices<'a>,
    source: &'a str,
    from: usize,
    end: char,
) -> Option<&'a str> {
    for (pos, c) in chars.by_ref() {
        if c == end {
            return Some(&source[from..pos]);
        }
    }
    None
}
