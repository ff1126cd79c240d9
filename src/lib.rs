extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{
    parse_tokens, DerivationRule, Expression, FirstFollow, Grammar, GrammarError, LL1ParsingTable,
    Recognition, Symbol,
};

/// Parses `grammar`, removes left recursion and builds its LL(1) table.
pub fn build_ll1_parsing_table(grammar: &str) -> Result<LL1ParsingTable, GrammarError> {
    let mut g = Grammar::parse(grammar)?;
    g.eliminate_left_recursion();
    g.generate_ll1_parsing_table()
}

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    let g = Grammar::parse(grammar).map(|mut g| {
        g.eliminate_left_recursion();
        g
    });
    match g {
        Ok(g) => match FirstFollow::new(&g) {
            Ok(ff) => ff.to_non_terminal_output_vec().to_json(),
            Err(e) => error_to_json(&e),
        },
        Err(e) => error_to_json(&e),
    }
}

#[wasm_bindgen]
pub fn recognize_to_json(grammar: &str, tokens: &str) -> String {
    match build_ll1_parsing_table(grammar) {
        Ok(table) => {
            let recognition = table.recognize(&parse_tokens(tokens));
            serde_json::to_string(&recognition.to_output()).unwrap_or_default()
        }
        Err(e) => error_to_json(&e),
    }
}

fn error_to_json(e: &GrammarError) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[cfg(test)]
mod test_util {
    use crate::{Expression, Symbol};

    pub fn nt(name: &str) -> Symbol {
        Symbol::non_terminal(name)
    }

    pub fn t(literal: &str) -> Symbol {
        Symbol::terminal(literal)
    }

    pub fn expr(symbols: &[Symbol]) -> Expression {
        Expression::new(symbols.to_vec())
    }

    pub fn tokens(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }
}



#[cfg(test)]
mod first_follow_tests {
    use indexmap::IndexSet;

    use crate::test_util::{expr, nt, t};
    use crate::{FirstFollow, Grammar, GrammarError, Symbol};

    const EXPRESSION: &str = r#"<E> ::= <T> <E'>
<E'> ::= "+" <T> <E'> | ""
<T> ::= <F> <T'>
<T'> ::= "*" <F> <T'> | ""
<F> ::= "(" <E> ")" | "id""#;

    fn set(symbols: &[Symbol]) -> IndexSet<Symbol> {
        symbols.iter().cloned().collect()
    }

    fn sorted(s: Option<&IndexSet<Symbol>>) -> Vec<Symbol> {
        let mut v: Vec<Symbol> = s.into_iter().flatten().cloned().collect();
        v.sort();
        v
    }

    #[test]
    fn first_sets() {
        let g = Grammar::parse(EXPRESSION).unwrap();
        let ff = FirstFollow::new(&g).unwrap();

        assert_eq!(sorted(ff.first(&nt("F"))), sorted(Some(&set(&[t("("), t("id")]))));
        assert_eq!(sorted(ff.first(&nt("E"))), sorted(Some(&set(&[t("("), t("id")]))));
        assert_eq!(sorted(ff.first(&nt("T"))), sorted(Some(&set(&[t("("), t("id")]))));
        assert_eq!(
            sorted(ff.first(&nt("E'"))),
            sorted(Some(&set(&[t("+"), Symbol::epsilon()])))
        );
        assert!(ff.is_nullable(&nt("T'")));
        assert!(!ff.is_nullable(&nt("T")));
    }

    #[test]
    fn follow_sets() {
        let g = Grammar::parse(EXPRESSION).unwrap();
        let ff = FirstFollow::new(&g).unwrap();

        let follow_e = ff.follow(&nt("E")).unwrap();
        assert!(follow_e.contains(&t(")")));
        assert!(follow_e.contains(&Symbol::end_mark()));
        assert_eq!(sorted(ff.follow(&nt("E'"))), sorted(Some(follow_e)));
        assert_eq!(
            sorted(ff.follow(&nt("T"))),
            sorted(Some(&set(&[t("+"), t(")"), Symbol::end_mark()])))
        );
        assert_eq!(
            sorted(ff.follow(&nt("F"))),
            sorted(Some(&set(&[t("*"), t("+"), t(")"), Symbol::end_mark()])))
        );
        assert!(ff.follow(&t("id")).is_none());
    }

    #[test]
    fn first_of_expressions() {
        let g = Grammar::parse(EXPRESSION).unwrap();
        let mut ff = FirstFollow::new(&g).unwrap();

        assert_eq!(
            ff.first_of_expression(&expr(&[nt("E'"), nt("T'")])).unwrap(),
            set(&[t("+"), t("*"), Symbol::epsilon()])
        );
        assert_eq!(
            ff.first_of_expression(&expr(&[nt("E'"), t("x")])).unwrap(),
            set(&[t("+"), t("x")])
        );
        assert_eq!(
            ff.first_of_expression(&expr(&[])).unwrap(),
            set(&[Symbol::epsilon()])
        );
        assert_eq!(
            ff.first_of_symbol(&t("id")).unwrap(),
            set(&[t("id")])
        );
    }

    #[test]
    fn nullable_suffix_passes_follow() {
        let g = Grammar::parse(
            r#"<S> ::= <A> <B> <C> "x"
<A> ::= "a"
<B> ::= "b" | ""
<C> ::= "c" | """#,
        )
        .unwrap();
        let ff = FirstFollow::new(&g).unwrap();

        assert_eq!(
            sorted(ff.follow(&nt("A"))),
            sorted(Some(&set(&[t("b"), t("c"), t("x")])))
        );
        assert_eq!(
            sorted(ff.follow(&nt("B"))),
            sorted(Some(&set(&[t("c"), t("x")])))
        );
    }

    #[test]
    fn hidden_left_recursion_is_reported() {
        let g = Grammar::parse(
            r#"<S> ::= <N> <S> "a" | "b"
<N> ::= "n" | """#,
        )
        .unwrap();

        assert!(matches!(
            FirstFollow::new(&g),
            Err(GrammarError::LeftRecursiveCycle(_))
        ));
    }

    #[test]
    fn output_lists_every_non_terminal() {
        let g = Grammar::parse(EXPRESSION).unwrap();
        let ff = FirstFollow::new(&g).unwrap();

        let text = ff.to_non_terminal_output_vec().to_plaintext();
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().next().unwrap().starts_with("<E> | false | "));
        assert!(text.contains("<E'> | true | \"+\", ε | \")\", $"));
    }

    #[test]
    fn latex_output_escapes_names() {
        let g = Grammar::parse(r#"<S> ::= "a" <S> | """#).unwrap();
        let ff = FirstFollow::new(&g).unwrap();

        assert_eq!(
            ff.to_non_terminal_output_vec().to_latex(),
            concat!(
                "\\begin{tabular}{c|c|c|c}\n",
                "Symbol & Nullable & First & Follow\\\\\\hline\n",
                r#"\textless{}S\textgreater{} & true & "a"\ $\epsilon$ & \$"#,
                "\\\\\n\\end{tabular}"
            )
        );
    }
}

#[cfg(test)]
mod ll1_parsing_table_tests {
    use crate::test_util::{expr, nt, t};
    use crate::{DerivationRule, Expression, Grammar, GrammarError, Symbol};

    #[test]
    fn expression_grammar_table() {
        let g = Grammar::parse(
            r#"<E> ::= <T> <E'>
<E'> ::= "+" <T> <E'> | ""
<T> ::= <F> <T'>
<T'> ::= "*" <F> <T'> | ""
<F> ::= "(" <E> ")" | "id""#,
        )
        .unwrap();
        let table = g.generate_ll1_parsing_table().unwrap();

        assert_eq!(
            table.get(&nt("E"), &t("id")),
            Some(&DerivationRule::new(nt("E"), expr(&[nt("T"), nt("E'")])))
        );
        assert_eq!(
            table.get(&nt("E'"), &Symbol::end_mark()),
            Some(&DerivationRule::new(nt("E'"), Expression::epsilon()))
        );
        assert_eq!(
            table.get(&nt("T'"), &t("+")),
            Some(&DerivationRule::new(nt("T'"), Expression::epsilon()))
        );
        assert_eq!(table.get(&nt("F"), &t("+")), None);
        // E: 2, E': 3, T: 2, T': 4, F: 2
        assert_eq!(table.len(), 13);
        assert!(!table.is_empty());
        assert_eq!(table.terminals().last(), Some(&Symbol::end_mark()));
    }

    #[test]
    fn first_first_conflict() {
        let g = Grammar::parse(r#"<S> ::= "a" | "a" "b""#).unwrap();

        let err = g.generate_ll1_parsing_table().unwrap_err();
        match err {
            GrammarError::NotLL1 {
                cell,
                existing,
                conflicting,
            } => {
                assert_eq!(cell.non_terminal, nt("S"));
                assert_eq!(cell.lookahead, t("a"));
                assert_eq!(existing.right, expr(&[t("a")]));
                assert_eq!(conflicting.right, expr(&[t("a"), t("b")]));
            }
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn first_follow_conflict() {
        let g = Grammar::parse(
            r#"<S> ::= <A> "a"
<A> ::= "a" | """#,
        )
        .unwrap();

        assert!(matches!(
            g.generate_ll1_parsing_table(),
            Err(GrammarError::NotLL1 { .. })
        ));
    }

    #[test]
    fn conflict_message_names_cell_and_rules() {
        let g = Grammar::parse(r#"<S> ::= "a" | "a" "b""#).unwrap();

        let message = g.generate_ll1_parsing_table().unwrap_err().to_string();
        assert!(message.contains(r#"[<S>, "a"]"#));
        assert!(message.contains(r#"<S> -> "a" "b""#));
    }

    #[test]
    fn plaintext_rendering() {
        let g = Grammar::parse(r#"<S> ::= "(" <S> ")" <S> | """#).unwrap();
        let table = g.generate_ll1_parsing_table().unwrap();

        let text = table.to_plaintext();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""(""#));
        assert!(lines[1].contains(r#"-> "(" <S> ")" <S>"#));
        assert!(lines[1].contains("-> ε"));
    }

    #[test]
    fn latex_rendering() {
        let g = Grammar::parse(r#"<S> ::= "a" <S> | """#).unwrap();
        let table = g.generate_ll1_parsing_table().unwrap();

        assert_eq!(
            table.to_latex(),
            concat!(
                "\\[\\begin{array}{c|l|l}\n",
                r#" & \text{"a"} & \text{\$}\\\hline"#,
                "\n",
                r#"\textless{}S\textgreater{} & \textless{}S\textgreater{} \rightarrow \text{"a"} \ \textless{}S\textgreater{} & \textless{}S\textgreater{} \rightarrow \epsilon"#,
                "\n\\end{array}\\]"
            )
        );
    }
}


#[cfg(test)]
mod json_tests {
    #[test]
    fn recognize_json() {
        let out = crate::recognize_to_json(r#"<S> ::= "a""#, "a\n");
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["accepted"], true);
        assert_eq!(v["trace"][0], r#"<S> -> "a""#);
    }

    #[test]
    fn not_ll1_json() {
        let out = crate::recognize_to_json(r#"<S> ::= "a" | "a" "b""#, "a\n");
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(v["error"].as_str().unwrap().contains("not LL(1)"));
    }

    #[test]
    fn nullable_first_follow_json() {
        let out = crate::nullable_first_follow_to_json(r#"<S> ::= "a" <S> | """#);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["data"][0]["name"], "<S>");
        assert_eq!(v["data"][0]["nullable"], true);
        assert_eq!(v["data"][0]["follow"][0], "$");
    }
}
