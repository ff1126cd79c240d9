pub mod eliminate_left_recursion;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod parse;
pub mod pretty_print;
pub mod recognizer;
pub use error::GrammarError;
pub use first_follow::FirstFollow;
pub use grammar::{DerivationRule, Expression, Grammar, Symbol};
pub use ll1_parsing_table::{LL1ParsingTable, PredictionCell};
pub use recognizer::{parse_tokens, Recognition};

pub const EPSILON_NAME: &str = "ε";
pub const END_MARK: &str = "$";
