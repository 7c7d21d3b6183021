pub mod error;
pub mod first_follow_predict;
pub mod grammar;
pub mod lex;
pub mod ll1_parsing_table;
pub mod parse;
pub mod parser;
pub mod pretty_print;
pub mod tokenizer;

pub use error::{GrammarError, ParseError};
pub use first_follow_predict::{Sets, SymbolSet};
pub use grammar::{Grammar, LexRule, Production, SymbolKind};
pub use ll1_parsing_table::{Conflict, ParserGenerator, ParsingTable, TableMode};
pub use parse::{BnfSource, GrammarSource, LexSource};
pub use parser::{Acceptance, LL1Parser};
pub use tokenizer::{Token, Tokenizer};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

/// Alternative spelling of [`EPSILON`] accepted in grammar text.
pub const EPSILON_ALT: &str = "ϵ";
