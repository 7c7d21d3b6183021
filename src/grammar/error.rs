use thiserror::Error;

use super::tokenizer::Token;

/// Errors raised while building a grammar or its parsing table.
#[derive(Error, Debug, Clone)]
pub enum GrammarError {
    #[error("Line {line}: no \"->\" and no leading \"|\"")]
    MissingSeparator { line: usize },

    #[error("Line {line}: empty left side")]
    EmptyLeftSide { line: usize },

    #[error("Line {line}: left side contains whitespace")]
    LeftSideContainsWhitespace { line: usize },

    #[error("Line {line}: too many \"->\"")]
    TooManyArrows { line: usize },

    #[error("Line {line}: cannot find left side")]
    NoPreviousLeftSide { line: usize },

    #[error("Line {line}: {symbol} cannot be a left side")]
    InvalidLeftSide { line: usize, symbol: String },

    #[error("Line {line}: unterminated terminal")]
    UnterminatedTerminal { line: usize },

    #[error("grammar has no productions")]
    EmptyGrammar,

    #[error("Lex line {line}: expected \"<pattern> : <token>\"")]
    MalformedLexRule { line: usize },

    #[error("invalid lexical pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("ambiguous table cell [{non_terminal}, {lookahead}]: productions {previous} and {replacement}")]
    Ambiguity {
        non_terminal: String,
        lookahead: String,
        previous: usize,
        replacement: usize,
    },
}

/// Errors raised while recognizing an input string.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Parse error, unexpected token: {}, expecting {}", .token.value, .expected.join(", "))]
    UnexpectedToken { token: Token, expected: Vec<String> },

    #[error("Parse error, stack not empty at end of input: [{}], got {}", .stack.join(" "), .token.value)]
    StackNotEmpty { token: Token, stack: Vec<String> },
}

impl ParseError {
    pub fn token(&self) -> &Token {
        match self {
            ParseError::UnexpectedToken { token, .. } => token,
            ParseError::StackNotEmpty { token, .. } => token,
        }
    }
}
