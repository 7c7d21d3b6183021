use regex::Regex;

use super::{END_MARK, EPSILON};

/// The kind of a grammar symbol, derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Terminal,
    LexVariable,
    NonTerminal,
    Epsilon,
    EndOfInput,
}

impl SymbolKind {
    /// Classifies `symbol` given the names of the lexical variables.
    pub fn of<S: AsRef<str>>(symbol: &str, lex_vars: &[S]) -> Self {
        if is_terminal(symbol) {
            SymbolKind::Terminal
        } else if symbol == EPSILON {
            SymbolKind::Epsilon
        } else if symbol == END_MARK {
            SymbolKind::EndOfInput
        } else if lex_vars.iter().any(|v| v.as_ref() == symbol) {
            SymbolKind::LexVariable
        } else {
            SymbolKind::NonTerminal
        }
    }

    pub fn is_token(self) -> bool {
        matches!(self, SymbolKind::Terminal | SymbolKind::LexVariable)
    }
}

/// Terminals are written in double quotes, e.g. `"+"` or `" "`.
pub fn is_terminal(symbol: &str) -> bool {
    symbol.len() >= 2 && symbol.starts_with('"') && symbol.ends_with('"')
}

/// `"a"` -> `a`
pub fn unwrap_terminal(terminal: &str) -> &str {
    if is_terminal(terminal) {
        &terminal[1..terminal.len() - 1]
    } else {
        terminal
    }
}

/// `a` -> `"a"`
pub fn wrap_terminal(lexeme: &str) -> String {
    format!("\"{}\"", lexeme)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub number: usize,
    pub lhs: String,
    pub rhs: Vec<String>,
}

impl Production {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn lhs(&self) -> &str {
        &self.lhs
    }

    pub fn rhs(&self) -> &[String] {
        &self.rhs
    }

    /// Whether the right side is exactly `[ε]`.
    pub fn is_epsilon(&self) -> bool {
        self.rhs.len() == 1 && self.rhs[0] == EPSILON
    }
}

/// One lexical rule: an anchored pattern and the token it produces.
#[derive(Debug, Clone)]
pub struct LexRule {
    pub pattern: String,
    pub token: String,
    pub(crate) regex: Regex,
}

impl LexRule {
    /// Length of the match at the very start of `input`, if any.
    pub fn match_len(&self, input: &str) -> Option<usize> {
        self.regex.find(input).map(|m| m.end())
    }
}

impl PartialEq for LexRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.token == other.token
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) productions: Vec<Production>,
    pub(crate) start_symbol: String,
    pub(crate) lex_rules: Vec<LexRule>,
    pub(crate) terminals: Vec<String>,
    pub(crate) non_terminals: Vec<String>,
    pub(crate) lex_vars: Vec<String>,
}

impl Grammar {
    /// Assembles a grammar from already normalized productions. Lexical rules
    /// default to one identity rule per terminal.
    pub(crate) fn from_parts(
        productions: Vec<Production>,
        lex_rules: Option<Vec<LexRule>>,
    ) -> Result<Self, super::GrammarError> {
        let start_symbol = productions
            .first()
            .map(|p| p.lhs.clone())
            .ok_or(super::GrammarError::EmptyGrammar)?;

        let mut terminals: Vec<String> = Vec::new();
        let mut non_terminals: Vec<String> = Vec::new();
        for production in &productions {
            if !non_terminals.contains(&production.lhs) {
                non_terminals.push(production.lhs.clone());
            }
            for symbol in &production.rhs {
                if is_terminal(symbol) && !terminals.contains(symbol) {
                    terminals.push(symbol.clone());
                }
            }
        }

        let lex_rules = match lex_rules {
            Some(rules) => rules,
            None => terminals
                .iter()
                .map(|t| super::lex::compile_rule(t, t))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let mut lex_vars: Vec<String> = Vec::new();
        for rule in &lex_rules {
            if !is_terminal(&rule.token) && !lex_vars.contains(&rule.token) {
                lex_vars.push(rule.token.clone());
            }
        }

        Ok(Self {
            productions,
            start_symbol,
            lex_rules,
            terminals,
            non_terminals,
            lex_vars,
        })
    }

    /// Productions in number order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn get(&self, number: usize) -> Option<&Production> {
        number
            .checked_sub(1)
            .and_then(|index| self.productions.get(index))
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &[String] {
        &self.non_terminals
    }

    pub fn lex_vars(&self) -> &[String] {
        &self.lex_vars
    }

    pub fn lex_rules(&self) -> &[LexRule] {
        &self.lex_rules
    }

    pub fn kind_of(&self, symbol: &str) -> SymbolKind {
        SymbolKind::of(symbol, &self.lex_vars)
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        is_terminal(symbol)
    }

    /// Terminal or lexical variable.
    pub fn is_token(&self, symbol: &str) -> bool {
        self.kind_of(symbol).is_token()
    }

    pub fn productions_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Production> {
        self.productions.iter().filter(move |p| p.lhs == symbol)
    }

    pub fn productions_with<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Production> {
        self.productions
            .iter()
            .filter(move |p| p.rhs.iter().any(|s| s == symbol))
    }

    pub fn get_number(production: &Production) -> usize {
        production.number
    }

    pub fn get_lhs(production: &Production) -> &str {
        &production.lhs
    }

    pub fn get_rhs(production: &Production) -> &[String] {
        &production.rhs
    }
}
