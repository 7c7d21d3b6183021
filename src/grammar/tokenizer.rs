use serde::Serialize;

use super::{
    grammar::{is_terminal, wrap_terminal, LexRule},
    Grammar, END_MARK,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// A terminal, a lex variable, or `$`.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub fn end_of_input() -> Self {
        Self::new(END_MARK, END_MARK)
    }

    pub fn is_end_of_input(&self) -> bool {
        self.kind == END_MARK
    }
}

/// Splits a string into the tokens of a grammar's lexical rules.
///
/// Rules are tried in declaration order and the first match wins. A
/// character no rule matches becomes a token of its own, which the parser
/// will then reject.
pub struct Tokenizer<'g> {
    string: String,
    cursor: usize,
    rules: &'g [LexRule],
}

impl<'g> Tokenizer<'g> {
    pub fn new(input: &str, grammar: &'g Grammar) -> Self {
        Self::with_rules(input, grammar.lex_rules())
    }

    pub fn with_rules(input: &str, rules: &'g [LexRule]) -> Self {
        Self {
            string: format!("{}{}", input, END_MARK),
            cursor: 0,
            rules,
        }
    }

    pub fn next_token(&mut self) -> Token {
        if self.is_eof() {
            return Token::end_of_input();
        }
        self.skip_whitespace();
        let rest = &self.string[self.cursor..];

        if rest == END_MARK {
            self.cursor += END_MARK.len();
            return Token::end_of_input();
        }
        // Rules never see the end marker.
        let rest = &self.string[self.cursor..self.string.len() - END_MARK.len()];

        for rule in self.rules {
            let len = match rule.match_len(rest) {
                Some(len) if len > 0 => len,
                _ => continue,
            };
            let matched = &rest[..len];
            let value = if is_terminal(&rule.token) {
                wrap_terminal(matched)
            } else {
                matched.to_string()
            };
            self.cursor += len;
            return Token::new(rule.token.clone(), value);
        }

        // `rest` is never empty before the end marker has been consumed.
        let c = rest.chars().next().map(String::from).unwrap_or_default();
        self.cursor += c.len();
        Token::new(c.clone(), c)
    }

    /// Whether the whole input, end marker included, has been consumed.
    pub fn is_eof(&self) -> bool {
        self.cursor >= self.string.len()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.string[self.cursor..];
        let trimmed = rest.trim_start();
        self.cursor += rest.len() - trimmed.len();
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    /// Every token up to and including the end of input.
    fn next(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        Some(self.next_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression_grammar() -> Grammar {
        Grammar::with_lex(
            "E -> T E'\n\
             E' -> \"+\" T E' | ε\n\
             T -> F T'\n\
             T' -> \"*\" F T' | ε\n\
             F -> \"id\" | NUMBER | \"(\" E \")\"",
            "\"(\" : \"(\"\n\
             \")\" : \")\"\n\
             \"+\" : \"+\"\n\
             \"*\" : \"*\"\n\
             \"id\" : \"id\"\n\
             [0-9]+(\".\"[0-9]+)?\\b : NUMBER",
        )
        .unwrap()
    }

    #[test]
    fn tokens_up_to_end_of_input() {
        let g = expression_grammar();
        let tokens: Vec<Token> = Tokenizer::new("id + 3.14*(id)", &g).collect();
        assert_eq!(
            tokens,
            vec![
                Token::new("\"id\"", "\"id\""),
                Token::new("\"+\"", "\"+\""),
                Token::new("NUMBER", "3.14"),
                Token::new("\"*\"", "\"*\""),
                Token::new("\"(\"", "\"(\""),
                Token::new("\"id\"", "\"id\""),
                Token::new("\")\"", "\")\""),
                Token::end_of_input(),
            ]
        );
    }

    #[test]
    fn trailing_whitespace_reaches_end() {
        let g = expression_grammar();
        let mut tokenizer = Tokenizer::new("  id  \n", &g);
        assert_eq!(tokenizer.next_token(), Token::new("\"id\"", "\"id\""));
        assert!(!tokenizer.is_eof());
        assert_eq!(tokenizer.next_token(), Token::end_of_input());
        assert!(tokenizer.is_eof());
        assert_eq!(tokenizer.next(), None);
    }

    #[test]
    fn unmatched_character_is_its_own_token() {
        let g = expression_grammar();
        let tokens: Vec<Token> = Tokenizer::new("id ? id", &g).collect();
        assert_eq!(tokens[1], Token::new("?", "?"));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn first_declared_rule_wins() {
        let g = Grammar::with_lex(
            "S -> IDENT | \"if\"",
            vec![("[a-z]+", "IDENT"), ("\"if\"", "\"if\"")],
        )
        .unwrap();
        let mut tokenizer = Tokenizer::new("if", &g);
        assert_eq!(tokenizer.next_token(), Token::new("IDENT", "if"));
    }

    #[test]
    fn inferred_rules_match_terminals() {
        let g = Grammar::parse("S -> \"a\" \".\" S | ε").unwrap();
        let tokens: Vec<Token> = Tokenizer::new("a.a.", &g).collect();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1], Token::new("\".\"", "\".\""));
    }

    #[test]
    fn greedy_rule_stops_before_end_marker() {
        let g = Grammar::with_lex("S -> WORD", vec![("[^ ]+", "WORD")]).unwrap();
        let tokens: Vec<Token> = Tokenizer::new("abc", &g).collect();
        assert_eq!(
            tokens,
            vec![Token::new("WORD", "abc"), Token::end_of_input()]
        );
    }

    #[test]
    fn empty_input_is_end_of_input() {
        let g = expression_grammar();
        let tokens: Vec<Token> = Tokenizer::new("", &g).collect();
        assert_eq!(tokens, vec![Token::end_of_input()]);
    }
}
