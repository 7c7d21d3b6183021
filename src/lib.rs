extern crate wasm_bindgen;

use serde_json::json;
use wasm_bindgen::prelude::*;

pub mod grammar;
use grammar::pretty_print::ParseOutput;
pub use grammar::{
    Grammar, GrammarError, GrammarSource, LL1Parser, ParseError, ParserGenerator, ParsingTable,
    Sets, TableMode, Token, Tokenizer,
};

fn error_to_json(e: impl std::fmt::Display) -> String {
    json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_predict_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let sets = Sets::compute(&g);
            json!({
                "first": sets.to_first_output_vec(&g),
                "follow": sets.to_follow_output_vec(&g),
                "predict": sets.to_predict_output_vec(&g),
            })
            .to_string()
        }
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    match ParserGenerator::new(grammar) {
        Ok(pg) => json!(pg.table().to_output(pg.grammar())).to_string(),
        Err(e) => error_to_json(e),
    }
}

/// An empty `lex` means the lexical rules are inferred from the terminals.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, lex: &str, input: &str) -> String {
    let g = if lex.trim().is_empty() {
        Grammar::parse(grammar)
    } else {
        Grammar::with_lex(grammar, lex)
    };
    let pg = match g.and_then(|g| ParserGenerator::from_grammar(g, TableMode::default())) {
        Ok(pg) => pg,
        Err(e) => return error_to_json(e),
    };
    match pg.generate().recognize(input) {
        Ok(acceptance) => json!(ParseOutput::new(input, &acceptance)).to_string(),
        Err(e) => error_to_json(e),
    }
}

#[cfg(test)]
mod test_grammars {
    pub const EXPRESSION: &str = r#"
  E  -> T E'
  E' -> "+" T E'
      | ε
  T  -> F T'
  T' -> "*" F T'
      | ε
  F  -> "id"
      | NUMBER
      | "(" E ")"
"#;

    pub const EXPRESSION_LEX: &str = r#"
  "("  : "("
  ")"  : ")"
  "+"  : "+"
  "*"  : "*"
  "id" : "id"
  [0-9]+("."[0-9]+)?\b : NUMBER
"#;

    pub const EXPRESSION_NO_LEX: &str = r#"
  E  -> T E'
  E' -> "+" T E'
      | ε
  T  -> F T'
  T' -> "*" F T'
      | ε
  F  -> "id"
      | "(" E ")"
"#;

    pub fn expression() -> crate::Grammar {
        crate::Grammar::with_lex(EXPRESSION, EXPRESSION_LEX).unwrap()
    }

    pub fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    pub fn set(v: &[&str]) -> crate::grammar::SymbolSet {
        v.iter().map(|s| s.to_string()).collect()
    }
}




#[cfg(test)]
mod parser_tests {
    use crate::{
        grammar::{GrammarSource, LexSource, BnfSource},
        ParseError, ParserGenerator, Token, Tokenizer,
    };

    use super::test_grammars::*;

    fn generator() -> ParserGenerator {
        ParserGenerator::new(GrammarSource::Structured {
            lex: Some(LexSource::Text(EXPRESSION_LEX.to_string())),
            bnf: BnfSource::Text(EXPRESSION.to_string()),
        })
        .unwrap()
    }

    #[test]
    fn accepts_expression() {
        let pg = generator();
        let acceptance = pg.generate().recognize("id + id * id").unwrap();

        assert_eq!(acceptance.productions, vec![1, 4, 7, 6, 2, 4, 7, 5, 7, 6, 3]);
        assert_eq!(acceptance.stack, strings(&["$"]));
        assert_eq!(acceptance.last_token, Token::end_of_input());
    }

    #[test]
    fn trace_is_deterministic() {
        let pg = generator();
        let parser = pg.generate();

        let first = parser.parse("(id + 2.5) * 3").unwrap();
        let second = parser.parse("(id + 2.5) * 3").unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(first[..3], [1, 4, 9]);
    }

    #[test]
    fn accepts_token_stream() {
        let pg = generator();
        let tokens = vec![
            Token::new("\"id\"", "\"id\""),
            Token::new("\"+\"", "\"+\""),
            Token::new("NUMBER", "7"),
            Token::end_of_input(),
        ];

        assert_eq!(
            pg.generate().recognize_tokens(tokens).unwrap().productions,
            vec![1, 4, 7, 6, 2, 4, 8, 6, 3]
        );
    }

    #[test]
    fn tokenizer_and_token_stream_agree() {
        let pg = generator();
        let parser = pg.generate();
        let tokens: Vec<Token> = Tokenizer::new("id * (3)", pg.grammar()).collect();

        assert_eq!(
            parser.recognize_tokens(tokens).unwrap(),
            parser.recognize("id * (3)").unwrap()
        );
    }

    #[test]
    fn accepts_through_completed_follow() {
        let pg = ParserGenerator::new(
            "S -> D\nA -> \"a\" B\nB -> \"b\" A\n | ε\nD -> A \"z\"",
        )
        .unwrap();

        assert_eq!(pg.generate().parse("a z").unwrap(), vec![1, 5, 2, 4]);
        assert_eq!(pg.generate().parse("a b a z").unwrap(), vec![1, 5, 2, 3, 2, 4]);
    }

    #[test]
    fn greedy_lex_variable_is_accepted() {
        let pg = ParserGenerator::new(GrammarSource::Structured {
            lex: Some(LexSource::Text("[^ ]+ : WORD".to_string())),
            bnf: BnfSource::Text("S -> WORD".to_string()),
        })
        .unwrap();

        let acceptance = pg.generate().recognize("abc").unwrap();
        assert_eq!(acceptance.productions, vec![1]);
        assert!(acceptance.last_token.is_end_of_input());
    }

    #[test]
    fn unbalanced_parenthesis() {
        let pg = generator();

        match pg.generate().parse("( id") {
            Err(ParseError::StackNotEmpty { token, stack }) => {
                assert!(token.is_end_of_input());
                assert_eq!(stack, strings(&["$", "E'", "T'", "\")\""]));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn unexpected_token() {
        let pg = generator();

        match pg.generate().parse("id + * id") {
            Err(ParseError::UnexpectedToken { token, expected }) => {
                assert_eq!(token.value, "\"*\"");
                assert_eq!(expected, strings(&["\"(\"", "\"id\"", "NUMBER"]));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn unknown_character() {
        let pg = generator();
        let err = pg.generate().parse("id ? id").unwrap_err();

        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
        assert_eq!(err.token().value, "?");
    }

    #[test]
    fn missing_operand_at_end() {
        let pg = generator();
        let err = pg.generate().parse("id +").unwrap_err();

        match err {
            ParseError::StackNotEmpty { stack, .. } => {
                assert_eq!(stack, strings(&["$", "E'", "T"]));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn empty_input() {
        let pg = generator();
        assert!(matches!(
            pg.generate().parse(""),
            Err(ParseError::StackNotEmpty { .. })
        ));

        let optional = ParserGenerator::new("S -> \"a\" S | ε").unwrap();
        assert_eq!(optional.generate().parse("").unwrap(), vec![2]);
        assert_eq!(optional.generate().parse("a a").unwrap(), vec![1, 1, 2]);
    }

    #[test]
    fn lexical_rules_as_pairs() {
        let pg = ParserGenerator::new(GrammarSource::Structured {
            lex: Some(LexSource::Rules(vec![
                ("\"a\"".to_string(), "\"a\"".to_string()),
                ("\",\"".to_string(), "\",\"".to_string()),
            ])),
            bnf: BnfSource::Lines(strings(&["L -> \"a\" R", "R -> \",\" \"a\" R | ε"])),
        })
        .unwrap();

        assert_eq!(pg.generate().parse("a, a,a").unwrap(), vec![1, 2, 2, 3]);
    }

    #[test]
    fn error_messages() {
        let pg = generator();
        let err = pg.generate().parse("( id").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Parse error, stack not empty at end of input: [$ E' T' \")\"], got $"
        );
    }
}
