use serde::Deserialize;

use super::{
    grammar::{is_terminal, Production},
    lex, Grammar, GrammarError, EPSILON, EPSILON_ALT,
};

/// The context-free part of a grammar, either as one text or one line per entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BnfSource {
    Lines(Vec<String>),
    Text(String),
}

/// The lexical part of a grammar: `<pattern> : <token>` lines, or pairs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LexSource {
    Rules(Vec<(String, String)>),
    Text(String),
}

/// Everything a grammar can be built from.
///
/// ```text
/// S -> F
///    | "(" S "+" F ")"
/// F -> "a"
/// ```
///
/// may be given as one string, as a list of lines, or together with a
/// lexical grammar:
///
/// ```text
/// "a"                  : "a"
/// "("                  : "("
/// [0-9]+("."[0-9]+)?\b : NUMBER
/// ```
///
/// Without a lexical grammar the rules are inferred from the terminals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GrammarSource {
    Structured {
        #[serde(default)]
        lex: Option<LexSource>,
        bnf: BnfSource,
    },
    Lines(Vec<String>),
    Text(String),
}

impl From<&str> for GrammarSource {
    fn from(text: &str) -> Self {
        GrammarSource::Text(text.to_string())
    }
}

impl From<String> for GrammarSource {
    fn from(text: String) -> Self {
        GrammarSource::Text(text)
    }
}

impl From<Vec<String>> for GrammarSource {
    fn from(lines: Vec<String>) -> Self {
        GrammarSource::Lines(lines)
    }
}

impl From<Vec<&str>> for GrammarSource {
    fn from(lines: Vec<&str>) -> Self {
        GrammarSource::Lines(lines.into_iter().map(String::from).collect())
    }
}

impl From<&str> for LexSource {
    fn from(text: &str) -> Self {
        LexSource::Text(text.to_string())
    }
}

impl From<Vec<(&str, &str)>> for LexSource {
    fn from(rules: Vec<(&str, &str)>) -> Self {
        LexSource::Rules(
            rules
                .into_iter()
                .map(|(p, t)| (p.to_string(), t.to_string()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Symbol(&'a str),
    Arrow,
    Bar,
}

/// Splits one grammar line into symbols, `->` and `|`. Quoted terminals are
/// kept whole, so `" "` and `"|"` are single symbols.
fn scan_line(line: &str, number: usize) -> Result<Vec<Piece<'_>>, GrammarError> {
    let mut pieces = Vec::new();
    let mut i = 0;
    while let Some(c) = line[i..].chars().next() {
        let rest = &line[i..];
        if c.is_whitespace() {
            i += c.len_utf8();
        } else if rest.starts_with("->") {
            pieces.push(Piece::Arrow);
            i += 2;
        } else if c == '|' {
            pieces.push(Piece::Bar);
            i += 1;
        } else if c == '"' {
            let end = rest[1..]
                .find('"')
                .ok_or(GrammarError::UnterminatedTerminal { line: number })?;
            pieces.push(Piece::Symbol(&rest[..end + 2]));
            i += end + 2;
        } else {
            let len = rest
                .find(|c: char| c.is_whitespace() || c == '"' || c == '|')
                .unwrap_or(rest.len());
            let len = rest[..len].find("->").unwrap_or(len);
            pieces.push(Piece::Symbol(&rest[..len]));
            i += len;
        }
    }
    Ok(pieces)
}

fn right_side(symbols: &[Piece]) -> Vec<String> {
    let rhs: Vec<String> = symbols
        .iter()
        .filter_map(|piece| match piece {
            Piece::Symbol(s) if *s == EPSILON || *s == EPSILON_ALT => None,
            Piece::Symbol(s) => Some(s.to_string()),
            _ => None,
        })
        .collect();
    if rhs.is_empty() {
        vec![EPSILON.to_string()]
    } else {
        rhs
    }
}

/// Numbers every alternative of every line, continuing `|` lines with the
/// last left side seen.
fn normalize_bnf<'a, I>(lines: I) -> Result<Vec<Production>, GrammarError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut productions: Vec<Production> = Vec::new();
    let mut previous_left: Option<String> = None;

    for (i, line) in lines.into_iter().enumerate() {
        let number = i + 1;
        let pieces = scan_line(line, number)?;
        if pieces.is_empty() {
            continue;
        }

        let arrows: Vec<usize> = pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == Piece::Arrow)
            .map(|(i, _)| i)
            .collect();
        if arrows.len() > 1 {
            return Err(GrammarError::TooManyArrows { line: number });
        }

        let (left, body): (String, &[Piece]) = match arrows.first() {
            Some(&arrow) => match &pieces[..arrow] {
                [] => return Err(GrammarError::EmptyLeftSide { line: number }),
                [Piece::Symbol(s)] => {
                    if is_terminal(s) || *s == EPSILON || *s == EPSILON_ALT {
                        return Err(GrammarError::InvalidLeftSide {
                            line: number,
                            symbol: s.to_string(),
                        });
                    }
                    (s.to_string(), &pieces[arrow + 1..])
                }
                _ => return Err(GrammarError::LeftSideContainsWhitespace { line: number }),
            },
            None => match pieces[0] {
                Piece::Bar => match &previous_left {
                    Some(left) => (left.clone(), &pieces[1..]),
                    None => return Err(GrammarError::NoPreviousLeftSide { line: number }),
                },
                _ => return Err(GrammarError::MissingSeparator { line: number }),
            },
        };

        for alternative in body.split(|p| *p == Piece::Bar) {
            productions.push(Production {
                number: productions.len() + 1,
                lhs: left.clone(),
                rhs: right_side(alternative),
            });
        }

        previous_left = Some(left);
    }

    Ok(productions)
}

fn normalize_lex(lex: &LexSource) -> Result<Vec<super::LexRule>, GrammarError> {
    match lex {
        LexSource::Text(text) => lex::compile_rules(lex::split_lex_lines(text)?),
        LexSource::Rules(rules) => {
            lex::compile_rules(rules.iter().map(|(p, t)| (p.as_str(), t.as_str())))
        }
    }
}

impl Grammar {
    pub fn new(source: impl Into<GrammarSource>) -> Result<Self, GrammarError> {
        let (bnf, lex) = match source.into() {
            GrammarSource::Structured { lex, bnf } => (bnf, lex),
            GrammarSource::Lines(lines) => (BnfSource::Lines(lines), None),
            GrammarSource::Text(text) => (BnfSource::Text(text), None),
        };

        let productions = match &bnf {
            BnfSource::Text(text) => normalize_bnf(text.lines())?,
            BnfSource::Lines(lines) => normalize_bnf(lines.iter().map(String::as_str))?,
        };
        let lex_rules = lex.as_ref().map(normalize_lex).transpose()?;

        Self::from_parts(productions, lex_rules)
    }

    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        Self::new(grammar)
    }

    pub fn with_lex(grammar: &str, lex: impl Into<LexSource>) -> Result<Self, GrammarError> {
        Self::new(GrammarSource::Structured {
            lex: Some(lex.into()),
            bnf: BnfSource::Text(grammar.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols<'a>(pieces: &[Piece<'a>]) -> Vec<&'a str> {
        pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Symbol(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn scan_keeps_quoted_space() {
        let pieces = scan_line(r#"S -> A " " B "|" C"#, 1).unwrap();
        assert_eq!(symbols(&pieces), vec!["S", "A", "\" \"", "B", "\"|\"", "C"]);
        assert_eq!(pieces[1], Piece::Arrow);
    }

    #[test]
    fn scan_without_spaces() {
        let pieces = scan_line(r#"S->"a"B|c"#, 1).unwrap();
        assert_eq!(
            pieces,
            vec![
                Piece::Symbol("S"),
                Piece::Arrow,
                Piece::Symbol("\"a\""),
                Piece::Symbol("B"),
                Piece::Bar,
                Piece::Symbol("c"),
            ]
        );
    }

    #[test]
    fn scan_unterminated_terminal() {
        assert!(matches!(
            scan_line(r#"S -> "a"#, 3),
            Err(GrammarError::UnterminatedTerminal { line: 3 })
        ));
    }

    #[test]
    fn alternatives_on_one_line_are_numbered() {
        let productions = normalize_bnf(vec!["S -> a | b", "  | ", "T -> ε c"]).unwrap();
        let rhs: Vec<_> = productions.iter().map(|p| (p.number, p.rhs.clone())).collect();
        assert_eq!(
            rhs,
            vec![
                (1, vec!["a".to_string()]),
                (2, vec!["b".to_string()]),
                (3, vec![EPSILON.to_string()]),
                (4, vec!["c".to_string()]),
            ]
        );
        assert_eq!(productions[2].lhs, "S");
    }

    #[test]
    fn terminal_left_side_is_rejected() {
        assert!(matches!(
            normalize_bnf(vec![r#""a" -> b"#]),
            Err(GrammarError::InvalidLeftSide { line: 1, .. })
        ));
    }

    #[test]
    fn structured_source_from_json() {
        let source: GrammarSource = serde_json::from_str(
            r#"{ "lex": [["[0-9]+", "NUMBER"]], "bnf": ["S -> NUMBER"] }"#,
        )
        .unwrap();
        assert_eq!(
            source,
            GrammarSource::Structured {
                lex: Some(LexSource::Rules(vec![(
                    "[0-9]+".to_string(),
                    "NUMBER".to_string()
                )])),
                bnf: BnfSource::Lines(vec!["S -> NUMBER".to_string()]),
            }
        );

        let source: GrammarSource = serde_json::from_str(r#"{ "bnf": "S -> \"a\"" }"#).unwrap();
        assert_eq!(
            source,
            GrammarSource::Structured {
                lex: None,
                bnf: BnfSource::Text("S -> \"a\"".to_string()),
            }
        );
    }
}
