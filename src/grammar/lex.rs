use std::{borrow::Cow, sync::OnceLock};

use regex::{Captures, Regex};

use super::{grammar::LexRule, GrammarError};

/// Replaces the grammar's notation for literal text with its regex form,
/// e.g. `"."` becomes `\.` and `"id"` becomes `id`.
pub fn to_regex_syntax(pattern: &str) -> Cow<'_, str> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let quoted =
        QUOTED.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("valid quote pattern"));
    if !quoted.is_match(pattern) {
        return Cow::Borrowed(pattern);
    }
    Cow::Owned(
        quoted
            .replace_all(pattern, |caps: &Captures| regex::escape(&caps[1]))
            .into_owned(),
    )
}

pub fn compile_rule(pattern: &str, token: &str) -> Result<LexRule, GrammarError> {
    let source = format!("^(?:{})", to_regex_syntax(pattern));
    let regex = Regex::new(&source).map_err(|source| GrammarError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(LexRule {
        pattern: pattern.to_string(),
        token: token.to_string(),
        regex,
    })
}

/// Compiles `(pattern, token)` pairs in order. A repeated pattern keeps its
/// first position and takes the last token.
pub fn compile_rules<I, P, T>(rules: I) -> Result<Vec<LexRule>, GrammarError>
where
    I: IntoIterator<Item = (P, T)>,
    P: AsRef<str>,
    T: AsRef<str>,
{
    let mut compiled: Vec<LexRule> = Vec::new();
    for (pattern, token) in rules {
        let (pattern, token) = (pattern.as_ref().trim(), token.as_ref().trim());
        match compiled.iter_mut().find(|r| r.pattern == pattern) {
            Some(rule) => rule.token = token.to_string(),
            None => compiled.push(compile_rule(pattern, token)?),
        }
    }
    Ok(compiled)
}

/// Byte offset of the last `:` that is not inside a quoted literal.
fn separator_colon(line: &str) -> Option<usize> {
    let mut quoted = false;
    let mut colon = None;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ':' if !quoted => colon = Some(i),
            _ => {}
        }
    }
    colon
}

/// Splits lexical grammar text of the form `<pattern> : <token>` per line.
pub fn split_lex_lines(lex: &str) -> Result<Vec<(&str, &str)>, GrammarError> {
    let mut rules = Vec::new();
    for (i, line) in lex.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let colon = separator_colon(line).ok_or(GrammarError::MalformedLexRule { line: i + 1 })?;
        let (pattern, token) = (line[..colon].trim(), line[colon + 1..].trim());
        if pattern.is_empty() || token.is_empty() {
            return Err(GrammarError::MalformedLexRule { line: i + 1 });
        }
        rules.push((pattern, token));
    }
    Ok(rules)
}
