use std::collections::HashMap;

use log::{debug, warn};

use super::{parser::LL1Parser, Grammar, GrammarError, GrammarSource, Sets, END_MARK};

/// Two productions competing for one table cell. The later one is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub non_terminal: String,
    pub lookahead: String,
    pub previous: usize,
    pub replacement: usize,
}

impl From<Conflict> for GrammarError {
    fn from(c: Conflict) -> Self {
        GrammarError::Ambiguity {
            non_terminal: c.non_terminal,
            lookahead: c.lookahead,
            previous: c.previous,
            replacement: c.replacement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// A later production silently takes over an occupied cell.
    #[default]
    LastWriteWins,
    /// An occupied cell is a [`GrammarError::Ambiguity`].
    Strict,
}

/// Non-terminal -> lookahead -> production number.
#[derive(Debug, Clone, Default)]
pub struct ParsingTable {
    rows: HashMap<String, HashMap<String, usize>>,
    conflicts: Vec<Conflict>,
}

impl ParsingTable {
    /// Basically the table needs the Predict set of every production: its
    /// First set, plus the Follow set of its left side if it derives ε.
    pub fn build(grammar: &Grammar, sets: &Sets) -> Self {
        let mut table = ParsingTable::default();

        for production in grammar.productions() {
            let row = table.rows.entry(production.lhs.clone()).or_default();
            let lookaheads = match sets.predict_of(production.number) {
                Some(set) => set,
                None => continue,
            };
            for lookahead in lookaheads {
                if let Some(previous) = row.insert(lookahead.clone(), production.number) {
                    if previous != production.number {
                        warn!(
                            "table cell [{}, {}]: production {} replaces {}",
                            production.lhs, lookahead, production.number, previous
                        );
                        table.conflicts.push(Conflict {
                            non_terminal: production.lhs.clone(),
                            lookahead: lookahead.clone(),
                            previous,
                            replacement: production.number,
                        });
                    }
                }
            }
        }

        debug!(
            "built LL(1) table with {} rows, {} conflicts",
            table.rows.len(),
            table.conflicts.len()
        );
        table
    }

    /// Like [`ParsingTable::build`], but refuses a grammar that is not LL(1).
    pub fn build_strict(grammar: &Grammar, sets: &Sets) -> Result<Self, GrammarError> {
        let mut table = Self::build(grammar, sets);
        if table.conflicts.is_empty() {
            Ok(table)
        } else {
            Err(table.conflicts.swap_remove(0).into())
        }
    }

    pub fn get(&self, non_terminal: &str, lookahead: &str) -> Option<usize> {
        self.rows
            .get(non_terminal)
            .and_then(|row| row.get(lookahead))
            .copied()
    }

    pub fn row(&self, non_terminal: &str) -> Option<&HashMap<String, usize>> {
        self.rows.get(non_terminal)
    }

    pub fn rows(&self) -> &HashMap<String, HashMap<String, usize>> {
        &self.rows
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Lookahead columns in display order: terminals, lex variables, `$`.
    pub fn columns(grammar: &Grammar) -> Vec<&str> {
        grammar
            .terminals()
            .iter()
            .chain(grammar.lex_vars())
            .map(String::as_str)
            .chain(std::iter::once(END_MARK))
            .collect()
    }
}

/// Given an LL(1) grammar builds a parser for it.
///
/// LL(1) by definition should not contain left recursion and should be
/// left-factored; neither is checked here.
#[derive(Debug, Clone)]
pub struct ParserGenerator {
    grammar: Grammar,
    sets: Sets,
    table: ParsingTable,
}

impl ParserGenerator {
    pub fn new(source: impl Into<GrammarSource>) -> Result<Self, GrammarError> {
        Self::with_mode(source, TableMode::default())
    }

    pub fn with_mode(source: impl Into<GrammarSource>, mode: TableMode) -> Result<Self, GrammarError> {
        Self::from_grammar(Grammar::new(source)?, mode)
    }

    pub fn from_grammar(grammar: Grammar, mode: TableMode) -> Result<Self, GrammarError> {
        let sets = Sets::compute(&grammar);
        let table = match mode {
            TableMode::LastWriteWins => ParsingTable::build(&grammar, &sets),
            TableMode::Strict => ParsingTable::build_strict(&grammar, &sets)?,
        };
        Ok(Self {
            grammar,
            sets,
            table,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &Sets {
        &self.sets
    }

    pub fn table(&self) -> &ParsingTable {
        &self.table
    }

    /// A parser that only checks strings for acceptance.
    pub fn generate(&self) -> LL1Parser<'_> {
        LL1Parser::new(&self.grammar, &self.table)
    }
}
