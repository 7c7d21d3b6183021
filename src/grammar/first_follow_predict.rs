use std::collections::{BTreeMap, HashMap, HashSet};

use log::trace;

use super::{
    grammar::{Production, SymbolKind},
    Grammar, END_MARK, EPSILON,
};

pub type SymbolSet = HashSet<String>;

/// Memo tables for the recursive First/Follow traversal. An entry is inserted
/// before its dependents are visited and grows in place, so a symbol reached
/// again through a cycle sees whatever has been collected so far.
struct SetsBuilder<'g> {
    grammar: &'g Grammar,
    first: HashMap<String, SymbolSet>,
    follow: HashMap<String, SymbolSet>,
}

impl<'g> SetsBuilder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            first: HashMap::new(),
            follow: HashMap::new(),
        }
    }

    fn first_of(&mut self, symbol: &str) -> SymbolSet {
        if let Some(first) = self.first.get(symbol) {
            return first.clone();
        }

        let grammar = self.grammar;
        if grammar.is_token(symbol) {
            let first: SymbolSet = std::iter::once(symbol.to_string()).collect();
            self.first.insert(symbol.to_string(), first.clone());
            return first;
        }

        self.first.insert(symbol.to_string(), SymbolSet::new());
        for production in grammar.productions_for(symbol) {
            let first = self.first_of_rhs(&production.rhs);
            if let Some(entry) = self.first.get_mut(symbol) {
                entry.extend(first);
            }
        }
        trace!("first({}) = {:?}", symbol, self.first[symbol]);
        self.first[symbol].clone()
    }

    fn first_of_rhs(&mut self, rhs: &[String]) -> SymbolSet {
        let mut first = SymbolSet::new();
        for symbol in rhs {
            if symbol == EPSILON {
                first.insert(EPSILON.to_string());
                break;
            }
            let current = self.first_of(symbol);
            let nullable = current.contains(EPSILON);
            first.extend(current.into_iter().filter(|s| s != EPSILON));
            if !nullable {
                return first;
            }
        }
        // Every symbol vanished (or the sequence was empty).
        first.insert(EPSILON.to_string());
        first
    }

    fn follow_of(&mut self, symbol: &str) -> SymbolSet {
        if let Some(follow) = self.follow.get(symbol) {
            return follow.clone();
        }

        let grammar = self.grammar;
        let mut seed = SymbolSet::new();
        if symbol == grammar.start_symbol() {
            seed.insert(END_MARK.to_string());
        }
        self.follow.insert(symbol.to_string(), seed);

        for production in grammar.productions_with(symbol) {
            for (i, _) in production.rhs.iter().enumerate().filter(|(_, s)| *s == symbol) {
                let follow = self.follow_after(production, symbol, i + 1);
                if let Some(entry) = self.follow.get_mut(symbol) {
                    entry.extend(follow);
                }
            }
        }
        trace!("follow({}) = {:?}", symbol, self.follow[symbol]);
        self.follow[symbol].clone()
    }

    /// First of `suffix` without ε, and whether the whole suffix can vanish.
    fn first_of_suffix(&mut self, suffix: &[String]) -> (SymbolSet, bool) {
        let mut first = SymbolSet::new();
        for next in suffix {
            let current = self.first_of(next);
            let nullable = current.contains(EPSILON);
            first.extend(current.into_iter().filter(|s| s != EPSILON));
            if !nullable {
                return (first, false);
            }
        }
        (first, true)
    }

    /// What `production.rhs[from..]` contributes to the Follow set of `symbol`.
    fn follow_after(&mut self, production: &Production, symbol: &str, from: usize) -> SymbolSet {
        let (mut follow, vanished) = self.first_of_suffix(&production.rhs[from..]);
        // `B -> a B` adds nothing new to Follow(B).
        if vanished && production.lhs != symbol {
            follow.extend(self.follow_of(&production.lhs));
        }
        follow
    }

    /// A Follow set read while its own computation was still running only
    /// holds part of its final content. Re-applies the Follow rules over the
    /// memoized sets until none of them grows.
    fn close_follow(&mut self) {
        let grammar = self.grammar;
        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions() {
                for (i, symbol) in production.rhs.iter().enumerate() {
                    if !self.follow.contains_key(symbol) {
                        continue;
                    }
                    let (mut follow, vanished) = self.first_of_suffix(&production.rhs[i + 1..]);
                    if vanished && production.lhs != *symbol {
                        if let Some(lhs) = self.follow.get(&production.lhs) {
                            follow.extend(lhs.iter().cloned());
                        }
                    }
                    if let Some(entry) = self.follow.get_mut(symbol) {
                        let before = entry.len();
                        entry.extend(follow);
                        if entry.len() != before {
                            trace!("follow({}) grew to {:?}", symbol, entry);
                            changed = true;
                        }
                    }
                }
            }
        }
    }
}

/// First, Follow and Predict sets of a grammar.
///
/// Rules for First sets:
///
/// - If X is a terminal then First(X) is just X.
/// - If there is a production X -> ε then add ε to First(X).
/// - If there is a production X -> Y1 Y2 .. Yk then add First(Y1 Y2 .. Yk) to First(X),
///   where First(Y1 .. Yk) is First(Y1) without ε, followed by First(Y2 .. Yk) when
///   First(Y1) contains ε, plus ε if every First(Yi) contains ε.
///
/// Rules for Follow sets:
///
/// - `$` is in Follow(S) for the start symbol S.
/// - For A -> a B b, everything in First(b) except ε is in Follow(B).
/// - For A -> a B, or A -> a B b where b derives ε, everything in Follow(A) is in Follow(B).
///
/// Follow sets are closed under these rules once the recursive pass is done.
/// First sets are not, so on a left-recursive grammar they may be incomplete.
#[derive(Debug, Clone)]
pub struct Sets {
    first: HashMap<String, SymbolSet>,
    follow: HashMap<String, SymbolSet>,
    predict: BTreeMap<usize, SymbolSet>,
    predict_all: BTreeMap<usize, SymbolSet>,
    lex_vars: Vec<String>,
}

impl Sets {
    pub fn compute(grammar: &Grammar) -> Self {
        let mut builder = SetsBuilder::new(grammar);
        for production in grammar.productions() {
            builder.first_of(&production.lhs);
        }
        for production in grammar.productions() {
            builder.follow_of(&production.lhs);
        }
        builder.close_follow();

        let mut predict = BTreeMap::new();
        let mut predict_all = BTreeMap::new();
        for production in grammar.productions() {
            let mut set = builder.first_of_rhs(&production.rhs);
            if set.remove(EPSILON) {
                set.extend(builder.follow_of(&production.lhs));
            }
            if !production.is_epsilon() {
                predict.insert(production.number, set.clone());
            }
            predict_all.insert(production.number, set);
        }

        Self {
            first: builder.first,
            follow: builder.follow,
            predict,
            predict_all,
            lex_vars: grammar.lex_vars().to_vec(),
        }
    }

    /// First sets of every symbol reached while computing the grammar's sets,
    /// tokens included.
    pub fn first_sets(&self) -> &HashMap<String, SymbolSet> {
        &self.first
    }

    pub fn follow_sets(&self) -> &HashMap<String, SymbolSet> {
        &self.follow
    }

    /// Predict sets keyed by production number. Productions of the form
    /// `A -> ε` are left out; see [`Sets::predict_of`].
    pub fn predict_sets(&self) -> &BTreeMap<usize, SymbolSet> {
        &self.predict
    }

    /// Predict(A -> α) = First(α) ∪ (Follow(A) if α =>* ε), without ε.
    pub fn predict_of(&self, number: usize) -> Option<&SymbolSet> {
        self.predict_all.get(&number)
    }

    pub fn first_of(&self, symbol: &str) -> SymbolSet {
        if let Some(first) = self.first.get(symbol) {
            return first.clone();
        }
        match SymbolKind::of(symbol, &self.lex_vars) {
            SymbolKind::Terminal | SymbolKind::LexVariable | SymbolKind::EndOfInput => {
                std::iter::once(symbol.to_string()).collect()
            }
            SymbolKind::Epsilon => std::iter::once(EPSILON.to_string()).collect(),
            SymbolKind::NonTerminal => SymbolSet::new(),
        }
    }

    pub fn follow_of(&self, symbol: &str) -> SymbolSet {
        self.follow.get(symbol).cloned().unwrap_or_default()
    }

    pub fn first_of_rhs(&self, rhs: &[String]) -> SymbolSet {
        let mut first = SymbolSet::new();
        for symbol in rhs {
            if symbol == EPSILON {
                break;
            }
            let current = self.first_of(symbol);
            let nullable = current.contains(EPSILON);
            first.extend(current.into_iter().filter(|s| s != EPSILON));
            if !nullable {
                return first;
            }
        }
        first.insert(EPSILON.to_string());
        first
    }

    pub fn is_nullable(&self, symbol: &str) -> bool {
        symbol == EPSILON || self.first.get(symbol).map_or(false, |f| f.contains(EPSILON))
    }
}

/// `"2. E' -> \"+\" T E'"`
pub fn predict_label(ordinal: usize, production: &Production) -> String {
    format!("{}. {} -> {}", ordinal, production.lhs, production.rhs.join(" "))
}
