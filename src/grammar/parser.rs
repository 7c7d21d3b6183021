use log::{debug, trace};

use super::{
    tokenizer::{Token, Tokenizer},
    Grammar, ParseError, ParsingTable, END_MARK,
};

/// The result of an accepted parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    /// Production numbers of the leftmost derivation, in order.
    pub productions: Vec<usize>,
    /// What is left on the stack, always `["$"]`.
    pub stack: Vec<String>,
    pub last_token: Token,
}

/// Walks an LL(1) parsing table to check strings for acceptance.
///
/// The stack and the production trace belong to a single call, so one parser
/// may check any number of strings.
#[derive(Debug, Clone, Copy)]
pub struct LL1Parser<'a> {
    grammar: &'a Grammar,
    table: &'a ParsingTable,
}

impl<'a> LL1Parser<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a ParsingTable) -> Self {
        Self { grammar, table }
    }

    /// The productions used to derive `input`.
    pub fn parse(&self, input: &str) -> Result<Vec<usize>, ParseError> {
        self.recognize(input).map(|acceptance| acceptance.productions)
    }

    pub fn recognize(&self, input: &str) -> Result<Acceptance, ParseError> {
        debug!("parsing {:?}", input);
        self.recognize_tokens(Tokenizer::new(input, self.grammar))
    }

    pub fn recognize_tokens<I>(&self, tokens: I) -> Result<Acceptance, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut tokens = tokens.into_iter().peekable();
        let mut token = tokens.next().unwrap_or_else(Token::end_of_input);

        let mut stack: Vec<String> = vec![
            END_MARK.to_string(),
            self.grammar.start_symbol().to_string(),
        ];
        let mut productions: Vec<usize> = Vec::new();

        while tokens.peek().is_some() {
            let top = match stack.pop() {
                Some(top) => top,
                None => return Err(ParseError::StackNotEmpty { token, stack }),
            };

            if self.grammar.is_token(&top) && top == token.kind {
                trace!("match {}", token.value);
                if let Some(next) = tokens.next() {
                    token = next;
                }
                continue;
            }

            self.derive(&top, &token, &mut stack, &mut productions)?;
        }

        // Whatever remains above `$` has to derive ε.
        while stack.len() > 1 {
            let derivable = stack.last().map_or(false, |top| {
                !self.grammar.is_token(top) && self.table.get(top, &token.kind).is_some()
            });
            if !derivable {
                break;
            }
            if let Some(top) = stack.pop() {
                self.derive(&top, &token, &mut stack, &mut productions)?;
            }
        }

        if stack.len() != 1 || stack[0] != END_MARK || !token.is_end_of_input() {
            return Err(ParseError::StackNotEmpty { token, stack });
        }

        debug!(
            "accepted, productions: {}",
            productions
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Acceptance {
            productions,
            stack,
            last_token: token,
        })
    }

    /// Replaces `top` on the stack with the right side the table selects.
    fn derive(
        &self,
        top: &str,
        token: &Token,
        stack: &mut Vec<String>,
        productions: &mut Vec<usize>,
    ) -> Result<(), ParseError> {
        let production = self
            .table
            .get(top, &token.kind)
            .and_then(|number| self.grammar.get(number))
            .ok_or_else(|| ParseError::UnexpectedToken {
                token: token.clone(),
                expected: self.expected(top),
            })?;

        trace!("{} on {}: production {}", top, token.kind, production.number);
        productions.push(production.number);

        // For `F -> ε` the symbol is just popped.
        if !production.is_epsilon() {
            stack.extend(production.rhs.iter().rev().cloned());
        }
        Ok(())
    }

    fn expected(&self, top: &str) -> Vec<String> {
        match self.table.row(top) {
            Some(row) if !self.grammar.is_token(top) => {
                let mut expected: Vec<String> = row.keys().cloned().collect();
                expected.sort();
                expected
            }
            _ => vec![top.to_string()],
        }
    }
}
