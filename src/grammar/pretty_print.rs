use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    first_follow_predict::{predict_label, SymbolSet},
    parser::Acceptance,
    Grammar, ParsingTable, Sets, EPSILON,
};

fn tex(s: &str) -> String {
    escape::tex(s).replace(EPSILON, r"$\epsilon$")
}

/// Pads every column to its widest cell and joins cells with `" | "`.
fn align(lines: &[Vec<String>]) -> String {
    let columns = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let mut width = vec![0; columns];
    for line in lines {
        for (j, cell) in line.iter().enumerate() {
            width[j] = width[j].max(cell.chars().count());
        }
    }
    lines
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:<width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sorted, with ε last.
fn sorted(set: &SymbolSet) -> Vec<&str> {
    let mut symbols: Vec<&str> = set
        .iter()
        .map(String::as_str)
        .filter(|s| *s != EPSILON)
        .collect();
    symbols.sort();
    if set.contains(EPSILON) {
        symbols.push(EPSILON);
    }
    symbols
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub number: usize,
    pub left: &'a str,
    pub right: Vec<&'a str>,
    /// Whether the previous production has the same left side.
    #[serde(skip)]
    pub continued: bool,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize) -> String {
        if self.continued {
            format!(
                "{:>3}. {:>width$}  | {}",
                self.number,
                "",
                self.right.join(" "),
                width = left_width
            )
        } else {
            format!(
                "{:>3}. {:>width$} -> {}",
                self.number,
                self.left,
                self.right.join(" "),
                width = left_width
            )
        }
    }

    pub fn to_latex(&self) -> String {
        let right = self
            .right
            .iter()
            .map(|s| tex(s))
            .collect::<Vec<_>>()
            .join(r" \ ");
        if self.continued {
            format!("{} & & \\mid & {}", self.number, right)
        } else {
            format!(
                "{} & {} & \\rightarrow & {}",
                self.number,
                tex(self.left),
                right
            )
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{rcll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
            + "\n\\end{array}\\]"
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let mut productions: Vec<ProductionOutput> = Vec::new();
        for production in self.productions() {
            let continued = productions
                .last()
                .map_or(false, |p| p.left == production.lhs);
            productions.push(ProductionOutput {
                number: production.number,
                left: production.lhs.as_str(),
                right: production.rhs.iter().map(String::as_str).collect(),
                continued,
            });
        }
        ProductionOutputVec { productions }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SetOutput<'a> {
    name: String,
    set: Vec<&'a str>,
}

/// One set per row, e.g. the First set of every non-terminal.
#[derive(Debug, Clone, Serialize)]
pub struct SetOutputVec<'a> {
    header: [&'static str; 2],
    data: Vec<SetOutput<'a>>,
}

impl SetOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut lines = vec![self.header.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        lines.extend(
            self.data
                .iter()
                .map(|row| vec![row.name.clone(), row.set.join(", ")]),
        );
        align(&lines)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|row| {
                format!(
                    "{} & {}",
                    tex(&row.name),
                    row.set.iter().map(|s| tex(s)).collect::<Vec<_>>().join(r"\ ")
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        format!(
            "\\begin{{tabular}}{{c|c}}\n{} & {}\\\\\\hline\n{}\\\\\n\\end{{tabular}}",
            self.header[0], self.header[1], content
        )
    }
}

impl Sets {
    pub fn to_first_output_vec<'a>(&'a self, grammar: &'a Grammar) -> SetOutputVec<'a> {
        let data = grammar
            .non_terminals()
            .iter()
            .filter_map(|nt| {
                self.first_sets().get(nt).map(|set| SetOutput {
                    name: nt.clone(),
                    set: sorted(set),
                })
            })
            .collect();
        SetOutputVec {
            header: ["Symbol", "First set"],
            data,
        }
    }

    pub fn to_follow_output_vec<'a>(&'a self, grammar: &'a Grammar) -> SetOutputVec<'a> {
        let data = grammar
            .non_terminals()
            .iter()
            .filter_map(|nt| {
                self.follow_sets().get(nt).map(|set| SetOutput {
                    name: nt.clone(),
                    set: sorted(set),
                })
            })
            .collect();
        SetOutputVec {
            header: ["Symbol", "Follow set"],
            data,
        }
    }

    pub fn to_predict_output_vec<'a>(&'a self, grammar: &'a Grammar) -> SetOutputVec<'a> {
        let data = self
            .predict_sets()
            .iter()
            .enumerate()
            .filter_map(|(i, (number, set))| {
                grammar.get(*number).map(|production| SetOutput {
                    name: predict_label(i + 1, production),
                    set: sorted(set),
                })
            })
            .collect();
        SetOutputVec {
            header: ["Production", "Predict set"],
            data,
        }
    }
}

/// The parsing table as plain rows: a header, then one row per non-terminal.
#[derive(Debug, Clone, Serialize)]
pub struct LL1ParsingTableOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LL1ParsingTableOutput {
    pub fn to_plaintext(&self) -> String {
        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        let mut lines = vec![header];
        lines.extend(self.rows.iter().cloned());
        align(&lines)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.columns.iter().map(|t| format!("\\text{{{}}}", tex(t))));
        let header = header.join(" & ");

        let output = self
            .rows
            .iter()
            .map(|row| row.iter().map(|s| tex(s)).collect::<Vec<_>>().join(" & "))
            .collect::<Vec<_>>()
            .join("\\\\\n");

        format!(
            "\\[\\begin{{array}}{{c{}}}\n{}\\\\\\hline\n{}\n\\end{{array}}\\]",
            "|c".repeat(self.columns.len()),
            header,
            output
        )
    }
}

impl ParsingTable {
    pub fn to_output(&self, grammar: &Grammar) -> LL1ParsingTableOutput {
        let columns: Vec<&str> = Self::columns(grammar);
        let rows = grammar
            .non_terminals()
            .iter()
            .map(|nt| {
                std::iter::once(nt.clone())
                    .chain(columns.iter().map(|t| match self.get(nt, t) {
                        Some(number) => number.to_string(),
                        None => "-".to_string(),
                    }))
                    .collect::<Vec<String>>()
            })
            .collect();
        LL1ParsingTableOutput {
            columns: columns.into_iter().map(String::from).collect(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput<'a> {
    pub input: &'a str,
    pub productions: Vec<usize>,
}

impl<'a> ParseOutput<'a> {
    pub fn new(input: &'a str, acceptance: &Acceptance) -> Self {
        Self {
            input,
            productions: acceptance.productions.clone(),
        }
    }

    pub fn to_plaintext(&self) -> String {
        format!(
            "Parsing: {:?}\nAccepted. Productions: {}",
            self.input,
            self.productions
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\texttt{{{}}}: ${}$",
            tex(self.input),
            self.productions
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(r" \Rightarrow ")
        )
    }
}
