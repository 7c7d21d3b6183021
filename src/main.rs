#[macro_use]
extern crate log;

use clap::{App, Arg};
use ll1_parser_helper::{
    grammar::{pretty_print::ParseOutput, BnfSource, LexSource},
    GrammarSource, ParserGenerator, TableMode,
};
use std::{fs, io::Read, path::Path};

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

macro_rules! render {
    ($format:expr, $t:expr) => {
        match $format {
            OutputFormat::Plain => $t.to_plaintext(),
            OutputFormat::LaTeX => $t.to_latex(),
            OutputFormat::JSON => serde_json::to_string(&$t).unwrap_or_default(),
        }
    };
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", message);
    std::process::exit(1);
}

fn read_source(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().lock().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("OUTPUT")
                .help("What to print")
                .possible_values(&["prod", "sets", "predict", "ll1", "parse"])
                .multiple(true)
                .required(true),
        )
        .arg(
            Arg::with_name("grammar")
                .short("g")
                .long("grammar")
                .help("Grammar file, a .json file is read as a structured grammar (default: stdin)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("lex")
                .long("lex")
                .help("Lexical grammar file with `<pattern> : <token>` lines")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .help("A string to parse with the `parse` output")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(Arg::with_name("latex").short("l").help("Print in LaTeX format"))
        .arg(
            Arg::with_name("json")
                .short("j")
                .conflicts_with("latex")
                .help("Print in JSON format"),
        )
        .arg(
            Arg::with_name("strict")
                .short("s")
                .long("strict")
                .help("Reject grammars with conflicting table cells"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .get_matches();

    // Configure the logger.
    let level = match matches.occurrences_of("verbosity") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    let output_format = if matches.is_present("latex") {
        OutputFormat::LaTeX
    } else if matches.is_present("json") {
        OutputFormat::JSON
    } else {
        OutputFormat::Plain
    };
    let mode = if matches.is_present("strict") {
        TableMode::Strict
    } else {
        TableMode::LastWriteWins
    };

    let grammar_path = matches.value_of("grammar");
    let text = read_source(grammar_path).unwrap_or_else(|e| fail(e));
    let is_json = grammar_path
        .and_then(|p| Path::new(p).extension())
        .map_or(false, |ext| ext == "json");

    let source: GrammarSource = if is_json {
        serde_json::from_str(&text).unwrap_or_else(|e| fail(e))
    } else {
        match matches.value_of("lex") {
            Some(lex) => GrammarSource::Structured {
                lex: Some(LexSource::Text(fs::read_to_string(lex).unwrap_or_else(|e| fail(e)))),
                bnf: BnfSource::Text(text),
            },
            None => GrammarSource::Text(text),
        }
    };

    let pg = ParserGenerator::with_mode(source, mode).unwrap_or_else(|e| fail(e));
    debug!(
        "{} productions, {} non-terminals, {} terminals, {} lex variables",
        pg.grammar().productions().len(),
        pg.grammar().non_terminals().len(),
        pg.grammar().terminals().len(),
        pg.grammar().lex_vars().len()
    );
    if !pg.table().conflicts().is_empty() {
        info!("grammar is not LL(1), later productions took over conflicting cells");
    }

    let mut failed = false;
    for output in matches.values_of("OUTPUT").into_iter().flatten() {
        match output {
            "prod" => println!("{}", render!(output_format, pg.grammar().to_production_output_vec())),
            "sets" => {
                println!("{}", render!(output_format, pg.sets().to_first_output_vec(pg.grammar())));
                println!("{}", render!(output_format, pg.sets().to_follow_output_vec(pg.grammar())));
            }
            "predict" => {
                println!("{}", render!(output_format, pg.sets().to_predict_output_vec(pg.grammar())))
            }
            "ll1" => println!("{}", render!(output_format, pg.table().to_output(pg.grammar()))),
            "parse" => {
                let parser = pg.generate();
                for input in matches.values_of("input").into_iter().flatten() {
                    match parser.recognize(input) {
                        Ok(acceptance) => {
                            println!("{}", render!(output_format, ParseOutput::new(input, &acceptance)))
                        }
                        Err(e) => {
                            eprintln!("{:?}: {}", input, e);
                            failed = true;
                        }
                    }
                }
            }
            _ => unreachable!(),
        }
    }

    if failed {
        std::process::exit(1);
    }
}
