//! Command-line interface for arbor
//! Checks that a file holds exactly one well-formed document.
//!
//! Usage:
//!   arbor `<path>`                  - Parse the file, report the first error
//!   arbor `<path>` --print          - Also print the parsed tree
//!   arbor `<path>` --tokens         - Print the token stream instead of parsing
//!
//! Exit status is 0 when the document parses, 1 when it does not (or cannot
//! be read) and 2 for usage errors.

use std::fs::File;
use std::process::ExitCode;

use arbor_core::{parse_file_with, Error, ParserOptions, ReadSource, Tokenizer, DEFAULT_MAX_DEPTH};
use clap::{value_parser, Arg, ArgAction, Command};
use tracing::{debug, Level};

fn cli() -> Command {
    Command::new("arbor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse a JSON-like document and report the first error")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the document")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("print")
                .long("print")
                .short('p')
                .help("Print the parsed tree, indented")
                .action(ArgAction::SetTrue)
                .conflicts_with("tokens"),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .short('t')
                .help("Print one line per token instead of parsing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .help("Maximum nesting depth of objects and lists [default: 128]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log progress to stderr (repeat for more detail)")
                .action(ArgAction::Count),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let max_depth = matches
        .get_one::<usize>("max-depth")
        .copied()
        .unwrap_or(DEFAULT_MAX_DEPTH);

    let outcome = if matches.get_flag("tokens") {
        handle_tokens_command(path)
    } else {
        handle_parse_command(path, ParserOptions::new().max_depth(max_depth), matches.get_flag("print"))
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(path, &err);
            ExitCode::FAILURE
        }
    }
}

/// Install a stderr subscriber; `-v` raises the level one step per use.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Handle the default command: parse, optionally print
fn handle_parse_command(path: &str, options: ParserOptions, print: bool) -> Result<(), Error> {
    debug!(path, max_depth = options.max_depth, "parsing file");
    let value = parse_file_with(path, options)?;
    if print {
        println!("{:#}", value);
    }
    Ok(())
}

/// Handle --tokens: dump the token stream
fn handle_tokens_command(path: &str) -> Result<(), Error> {
    debug!(path, "tokenizing file");
    let file = File::open(path)?;
    let mut tokens = Tokenizer::new(ReadSource::new(file));
    while let Some(token) = tokens.next_token()? {
        println!("{}\t{}", token.span, token);
    }
    Ok(())
}

fn report(path: &str, err: &Error) {
    match err {
        Error::Lex(e) => eprintln!("error: {}", e),
        Error::Parse(e) => eprintln!("error: {}", e),
        Error::Io(e) => eprintln!("error: cannot read {}: {}", path, e),
    }
}
