//! Command-line interface for markup-digester
//!
//! Usage:
//!   mdigest match `<expr>` [`<file>`] [--format lines|json]  - Print the text matched by a path
//!   mdigest compile `<expr>`                                - Print the canonical form of a path
//!   mdigest tokens [`<file>`]                               - Dump the token stream
//!
//! Input is read from stdin when no file is given. `--config <file.yaml>` loads a digester
//! configuration. Set `RUST_LOG=markup_digester=debug` to see match transitions.

use clap::{Arg, ArgMatches, Command};
use std::io::Read;
use std::process;

use markup_digester::{compile, lexer, Digester, DigesterConfig};

fn main() {
    env_logger::init();

    let matches = Command::new("mdigest")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract text from tag markup with XPath-style paths")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("YAML file with digester settings"),
        )
        .subcommand(
            Command::new("match")
                .about("Print the text matched by a path expression")
                .arg(
                    Arg::new("expr")
                        .help("Path expression, e.g. /rss/channel/item[@type='news']")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("file")
                        .help("Markup file to read (stdin when omitted)")
                        .index(2),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["lines", "json"])
                        .default_value("lines"),
                ),
        )
        .subcommand(
            Command::new("compile")
                .about("Compile a path expression and print its canonical form")
                .arg(
                    Arg::new("expr")
                        .help("Path expression")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Dump the token stream of a markup file")
                .arg(
                    Arg::new("file")
                        .help("Markup file to read (stdin when omitted)")
                        .index(1),
                ),
        )
        .get_matches();

    let config = load_config(matches.get_one::<String>("config"));

    match matches.subcommand() {
        Some(("match", match_matches)) => {
            let expr = required(match_matches, "expr");
            let format = match_matches
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("lines");
            let source = read_input(match_matches.get_one::<String>("file"));
            handle_match_command(config, expr, &source, format);
        }
        Some(("compile", compile_matches)) => {
            handle_compile_command(required(compile_matches, "expr"));
        }
        Some(("tokens", tokens_matches)) => {
            let source = read_input(tokens_matches.get_one::<String>("file"));
            handle_tokens_command(&source);
        }
        _ => unreachable!(),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("missing argument <{}>", name)))
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_config(path: Option<&String>) -> DigesterConfig {
    let Some(path) = path else {
        return DigesterConfig::default();
    };
    let source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading config {}: {}", path, e)));
    DigesterConfig::from_yaml_str(&source).unwrap_or_else(|e| fail(e))
}

fn read_input(path: Option<&String>) -> String {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("reading {}: {}", path, e))),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .unwrap_or_else(|e| fail(format!("reading stdin: {}", e)));
            source
        }
    }
}

/// Handle the match command
fn handle_match_command(config: DigesterConfig, expr: &str, source: &str, format: &str) {
    let mut digester = Digester::with_config(config);
    let matches = digester
        .find_matches_expr(expr, source)
        .unwrap_or_else(|e| fail(e));

    match format {
        "json" => {
            let output = serde_json::to_string_pretty(&matches).unwrap_or_else(|e| fail(e));
            println!("{}", output);
        }
        _ => {
            for text in &matches {
                println!("{}", text);
            }
        }
    }
}

/// Handle the compile command
fn handle_compile_command(expr: &str) {
    match compile(expr) {
        Ok(path) => println!("{}", path),
        Err(e) => fail(e),
    }
}

/// Handle the tokens command
fn handle_tokens_command(source: &str) {
    let dump = lexer::dump_tokens(source).unwrap_or_else(|e| fail(e));
    println!("{}", dump);
}
