use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use colored::Colorize;
use env_logger::Env;
use std::io::{self, IsTerminal, Write};
use std::process;

use iniq_core::{evaluate, query, Error, Expression, Source};

/// iniq — query INI files
///
/// Dump every variable, print one `section.key`, or evaluate a
/// two-operand expression such as `server.port + offsets.port`.
#[derive(Parser)]
#[command(name = "iniq", version, about, long_about = None)]
struct Cli {
    /// INI file to read, or `-` for standard input
    file: String,

    /// `section.key` to look up, or the word `expression`
    #[arg(allow_hyphen_values = true)]
    query: Option<String>,

    /// Expression to evaluate, e.g. `a.x+b.y` (after `expression`)
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,

    /// Dump as a JSON array instead of `section.key = value` lines
    #[arg(long)]
    json: bool,

    /// Only report errors on stderr
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log parse details on stderr (-vv for every line)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// What the invocation asks for
enum Mode<'a> {
    Dump,
    Lookup(&'a str),
    Expression(&'a str),
}

/// Pick the query mode before touching the input
fn resolve_mode(cli: &Cli) -> Result<Mode<'_>, &'static str> {
    match (cli.query.as_deref(), cli.expression.as_deref()) {
        (None, _) => Ok(Mode::Dump),
        (Some("expression"), None) => Err("expected an expression after \"expression\""),
        (Some("expression"), Some(expr)) => Ok(Mode::Expression(expr)),
        (Some(_), Some(_)) => Err("expected the second argument to be \"expression\""),
        (Some(reference), None) => Ok(Mode::Lookup(reference)),
    }
}

fn init_logging(cli: &Cli) {
    let default_filter = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, mode: Mode<'_>) -> iniq_core::Result<()> {
    let document = iniq_core::parse_source(&Source::from_arg(&cli.file))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match mode {
        Mode::Dump => {
            if cli.json {
                query::dump_json(&document, &mut out)?;
            } else {
                query::dump(&document, &mut out)?;
            }
        }
        Mode::Lookup(reference) => {
            let value = query::value_of(&document, reference)?;
            writeln!(out, "{}", value)?;
        }
        Mode::Expression(text) => {
            let expr: Expression = text.parse()?;
            let result = evaluate(&document, &expr)?;
            writeln!(out, "{}", result.value)?;
            if let Some(quotient) = result.quotient {
                writeln!(out, "{:?}", quotient)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Exit status for a failed run
fn exit_code_for(err: &Error) -> i32 {
    match err {
        Error::NotFound(_) | Error::Evaluation(_) => 1,
        Error::Open { .. }
        | Error::Io(_)
        | Error::Syntax { .. }
        | Error::Reference { .. }
        | Error::Unresolved(_) => 2,
    }
}

fn report(message: &dyn std::fmt::Display) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    if !io::stderr().is_terminal() {
        colored::control::set_override(false);
    }
    init_logging(&cli);

    let mode = match resolve_mode(&cli) {
        Ok(mode) => mode,
        Err(message) => {
            report(&message);
            process::exit(1);
        }
    };

    let exit_code = match run(&cli, mode) {
        Ok(()) => 0,
        Err(err) => {
            report(&err);
            exit_code_for(&err)
        }
    };

    process::exit(exit_code);
}
