use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use thiserror::Error;

use simple_ll1::{parse_tokens, FirstFollow, Grammar, GrammarError, LL1ParsingTable};

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Show {
    /// Productions after left-recursion elimination
    Prod,
    /// Nullable, first and follow
    Nff,
    /// LL(1) parsing table
    Ll1,
}

/// Decides whether a token sequence is a sentence of an LL(1) grammar.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// BNF grammar file
    grammar: PathBuf,

    /// Token file, one terminal per line
    tokens: PathBuf,

    /// Print these before recognizing
    #[arg(short, long, value_enum)]
    show: Vec<Show>,

    /// Format of the --show outputs
    #[arg(short, long, value_enum, default_value = "plain")]
    format: OutputFormat,

    /// Use the grammar as written, without removing left recursion
    #[arg(long)]
    keep_left_recursion: bool,
}

#[derive(Error, Debug)]
enum Error {
    #[error("cannot read {}: {}", .path.display(), .source)]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

fn read_source(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

fn render(format: OutputFormat, plain: String, latex: String, json: String) -> String {
    match format {
        OutputFormat::Plain => plain,
        OutputFormat::Latex => latex,
        OutputFormat::Json => json,
    }
}

fn run(cli: &Cli) -> Result<bool, Error> {
    let source = read_source(&cli.grammar)?;
    let tokens = parse_tokens(&read_source(&cli.tokens)?);

    let mut g = Grammar::parse(&source)?;
    if !cli.keep_left_recursion {
        g.eliminate_left_recursion();
    }

    let ff = FirstFollow::new(&g)?;
    let table = LL1ParsingTable::build(&ff)?;

    for show in &cli.show {
        let output = match show {
            Show::Prod => {
                let t = g.to_production_output_vec();
                render(cli.format, t.to_plaintext(), t.to_latex(), t.to_json())
            }
            Show::Nff => {
                let t = ff.to_non_terminal_output_vec();
                render(cli.format, t.to_plaintext(), t.to_latex(), t.to_json())
            }
            Show::Ll1 => render(
                cli.format,
                table.to_plaintext(),
                table.to_latex(),
                serde_json::to_string(&table.to_output()).unwrap_or_default(),
            ),
        };
        println!("{}", output);
    }

    Ok(table.recognize_with(&tokens, |rule| println!("{}", rule)))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(accepted) => {
            println!("{}", if accepted { "YES" } else { "NO" });
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
