use clap::{Parser as ClapParser, Subcommand};
use mscript_lang::cli::{self, AstFormat, AstOptions, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "mscript")]
#[command(about = "MScript - compile alias scripts and inspect their parse trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a script file and report the aliases it defines
    Check {
        /// Path to the script file (reads from stdin if not provided)
        file: Option<String>,
    },

    /// Compile a code fragment and print its parse tree
    Ast {
        /// The fragment to compile (reads from stdin if not provided)
        fragment: Option<String>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => run_check(file),
        Commands::Ast {
            fragment,
            json,
            pretty,
        } => run_ast(fragment, json, pretty),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(file: Option<String>) -> Result<(), CliError> {
    let (source, name) = match file {
        Some(path) => (std::fs::read_to_string(&path)?, Some(path)),
        None => (read_stdin()?, None),
    };

    let options = CheckOptions { source, name };
    match cli::execute_check(&options)? {
        CheckResult::Compiled(count) => {
            println!(
                "Compiled {} alias{}",
                count,
                if count == 1 { "" } else { "es" }
            );
        }
    }
    Ok(())
}

fn run_ast(fragment: Option<String>, json: bool, pretty: bool) -> Result<(), CliError> {
    let fragment = match fragment {
        Some(s) => s,
        None => read_stdin()?,
    };

    let format = match (json, pretty) {
        (_, true) => AstFormat::PrettyJson,
        (true, false) => AstFormat::Json,
        (false, false) => AstFormat::Text,
    };

    let options = AstOptions { fragment, format };
    println!("{}", cli::execute_ast(&options)?);
    Ok(())
}

fn read_stdin() -> Result<String, CliError> {
    if atty::is(atty::Stream::Stdin) {
        return Err(CliError::NoInput);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
    Ok(buffer)
}
