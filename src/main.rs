use clap::Parser as ClapParser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use teeny_tiny_compiler::{compile, Emitter, Lexer, Parser, TeenyError};
use tracing_subscriber::EnvFilter;

/// Translate a Teeny Tiny program into C
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Teeny Tiny source file
    source: PathBuf,

    /// Where to write the generated C
    #[arg(short, long, default_value = "out.c")]
    output: PathBuf,

    /// Print the generated C to stdout instead of writing a file
    #[arg(long, default_value_t = false)]
    stdout: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error. {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), TeenyError> {
    tracing::info!(source = %args.source.display(), "compiling");

    let source = fs::read_to_string(&args.source)
        .map_err(|e| TeenyError::Io(format!("{}: {}", args.source.display(), e)))?;

    if args.stdout {
        print!("{}", compile(&source)?);
        return Ok(());
    }

    let mut parser = Parser::new(Lexer::new(&source), Emitter::new())?;
    parser.program()?;
    parser.emitter().write_file(&args.output)?;

    tracing::info!(output = %args.output.display(), "compiled");
    println!("Compiling completed.");
    Ok(())
}
