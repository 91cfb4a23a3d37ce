use clap::{Parser, Subcommand};
use remap_lang::{Transformer, wire};
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "remap")]
#[command(about = "remap - A declarative transformation language for JSON, CSV, and YAML documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a transformation document to input data
    Apply {
        /// Path to the transformation document (JSON wire format)
        definition: String,

        /// Input format
        #[arg(long, default_value = "json")]
        from: String,

        /// Output format
        #[arg(long, default_value = "json")]
        to: String,

        /// Input text (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Validate a transformation document without running it
    Check {
        /// Path to the transformation document (JSON wire format)
        definition: String,
    },
}

#[derive(Debug)]
enum CliError {
    Wire(remap_lang::WireError),
    Transform(remap_lang::TransformError),
    Io(io::Error),
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Wire(e) => write!(f, "{}", e),
            CliError::Transform(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Use --input or pipe data to stdin."),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Apply {
            definition,
            from,
            to,
            input,
        } => run_apply(definition, from, to, input),
        Commands::Check { definition } => run_check(definition),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_apply(
    definition: String,
    from: String,
    to: String,
    input: Option<String>,
) -> Result<(), CliError> {
    let document = std::fs::read_to_string(&definition).map_err(CliError::Io)?;
    let tree = wire::parse(&document).map_err(CliError::Wire)?;

    let input = match input {
        Some(s) => s,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            buffer
        }
        None => return Err(CliError::NoInput),
    };

    let transformer = Transformer::new(tree);
    let output = transformer
        .apply(&input, &from, &to)
        .map_err(CliError::Transform)?;
    println!("{}", output);
    Ok(())
}

fn run_check(definition: String) -> Result<(), CliError> {
    let document = std::fs::read_to_string(&definition).map_err(CliError::Io)?;
    wire::parse(&document).map_err(CliError::Wire)?;
    println!("Transformation document is valid");
    Ok(())
}
