use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod commands;

use commands::{Input, Output};

#[derive(Parser)]
#[command(name = "jscbind", version, about = "Run JavaScript in JavaScriptCore and print JSON")]
struct Cli {
    /// Log engine exceptions and context lifecycle
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Spaces of JSON indentation (0 for compact output)
    #[arg(long, default_value_t = 2, global = true)]
    indent: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Read the script from a file instead of the command line
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a script and print its completion value
    Eval {
        script: Option<String>,
        #[command(flatten)]
        source: Source,
    },
    /// Read a dotted property path from JSON input or a script result
    Get {
        path: String,
        /// JSON document to read from
        #[arg(long, conflicts_with = "file")]
        json: Option<String>,
        #[command(flatten)]
        source: Source,
    },
    /// Call a global function with JSON arguments
    Call {
        function: String,
        /// JSON array of arguments
        #[arg(long, default_value = "[]")]
        args: String,
        #[command(flatten)]
        source: Source,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let output = Output { indent: cli.indent };
    let json = match cli.command {
        Commands::Eval { script, source } => {
            let input = Input::script(script, source.file)?;
            commands::eval(&input, &output)?
        }
        Commands::Get { path, json, source } => {
            let input = Input::document(json, source.file)?;
            commands::get(&input, &path, &output)?
        }
        Commands::Call {
            function,
            args,
            source,
        } => {
            let prelude = source.file.map(Input::from_file).transpose()?;
            commands::call(prelude.as_ref(), &function, &args, &output)?
        }
    };

    println!("{json}");
    Ok(())
}
