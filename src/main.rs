use clap::Parser;
use std::{io::stdout, path::PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wordstack::{
    runtime::{
        built_ins::host_words::register_host_words,
        data_structures::environment::Environment,
        error,
        interpreter::{
            program::{Program, bootstrap},
            vm::{DEFAULT_MAX_CALL_DEPTH, Vm, VmOptions},
        },
    },
};

/// Environment variable holding the log filter, in `tracing_subscriber::EnvFilter` syntax.
const LOG_ENV: &str = "WORDSTACK_LOG";

#[derive(Parser, Debug)]
#[command(name = "wordstack", about = "Compile and run a wordstack script")]
struct Args {
    /// Path to the script to run.
    #[arg(required_unless_present = "eval", conflicts_with = "eval")]
    script: Option<PathBuf>,

    /// Run this source text instead of a script file.
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Print the compiled byte code before running it.
    #[arg(long = "dump")]
    dump: bool,

    /// Maximum number of nested word calls.
    #[arg(long = "max-call-depth", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn main() -> error::Result<()> {
    init_logging();

    let args = Args::parse();

    // Clap guarantees exactly one of the two is present.
    let program = match &args.script {
        Some(path) => Program::compile_file(&path.to_string_lossy())?,
        None => Program::compile("<eval>", args.eval.as_deref().unwrap_or_default())?,
    };

    if args.dump {
        println!("Compiled {}:\n{}", program.name(), program.listing());
    }

    let options = VmOptions {
        max_call_depth: args.max_call_depth,
    };
    let mut vm = Vm::with_sink(options, Box::new(stdout()));

    // The host surface sits at the end of every scope chain.
    let host = Environment::new_host();
    register_host_words(&host);

    let stack = bootstrap(&program, &mut vm, &host)?;

    info!(depth = stack.len(), "program finished");

    for value in &stack {
        println!("{:?}", value);
    }

    Ok(())
}
