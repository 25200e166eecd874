//! citygeo — compile city scripts to GeoJSON and back.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use citygeo::compile_log::CompileLog;
use citygeo::config::Config;
use citygeo::dsl::Compiler;
use citygeo::geojson::decompile_file;
use citygeo::render::{DrawCall, DrawingSink, NullSink, RecordingSink};

#[derive(Parser)]
#[command(name = "citygeo", version, about = "City description language ⇄ GeoJSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a city script into a GeoJSON document.
    Compile {
        script: PathBuf,
        /// Output path (defaults to the configured one).
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the compile log to stderr.
        #[arg(long)]
        verbose: bool,
        /// Print every draw call in projected pixel space.
        #[arg(long)]
        trace_draw: bool,
    },
    /// Rebuild a city script from a GeoJSON document.
    Decompile {
        geojson: PathBuf,
        /// Write the script here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Dump the token stream of a city script.
    Tokens { script: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Compile {
            script,
            output,
            config,
            verbose,
            trace_draw,
        } => compile(&script, output, config.as_deref(), verbose, trace_draw),
        Command::Decompile {
            geojson,
            output,
            config,
        } => decompile(&geojson, output.as_deref(), config.as_deref()),
        Command::Tokens { script } => tokens(&script),
    };
    if let Err(message) = result {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| format!("failed to load config: {e}"))
}

fn compile(
    script: &Path,
    output: Option<PathBuf>,
    config: Option<&Path>,
    verbose: bool,
    trace_draw: bool,
) -> Result<(), String> {
    let config = load_config(config)?;
    let output = output.unwrap_or_else(|| config.output.clone());
    let mut log = CompileLog::new(config.log_capacity);
    let mut recorder = RecordingSink::new();
    let mut null = NullSink;
    let sink: &mut dyn DrawingSink = if trace_draw { &mut recorder } else { &mut null };

    let result = Compiler::compile_file(script, &output, &config.projection, sink, &mut log);

    if verbose {
        for line in log.render() {
            eprintln!("{line}");
        }
    }
    for call in &recorder.calls {
        match call {
            DrawCall::Line { from, to } => println!("line {from:?} -> {to:?}"),
            DrawCall::Circle { center, radius } => println!("circle {center:?} r={radius}"),
            DrawCall::Polygon { points } => println!("polygon {points:?}"),
        }
    }

    let compiled = result.map_err(|e| format!("{}: {e}", script.display()))?;
    println!(
        "compiled \"{}\": {} features -> {}",
        compiled.name,
        compiled.document.features.len(),
        output.display()
    );
    Ok(())
}

fn decompile(geojson: &Path, output: Option<&Path>, config: Option<&Path>) -> Result<(), String> {
    let config = load_config(config)?;
    let script = decompile_file(geojson, &config.decompile_options())
        .map_err(|e| format!("{}: {e}", geojson.display()))?;
    match output {
        Some(path) => std::fs::write(path, script)
            .map_err(|e| format!("failed to write {}: {e}", path.display())),
        None => {
            print!("{script}");
            Ok(())
        }
    }
}

fn tokens(script: &Path) -> Result<(), String> {
    let source = std::fs::read_to_string(script)
        .map_err(|e| format!("failed to read {}: {e}", script.display()))?;
    let tokens = Compiler::tokenize(&source).map_err(|e| format!("{}: {e}", script.display()))?;
    for token in tokens {
        println!("{}(\"{}\")", token.kind, token.lexeme);
    }
    Ok(())
}
