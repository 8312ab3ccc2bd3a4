//! CLI tool to run a stage list over lines of input.

use clap::{ArgGroup, Parser};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process;

use cascade_rs::{ChainBuilder, Result, WriterSink, build_filters, lines};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Run a stage list against lines of input.
///
/// Stages come from `--stages` or from a stage file; one of them is required.
#[derive(Parser)]
#[command(name = "cascade-run")]
#[command(group(ArgGroup::new("stage_src").required(true).args(["stages", "pipeline"])))]
struct Cli {
    /// Input file, or `-` for stdin
    input: String,

    /// Stage list text, e.g. "DROPEMPTY | UPPER"
    #[arg(short, long)]
    stages: Option<String>,

    /// Stage list file
    #[arg(short, long)]
    pipeline: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Drive the chain through the pull adapter instead of pushing
    #[arg(long)]
    pull: bool,

    /// Log chain activity on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let stage_text = match (&cli.stages, &cli.pipeline) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading stage file '{path}': {e}");
                process::exit(1);
            }
        },
        (None, None) => unreachable!("clap requires --stages or --pipeline"),
    };

    let input: Box<dyn BufRead> = if cli.input == "-" {
        Box::new(io::stdin().lock())
    } else {
        match File::open(&cli.input) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error reading input file '{}': {e}", cli.input);
                process::exit(1);
            }
        }
    };

    let output: Box<dyn Write> = match &cli.output {
        Some(out_path) => {
            if let Some(parent) = Path::new(out_path.as_str()).parent()
                && !parent.as_os_str().is_empty()
                && fs::create_dir_all(parent).is_err()
            {
                eprintln!("Error creating output directory for '{out_path}'");
                process::exit(1);
            }
            match File::create(out_path) {
                Ok(file) => Box::new(BufWriter::new(file)),
                Err(e) => {
                    eprintln!("Error writing output file '{out_path}': {e}");
                    process::exit(1);
                }
            }
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let result = if cli.pull {
        run_pull(&stage_text, input, output)
    } else {
        run_push(&stage_text, input, output)
    };

    match result {
        Ok((input_count, output_count)) => {
            info!(input = input_count, output = output_count, "done");
            if cli.verbose {
                eprintln!("Records:  {input_count} in -> {output_count} out");
            }
        }
        Err(e) => {
            eprintln!("Chain error: {e}");
            process::exit(1);
        }
    }
}

/// Push every line into a chain ending in a writer.
fn run_push(
    stage_text: &str,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
) -> Result<(usize, usize)> {
    let filters = build_filters(stage_text)?;
    let sink = WriterSink::new(output);
    let written = sink.written();
    let mut head = ChainBuilder::new().filters(filters).consumer(sink).build()?;
    let fed = head.run(lines(input))?;
    Ok((fed, written.get()))
}

/// Iterate the pull adapter's output and write each record.
fn run_pull(
    stage_text: &str,
    input: Box<dyn BufRead>,
    mut output: Box<dyn Write>,
) -> Result<(usize, usize)> {
    let filters = build_filters(stage_text)?;
    let mut produced = ChainBuilder::new()
        .filters(filters)
        .into_pull()?
        .produce_from(lines(input));
    let mut written = 0;
    for record in produced.by_ref() {
        output.write_all(record?.as_str().as_bytes())?;
        written += 1;
    }
    output.flush()?;
    Ok((produced.units_read(), written))
}
