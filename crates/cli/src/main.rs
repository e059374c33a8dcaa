//! Print the slides of a PDF or PPTX file as JSON, detecting the format.

use anyhow::Result;
use clap::Parser;
use slide_cli::{extract_any, init_logging, run_stdout, InputArgs};
use std::process::ExitCode;

/// Extract slide content from a PDF or PPTX file.
#[derive(Parser, Debug)]
#[command(name = "slide-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    input: InputArgs,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.input.verbose);

    run_stdout(&args.input, "input", extract_any)
}
