//! Print the slides of a PPTX deck as JSON.

use anyhow::Result;
use clap::Parser;
use slide_cli::{init_logging, run_stdout, InputArgs};
use slide_pptx::PptxExtractor;
use std::process::ExitCode;

/// Extract titles, bullets and speaker notes from a PPTX deck.
#[derive(Parser, Debug)]
#[command(name = "extract-pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    input: InputArgs,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.input.verbose);

    let extractor = PptxExtractor::new();
    run_stdout(&args.input, "pptx", |path| extractor.extract_path(path))
}
