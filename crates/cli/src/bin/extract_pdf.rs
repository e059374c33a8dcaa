//! Print the slides of a PDF as JSON.

use anyhow::Result;
use clap::Parser;
use slide_cli::{init_logging, run_stdout, InputArgs};
use slide_pdf::PdfExtractor;
use std::process::ExitCode;

/// Extract title and bullets from every page of a PDF.
#[derive(Parser, Debug)]
#[command(name = "extract-pdf")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    input: InputArgs,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.input.verbose);

    let extractor = PdfExtractor::new();
    run_stdout(&args.input, "pdf", |path| extractor.extract_path(path))
}
