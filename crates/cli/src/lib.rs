//! Shared plumbing for the extraction binaries.
//!
//! Every binary prints exactly one line of JSON to stdout. Logging goes to
//! stderr so it never mixes with the result.

use anyhow::{Context, Result};
use clap::Args;
use slide_core::{DocumentFormat, DocumentResult, Error};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// Arguments shared by every binary. Flattened into each binary's parser.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Input file
    pub path: Option<PathBuf>,

    /// Further arguments are accepted and ignored
    #[arg(hide = true)]
    pub extra: Vec<String>,

    /// Verbose output (logs to stderr)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Initialize logging: `warn` by default, `debug` when verbose.
/// `RUST_LOG` overrides either.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

/// Write a document result as a single JSON line.
pub fn write_result<W: Write>(out: &mut W, result: &DocumentResult) -> Result<()> {
    result
        .write_json(&mut *out)
        .context("Failed to write result")?;
    out.write_all(b"\n").context("Failed to write result")?;
    out.flush().context("Failed to flush output")?;
    Ok(())
}

/// Exit status after a result was written, including extraction errors.
pub const EXIT_OK: u8 = 0;

/// Exit status when no input path was given.
pub const EXIT_MISSING_ARGUMENT: u8 = 1;

/// Report a missing path argument and return its exit status.
pub fn missing_argument<W: Write>(out: &mut W, what: &str) -> Result<u8> {
    write_result(out, &DocumentResult::error(format!("missing {} path", what)))?;
    Ok(EXIT_MISSING_ARGUMENT)
}

/// Run one binary invocation: extract `args.path` with `extract` and write
/// the JSON line to `out`. Returns the exit status.
///
/// Fails only when no path was given. Extraction errors are part of the
/// JSON result and still exit with [`EXIT_OK`].
pub fn run<W, F>(out: &mut W, args: &InputArgs, what: &str, extract: F) -> Result<u8>
where
    W: Write,
    F: FnOnce(&Path) -> DocumentResult,
{
    if !args.extra.is_empty() {
        log::debug!("Ignoring extra arguments: {:?}", args.extra);
    }

    let Some(path) = args.path.as_deref() else {
        return missing_argument(out, what);
    };

    log::debug!("Processing {}", path.display());
    let result = extract(path);
    match &result {
        DocumentResult::Slides(slides) => log::debug!("Extracted {} slides", slides.len()),
        DocumentResult::Error(message) => log::info!("{}: {}", path.display(), message),
    }

    write_result(out, &result)?;
    Ok(EXIT_OK)
}

/// [`run`] against stdout.
pub fn run_stdout<F>(args: &InputArgs, what: &str, extract: F) -> Result<ExitCode>
where
    F: FnOnce(&Path) -> DocumentResult,
{
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&mut out, args, what, extract).map(ExitCode::from)
}

/// Detect the format of a file from its leading bytes, falling back to the
/// extension.
pub fn detect_format(path: &Path) -> slide_core::Result<DocumentFormat> {
    let mut magic = Vec::with_capacity(8);
    File::open(path)?.take(8).read_to_end(&mut magic)?;

    DocumentFormat::from_magic(&magic)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(DocumentFormat::from_extension)
        })
        .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))
}

/// Extract any supported document, choosing the backend by detected format.
pub fn extract_any(path: &Path) -> DocumentResult {
    match detect_format(path) {
        Ok(DocumentFormat::Pdf) => {
            log::debug!("Parsing as PDF");
            slide_pdf::PdfExtractor::new().extract_path(path)
        }
        Ok(DocumentFormat::Pptx) => {
            log::debug!("Parsing as PPTX");
            slide_pptx::PptxExtractor::new().extract_path(path)
        }
        Err(e) => e.into(),
    }
}
