//! epub-onenote - Upload EPUB books to OneNote

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use epub_onenote::config::{ENDPOINT_ENV, TOKEN_ENV};
use epub_onenote::convert::DEFAULT_SECTION;
use epub_onenote::onenote::DEFAULT_ENDPOINT;
use epub_onenote::{
    Config, ConversionReport, ConvertOptions, Destination, ImageMode, NotebookName,
    PageFailurePolicy, PageOutcome,
};

#[derive(Parser)]
#[command(name = "epub-onenote")]
#[command(version, about = "Upload EPUB books to OneNote", long_about = None)]
#[command(after_help = "EXAMPLES:
    epub-onenote book.epub                 Upload using $ONENOTE_TOKEN
    epub-onenote --use-title book.epub     Name the notebook after the book
    epub-onenote --out dry-run book.epub   Write pages to a directory instead")]
struct Cli {
    /// Input `.epub` file or extracted book directory
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Bearer token for the note service
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Base URL of the notes API
    #[arg(long, env = ENDPOINT_ENV, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Notebook name (defaults to a digest of the file name)
    #[arg(long, conflicts_with = "use_title")]
    notebook: Option<String>,

    /// Name the notebook after the book title
    #[arg(long)]
    use_title: bool,

    /// Section receiving the pages
    #[arg(long, default_value = DEFAULT_SECTION)]
    section: String,

    /// Write pages to this directory instead of uploading
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Embed images as data URIs instead of multipart parts
    #[arg(long)]
    data_uri_images: bool,

    /// Continue with the next page when one fails
    #[arg(long)]
    skip_failed_pages: bool,

    /// Extra attempts per page after a transient failure
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    timeout: u64,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(cli) {
        Ok(report) => {
            print_summary(&report);
            if report.failed().next().is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "epub_onenote=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> epub_onenote::Result<ConversionReport> {
    let destination = Destination::resolve(cli.token, &cli.endpoint, cli.out)?;

    let notebook = match (cli.notebook, cli.use_title) {
        (Some(name), _) => NotebookName::Named(name),
        (None, true) => NotebookName::BookTitle,
        (None, false) => NotebookName::SourceDigest,
    };

    let mut config = Config::new(cli.input, destination);
    config.timeout = Duration::from_secs(cli.timeout);
    config.options = ConvertOptions {
        notebook,
        section: cli.section,
        image_mode: if cli.data_uri_images {
            ImageMode::DataUri
        } else {
            ImageMode::Parts
        },
        on_page_failure: if cli.skip_failed_pages {
            PageFailurePolicy::Skip
        } else {
            PageFailurePolicy::Abort
        },
        retries: cli.retries,
    };

    config.run()
}

fn print_summary(report: &ConversionReport) {
    println!("Notebook: {}", report.notebook.display_name);
    println!("Section: {}", report.section.display_name);
    println!("Pages: {}/{}", report.uploaded(), report.pages.len());
    for page in &report.pages {
        if let PageOutcome::Failed(err) = &page.outcome {
            println!("  failed {} ({}): {err}", page.spine_id, page.href);
        }
    }
}
