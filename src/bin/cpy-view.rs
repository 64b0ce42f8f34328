//! CLI tool to print one page of an EBCDIC data file using a COBOL copybook.
//!
//! Usage:
//!   cpy-view <data.dat> <layout.cpy> [ENCODING] [PAGE_SIZE]
//!   cpy-view <data.dat> <layout.cpy> --page 3 --search NAME=smith

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use copybook_view::{
    DEFAULT_ENCODING, DEFAULT_PAGE_SIZE, Dataset, DatasetError, LoadStrategy, OpenOptions, Record,
    UnmatchedLines, load_schema_with, render_table, status_line,
};
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Display fixed-width EBCDIC records described by a COBOL copybook.
#[derive(Parser)]
#[command(name = "cpy-view")]
struct Cli {
    /// Data file of fixed-length records
    data: String,

    /// COBOL copybook with PIC X field definitions
    copybook: String,

    /// Code page of the data file (IBM037, IBM500, IBM1047, IBM1140, or any single-byte label)
    #[arg(default_value = DEFAULT_ENCODING)]
    encoding: String,

    /// Records per page
    #[arg(
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    page_size: usize,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,

    /// Only show rows on the page whose FIELD contains TERM (case-insensitive)
    #[arg(short, long, value_name = "FIELD=TERM", value_parser = parse_search)]
    search: Option<(String, String)>,

    /// Read pages from the file on demand instead of loading it into memory
    #[arg(long)]
    seek: bool,

    /// Fail on copybook lines that are not PIC X field definitions
    #[arg(long)]
    strict: bool,

    /// Show debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_search(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, term)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), term.to_string()))
        }
        _ => Err("expected FIELD=TERM".to_string()),
    }
}

/// Logs go to stderr; stdout carries the page.
fn init_tracing(cli: &Cli) {
    let max_level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::ERROR,
        (false, true) => Level::DEBUG,
        (false, false) => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_max_level(max_level)
        .with_target(false)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging disabled: {e}");
    }
}

fn run(cli: &Cli) -> Result<(), DatasetError> {
    let policy = if cli.strict {
        UnmatchedLines::Reject
    } else {
        UnmatchedLines::Warn
    };
    let layout = load_schema_with(&cli.copybook, policy)?.into_layout()?;

    let options = OpenOptions::new()
        .page_size(cli.page_size)
        .encoding(cli.encoding.as_str())
        .strategy(if cli.seek {
            LoadStrategy::Seek
        } else {
            LoadStrategy::Eager
        });
    let mut dataset = Dataset::open_with(&cli.data, layout, &options)?;

    for warning in dataset.warnings() {
        eprintln!("Warning: {warning}");
    }

    let field_names: Vec<String> = dataset.field_names().iter().map(|n| n.to_string()).collect();
    let field_names: Vec<&str> = field_names.iter().map(String::as_str).collect();

    let total_pages = dataset.total_pages();
    let mut message = if total_pages == 0 {
        "No records to display. Check copybook and data file.".to_string()
    } else {
        match dataset.get_page(cli.page.saturating_sub(1)) {
            Ok(_) => format!("Page {} of {}.", cli.page, total_pages),
            Err(DatasetError::OutOfRange { .. }) => {
                format!("Invalid page number requested: {}", cli.page)
            }
            Err(e) => format!("Error loading page {}: {e}", cli.page),
        }
    };

    let rows: Vec<&Record> = match &cli.search {
        Some((field, term)) => {
            let page = dataset.current_page();
            if page.is_empty() {
                message = format!(
                    "No data on the current page ({}) to search.",
                    dataset.current_page_index().map_or(0, |n| n + 1)
                );
                Vec::new()
            } else {
                let hits = dataset.search_current(field, term);
                message = format!(
                    "Search for '{}' in '{}' on page {}: {} results.",
                    term,
                    field,
                    page.index() + 1,
                    hits.len()
                );
                hits
            }
        }
        None => dataset.current_page().iter().collect(),
    };

    println!("{}", status_line(&dataset, &message));
    println!("{}", render_table(&field_names, rows));
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
