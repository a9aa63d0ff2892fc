use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

mod output;

use output::ColorMode;
use pdfharvest_core::{BatchOptions, ExtractionOutcome, ProgressEvent, extract_directory};
use pdfharvest_mupdf::MupdfExtractor;

/// Batch text extraction for directories of PDF files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory containing the PDF files to extract (searched recursively)
    input_dir: PathBuf,

    /// Directory where the JSON report is written
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Maximum number of concurrent extractions (default: available CPUs)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-file extraction timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color = ColorMode(!cli.no_color);

    let mut options = BatchOptions::default();
    if let Some(jobs) = cli.jobs {
        anyhow::ensure!(jobs > 0, "--jobs must be a positive integer");
        options.max_workers = jobs;
    }
    anyhow::ensure!(cli.timeout > 0, "--timeout must be a positive integer");
    options.per_item_timeout = Duration::from_secs(cli.timeout);

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    // Length is unknown until discovery runs; the first event carries the
    // batch total.
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
            .expect("static template")
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let progress_bar = bar.clone();
    let progress_cb = move |event: ProgressEvent| match event {
        ProgressEvent::Extracting { total, path, .. } => {
            if progress_bar.length() == Some(0) {
                progress_bar.set_length(total as u64);
            }
            if let Some(name) = path.file_name() {
                progress_bar.set_message(name.to_string_lossy().into_owned());
            }
        }
        ProgressEvent::Outcome { total, outcome, .. } => {
            if progress_bar.length() == Some(0) {
                progress_bar.set_length(total as u64);
            }
            if let ExtractionOutcome::Failure { path, error } = outcome.as_ref() {
                progress_bar.println(format!("failed: {} — {}", path.display(), error));
            }
            progress_bar.inc(1);
        }
    };

    let extractor = Arc::new(MupdfExtractor::new());
    let report = extract_directory(
        &cli.input_dir,
        extractor,
        options,
        progress_cb,
        cancel.clone(),
    )
    .await?;

    bar.finish_and_clear();

    let mut stdout = std::io::stdout();
    if report.total == 0 {
        writeln!(
            stdout,
            "No PDF files found in {}",
            cli.input_dir.display()
        )?;
        return Ok(());
    }

    output::print_report_summary(&mut stdout, &report, color)?;

    if output::timeout_count(&report) > 0 {
        writeln!(
            stdout,
            "Some files timed out after {}s; re-run with a larger --timeout to retry them.",
            cli.timeout
        )?;
    }

    let report_path = output::save_report(&report, &cli.output_dir)?;
    writeln!(stdout, "Report saved to: {}", report_path.display())?;

    Ok(())
}
