//! # docweave CLI
//!
//! Command-line entry point: crawl a documentation site starting from one
//! entry URL and consolidate the crawled content into a single markdown file.
//!
//! ## Usage
//!
//! ```text
//! docweave https://docs.example.com/guide/ --depth 2 --output guide.md
//! ```
//!
//! The LLM credential is read from `OPENAI_API_KEY`; the endpoint can be
//! pointed at any OpenAI-compatible server via `OPENAI_API_BASE_URL`.

use std::env;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use docweave::consolidator::RunStatus;
use docweave::crawler::CrawlerConfig;
use docweave::pipeline::{self, PipelineConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Crawl a documentation site and consolidate it into one markdown document", long_about = None)]
struct Cli {
    /// Entry URL; crawling stays under this URL's path prefix
    #[arg(required = true)]
    url: String,

    /// Crawl depth
    #[arg(short, long, default_value = "2")]
    depth: u32,

    /// Output markdown file
    #[arg(short, long, default_value = "output.md")]
    output: PathBuf,

    /// LLM model to use
    #[arg(short, long, default_value = "gpt-4o-mini")]
    model: String,

    /// Token budget per LLM call
    #[arg(short, long, default_value = "8000")]
    token_limit: usize,

    /// Maximum number of pages to crawl
    #[arg(short = 'p', long, default_value = "100")]
    max_pages: u32,

    /// Rate limit in milliseconds
    #[arg(short, long, default_value = "500")]
    rate: u64,

    /// CSS selectors to exclude (comma-separated)
    #[arg(short, long)]
    exclude: Option<String>,

    /// CSS selectors to restrict extraction to (comma-separated)
    #[arg(short, long)]
    include: Option<String>,

    /// Treat URLs differing only in query string as the same page
    #[arg(long)]
    strip_query: bool,
}

fn setup_logging() -> anyhow::Result<()> {
    let log_dir = env::temp_dir().join("docweave");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, "docweave.log");

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(file_layer)
        .with(console_layer)
        .init();

    println!("Logging to {}", log_dir.join("docweave.log").display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging()?;

    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow!("OPENAI_API_KEY environment variable must be set"))?;
    let api_base_url = std::env::var("OPENAI_API_BASE_URL")
        .unwrap_or_else(|_| pipeline::DEFAULT_API_BASE_URL.to_string());

    let mut crawler = CrawlerConfig::builder()
        .max_depth(cli.depth)
        .max_pages(cli.max_pages)
        .rate_limit_ms(cli.rate)
        .strip_query(cli.strip_query);
    if let Some(exclude) = cli.exclude {
        crawler = crawler.exclude_selectors(exclude.split(',').map(String::from).collect());
    }
    if let Some(include) = cli.include {
        crawler = crawler.content_selectors(include.split(',').map(String::from).collect());
    }

    let config = PipelineConfig::builder(&cli.url)
        .crawler(crawler.build())
        .output(&cli.output)
        .model(&cli.model)
        .token_limit(cli.token_limit)
        .api_key(api_key)
        .api_base_url(api_base_url)
        .build()?;

    println!("Crawling {}...", cli.url);
    let summary = pipeline::run(config).await?;

    println!(
        "Crawled {} pages ({} skipped, {} failed)",
        summary.visited, summary.skipped, summary.failed
    );
    match summary.status {
        RunStatus::Success => {
            println!("Wrote consolidated documentation to {}", cli.output.display());
        }
        RunStatus::Partial => {
            println!(
                "Wrote consolidated documentation to {} (some sections could not be consolidated)",
                cli.output.display()
            );
        }
        RunStatus::Failed => {
            return Err(anyhow!(
                "consolidation failed for every partition; see {} for the placeholder output",
                cli.output.display()
            ));
        }
    }

    Ok(())
}
