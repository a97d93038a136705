//! Research CLI - search, scrape and summarise a topic
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{Parser, Subcommand};
use colored::Colorize;
use research_assistant::chunker::{chunk_spans, DEFAULT_MAX_LEN};
use research_assistant::research::{summarise_page, Progress, Research};
use research_assistant::scraper::Scraper;
use research_assistant::summary::render;
use research_assistant::{setup_logging, Config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "research")]
#[command(author, version, about = "Search, scrape and summarise a research topic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a topic and print a synthesized report
    Research {
        /// Research topic
        topic: String,
        /// Number of search results to process
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(1..=10))]
        results: Option<u8>,
    },
    /// Summarise a webpage by URL
    Summarise {
        /// URL to summarize
        url: String,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
    },
    /// Show how a local text file would be chunked
    Chunk {
        /// Text file to split
        file: PathBuf,
        /// Maximum characters per chunk
        #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
        max_len: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Research { topic, results } => {
            let config = Config::load()?;
            let num_results = results.map_or(config.search.num_results, usize::from);
            let research = Research::new(&config)?;

            let outcome = research
                .run(&topic, num_results, |progress| match progress {
                    Progress::Searching { topic } => {
                        println!("{} {}", "Searching:".cyan().bold(), topic);
                    }
                    Progress::Scraping { index, total, url } => {
                        println!("{} {}", format!("[{index}/{total}] Scraping:").cyan(), url);
                    }
                    Progress::Skipped { index, url, reason } => {
                        let label = format!("Skipping source {index}:");
                        println!("{} {} ({})", label.yellow(), url, reason);
                    }
                    Progress::Summarizing { index, .. } => {
                        println!("Summarizing content from source {index}...");
                    }
                    Progress::Synthesizing { sources } => {
                        println!("Synthesizing {sources} source summaries...");
                    }
                })
                .await?;

            let Some(report) = outcome.report else {
                println!("{}", "No relevant summaries found.".red());
                return Ok(());
            };

            println!("\n{}\n", "Individual Source Summaries:".green().bold());
            for (i, source) in outcome.sources.iter().enumerate() {
                println!("{} {}", format!("Source {}:", i + 1).bold(), source.url);
                println!("{}\n", render(&source.summary));
            }

            println!("{}\n", "Synthesized Report:".green().bold());
            println!("{report}");
        }
        Commands::Summarise { url, raw } => {
            let config = Config::load()?;
            println!("Fetching: {}", url);

            if raw {
                let content = Scraper::new(&config.scraper)?.fetch_content(&url).await?;
                let title = content.title.as_deref().unwrap_or("No title");
                println!("\n=== {} ===\n", title);
                println!("{}", content.text);
                println!("\n--- Extracted {} characters ---", content.text.chars().count());
            } else {
                let page = summarise_page(&config, &url).await?;
                let title = page.content.title.as_deref().unwrap_or("No title");
                println!("Summarised {} characters\n", page.content.text.chars().count());
                println!("=== {} ===\n", title.bold());
                println!("{}", render(&page.summary));
            }
        }
        Commands::Chunk { file, max_len } => {
            let text = std::fs::read_to_string(&file)?;
            let spans = chunk_spans(&text, max_len);
            println!("{} chunks from {} characters\n", spans.len(), text.chars().count());
            for (i, span) in spans.iter().enumerate() {
                let chunk = text[span.clone()].trim();
                let preview: String = chunk.chars().take(60).collect();
                println!(
                    "{:>4}  bytes {:>7}..{:<7} chars {:>5}  {}",
                    i + 1,
                    span.start,
                    span.end,
                    chunk.chars().count(),
                    preview.replace('\n', " ").dimmed()
                );
            }
        }
    }

    Ok(())
}
