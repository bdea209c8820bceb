mod config;
mod crawl;
mod dojo;
mod error;
mod export;
mod parser;
mod record;
mod session;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use crate::config::{NotionSettings, PlatformSettings};
use dojo::Dojo;
use export::{markdown, notion};
use record::Record;
use session::Session;

#[derive(Parser)]
#[command(name = "dojo_scraper", about = "Scrape pwn.college dojos into a Markdown table and Notion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, scrape all dojos and write the Markdown table
    Markdown(ScrapeArgs),
    /// Same as `markdown`, then push modules and challenge pages to Notion
    Notion {
        #[command(flatten)]
        args: ScrapeArgs,
        /// Skip per-challenge pages (and description scraping); only the modules table
        #[arg(long)]
        no_pages: bool,
    },
    /// List the dojos that get scraped
    Dojos,
}

#[derive(Args)]
struct ScrapeArgs {
    /// Markdown output path (overwritten)
    #[arg(short, long, default_value = markdown::DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Only scrape these dojos (default: all)
    #[arg(short, long = "dojo", value_enum)]
    dojos: Vec<Dojo>,
    /// Don't wrap challenge names in backticks
    #[arg(long)]
    plain: bool,
}

impl ScrapeArgs {
    fn selected(&self) -> Vec<Dojo> {
        if self.dojos.is_empty() {
            return Dojo::ALL.to_vec();
        }
        let wanted: HashSet<Dojo> = self.dojos.iter().copied().collect();
        Dojo::ALL.into_iter().filter(|d| wanted.contains(d)).collect()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dojos => {
            let settings = PlatformSettings::from_env()?;
            for dojo in Dojo::ALL {
                println!(
                    "{:<24} {:<24} {}{}",
                    dojo.slug(),
                    dojo.title(),
                    settings.base_url.trim_end_matches('/'),
                    dojo.path()
                );
            }
            Ok(())
        }
        Commands::Markdown(args) => {
            let (_session, records) = scrape(&args, false).await?;
            markdown::write(&args.output, &records, !args.plain)?;
            print_summary(&records, &args);
            Ok(())
        }
        Commands::Notion { args, no_pages } => {
            // Resolve the Notion target before spending time on the scrape.
            let target = NotionSettings::from_env()?.target()?;
            let client = notion::NotionClient::new(&target)?;

            let (session, records) = scrape(&args, !no_pages).await?;
            markdown::write(&args.output, &records, !args.plain)?;
            print_summary(&records, &args);

            if records.is_empty() {
                println!("Nothing to export to Notion.");
            } else {
                let stats = notion::export(&client, &target.page_id, &records, session.base(), !no_pages).await?;
                println!(
                    "Notion: {} challenge pages, {} module rows, {} failures",
                    stats.pages, stats.rows, stats.failures
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Credentials are checked before any request; login failures end the run.
async fn scrape(args: &ScrapeArgs, with_descriptions: bool) -> anyhow::Result<(Session, Vec<Record>)> {
    let settings = PlatformSettings::from_env()?;
    let creds = settings.credentials()?;
    let session = Session::new(&settings.base_url)?;
    session.login(&creds).await?;

    let (records, _stats) = crawl::crawl(&session, &args.selected(), with_descriptions).await;
    Ok((session, records))
}

fn print_summary(records: &[Record], args: &ScrapeArgs) {
    let dojos: HashSet<Dojo> = records.iter().map(|r| r.dojo).collect();
    println!("Results saved to {:?}", args.output);
    println!("Total entries: {} modules across {} dojos", records.len(), dojos.len());
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
