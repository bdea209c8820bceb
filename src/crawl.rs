use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::dojo::Dojo;
use crate::parser::{challenges, modules};
use crate::record::{self, Record};
use crate::session::Session;

/// Counts reported after a crawl.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub dojos: usize,
    pub modules: usize,
    pub records: usize,
    pub empty_modules: usize,
}

/// Walk each dojo, then each of its modules, one request at a time.
/// Missing pages and empty modules are logged and skipped.
pub async fn crawl(session: &Session, dojos: &[Dojo], with_descriptions: bool) -> (Vec<Record>, CrawlStats) {
    let mut records = Vec::new();
    let mut stats = CrawlStats::default();

    info!("Starting to scrape {} dojos", dojos.len());

    for (i, &dojo) in dojos.iter().enumerate() {
        info!("[{}/{}] Processing dojo: {}", i + 1, dojos.len(), dojo);

        let Some(page) = session.fetch(&dojo.path()).await else {
            warn!("No modules found for {}", dojo);
            continue;
        };
        let found = modules::extract(dojo, &page);
        if found.is_empty() {
            warn!("No modules found for {}", dojo);
            continue;
        }
        stats.dojos += 1;
        stats.modules += found.len();
        info!("Found {} modules in {}", found.len(), dojo);

        let pb = ProgressBar::new(found.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        for module in found {
            pb.set_message(module.name.clone());
            let challenges = match session.fetch(&module.path(dojo)).await {
                Some(html) => challenges::extract(&html, with_descriptions),
                None => Vec::new(),
            };

            let name = module.name.clone();
            let count = challenges.len();
            match record::assemble(dojo, module, challenges) {
                Some(r) => {
                    pb.println(format!("  {} / {}: {} challenges", dojo, name, count));
                    records.push(r);
                }
                None => {
                    stats.empty_modules += 1;
                    pb.suspend(|| warn!("No challenges found in {} ({})", name, dojo));
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
    }

    stats.records = records.len();
    info!(
        "Scraping complete: {} records from {} modules in {} dojos ({} empty)",
        stats.records, stats.modules, stats.dojos, stats.empty_modules
    );
    (records, stats)
}
