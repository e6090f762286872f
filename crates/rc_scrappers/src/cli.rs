use clap::{Args, Subcommand};
use rc_core::{Error, Result};

use crate::logging::Logger;
use crate::manager::PipelineManager;
use crate::scrapers::get_scraper_factories;

#[derive(Args, Clone, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ScraperCommands {
    /// Select an essay from the feed, analyse it and write the dataset
    Run,
    /// Show which essay the next run would pick, without analysing it
    Select,
    /// Analyse a specific essay URL and write the dataset
    Url {
        url: String,
    },
}

pub async fn handle_command(args: ScraperArgs, manager: &PipelineManager) -> Result<()> {
    match args.command {
        ScraperCommands::Run => {
            let dataset = manager.run().await?;
            println!(
                "✅ {} passages from \"{}\" ({})",
                dataset.passages.len(),
                dataset.metadata.title,
                dataset.metadata.source
            );
        }
        ScraperCommands::Select => {
            let candidate = manager.select_candidate().await?;
            println!("{} - {}", candidate.title, candidate.link);
        }
        ScraperCommands::Url { url } => {
            let dataset = manager.process_url(&url).await?;
            println!(
                "✅ {} passages from \"{}\" ({})",
                dataset.passages.len(),
                dataset.metadata.title,
                dataset.metadata.source
            );
        }
    }
    Ok(())
}

pub fn list_sources() -> Result<Vec<String>> {
    get_scraper_factories()
        .iter()
        .map(|factory| {
            let scraper = factory()?;
            let meta = scraper.source_metadata();
            Ok(format!(
                "{} {} ({}) - {}",
                meta.emoji,
                meta.name,
                scraper.cli_names().join(", "),
                meta.feed_url
            ))
        })
        .collect()
}

pub fn failure_message(err: &Error) -> String {
    if err.is_acquisition() {
        format!("❌ Run aborted, prior output left untouched: {}", err)
    } else {
        format!("❌ Run failed: {}", err)
    }
}

/// Log a failed command at error level.
pub fn report_failure(err: &Error) {
    Logger::new().error(&failure_message(err));
}
