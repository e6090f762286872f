use clap::Parser;
use rc_core::{Error, Result};
use rc_inference::{AnalysisGenerator, AnalysisSettings, ModelKind};
use rc_scrappers::cli::{handle_command, list_sources, report_failure, ScraperArgs, ScraperCommands};
use rc_scrappers::logging::init_logging;
use rc_scrappers::{get_scraper, get_scraper_with_feed, PipelineManager, PipelineSettings};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let factor = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(factor)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // bare trailing number counts as seconds
        if !current_number.is_empty() {
            let secs = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(secs)
                .ok_or_else(|| "Duration too large".to_string())?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds a daily reading-comprehension dataset from a long-form essay", long_about = None)]
struct Cli {
    /// Where the dataset is written
    #[arg(long, global = true, default_value = rc_storage::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
    /// Storage backend: json or memory
    #[arg(long, global = true, default_value = "json")]
    storage: String,
    /// Generation backend: gemini, deepseek or dummy
    #[arg(long, global = true, default_value = rc_inference::models::DEFAULT_MODEL)]
    model: String,
    /// Provider-side model identifier
    #[arg(long, global = true)]
    model_id: Option<String>,
    /// Override the provider base URL
    #[arg(long, global = true)]
    model_url: Option<String>,
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Essay source: aeon or psyche
    #[arg(long, global = true, default_value = "aeon")]
    source: String,
    /// Read candidates from this feed instead of the source's own
    #[arg(long, global = true)]
    feed_url: Option<String>,
    /// Approximate words per passage
    #[arg(long, global = true, default_value_t = rc_core::chunker::DEFAULT_TARGET_WORDS)]
    target_words: usize,
    #[arg(long, global = true, default_value_t = rc_inference::DEFAULT_MAX_RETRIES)]
    max_retries: u32,
    /// Questions requested per passage
    #[arg(long, global = true, default_value = "3", value_parser = clap::value_parser!(u8).range(3..=4))]
    questions: u8,
    /// Passage characters sent to the model
    #[arg(long, global = true, default_value_t = rc_inference::DEFAULT_MAX_PASSAGE_CHARS)]
    max_chars: usize,
    /// Pause after every passage (e.g. 4s, 1m)
    #[arg(long, global = true, default_value = "4s")]
    rate_limit: HumanDuration,
    /// First retry wait, doubled on every failure
    #[arg(long, global = true, default_value = "1s")]
    backoff: HumanDuration,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Clone, Debug)]
enum Commands {
    /// Select an essay from the feed, analyse it and write the dataset
    Run {
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Show which essay the next run would pick
    Select,
    /// Analyse a specific essay URL
    Url { url: String },
    /// List available sources
    List,
}

async fn build_manager(cli: &Cli) -> Result<PipelineManager> {
    let kind: ModelKind = cli.model.parse()?;
    if kind.requires_api_key() && cli.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        return Err(Error::Config(
            "GEMINI_API_KEY is not set (use --api-key or the environment)".to_string(),
        ));
    }

    let scraper = match &cli.feed_url {
        Some(feed_url) => get_scraper_with_feed(&cli.source, feed_url)?,
        None => get_scraper(&cli.source)?,
    };
    let meta = scraper.source_metadata();
    info!("🦗 Source: {} {} ({})", meta.emoji, meta.name, meta.feed_url);

    let storage = rc_storage::create_storage(&cli.storage, Some(&cli.output))?;
    info!("💾 Storage initialized (using {} at {})", cli.storage, cli.output.display());

    let config = rc_inference::Config {
        api_key: cli.api_key.clone(),
        model_name: Some(cli.model.clone()),
        model_id: cli.model_id.clone(),
        model_url: cli.model_url.clone(),
    };
    let model = rc_inference::create_model(Some(config)).await?;
    info!("🧠 Inference model initialized (using {})", model.name());

    let generator = AnalysisGenerator::new(
        model,
        AnalysisSettings {
            max_retries: cli.max_retries,
            backoff_base: cli.backoff.0,
            max_passage_chars: cli.max_chars,
            question_count: usize::from(cli.questions),
        },
    );
    let settings = PipelineSettings {
        target_words: cli.target_words.max(1),
        rate_limit: cli.rate_limit.0,
    };
    Ok(PipelineManager::new(scraper, storage, generator, settings))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::INFO });

    let (command, interval) = match cli.command.clone().unwrap_or(Commands::Run { interval: None }) {
        Commands::List => {
            println!("Available sources:");
            for line in list_sources()? {
                println!("  {}", line);
            }
            return Ok(());
        }
        Commands::Run { interval } => (ScraperCommands::Run, interval),
        Commands::Select => (ScraperCommands::Select, None),
        Commands::Url { url } => {
            info!("Processing single URL: {}", url);
            (ScraperCommands::Url { url }, None)
        }
    };

    let manager = build_manager(&cli).await?;
    let args = ScraperArgs { command };

    if let Some(interval) = interval {
        info!("Running in periodic mode with {}s interval", interval.0.as_secs());
        loop {
            info!("Starting run");
            if let Err(e) = handle_command(args.clone(), &manager).await {
                report_failure(&e);
            }
            info!("Waiting {}s before next run", interval.0.as_secs());
            tokio::time::sleep(interval.0).await;
        }
    }

    handle_command(args, &manager).await.map_err(|e| {
        report_failure(&e);
        e
    })
}
