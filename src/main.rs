//! # Company Profiler CLI
//!
//! Command-line access to each stage of the profiling pipeline, plus batch
//! mode for job files.
//!
//! ## Subcommands
//!
//! - `links`: candidate links found on a homepage (no LLM needed)
//! - `classify`: candidate links and their YES/NO verdict, as JSON
//! - `corpus`: the normalized text that would be sent for synthesis
//! - `profile`: the full pipeline for one company
//! - `batch`: many companies from a JSON Lines job file
//!
//! Credentials are read from `OPENAI_API_KEY` or `GEMINI_API_KEY`, with a
//! `.env` file in the working directory taken into account.

mod telemetry;

use clap::{Args, Parser, Subcommand};
use company_profiler::classifier::{ClassifierConfig, LlmLinkClassifier};
use company_profiler::fetcher::{
    FetchError, FetcherConfig, HttpPageFetcher, PageFetcher, SpiderPageFetcher,
};
use company_profiler::jobs::{self, JobStatus};
use company_profiler::links::{LinkFilterConfig, extract_links};
use company_profiler::model::{Client, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};
use company_profiler::pipeline::{PipelineConfig, ProfilePipeline};
use company_profiler::synthesizer::{LlmProfileSynthesizer, SynthesizerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use rig::completion::CompletionModel;
use std::path::PathBuf;
use tracing::{instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Builds company profiles from corporate websites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    options: PipelineOptions,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List candidate links found on a homepage
    Links(UrlArgs),

    /// Classify the candidate links of a homepage
    Classify(UrlArgs),

    /// Print the normalized corpus for a company
    Corpus(UrlArgs),

    /// Build the profile of one company
    Profile(ProfileArgs),

    /// Process a JSON Lines file of jobs
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct PipelineOptions {
    /// Maximum number of links the classifier may mark relevant
    #[arg(long, global = true, default_value = "3")]
    max_yes: usize,

    /// Language the profile is written in
    #[arg(long, global = true, default_value = "Polish")]
    language: String,

    /// Extra keyword that disqualifies a link (repeatable)
    #[arg(long = "deny-keyword", global = true)]
    deny_keywords: Vec<String>,

    /// Only keep links on the homepage's host
    #[arg(long, global = true)]
    same_host: bool,

    /// Page fetch timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,

    /// Timeout for each LLM call in seconds
    #[arg(long, global = true, default_value = "120")]
    llm_timeout_secs: u64,

    /// Page fetcher backend (http|spider). spider renders JavaScript when
    /// built with `--features chrome`
    #[arg(long, global = true, default_value = "http", value_parser = ["http", "spider"])]
    fetcher: String,

    /// LLM provider (openai|gemini)
    #[arg(long, global = true, default_value = "openai", value_parser = ["openai", "gemini"])]
    provider: String,

    /// Model name, defaults to the provider's default
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Number of relevant pages fetched at once
    #[arg(long, global = true, default_value = "3")]
    concurrency: usize,

    /// CSS selectors to ignore when extracting page text (comma-separated)
    #[arg(short, long, global = true)]
    exclude: Option<String>,

    /// Write a debug log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UrlArgs {
    /// Company homepage URL
    #[arg(required = true)]
    url: String,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Company homepage URL
    #[arg(required = true)]
    url: String,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSON Lines file with one job per line
    #[arg(required = true)]
    input: PathBuf,

    /// Where to write the outcomes
    #[arg(short, long, default_value = "results.jsonl")]
    output: PathBuf,

    /// Number of companies processed at once
    #[arg(short, long, default_value = "4")]
    jobs: usize,
}

/// Subcommands that need a language model
enum LlmCommand {
    Classify(UrlArgs),
    Corpus(UrlArgs),
    Profile(ProfileArgs),
    Batch(BatchArgs),
}

/// Page fetcher chosen on the command line
enum Fetcher {
    Http(HttpPageFetcher),
    Spider(SpiderPageFetcher),
}

impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match self {
            Fetcher::Http(fetcher) => fetcher.fetch(url).await,
            Fetcher::Spider(fetcher) => fetcher.fetch(url).await,
        }
    }
}

impl PipelineOptions {
    fn exclude_selectors(&self) -> Vec<String> {
        self.exclude
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn fetcher(&self) -> anyhow::Result<Fetcher> {
        let config = FetcherConfig::builder()
            .timeout_secs(self.timeout_secs)
            .exclude_selectors(self.exclude_selectors())
            .build();
        Ok(match self.fetcher.as_str() {
            "spider" => {
                if !SpiderPageFetcher::renders_javascript() {
                    warn!("Built without the chrome feature, spider pages are not rendered");
                }
                Fetcher::Spider(SpiderPageFetcher::new(config))
            }
            _ => Fetcher::Http(HttpPageFetcher::new(config)?),
        })
    }

    fn link_filter(&self) -> LinkFilterConfig {
        let mut builder = LinkFilterConfig::builder().same_host_only(self.same_host);
        for keyword in &self.deny_keywords {
            builder = builder.deny_keyword(keyword.as_str());
        }
        builder.build()
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::builder()
            .link_filter(self.link_filter())
            .max_yes(self.max_yes)
            .fetch_concurrency(self.concurrency)
            .fetch_timeout_secs(self.timeout_secs)
            .exclude_selectors(self.exclude_selectors())
            .build()
    }

    fn pipeline<M: CompletionModel>(
        &self,
        client: &Client<M>,
    ) -> anyhow::Result<ProfilePipeline<Fetcher, LlmLinkClassifier<M>, LlmProfileSynthesizer<M>>>
    {
        let classifier = LlmLinkClassifier::new(
            client,
            ClassifierConfig::builder()
                .timeout_secs(self.llm_timeout_secs)
                .build(),
        );
        let synthesizer = LlmProfileSynthesizer::new(
            client,
            SynthesizerConfig::builder()
                .language(&self.language)
                .timeout_secs(self.llm_timeout_secs)
                .build(),
        );
        Ok(ProfilePipeline::new(
            self.fetcher()?,
            classifier,
            synthesizer,
            self.pipeline_config(),
        )?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the shell
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber(cli.options.log_file.as_deref())?;

    let Some(command) = cli.command else {
        // If no command is provided, show help
        let _ = Cli::parse_from(["company-profiler", "--help"]);
        return Ok(());
    };

    let command = match command {
        Commands::Links(args) => return links_command(&args, &cli.options).await,
        Commands::Classify(args) => LlmCommand::Classify(args),
        Commands::Corpus(args) => LlmCommand::Corpus(args),
        Commands::Profile(args) => LlmCommand::Profile(args),
        Commands::Batch(args) => LlmCommand::Batch(args),
    };

    match cli.options.provider.as_str() {
        "gemini" => {
            let model = cli.options.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            let client = Client::new_gemini_from_env(model)?;
            llm_command(command, &cli.options, &client).await
        }
        _ => {
            let model = cli.options.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
            let client = Client::new_openai_from_env(model)?;
            llm_command(command, &cli.options, &client).await
        }
    }
}

#[instrument(skip(options))]
async fn links_command(args: &UrlArgs, options: &PipelineOptions) -> anyhow::Result<()> {
    let filter = options.link_filter().compile()?;
    let html = options.fetcher()?.fetch(&args.url).await?;

    let links = extract_links(&html, &args.url, &filter)?;
    for link in &links {
        println!("{}", link);
    }
    eprintln!("{} candidate links", links.len());

    Ok(())
}

async fn llm_command<M: CompletionModel>(
    command: LlmCommand,
    options: &PipelineOptions,
    client: &Client<M>,
) -> anyhow::Result<()> {
    let pipeline = options.pipeline(client)?;

    match command {
        LlmCommand::Classify(args) => {
            let candidates = pipeline.discover_links(&args.url).await?;
            let verdict = pipeline.classify_links(&args.url, &candidates).await?;
            let output = serde_json::json!({
                "url": args.url,
                "candidates": candidates,
                "links": verdict,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        LlmCommand::Corpus(args) => {
            let report = pipeline.build_corpus(&args.url).await?;
            for skipped in &report.skipped {
                eprintln!("Skipped {}: {}", skipped.url, skipped.reason);
            }
            print!("{}", report.corpus);
            Ok(())
        }
        LlmCommand::Profile(args) => {
            let report = pipeline.run(&args.url).await?;
            if args.format == "json" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.profile);
            }
            Ok(())
        }
        LlmCommand::Batch(args) => batch_command(args, &pipeline).await,
    }
}

#[instrument(skip(pipeline))]
async fn batch_command<M: CompletionModel>(
    args: BatchArgs,
    pipeline: &ProfilePipeline<Fetcher, LlmLinkClassifier<M>, LlmProfileSynthesizer<M>>,
) -> anyhow::Result<()> {
    let job_list = jobs::read_jobs(&args.input).await?;
    println!("Processing {} companies...", job_list.len());

    let progress_bar = ProgressBar::new(job_list.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );

    let start_time = std::time::Instant::now();
    let outcomes = jobs::run_batch(pipeline, job_list, args.jobs, |outcome| {
        progress_bar.inc(1);
        progress_bar.set_message(format!("row {}: {:?}", outcome.row, outcome.status));
    })
    .await;
    progress_bar.finish_with_message("Batch completed");

    jobs::write_outcomes(&args.output, &outcomes).await?;

    let count = |status: JobStatus| outcomes.iter().filter(|o| o.status == status).count();
    println!(
        "Completed {}, insufficient data {}, failed {} in {:.2?}",
        count(JobStatus::Completed),
        count(JobStatus::InsufficientData),
        count(JobStatus::Failed),
        start_time.elapsed()
    );
    println!("Saved outcomes to {}", args.output.display());

    Ok(())
}
