use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use vigil_config::ProviderConfig;
use vigil_engine::PipelineEngine;
use vigil_trigger::{EventPattern, UploadEvent};
use vigil_workflow::State;

mod local;

use local::{LocalCrawlClient, LocalNotifyClient, LocalQueryClient, sample_result_set};

/// Vigil - data quality monitoring pipeline
#[derive(Parser)]
#[command(name = "vigil")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.vigil)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a provider configuration file
  Validate {
    /// Path to the provider config (JSON)
    config: PathBuf,
  },

  /// Print the orchestration state graph
  Plan,

  /// Run one pipeline execution locally against fixture clients
  Run {
    /// Path to the provider config (JSON)
    config: PathBuf,

    /// Result set fixture (default: <data-dir>/fixtures/<provider_path>.json)
    #[arg(long)]
    results: Option<PathBuf>,

    /// Number of status polls before the local crawler reports ready
    #[arg(long, default_value_t = 1)]
    polls_until_ready: u32,
  },

  /// Write a sample result set fixture for a provider
  InitFixture {
    /// Path to the provider config (JSON)
    config: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".vigil")
  });

  match cli.command {
    Some(Commands::Validate { config }) => {
      validate(config)?;
    }
    Some(Commands::Plan) => {
      plan();
    }
    Some(Commands::Run {
      config,
      results,
      polls_until_ready,
    }) => {
      run(config, results, polls_until_ready, data_dir)?;
    }
    Some(Commands::InitFixture { config }) => {
      init_fixture(config, data_dir)?;
    }
    None => {
      println!("vigil - use --help to see available commands");
    }
  }

  Ok(())
}

fn validate(config: PathBuf) -> Result<()> {
  let provider = ProviderConfig::load(&config)
    .with_context(|| format!("invalid provider config: {}", config.display()))?;

  eprintln!("Provider: {}", provider.provider_path);
  eprintln!("Bucket:   {}", provider.source_bucket);
  eprintln!("Crawler:  {}", provider.crawler_name);
  eprintln!("Table:    {}.{}", provider.database_name, provider.table_name());
  eprintln!("Query:    {}", provider.resolved_query());
  eprintln!("OK");

  Ok(())
}

fn plan() {
  for (from, to) in State::edges() {
    println!("{} -> {}", from, to);
  }
}

fn run(
  config: PathBuf,
  results: Option<PathBuf>,
  polls_until_ready: u32,
  data_dir: PathBuf,
) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_async(config, results, polls_until_ready, data_dir).await })
}

async fn run_async(
  config: PathBuf,
  results: Option<PathBuf>,
  polls_until_ready: u32,
  data_dir: PathBuf,
) -> Result<()> {
  let provider = ProviderConfig::load(&config)
    .with_context(|| format!("invalid provider config: {}", config.display()))?;

  let event = read_event_from_stdin()?;

  // Only matching upload events trigger this provider's pipeline.
  let pattern = EventPattern {
    bucket_name: provider.source_bucket.clone(),
    key_prefix: provider.provider_path.clone(),
  };
  if !pattern.matches(&event) {
    bail!(
      "event does not match provider '{}' (bucket '{}', key '{}')",
      provider.provider_path,
      event.bucket_name(),
      event.object_key()
    );
  }

  let results_file = results.unwrap_or_else(|| fixture_path(&data_dir, &provider));
  let target_path = format!("s3://{}/{}/", provider.source_bucket, provider.provider_path);

  let crawl = LocalCrawlClient::new(&provider.database_name, &target_path, polls_until_ready);
  let query = LocalQueryClient::new(results_file);
  let engine = PipelineEngine::new(provider, crawl, query, LocalNotifyClient);

  let cancel = CancellationToken::new();
  let watcher = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      watcher.cancel();
    }
  });

  let report = engine
    .execute(event, cancel)
    .await
    .context("pipeline execution failed")?;

  println!("{}", serde_json::to_string_pretty(&report)?);

  Ok(())
}

fn init_fixture(config: PathBuf, data_dir: PathBuf) -> Result<()> {
  let provider = ProviderConfig::load(&config)
    .with_context(|| format!("invalid provider config: {}", config.display()))?;

  let path = fixture_path(&data_dir, &provider);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create fixture directory: {}", parent.display()))?;
  }

  let content = serde_json::to_string_pretty(&sample_result_set())?;
  std::fs::write(&path, content)
    .with_context(|| format!("failed to write fixture: {}", path.display()))?;

  eprintln!("Wrote {}", path.display());
  Ok(())
}

fn fixture_path(data_dir: &std::path::Path, provider: &ProviderConfig) -> PathBuf {
  data_dir
    .join("fixtures")
    .join(format!("{}.json", provider.provider_path))
}

fn read_event_from_stdin() -> Result<UploadEvent> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    bail!("pipe an upload event (JSON) to stdin, e.g. `vigil run config.json < event.json`");
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read upload event from stdin")?;

  serde_json::from_str(&input).context("failed to parse upload event JSON from stdin")
}
