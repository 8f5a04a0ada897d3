//! Command-line interface for sql-replay
//!
//! # Usage Examples
//!
//! ## Extract a corpus from a MySQL general log
//! ```bash
//! sql-replay extract general.log -o queries.sql --max-statements 5000
//!
//! # Only read statements
//! sql-replay extract general.log -o queries.sql --kind read
//! ```
//!
//! ## Replay the corpus
//! ```bash
//! # Connection settings come from the environment
//! export MYSQL_HOST=localhost MYSQL_USER=root MYSQL_PASSWORD=root MYSQL_DATABASE=testdb
//!
//! # 8 workers for 120 seconds
//! sql-replay run -t 8 -d 120 -f queries.sql
//!
//! # 4 workers, 500 statements each, machine-readable summary
//! sql-replay run -t 4 -q 500 --json
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use corpus_extract::{ExtractOptions, LogParser, StatementKind};
use replay_core::{Corpus, RunConfig, Termination};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod report;

#[derive(Parser)]
#[command(name = "sql-replay")]
#[command(about = "Replay captured MySQL statements against a live server under concurrent load")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a corpus file against MySQL and print a summary report
    Run(RunArgs),

    /// Extract a replayable corpus from a MySQL general log
    Extract(ExtractArgs),
}

/// Target server options, resolved from flags or the environment.
#[derive(Args)]
struct MySqlOpts {
    /// MySQL server hostname
    #[arg(long, env = "MYSQL_HOST")]
    host: String,

    /// MySQL server port
    #[arg(long, env = "MYSQL_PORT", default_value_t = 3306)]
    port: u16,

    /// MySQL user
    #[arg(long, env = "MYSQL_USER")]
    user: String,

    /// MySQL password
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    password: String,

    /// Database to replay against
    #[arg(long, env = "MYSQL_DATABASE")]
    database: String,

    /// Connect timeout in seconds
    #[arg(long, env = "CONNECTION_TIMEOUT", default_value_t = 10)]
    connect_timeout: u64,

    /// Per-statement timeout in seconds
    #[arg(long, env = "QUERY_TIMEOUT", default_value_t = 30)]
    query_timeout: u64,

    /// Attempts per statement before it counts as a failure
    #[arg(long, env = "MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    mysql: MySqlOpts,

    /// Number of concurrent workers (one connection each)
    #[arg(short = 't', long = "workers")]
    workers: usize,

    /// Statements per worker; the run stops when every worker reaches this
    #[arg(short = 'q', long, conflicts_with = "duration")]
    queries: Option<u64>,

    /// Run length in seconds (default: 60 when --queries is not given)
    #[arg(short = 'd', long)]
    duration: Option<u64>,

    /// Corpus file produced by `sql-replay extract`
    #[arg(short = 'f', long, default_value = "queries.sql")]
    corpus: PathBuf,

    /// Seed for statement selection; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the summary as JSON instead of a console report
    #[arg(long)]
    json: bool,

    /// Skip writing the timestamped report file
    #[arg(long)]
    no_report_file: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// MySQL general log file
    log_file: PathBuf,

    /// Output corpus file
    #[arg(short = 'o', long, default_value = "queries.sql")]
    output: PathBuf,

    /// Maximum number of statements to extract
    #[arg(short = 'm', long)]
    max_statements: Option<usize>,

    /// Keep only statements of this kind
    #[arg(long, value_enum)]
    kind: Option<KindChoice>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindChoice {
    Read,
    Write,
}

impl From<KindChoice> for StatementKind {
    fn from(choice: KindChoice) -> Self {
        match choice {
            KindChoice::Read => StatementKind::Read,
            KindChoice::Write => StatementKind::Write,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run_replay(args).await,
        Commands::Extract(args) => run_extract(args),
    }
}

async fn run_replay(args: RunArgs) -> anyhow::Result<()> {
    let statements = corpus_extract::load_corpus(&args.corpus)
        .with_context(|| format!("failed to load corpus from {}", args.corpus.display()))?;
    info!(
        statements = statements.len(),
        corpus = %args.corpus.display(),
        "corpus loaded"
    );

    let corpus = Corpus::new(statements).context("cannot start a replay run")?;

    let termination = match (args.queries, args.duration) {
        (Some(count), _) => Termination::CountPerWorker(count),
        (None, Some(secs)) => Termination::Duration(Duration::from_secs(secs)),
        (None, None) => Termination::Duration(replay_core::config::DEFAULT_RUN_DURATION),
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut config = RunConfig::new(
        args.mysql.host,
        args.mysql.user,
        args.mysql.password,
        args.mysql.database,
    )
    .with_workers(args.workers)
    .with_termination(termination)
    .with_seed(seed);
    config.port = args.mysql.port;
    config.connect_timeout = Duration::from_secs(args.mysql.connect_timeout);
    config.query_timeout = Duration::from_secs(args.mysql.query_timeout);
    config.max_retries = args.mysql.max_retries;

    let summary = replay_core::run_mysql(config, corpus)
        .await
        .context("replay run failed")?;

    if args.json {
        println!("{}", report::to_json(&summary)?);
    } else {
        println!("{}", report::render(&summary));
    }

    if !args.no_report_file {
        let path = report::write_report_file(&summary).context("failed to write report file")?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let parser = LogParser::new();
    let options = ExtractOptions {
        max_statements: args.max_statements,
        kind_filter: args.kind.map(StatementKind::from),
    };

    let extracted = parser
        .extract_file(&args.log_file, &options)
        .with_context(|| format!("failed to read log file {}", args.log_file.display()))?;

    info!(
        total = extracted.stats.total(),
        read = extracted.stats.read,
        write = extracted.stats.write,
        system = extracted.stats.system,
        unknown = extracted.stats.unknown,
        ignored = extracted.stats.ignored,
        "extraction finished"
    );

    if extracted.statements.is_empty() {
        anyhow::bail!(
            "no replayable statements found in {}",
            args.log_file.display()
        );
    }

    corpus_extract::write_corpus(
        &args.output,
        &extracted,
        &args.log_file.display().to_string(),
        args.kind.map(|k| StatementKind::from(k).as_str()),
    )
    .with_context(|| format!("failed to write corpus to {}", args.output.display()))?;

    Ok(())
}
