//! AdLens CLI: cross-channel ad reporting from platform CSV exports.
//!
//! Commands:
//! - `summary` - headline rollups plus the per-platform table
//! - `aggregate` - group-by rows with recomputed KPIs
//! - `top` - best groups by a metric
//! - `insights` - key insights for the selected view
//! - `export` - unified dataset with per-record KPIs (CSV or JSON)
//! - `sample` - write deterministic synthetic exports
//! - `fingerprint` - print the cache key for the configured sources

mod logging;

use adlens_core::domain::Platform;
use adlens_core::kpi::measure_all;
use adlens_core::SourceFingerprint;
use adlens_runner::data_loader::read_sources;
use adlens_runner::export::{
    headline_report, insights_report, summary_csv, summary_json, summary_table, write_records,
};
use adlens_runner::{
    aggregate, generate_sample, load_fact_table, top_n, DateRange, GroupBy, Headline, Insights,
    LoadedData, PipelineConfig, RankMetric, RecordFilter, SummaryRow,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "adlens",
    version,
    about = "AdLens: unified KPIs across Facebook, Google and TikTok ad exports"
)]
struct Cli {
    /// Log pipeline stages at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Path to a TOML pipeline config.
    #[arg(long, conflicts_with = "data_dir")]
    config: Option<PathBuf>,

    /// Directory holding the three exports under their default file names.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

impl SourceArgs {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None => Ok(PipelineConfig::from_data_dir(&self.data_dir)),
        }
    }

    fn load(&self) -> Result<LoadedData> {
        let config = self.pipeline_config()?;
        load_fact_table(&config).context("failed to load ad exports")
    }
}

#[derive(Args)]
struct FilterArgs {
    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Restrict to these platforms (repeatable).
    #[arg(long = "platform")]
    platforms: Vec<Platform>,

    /// Restrict to these campaign names (repeatable).
    #[arg(long = "campaign")]
    campaigns: Vec<String>,
}

impl FilterArgs {
    fn record_filter(&self) -> Result<RecordFilter> {
        let dates = DateRange::new(self.from, self.to).context("invalid date filter")?;
        Ok(RecordFilter::all()
            .with_dates(dates)
            .with_platforms(self.platforms.iter().copied())
            .with_campaigns(self.campaigns.iter().cloned()))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline totals, blended ROAS and the per-platform table.
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Aggregate by any combination of dimensions.
    Aggregate {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Comma-separated dimensions: platform, campaign, subgroup, date.
        /// Empty means one grand-total row.
        #[arg(long, default_value = "platform")]
        by: GroupBy,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Best groups by a metric.
    Top {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// roas, ctr, cpc, cpa, cpm, conversions, cost, clicks, impressions, conversion_value.
        #[arg(long, default_value = "roas")]
        metric: RankMetric,
        #[arg(long, default_value_t = 10)]
        n: usize,
        #[arg(long, default_value = "campaign")]
        by: GroupBy,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Best ROAS platform, conversion leader and top campaign.
    Insights {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Write the filtered unified dataset with per-record KPIs.
    Export {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file; `.csv` or `.json` selects the format.
        #[arg(long)]
        out: PathBuf,
    },
    /// Write synthetic exports for all three platforms.
    Sample {
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
        /// First day of data (YYYY-MM-DD).
        #[arg(long, default_value = "2024-01-01")]
        start: NaiveDate,
        #[arg(long, default_value_t = 31)]
        days: u32,
        #[arg(long, default_value = "adlens")]
        seed: String,
    },
    /// Print the content fingerprint of the configured sources.
    Fingerprint {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(if cli.verbose {
        logging::VERBOSE_FILTER
    } else {
        logging::DEFAULT_FILTER
    })?;

    match cli.command {
        Commands::Summary {
            source,
            filter,
            format,
        } => run_summary(&source, &filter, format),
        Commands::Aggregate {
            source,
            filter,
            by,
            format,
        } => run_aggregate(&source, &filter, &by, format),
        Commands::Top {
            source,
            filter,
            metric,
            n,
            by,
            format,
        } => run_top(&source, &filter, metric, n, &by, format),
        Commands::Insights {
            source,
            filter,
            format,
        } => run_insights(&source, &filter, format),
        Commands::Export {
            source,
            filter,
            out,
        } => run_export(&source, &filter, out),
        Commands::Sample {
            out_dir,
            start,
            days,
            seed,
        } => run_sample(out_dir, start, days, &seed),
        Commands::Fingerprint { source } => run_fingerprint(&source),
    }
}

fn run_summary(source: &SourceArgs, filter: &FilterArgs, format: OutputFormat) -> Result<()> {
    let loaded = source.load()?;
    let filter = filter.record_filter()?;
    let headline = Headline::from_records(filter.apply(&loaded.table));
    if headline.records == 0 {
        warn!("no records match the selected filters");
    }
    let by = GroupBy::platform();
    let rows = aggregate(&loaded.table, &by, &filter);

    match format {
        OutputFormat::Table => {
            print!("{}", headline_report(&headline));
            println!();
            print!("{}", summary_table(&rows, &by));
        }
        OutputFormat::Csv => print!("{}", summary_csv(&rows, &by)?),
        OutputFormat::Json => {
            let body = serde_json::json!({ "headline": headline, "platforms": rows });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}

fn run_aggregate(
    source: &SourceArgs,
    filter: &FilterArgs,
    by: &GroupBy,
    format: OutputFormat,
) -> Result<()> {
    let loaded = source.load()?;
    let rows = aggregate(&loaded.table, by, &filter.record_filter()?);
    print_rows(&rows, by, format)
}

fn run_top(
    source: &SourceArgs,
    filter: &FilterArgs,
    metric: RankMetric,
    n: usize,
    by: &GroupBy,
    format: OutputFormat,
) -> Result<()> {
    let loaded = source.load()?;
    let rows = aggregate(&loaded.table, by, &filter.record_filter()?);
    let ranked = top_n(&rows, metric, n);
    print_rows(&ranked, by, format)
}

fn print_rows(rows: &[SummaryRow], by: &GroupBy, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print!("{}", summary_table(rows, by)),
        OutputFormat::Csv => print!("{}", summary_csv(rows, by)?),
        OutputFormat::Json => println!("{}", summary_json(rows)?),
    }
    Ok(())
}

fn run_insights(source: &SourceArgs, filter: &FilterArgs, format: OutputFormat) -> Result<()> {
    let loaded = source.load()?;
    let filter = filter.record_filter()?;
    let insights = Insights::compute(filter.apply(&loaded.table));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&insights)?),
        OutputFormat::Table | OutputFormat::Csv => print!("{}", insights_report(&insights)),
    }
    Ok(())
}

fn run_export(source: &SourceArgs, filter: &FilterArgs, out: PathBuf) -> Result<()> {
    let loaded = source.load()?;
    let filter = filter.record_filter()?;
    let measured = measure_all(filter.apply(&loaded.table));
    if measured.is_empty() {
        warn!(out = %out.display(), "exporting an empty view");
    }

    write_records(&out, &measured)?;
    println!("Exported {} records to {}", measured.len(), out.display());
    Ok(())
}

fn run_sample(out_dir: PathBuf, start: NaiveDate, days: u32, seed: &str) -> Result<()> {
    let summary = generate_sample(&out_dir, start, days, seed)?;
    for (platform, path) in &summary.files {
        let rows = summary.rows.get(platform).copied().unwrap_or_default();
        println!("{:<8} {rows:>5} rows  {}", platform.as_str(), path.display());
    }
    Ok(())
}

fn run_fingerprint(source: &SourceArgs) -> Result<()> {
    let config = source.pipeline_config()?;
    let policy = config.to_policy()?;
    let sources = read_sources(&config).context("failed to read ad exports")?;
    let fingerprint = SourceFingerprint::compute(&sources, &policy);
    println!("{fingerprint}");
    Ok(())
}
