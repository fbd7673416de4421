use analytics::AnalyticsEngine;
use analyzer::{Analyzer, ChartFrame};
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{init_tracing, load_config_from, settings::Config};
use core_types::{AssetRecord, FieldObservation, NumericField, Symbol};
use database::{connect, connect_writable, DbRepository};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The main entry point for the ETF analyzer.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env file is fine; the config file and ETF__* variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(&config.logging)?;

    tracing::info!(database = %config.database.url, "Starting ETF analyzer.");

    match cli.command {
        Commands::Import(args) => handle_import(args, &config).await,
        Commands::Query(command) => {
            let pool = connect(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to connect to the database")?;
            let analyzer = Analyzer::new(
                DbRepository::new(pool),
                AnalyticsEngine::new(config.portfolio.trading_days_per_year),
            );

            let outcome = run(&analyzer, command, &config).await;
            analyzer.into_repository().close().await;
            outcome
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Query ETF price tables and compute individual and portfolio returns.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(QueryCommand),
    /// Load a CSV file of daily records into an asset table.
    Import(ImportArgs),
}

/// Commands that read the store through the analyzer.
#[derive(Subcommand)]
enum QueryCommand {
    /// List the asset tables in the store.
    Tables,
    /// Review one asset's table and its returns.
    Asset(AssetArgs),
    /// Show rows whose field is strictly above a threshold.
    Above(AboveArgs),
    /// Show the rows with the largest values of a field.
    Top(TopArgs),
    /// Analyze the equally weighted portfolio.
    Portfolio(PortfolioArgs),
}

#[derive(Parser)]
struct AssetArgs {
    /// The asset's table name (e.g., "PYPL").
    #[arg(long)]
    symbol: Symbol,

    /// Rows to show from each end of the table.
    #[arg(long)]
    rows: Option<usize>,

    /// Write chart frames as JSON into this directory.
    #[arg(long)]
    chart_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct AboveArgs {
    /// Defaults to the configured query symbol.
    #[arg(long)]
    symbol: Option<Symbol>,

    #[arg(long)]
    field: Option<NumericField>,

    #[arg(long, value_parser = parse_finite)]
    threshold: Option<f64>,
}

#[derive(Parser)]
struct TopArgs {
    #[arg(long)]
    symbol: Option<Symbol>,

    #[arg(long)]
    field: Option<NumericField>,

    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Parser)]
struct PortfolioArgs {
    /// Comma-separated symbols; defaults to the configured portfolio.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<Symbol>,

    #[arg(long)]
    chart_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct ImportArgs {
    #[arg(long)]
    symbol: Symbol,

    /// CSV with the header `time,open,high,low,close,daily_returns`.
    #[arg(long)]
    csv: PathBuf,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn parse_finite(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{raw}' is not a finite number"))
    }
}

async fn run(analyzer: &Analyzer, command: QueryCommand, config: &Config) -> Result<()> {
    let queries = &config.queries;
    match command {
        QueryCommand::Tables => {
            let tables = analyzer.tables().await?;
            let mut table = new_table(vec!["Table"]);
            for symbol in &tables {
                table.add_row(vec![symbol.to_string()]);
            }
            println!("{table}");
        }
        QueryCommand::Asset(args) => {
            let analysis = analyzer.asset(&args.symbol).await?;
            let rows = args.rows.unwrap_or(queries.preview_rows);

            println!("{} (first {rows} rows)", args.symbol);
            println!("{}", records_table(analysis.series.head(rows)));
            println!("{} (last {rows} rows)", args.symbol);
            println!("{}", records_table(analysis.series.tail(rows)));

            let report = &analysis.report;
            println!(
                "{}: {} trading days from {} to {}",
                report.symbol,
                report.trading_days,
                report.first_time.format(TIME_FORMAT),
                report.last_time.format(TIME_FORMAT)
            );
            println!("Annualized return: {:.2}%", report.annualized_return_pct());
            println!("Final cumulative return: {:.4}", report.final_cumulative_return);

            if let Some(dir) = args.chart_dir {
                export_charts(&dir, &analysis.charts())?;
            }
        }
        QueryCommand::Above(args) => {
            let symbol = args.symbol.unwrap_or_else(|| queries.symbol.clone());
            let field = args.field.unwrap_or(queries.filter_field);
            let threshold = args.threshold.unwrap_or(queries.threshold);

            let rows = analyzer.rows_above(&symbol, field, threshold).await?;
            println!("{symbol}: {} rows with {field} > {threshold}", rows.len());
            println!("{}", observations_table(field, &rows));
        }
        QueryCommand::Top(args) => {
            let symbol = args.symbol.unwrap_or_else(|| queries.symbol.clone());
            let field = args.field.unwrap_or(queries.top_field);
            let limit = args.limit.unwrap_or(queries.top_n);

            let rows = analyzer.top_rows(&symbol, limit, field).await?;
            println!("{symbol}: top {} rows by {field}", rows.len());
            println!("{}", observations_table(field, &rows));
        }
        QueryCommand::Portfolio(args) => {
            let symbols = if args.symbols.is_empty() {
                config.portfolio.symbols.clone()
            } else {
                args.symbols
            };

            let analysis = analyzer.portfolio(&symbols).await?;
            println!("{}", portfolio_table(&analysis.portfolio, queries.preview_rows));

            let report = &analysis.report;
            let mut summary = new_table(vec!["Asset", "Annualized Return (%)"]);
            for constituent in &report.constituents {
                summary.add_row(vec![
                    constituent.symbol.to_string(),
                    format!("{:.2}", constituent.annualized_return * 100.0),
                ]);
            }
            summary.add_row(vec![
                analyzer::charts::EQUAL_WEIGHTED_LABEL.to_string(),
                format!("{:.2}", report.annualized_return_pct()),
            ]);
            println!("{summary}");
            println!(
                "Portfolio annualized return: {:.2}%",
                report.annualized_return_pct()
            );
            println!(
                "Portfolio final cumulative return: {:.4}",
                report.final_cumulative_return
            );

            if let Some(dir) = args.chart_dir {
                export_charts(&dir, &analysis.charts())?;
            }
        }
    }
    Ok(())
}

/// One CSV line of an asset table export.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    daily_returns: f64,
}

async fn handle_import(args: ImportArgs, config: &Config) -> Result<()> {
    let records = read_csv(&args.csv)?;

    let pool = connect_writable(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to open the database for writing")?;
    let repo = DbRepository::new(pool);

    let outcome = repo.save_records(&args.symbol, &records).await;
    repo.close().await;
    let inserted = outcome?;

    println!(
        "Imported {inserted} of {} rows from {} into {}",
        records.len(),
        args.csv.display(),
        args.symbol
    );
    Ok(())
}

fn read_csv(path: &Path) -> Result<Vec<AssetRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let row: CsvRecord =
            result.with_context(|| format!("Malformed CSV row {}", line + 1))?;
        records.push(AssetRecord {
            time: parse_time(&row.time)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            daily_return: row.daily_returns,
        });
    }

    if records.is_empty() {
        bail!("{} contains no rows", path.display());
    }
    Ok(records)
}

/// Accepts either a full timestamp or a bare date (taken as midnight).
fn parse_time(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(time) = NaiveDateTime::parse_from_str(raw, TIME_FORMAT) {
        return Ok(time);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Unrecognized timestamp '{raw}'"))?;
    date.and_hms_opt(0, 0, 0)
        .with_context(|| format!("Unrecognized timestamp '{raw}'"))
}

// ==============================================================================
// Output helpers
// ==============================================================================

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn records_table(records: &[AssetRecord]) -> Table {
    let mut table = new_table(vec!["time", "open", "high", "low", "close", "daily_returns"]);
    for r in records {
        table.add_row(vec![
            r.time.format(TIME_FORMAT).to_string(),
            format!("{:.4}", r.open),
            format!("{:.4}", r.high),
            format!("{:.4}", r.low),
            format!("{:.4}", r.close),
            format!("{:.6}", r.daily_return),
        ]);
    }
    table
}

fn observations_table(field: NumericField, rows: &[FieldObservation]) -> Table {
    let mut table = new_table(vec!["time", field.column()]);
    for row in rows {
        table.add_row(vec![
            row.time.format(TIME_FORMAT).to_string(),
            format!("{:.6}", row.value),
        ]);
    }
    table
}

fn portfolio_table(portfolio: &core_types::PortfolioSeries, rows: usize) -> Table {
    let mut header = vec!["time".to_string()];
    header.extend(portfolio.symbols().iter().map(|s| s.to_string()));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for (time, returns) in portfolio.times().iter().zip(portfolio.rows()).take(rows) {
        let mut cells = vec![time.format(TIME_FORMAT).to_string()];
        cells.extend(returns.iter().map(|r| format!("{r:.6}")));
        table.add_row(cells);
    }
    table
}

fn export_charts(dir: &Path, frames: &[ChartFrame]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;

    for frame in frames {
        frame.validate()?;
        let path = dir.join(format!("{}.json", frame.slug()));
        let json = serde_json::to_string_pretty(frame)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), title = %frame.title, "Wrote chart frame.");
    }
    Ok(())
}
