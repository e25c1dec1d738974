//! # chatcast CLI
//!
//! Command-line interface for the chatcast library.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatcast::ChatcastError;
use chatcast::analysis::ModelSummary;
use chatcast::cli::Args;
use chatcast::core::output::Table;
use chatcast::format::{OutputFormat, write_to_format};
use chatcast::pipeline::{AnalysisReport, ForecastOutcome, analyze_file};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {e}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `Ok(false)` when the report was printed but the forecast stage failed.
fn run(args: &Args) -> Result<bool, ChatcastError> {
    let total_start = Instant::now();

    if !args.input.is_file() {
        return Err(ChatcastError::InputNotFound {
            path: args.input.clone(),
        });
    }

    let config = args.analysis_config();
    let report = analyze_file(&args.input, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(args, &report);
    }

    if let Some(path) = &args.forecast_out {
        match report.outcome.forecast() {
            Some(forecast) => export(forecast, path, args.output_format(path)?, args.json)?,
            None => eprintln!("⚠️  No forecast to write to {}", path.display()),
        }
    }
    if let Some(path) = &args.series_out {
        export(&report.series, path, args.output_format(path)?, args.json)?;
    }
    if let Some(path) = &args.heatmap_out {
        export(&report.activity, path, args.output_format(path)?, args.json)?;
    }

    if let ForecastOutcome::Failed { reason, .. } = &report.outcome {
        eprintln!("❌ Error: {reason}");
        return Ok(false);
    }

    if !args.json {
        println!();
        println!("⚡ Done in {:.2}s", total_start.elapsed().as_secs_f64());
    }
    Ok(true)
}

fn export<T: Table>(
    table: &T,
    path: &Path,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), ChatcastError> {
    write_to_format(table, path, format)?;
    if !quiet {
        println!("💾 Wrote {} to {}", format, path.display());
    }
    Ok(())
}

fn print_report(args: &Args, report: &AnalysisReport) {
    let stats = &report.stats;

    println!("📊 chatcast v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:    {}", args.input.display());
    println!(
        "📖 Parsed:   {} messages ({} lines skipped)",
        stats.total_messages, report.skipped_lines
    );

    println!();
    println!("🕐 Activity:");
    if let Some(h) = stats.busiest_hour {
        println!("   Busiest hour:     {:02}:00 ({} messages)", h.hour, h.count);
    }
    if let Some(h) = stats.quietest_hour {
        println!("   Quietest hour:    {:02}:00 ({} messages)", h.hour, h.count);
    }
    if let Some(s) = &stats.busiest_sender {
        println!("   Most active:      {} ({} messages, {:.2}%)", s.sender, s.count, s.percent);
    }
    if let Some(s) = &stats.quietest_sender {
        println!("   Least active:     {} ({} messages, {:.2}%)", s.sender, s.count, s.percent);
    }
    println!("   Total messages:   {}", stats.total_messages);
    match stats.top_emoji {
        Some(e) => println!("   Top emoji:        {} ({} times)", e.emoji, e.count),
        None => println!("   Top emoji:        none"),
    }

    println!();
    println!("📈 Hourly series: {} hours", report.series.len());
    if let (Some(first), Some(last)) = (report.series.first(), report.series.last()) {
        println!("   From {} to {}", first.hour, last.hour);
    }

    if let Some(adf) = report.outcome.stationarity() {
        println!();
        println!("🧪 Augmented Dickey-Fuller test:");
        println!("   ADF statistic:    {:.4}", adf.statistic);
        println!("   p-value:          {:.4}", adf.p_value);
        println!("   Lags used:        {}", adf.used_lag);
        println!("   Observations:     {}", adf.nobs);
        for (label, value) in adf.critical_values.iter() {
            println!("   Critical ({label:>3}):   {value:.4}");
        }
        println!("   Verdict:          {}", adf.verdict());
    }

    println!();
    match &report.outcome {
        ForecastOutcome::Produced { model, forecast, .. } => {
            print_model(model);
            println!();
            println!("🔮 Forecast ({} hours):", forecast.len());
            for point in forecast.points() {
                println!("   {}  {:>8.3}", point.timestamp, point.predicted_count);
            }
        }
        ForecastOutcome::Withheld { reason, .. } => {
            println!("⏭️  Forecast withheld: {reason}");
        }
        ForecastOutcome::Failed { .. } => {
            println!("⚠️  Forecast failed, see the error below");
        }
    }
}

fn print_model(model: &ModelSummary) {
    println!("🧮 {} fit:", model.model);
    println!("   const:            {:.4}", model.constant);
    for (i, coef) in model.ar.iter().enumerate() {
        println!("   ar.L{}:            {coef:.4}", i + 1);
    }
    for (i, coef) in model.ma.iter().enumerate() {
        println!("   ma.L{}:            {coef:.4}", i + 1);
    }
    println!("   sigma2:           {:.4}", model.sigma2);
    println!("   Log likelihood:   {:.3}", model.log_likelihood);
    println!("   AIC / BIC / HQIC: {:.3} / {:.3} / {:.3}", model.aic, model.bic, model.hqic);
    println!("   Observations:     {}", model.nobs);
}
