//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`ExportFormat`] - Export format option, convertible to [`crate::format::OutputFormat`]

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ForecastConfig, StationarityConfig};
use crate::error::Result;
use crate::format::OutputFormat;

/// Default transcript location, relative to the working directory.
pub const DEFAULT_INPUT: &str = "Data/WhatsApp_data.txt";

/// Analyse a WhatsApp group-chat export and forecast hourly message volume.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatcast")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatcast
    chatcast chat.txt -n 48
    chatcast chat.txt --forecast-out forecast.csv --series-out series.csv
    chatcast chat.txt --heatmap-out activity.json
    chatcast chat.txt -f json --series-out series.out
    chatcast chat.txt --json > report.json")]
pub struct Args {
    /// Path to the exported transcript
    #[arg(default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Number of hours to forecast
    #[arg(short = 'n', long, default_value_t = 20)]
    pub periods: usize,

    /// Format of the export files [default: from each file's extension]
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Write the forecast table to this file
    #[arg(long, value_name = "PATH")]
    pub forecast_out: Option<PathBuf>,

    /// Write the hourly message counts to this file
    #[arg(long, value_name = "PATH")]
    pub series_out: Option<PathBuf>,

    /// Write the sender × hour activity matrix to this file
    #[arg(long, value_name = "PATH")]
    pub heatmap_out: Option<PathBuf>,

    /// p-value at or below which the series counts as stationary
    #[arg(long, default_value_t = 0.05)]
    pub significance: f64,

    /// Upper bound of the ADF lag search
    #[arg(long, value_name = "LAGS")]
    pub max_lag: Option<usize>,

    /// Print the full report as JSON instead of the console summary
    #[arg(long)]
    pub json: bool,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds the analysis configuration from the arguments.
    pub fn analysis_config(&self) -> AnalysisConfig {
        let mut stationarity = StationarityConfig::new().with_significance(self.significance);
        if let Some(max_lag) = self.max_lag {
            stationarity = stationarity.with_max_lag(max_lag);
        }
        AnalysisConfig::new()
            .with_stationarity(stationarity)
            .with_forecast(ForecastConfig::new().with_horizon(self.periods))
    }

    /// Format for the export at `path`: `--format` if given, else the
    /// file extension.
    pub fn output_format(&self, path: &Path) -> Result<OutputFormat> {
        match self.format {
            Some(format) => Ok(format.into()),
            None => OutputFormat::from_path(path),
        }
    }
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values with a header line
    #[default]
    Csv,

    /// JSON array of row objects
    Json,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Json => write!(f, "JSON"),
        }
    }
}

// Conversion to library format type
impl From<ExportFormat> for OutputFormat {
    fn from(format: ExportFormat) -> OutputFormat {
        match format {
            ExportFormat::Csv => OutputFormat::Csv,
            ExportFormat::Json => OutputFormat::Json,
        }
    }
}
