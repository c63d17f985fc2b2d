//! Command-line argument parsing for sqlview.

use clap::Parser;
use sqlview::config::ConnectionSettings;
use std::path::PathBuf;

/// How result tables are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Box-drawn text table.
    #[default]
    Text,
    /// Columns and rows as JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Run SQL against a database and view the result as a table.
#[derive(Parser, Debug)]
#[command(name = "sqlview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Connection URL (e.g., postgres://host:5432/sales or sqlite://sales.db)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Database user
    #[arg(short = 'U', long, value_name = "USER")]
    pub user: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run one query, print the result and exit
    #[arg(short = 'e', long, value_name = "SQL")]
    pub execute: Option<String>,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: String,

    /// Maximum width of text tables
    #[arg(long, value_name = "COLUMNS", default_value_t = 120)]
    pub width: usize,

    /// Query timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Open the session without the read-only guard
    #[arg(long)]
    pub writable: bool,

    /// Write logs to a file (default location if no path is given)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub log_file: Option<Option<PathBuf>>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Converts CLI arguments to connection settings.
    ///
    /// Returns None when no connection arguments were given.
    pub fn to_connection_settings(&self) -> Option<ConnectionSettings> {
        if self.url.is_none() && self.user.is_none() && !self.writable {
            return None;
        }

        Some(ConnectionSettings {
            url: self.url.clone().unwrap_or_default(),
            user: self.user.clone(),
            password: None, // Password comes from config or SQLVIEW_PASSWORD
            read_only: !self.writable,
        })
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(sqlview::config::Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Parses the output format from the --format argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.format.parse()
    }
}
