//! sqlview - run SQL against a database and view the result as a table.

mod cli;

use std::io::{IsTerminal, Write};

use anyhow::Context;
use cli::{Cli, OutputFormat};
use sqlview::app::{AppState, Status};
use sqlview::config::{Config, ConnectionSettings};
use sqlview::error::{Result, SqlViewError};
use sqlview::logging;
use sqlview::query::QueryRunner;
use sqlview::render;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    match &cli.log_file {
        Some(path) => {
            let path = path.clone().unwrap_or_else(logging::default_log_path);
            logging::init_file_logging(&path);
        }
        None => logging::init_stderr_logging(),
    }

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            match e.downcast_ref::<SqlViewError>() {
                Some(err) => error!("{}: {}", err.category(), err),
                None => error!("{e:#}"),
            }
            std::process::exit(1);
        }
    }
}

/// Output settings shared by every printed result.
struct Printer {
    format: OutputFormat,
    width: usize,
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let format = cli.parse_output_format().map_err(SqlViewError::config)?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let settings = resolve_connection(&cli, &config)?;
    info!("Connection: {}", settings.display_string());

    let timeout = match cli.timeout {
        Some(secs) => (secs > 0).then(|| std::time::Duration::from_secs(secs)),
        None => config.query.timeout(),
    };

    let mut runner = QueryRunner::new(settings, timeout);
    let mut state = AppState::new(config.query.default.clone());
    let printer = Printer {
        format,
        width: cli.width,
    };

    if let Some(query) = &cli.execute {
        state.set_query_text(query.clone());
        state.submit(&mut runner).await;
        printer.print(&state)?;
        let failed = matches!(state.status(), Some(Status::Failed { .. }));
        return Ok(if failed { 1 } else { 0 });
    }

    run_interactive(&mut state, &mut runner, &printer).await?;
    Ok(0)
}

/// Reads one query per line from stdin until EOF or `.quit`.
async fn run_interactive(
    state: &mut AppState,
    runner: &mut QueryRunner,
    printer: &Printer,
) -> anyhow::Result<()> {
    let interactive = std::io::stdin().is_terminal();
    if interactive {
        println!("Connected as {}", runner.settings().display_string());
        println!("Enter a query per line, .run for the current query, .reset or .quit");
        println!("Current query:\n{}", state.query_text());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("sqlview> ");
            std::io::stdout().flush().context("Failed to write prompt")?;
        }

        let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read from stdin")?
        else {
            break;
        };

        match line.trim() {
            "" => continue,
            ".quit" | ".exit" => break,
            ".reset" => {
                state.reset();
                println!("{}", state.query_text());
            }
            ".run" => {
                state.submit(runner).await;
                printer.print(state)?;
            }
            query => {
                state.set_query_text(query);
                state.submit(runner).await;
                printer.print(state)?;
            }
        }
    }

    Ok(())
}

impl Printer {
    /// Prints the table or the failure recorded by the last submit.
    fn print(&self, state: &AppState) -> Result<()> {
        match state.status() {
            Some(Status::Failed {
                category,
                message,
                reset,
            }) => {
                eprintln!("{category}: {message}");
                if *reset {
                    eprintln!("Query reset to default:\n{}", state.query_text());
                }
            }
            _ => {
                if let Some(table) = state.table() {
                    match self.format {
                        OutputFormat::Text => {
                            for line in render::render_table(table, self.width) {
                                println!("{line}");
                            }
                        }
                        OutputFormat::Json => println!("{}", render::render_json(table)?),
                    }
                }
            }
        }
        Ok(())
    }
}

/// Resolves the final connection settings from CLI args, config file, and environment.
///
/// Precedence: CLI arguments, then the named connection, then the default
/// connection, then SQLVIEW_* environment variables.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionSettings> {
    let mut settings = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            SqlViewError::config(format!("Connection '{}' not found in config file", name))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    if let Some(cli_settings) = cli.to_connection_settings() {
        settings.merge(&cli_settings);
    }

    settings.apply_env_defaults();

    if settings.url.is_empty() {
        return Err(SqlViewError::config(
            "No database connection configured. Pass a URL, use --connection, or set SQLVIEW_URL",
        ));
    }

    Ok(settings)
}
