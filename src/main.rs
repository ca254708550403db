use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mortgage_site::api::{render_results_text, run_calculator_json, run_http_server};
use mortgage_site::config::{ConfigOverrides, load_config};
use mortgage_site::core::Calculator;
use mortgage_site::error::{ApiError, CalculatorError};

#[derive(Parser, Debug)]
#[command(
    name = "mortgage_site",
    version,
    about = "Mortgage brokerage site: content pages and loan calculators"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Configuration file (TOML).
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one calculator and print its results.
    Calc {
        #[arg(value_enum)]
        calculator: CliCalculator,
        /// camelCase JSON inputs; omitted fields use the form defaults.
        #[arg(long, default_value = "{}")]
        input: String,
        /// Print the JSON response instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCalculator {
    Affordability,
    VaPurchase,
    VaRefinance,
    Dscr,
}

impl From<CliCalculator> for Calculator {
    fn from(value: CliCalculator) -> Self {
        match value {
            CliCalculator::Affordability => Calculator::Affordability,
            CliCalculator::VaPurchase => Calculator::VaPurchase,
            CliCalculator::VaRefinance => Calculator::VaRefinance,
            CliCalculator::Dscr => Calculator::Dscr,
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    match Cli::parse().command {
        Command::Serve { config, host, port } => {
            let overrides = ConfigOverrides {
                config_file: config,
                host,
                port,
            };
            let config = match load_config(&overrides) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    return ExitCode::FAILURE;
                }
            };
            init_tracing(&config.log_filter);
            tracing::info!(
                host = %config.host,
                port = config.port,
                cache_max_age_secs = config.cache_max_age_secs,
                "configuration loaded"
            );
            if let Err(e) = run_http_server(config).await {
                tracing::error!(error = %e, "server error");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Command::Calc {
            calculator,
            input,
            json,
        } => {
            init_tracing("warn");
            match run_calculator_json(calculator.into(), &input) {
                Ok(response) if json => match serde_json::to_string_pretty(&response) {
                    Ok(text) => {
                        println!("{text}");
                        ExitCode::SUCCESS
                    }
                    Err(e) => {
                        eprintln!("Failed to encode response: {e}");
                        ExitCode::FAILURE
                    }
                },
                Ok(response) => {
                    print!("{}", render_results_text(&response));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    if let ApiError::Calculator(CalculatorError::Validation(fields)) = &e {
                        for (field, message) in fields.iter() {
                            eprintln!("  {field}: {message}");
                        }
                    }
                    ExitCode::FAILURE
                }
            }
        }
    }
}
