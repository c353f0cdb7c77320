mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::currency::ConvertArgs;
use commands::projection::{CashFlowArgs, NpvArgs};
use commands::schedule::ScheduleArgs;
use commands::time_value::DateValueArgs;

/// Lease cash-flow, NPV and installment schedule calculations
#[derive(Parser)]
#[command(
    name = "lease-npv",
    version,
    about = "Lease cash-flow, NPV and installment schedule calculations",
    long_about = "Projects escalating lease rent (quoted per m², reported per hectare), \
                  discounts it to net present value, and prices custom installment \
                  schedules against a deal value. All arithmetic uses decimal precision \
                  in USD; other currencies are applied to reports only."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project yearly lease cash flows with escalation
    CashFlows(CashFlowArgs),
    /// Net present value of an escalating lease
    Npv(NpvArgs),
    /// Discount an amount from a payment date back to a start date
    PresentValue(DateValueArgs),
    /// Grow an amount from a start date forward to a payment date
    FutureValue(DateValueArgs),
    /// Price and validate a custom installment schedule
    Schedule(ScheduleArgs),
    /// Convert an amount between currencies using a rate table
    Convert(ConvertArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::CashFlows(args) => commands::projection::run_cash_flows(args),
        Commands::Npv(args) => commands::projection::run_npv(args),
        Commands::PresentValue(args) => commands::time_value::run_present_value(args),
        Commands::FutureValue(args) => commands::time_value::run_future_value(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Convert(args) => commands::currency::run_convert(args),
        Commands::Version => {
            println!("lease-npv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
