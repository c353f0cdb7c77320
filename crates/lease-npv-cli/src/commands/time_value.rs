use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lease_npv_core::time_value;

/// Arguments for date-based discounting
#[derive(Args)]
pub struct DateValueArgs {
    /// Amount to move in time (USD)
    #[arg(long)]
    pub amount: Decimal,

    /// Annual discount rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Lease start / valuation date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Payment date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
}

fn elapsed(args: &DateValueArgs) -> Value {
    json!({
        "days": (args.date - args.start).num_days(),
        "years": time_value::years_between(args.start, args.date).round_dp(6),
    })
}

pub fn run_present_value(args: DateValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pv = time_value::present_value(args.amount, args.rate, args.start, args.date)?;
    Ok(json!({
        "result": {
            "present_value": pv,
            "future_value": args.amount,
            "elapsed": elapsed(&args),
        }
    }))
}

pub fn run_future_value(args: DateValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fv = time_value::future_value(args.amount, args.rate, args.start, args.date)?;
    Ok(json!({
        "result": {
            "future_value": fv,
            "present_value": args.amount,
            "elapsed": elapsed(&args),
        }
    }))
}
