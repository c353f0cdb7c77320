use chrono::{DateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lease_npv_core::currency::ExchangeRateTable;
use lease_npv_core::Currency;

use crate::input;

/// Arguments for currency conversion
#[derive(Args)]
pub struct ConvertArgs {
    /// Amount in the source currency
    #[arg(long)]
    pub amount: Decimal,

    /// Source currency code
    #[arg(long, default_value = "USD")]
    pub from: String,

    /// Target currency code
    #[arg(long)]
    pub to: String,

    /// Exchange-rate table (JSON): {"rates": {"EUR": "0.92"}, "fetched_at": "..."}
    #[arg(long)]
    pub rates: String,
}

pub fn parse_currency(code: &str) -> Result<Currency, Box<dyn std::error::Error>> {
    Ok(code.parse::<Currency>()?)
}

/// Load the rate table, or an empty one when only USD is involved.
pub fn load_rates(
    path: Option<&str>,
    currency: &Currency,
) -> Result<ExchangeRateTable, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let table: ExchangeRateTable = input::file::read_structured(path)?;
            // staleness is logged, not fatal
            table.is_stale(Utc::now());
            Ok(table)
        }
        None if *currency == Currency::USD => Ok(ExchangeRateTable::new(Utc::now())),
        None => Err(format!("--rates <file> is required to report in {currency}").into()),
    }
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let from = parse_currency(&args.from)?;
    let to = parse_currency(&args.to)?;
    let table: ExchangeRateTable = input::file::read_structured(&args.rates)?;

    let now: DateTime<Utc> = Utc::now();
    let converted = table.convert(args.amount, &from, &to)?;

    Ok(json!({
        "result": {
            "converted": converted.round_dp(2),
            "amount": args.amount,
            "from": from.code(),
            "to": to.code(),
            "rates_as_of": table.fetched_at,
            "stale": table.is_stale(now),
        }
    }))
}
