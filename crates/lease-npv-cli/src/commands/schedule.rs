use clap::Args;
use serde_json::Value;
use std::time::Instant;

use lease_npv_core::report::ScheduleReport;
use lease_npv_core::schedule::{validate_schedule, ScheduleDraft, SchedulePolicy};
use lease_npv_core::with_metadata;

use crate::commands::currency::{load_rates, parse_currency};
use crate::input;

/// Arguments for custom schedule pricing and validation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML schedule draft
    #[arg(long)]
    pub input: Option<String>,

    /// Tolerance policy file (JSON or YAML); defaults apply when omitted
    #[arg(long)]
    pub policy: Option<String>,

    /// Display currency for the export report (e.g. EUR)
    #[arg(long)]
    pub currency: Option<String>,

    /// Exchange-rate table (JSON) used with --currency
    #[arg(long)]
    pub rates: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let draft: ScheduleDraft = input::read_input(args.input.as_deref(), "schedule draft")?
        .ok_or("--input <file> or stdin required for schedule")?;

    let policy: SchedulePolicy = match args.policy.as_deref() {
        Some(path) => input::file::read_structured(path)?,
        None => SchedulePolicy::default(),
    };

    let validation = validate_schedule(&draft, &policy);
    let warnings = validation.errors.clone();

    let report = match (args.currency.as_deref(), validation.allocation.as_ref()) {
        (Some(code), Some(allocation)) => {
            let currency = parse_currency(code)?;
            let table = load_rates(args.rates.as_deref(), &currency)?;
            Some(ScheduleReport::from_allocation(allocation, &currency, &table)?)
        }
        _ => None,
    };

    let output = with_metadata(
        "Installments priced as a share of deal value, discounted to lease start over 365.25-day years",
        &policy,
        warnings,
        start.elapsed().as_micros() as u64,
        validation,
    );

    let mut value = serde_json::to_value(output)?;
    if let (Some(report), Value::Object(map)) = (report, &mut value) {
        map.insert("report".into(), serde_json::to_value(report)?);
    }
    Ok(value)
}
