use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lease_npv_core::cash_flows::{self, EscalationInput, EscalationType};
use lease_npv_core::lease_npv::{self, LeaseNpvInput};
use lease_npv_core::report::CashFlowReport;
use lease_npv_core::PaymentTiming;

use crate::commands::currency::{load_rates, parse_currency};
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IncreaseKind {
    Amount,
    Percent,
}

impl From<IncreaseKind> for EscalationType {
    fn from(kind: IncreaseKind) -> Self {
        match kind {
            IncreaseKind::Amount => EscalationType::Amount,
            IncreaseKind::Percent => EscalationType::Percent,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Timing {
    Beginning,
    Middle,
    End,
}

impl From<Timing> for PaymentTiming {
    fn from(timing: Timing) -> Self {
        match timing {
            Timing::Beginning => PaymentTiming::Beginning,
            Timing::Middle => PaymentTiming::Middle,
            Timing::End => PaymentTiming::End,
        }
    }
}

/// Rent and escalation flags shared by `cash-flows` and `npv`
#[derive(Args)]
pub struct EscalationArgs {
    /// Year-one rent per m² (USD)
    #[arg(long)]
    pub base_cash_flow: Option<Decimal>,

    /// Escalation step (currency amount or percentage points)
    #[arg(long, default_value = "0")]
    pub increase_value: Decimal,

    /// Whether the step is added or compounded
    #[arg(long, value_enum, default_value = "amount")]
    pub increase_type: IncreaseKind,

    /// Years between escalation steps
    #[arg(long, default_value = "1")]
    pub increase_frequency: u32,

    /// Lease horizon in whole years
    #[arg(long)]
    pub time_period: Option<u32>,
}

impl EscalationArgs {
    fn to_input(&self) -> Result<EscalationInput, Box<dyn std::error::Error>> {
        Ok(EscalationInput {
            base_cash_flow: self
                .base_cash_flow
                .ok_or("--base-cash-flow is required (or provide --input)")?,
            increase_value: self.increase_value,
            increase_type: self.increase_type.into(),
            increase_frequency: self.increase_frequency,
            time_period: self
                .time_period
                .ok_or("--time-period is required (or provide --input)")?,
        })
    }
}

/// Arguments for the yearly cash-flow projection
#[derive(Args)]
pub struct CashFlowArgs {
    #[command(flatten)]
    pub escalation: EscalationArgs,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for lease NPV
#[derive(Args)]
pub struct NpvArgs {
    #[command(flatten)]
    pub escalation: EscalationArgs,

    /// Annual discount rate in percent (e.g. 8 for 8%)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// When rent is paid within each lease year
    #[arg(long, value_enum, default_value = "end")]
    pub timing: Timing,

    /// Leased area in hectares
    #[arg(long)]
    pub area: Option<Decimal>,

    /// Display currency for the export report (e.g. EUR)
    #[arg(long)]
    pub currency: Option<String>,

    /// Exchange-rate table (JSON) used with --currency
    #[arg(long)]
    pub rates: Option<String>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_cash_flows(args: CashFlowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let esc: EscalationInput = match input::read_input(args.input.as_deref(), "cash-flow input")? {
        Some(esc) => esc,
        None => args.escalation.to_input()?,
    };

    let rates = cash_flows::escalated_rates(&esc)?;
    let flows = cash_flows::generate_cash_flows(&esc)?;
    let total: Decimal = flows
        .iter()
        .try_fold(Decimal::ZERO, |acc, cf| acc.checked_add(cf.amount))
        .ok_or("Total nominal rent exceeds the representable range")?;

    let rows: Vec<Value> = flows
        .iter()
        .zip(&rates)
        .map(|(cf, rate)| json!({ "year": cf.year, "rate_per_sqm": rate, "amount": cf.amount }))
        .collect();

    Ok(json!({
        "result": {
            "total_nominal": total,
            "years": flows.len(),
            "rows": rows,
        }
    }))
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let npv_input: LeaseNpvInput = match input::read_input(args.input.as_deref(), "lease NPV input")? {
        Some(parsed) => parsed,
        None => LeaseNpvInput {
            escalation: args.escalation.to_input()?,
            discount_rate: args
                .discount_rate
                .ok_or("--discount-rate is required (or provide --input)")?,
            payment_timing: args.timing.into(),
            area_hectares: args.area,
        },
    };

    let output = lease_npv::calculate_lease_npv(&npv_input)?;
    let mut value = serde_json::to_value(&output)?;

    if let Some(code) = args.currency.as_deref() {
        let currency = parse_currency(code)?;
        let table = load_rates(args.rates.as_deref(), &currency)?;
        let report = CashFlowReport::from_lease_npv(&output.result, &currency, &table)?;
        if let Value::Object(ref mut map) = value {
            map.insert("report".into(), serde_json::to_value(report)?);
        }
    }

    Ok(value)
}
