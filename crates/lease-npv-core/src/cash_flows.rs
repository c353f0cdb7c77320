//! Year-indexed lease cash-flow projection with discrete escalation.
//!
//! Rents are quoted per square metre per year and reported per hectare.
//! Escalations land on lease-year boundaries only: with a frequency of
//! `k` years the rate steps up in years `1 + k`, `1 + 2k`, ... and is
//! flat in between.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LeaseNpvError;
use crate::types::{CashFlow, Money};
use crate::LeaseNpvResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Square metres per hectare.
pub const SQM_PER_HECTARE: Decimal = dec!(10000);

const MONEY_DP: u32 = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How an escalation step is applied to the running rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationType {
    /// Add `increase_value` to the per-m² rate
    #[default]
    Amount,
    /// Grow the per-m² rate by `increase_value` percent
    Percent,
}

/// Parameters of an escalating lease rent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationInput {
    /// Year-one rent per square metre
    pub base_cash_flow: Money,
    /// Size of each escalation step (currency or percentage points)
    pub increase_value: Decimal,
    /// Whether the step is additive or multiplicative
    #[serde(default)]
    pub increase_type: EscalationType,
    /// Years between escalation steps
    pub increase_frequency: u32,
    /// Lease horizon in whole years
    pub time_period: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Per-square-metre rate for each lease year, `time_period` entries long.
///
/// Returns [`LeaseNpvError::Overflow`] when compounding outgrows `Decimal`.
pub fn escalated_rates(input: &EscalationInput) -> LeaseNpvResult<Vec<Money>> {
    validate_input(input)?;

    let growth = Decimal::ONE + input.increase_value / dec!(100);
    let mut rate = input.base_cash_flow;
    let mut rates = Vec::with_capacity(input.time_period as usize);

    for year in 1..=input.time_period {
        if year > 1 && (year - 1) % input.increase_frequency == 0 {
            rate = match input.increase_type {
                EscalationType::Amount => rate.checked_add(input.increase_value),
                EscalationType::Percent => rate.checked_mul(growth),
            }
            .ok_or_else(|| LeaseNpvError::Overflow {
                context: format!("escalated rate in lease year {year}"),
            })?;
        }
        rates.push(rate);
    }

    Ok(rates)
}

/// Nominal per-hectare cash flow for years `1..=time_period`.
pub fn generate_cash_flows(input: &EscalationInput) -> LeaseNpvResult<Vec<CashFlow>> {
    escalated_rates(input)?
        .into_iter()
        .zip(1u32..)
        .map(|(rate, year)| {
            Ok(CashFlow {
                year,
                amount: hectare_amount(rate)?,
            })
        })
        .collect()
}

/// Convert a per-m² rate into a per-hectare amount, rounded to cents and
/// floored at zero.
pub fn hectare_amount(rate_per_sqm: Money) -> LeaseNpvResult<Money> {
    let amount = rate_per_sqm
        .checked_mul(SQM_PER_HECTARE)
        .ok_or_else(|| LeaseNpvError::Overflow {
            context: format!("per-hectare amount for a rate of {rate_per_sqm} per m²"),
        })?;
    Ok(amount
        .round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &EscalationInput) -> LeaseNpvResult<()> {
    if input.base_cash_flow < Decimal::ZERO {
        return Err(LeaseNpvError::InvalidInput {
            field: "base_cash_flow".into(),
            reason: "Base cash flow cannot be negative".into(),
        });
    }
    if input.increase_value < Decimal::ZERO {
        return Err(LeaseNpvError::InvalidInput {
            field: "increase_value".into(),
            reason: "Escalation step cannot be negative".into(),
        });
    }
    if input.increase_frequency == 0 {
        return Err(LeaseNpvError::InvalidInput {
            field: "increase_frequency".into(),
            reason: "Escalation frequency must be at least one year".into(),
        });
    }
    if input.time_period == 0 {
        return Err(LeaseNpvError::InvalidInput {
            field: "time_period".into(),
            reason: "Lease horizon must be at least one year".into(),
        });
    }
    Ok(())
}
