//! Lease NPV: escalating rent projection discounted to present value.
//!
//! Combines [`crate::cash_flows`] and [`crate::time_value`] into a single
//! per-year table. Export and display layers consume this table rather
//! than re-deriving the arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::cash_flows::{self, EscalationInput};
use crate::error::LeaseNpvError;
use crate::time_value;
use crate::types::{with_metadata, CashFlow, ComputationOutput, Money, PaymentTiming, Percent};
use crate::LeaseNpvResult;

/// Input for a lease NPV calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseNpvInput {
    /// Rent and escalation terms (per m², per year)
    #[serde(flatten)]
    pub escalation: EscalationInput,
    /// Annual discount rate in percent
    pub discount_rate: Percent,
    /// When in each lease year rent is paid
    #[serde(default)]
    pub payment_timing: PaymentTiming,
    /// Leased area in hectares (defaults to one hectare)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_hectares: Option<Decimal>,
}

/// One lease year of the projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseNpvRow {
    pub year: u32,
    /// Escalated rent per m² in force this year
    pub rate_per_sqm: Money,
    /// Rent for the whole leased area
    pub nominal_amount: Money,
    pub discount_factor: Decimal,
    pub present_value: Money,
    pub cumulative_present_value: Money,
}

/// Result of a lease NPV calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseNpvOutput {
    pub rows: Vec<LeaseNpvRow>,
    /// Undiscounted rent over the horizon
    pub total_nominal: Money,
    /// Net present value of all rent
    pub npv: Money,
    pub area_hectares: Decimal,
    pub payment_timing: PaymentTiming,
}

impl LeaseNpvOutput {
    /// The nominal flows behind this result, in year order.
    pub fn cash_flows(&self) -> Vec<CashFlow> {
        self.rows
            .iter()
            .map(|r| CashFlow {
                year: r.year,
                amount: r.nominal_amount,
            })
            .collect()
    }
}

/// Project the lease rent, discount every year, and total the result.
pub fn calculate_lease_npv(
    input: &LeaseNpvInput,
) -> LeaseNpvResult<ComputationOutput<LeaseNpvOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let area = input.area_hectares.unwrap_or(Decimal::ONE);
    if area <= Decimal::ZERO {
        return Err(LeaseNpvError::InvalidInput {
            field: "area_hectares".into(),
            reason: "Leased area must be positive".into(),
        });
    }

    let esc = &input.escalation;
    let rates = cash_flows::escalated_rates(esc)?;

    if esc.base_cash_flow.is_zero() {
        warnings.push("Base cash flow is zero; every year's rent is zero".into());
    }
    if input.discount_rate.is_zero() {
        warnings.push("Discount rate is zero; NPV equals total nominal rent".into());
    }
    if esc.increase_frequency >= esc.time_period && !esc.increase_value.is_zero() {
        warnings.push(format!(
            "Escalation every {} years never applies within a {}-year lease",
            esc.increase_frequency, esc.time_period
        ));
    }

    let offset = input.payment_timing.exponent_offset();
    let mut rows = Vec::with_capacity(rates.len());
    let mut cumulative = Decimal::ZERO;
    let mut total_nominal = Decimal::ZERO;

    for (rate_per_sqm, year) in rates.into_iter().zip(1u32..) {
        let overflow = || LeaseNpvError::Overflow {
            context: format!("lease year {year} rent"),
        };
        let nominal_amount = cash_flows::hectare_amount(rate_per_sqm)?
            .checked_mul(area)
            .ok_or_else(overflow)?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let df = time_value::discount_factor(input.discount_rate, Decimal::from(year) - offset)?;
        let present_value = nominal_amount * df;

        cumulative = cumulative.checked_add(present_value).ok_or_else(overflow)?;
        total_nominal = total_nominal.checked_add(nominal_amount).ok_or_else(overflow)?;

        rows.push(LeaseNpvRow {
            year,
            rate_per_sqm,
            nominal_amount,
            discount_factor: df,
            present_value,
            cumulative_present_value: cumulative,
        });
    }

    let output = LeaseNpvOutput {
        rows,
        total_nominal,
        npv: cumulative,
        area_hectares: area,
        payment_timing: input.payment_timing,
    };

    debug!(
        years = output.rows.len(),
        total_nominal = %output.total_nominal,
        npv = %output.npv,
        "lease npv computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Escalating lease rent, per-m² rate × 10,000 per hectare, discounted annually",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash_flows::EscalationType;
    use rust_decimal_macros::dec;

    fn base_input() -> LeaseNpvInput {
        LeaseNpvInput {
            escalation: EscalationInput {
                base_cash_flow: dec!(2),
                increase_value: dec!(5),
                increase_type: EscalationType::Percent,
                increase_frequency: 1,
                time_period: 10,
            },
            discount_rate: dec!(8),
            payment_timing: PaymentTiming::End,
            area_hectares: None,
        }
    }

    #[test]
    fn test_npv_matches_time_value_npv() {
        let out = calculate_lease_npv(&base_input()).unwrap();
        let direct = time_value::npv(&out.result.cash_flows(), dec!(8), PaymentTiming::End).unwrap();
        assert!((out.result.npv - direct).abs() < dec!(0.0001));
    }

    #[test]
    fn test_rows_and_totals() {
        let out = calculate_lease_npv(&base_input()).unwrap().result;
        assert_eq!(out.rows.len(), 10);
        assert_eq!(out.rows[0].nominal_amount, dec!(20000));
        assert_eq!(out.rows[1].nominal_amount, dec!(21000));
        let sum: Decimal = out.rows.iter().map(|r| r.nominal_amount).sum();
        assert_eq!(out.total_nominal, sum);
        assert_eq!(out.rows.last().unwrap().cumulative_present_value, out.npv);
        assert!(out.npv < out.total_nominal);
    }

    #[test]
    fn test_area_scales_amounts() {
        let mut input = base_input();
        input.area_hectares = Some(dec!(2.5));
        let out = calculate_lease_npv(&input).unwrap().result;
        assert_eq!(out.rows[0].nominal_amount, dec!(50000));
        assert_eq!(out.area_hectares, dec!(2.5));
    }

    #[test]
    fn test_non_positive_area_rejected() {
        let mut input = base_input();
        input.area_hectares = Some(Decimal::ZERO);
        assert!(calculate_lease_npv(&input).is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut input = base_input();
        input.escalation.base_cash_flow = dec!(100000000000000000000);
        input.area_hectares = Some(dec!(10000000000));
        let err = calculate_lease_npv(&input).unwrap_err();
        assert!(matches!(err, LeaseNpvError::Overflow { .. }));

        let mut input = base_input();
        input.escalation.increase_value = dec!(10);
        input.escalation.time_period = 1000;
        assert!(matches!(
            calculate_lease_npv(&input),
            Err(LeaseNpvError::Overflow { .. })
        ));
    }

    #[test]
    fn test_warnings() {
        let mut input = base_input();
        input.discount_rate = Decimal::ZERO;
        input.escalation.increase_frequency = 10;
        let out = calculate_lease_npv(&input).unwrap();
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.result.npv, out.result.total_nominal);
    }

    #[test]
    fn test_input_deserializes_flat() {
        let json = r#"{
            "base_cash_flow": "3",
            "increase_value": "1",
            "increase_type": "amount",
            "increase_frequency": 3,
            "time_period": 6,
            "discount_rate": "10",
            "payment_timing": "beginning"
        }"#;
        let input: LeaseNpvInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.escalation.time_period, 6);
        assert_eq!(input.payment_timing, PaymentTiming::Beginning);
        let out = calculate_lease_npv(&input).unwrap().result;
        assert_eq!(out.rows[0].present_value, dec!(30000));
    }
}
