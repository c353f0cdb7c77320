//! Export rows for spreadsheets and printed reports.
//!
//! Reports are built from already-computed results; nothing here
//! re-derives escalation or discounting. Amounts are converted into the
//! display currency and rounded for presentation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::currency::ExchangeRateTable;
use crate::lease_npv::LeaseNpvOutput;
use crate::schedule::ScheduleAllocation;
use crate::types::{Currency, Money, PaymentTiming};
use crate::LeaseNpvResult;

const FACTOR_DP: u32 = 6;

fn money(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Lease cash-flow report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReportRow {
    pub year: u32,
    pub rate_per_sqm: Money,
    pub nominal_amount: Money,
    pub discount_factor: Decimal,
    pub present_value: Money,
    pub cumulative_present_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReport {
    pub currency: Currency,
    pub payment_timing: PaymentTiming,
    pub rows: Vec<CashFlowReportRow>,
    pub total_nominal: Money,
    pub npv: Money,
    pub rates_as_of: DateTime<Utc>,
}

impl CashFlowReport {
    pub fn from_lease_npv(
        output: &LeaseNpvOutput,
        currency: &Currency,
        rates: &ExchangeRateTable,
    ) -> LeaseNpvResult<Self> {
        let fx = rates.rate(currency)?;

        let rows = output
            .rows
            .iter()
            .map(|r| CashFlowReportRow {
                year: r.year,
                rate_per_sqm: r.rate_per_sqm * fx,
                nominal_amount: money(r.nominal_amount * fx),
                discount_factor: r.discount_factor.round_dp(FACTOR_DP),
                present_value: money(r.present_value * fx),
                cumulative_present_value: money(r.cumulative_present_value * fx),
            })
            .collect();

        Ok(Self {
            currency: currency.clone(),
            payment_timing: output.payment_timing,
            rows,
            total_nominal: money(output.total_nominal * fx),
            npv: money(output.npv * fx),
            rates_as_of: rates.fetched_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Installment schedule report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleReportRow {
    pub id: String,
    pub payment_date: NaiveDate,
    pub days_from_start: i64,
    pub percentage_of_deal: Decimal,
    pub amount_due: Money,
    pub present_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub currency: Currency,
    pub rows: Vec<ScheduleReportRow>,
    pub total_amount: Money,
    pub total_npv: Money,
    pub rates_as_of: DateTime<Utc>,
}

impl ScheduleReport {
    pub fn from_allocation(
        allocation: &ScheduleAllocation,
        currency: &Currency,
        rates: &ExchangeRateTable,
    ) -> LeaseNpvResult<Self> {
        let fx = rates.rate(currency)?;

        let rows: Vec<ScheduleReportRow> = allocation
            .installments
            .iter()
            .map(|i| ScheduleReportRow {
                id: i.id.clone(),
                payment_date: i.payment_date,
                days_from_start: i.days_from_start,
                percentage_of_deal: i.percentage_of_deal,
                amount_due: money(i.amount_due * fx),
                present_value: money(i.present_value * fx),
            })
            .collect();

        let total_amount = money(allocation.installments.iter().map(|i| i.amount_due).sum::<Money>() * fx);

        Ok(Self {
            currency: currency.clone(),
            rows,
            total_amount,
            total_npv: money(allocation.total_npv * fx),
            rates_as_of: rates.fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash_flows::{EscalationInput, EscalationType};
    use crate::lease_npv::{calculate_lease_npv, LeaseNpvInput};
    use crate::schedule::{allocate_schedule, InstallmentInput};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn rates() -> ExchangeRateTable {
        ExchangeRateTable::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .with_rate(Currency::EUR, dec!(0.5))
            .unwrap()
    }

    #[test]
    fn test_cash_flow_report_converts_amounts() {
        let out = calculate_lease_npv(&LeaseNpvInput {
            escalation: EscalationInput {
                base_cash_flow: dec!(1),
                increase_value: dec!(0),
                increase_type: EscalationType::Amount,
                increase_frequency: 1,
                time_period: 3,
            },
            discount_rate: dec!(0),
            payment_timing: PaymentTiming::End,
            area_hectares: None,
        })
        .unwrap()
        .result;

        let report = CashFlowReport::from_lease_npv(&out, &Currency::EUR, &rates()).unwrap();
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].nominal_amount, dec!(5000));
        assert_eq!(report.total_nominal, dec!(15000));
        assert_eq!(report.npv, dec!(15000));
        assert_eq!(report.rows[2].cumulative_present_value, dec!(15000));

        let usd = CashFlowReport::from_lease_npv(&out, &Currency::USD, &rates()).unwrap();
        assert_eq!(usd.npv, out.npv);
    }

    #[test]
    fn test_report_unknown_currency_fails() {
        let alloc = ScheduleAllocation {
            installments: vec![],
            total_npv: Decimal::ZERO,
        };
        assert!(ScheduleReport::from_allocation(&alloc, &Currency::GBP, &rates()).is_err());
    }

    #[test]
    fn test_schedule_report_totals() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let alloc = allocate_schedule(
            dec!(1000),
            start,
            dec!(5),
            &[
                InstallmentInput { id: "a".into(), payment_date: start, percentage: dec!(40) },
                InstallmentInput { id: "b".into(), payment_date: start, percentage: dec!(60) },
            ],
        )
        .unwrap();
        let report = ScheduleReport::from_allocation(&alloc, &Currency::EUR, &rates()).unwrap();
        assert_eq!(report.total_amount, dec!(500));
        assert_eq!(report.total_npv, dec!(500));
        assert_eq!(report.rows[1].amount_due, dec!(300));
    }
}
