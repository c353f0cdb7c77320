//! Custom installment schedules.
//!
//! A deal value is split into dated installments, each a percentage of the
//! deal. Every installment is discounted back to the lease start date with
//! [`time_value::present_value`], and the schedule's NPV is the sum.
//!
//! [`PaymentSchedule`] is the editable form: its totals are plain fields
//! refreshed by [`PaymentSchedule::recalculate_totals`] (the editing helpers
//! call it for you), and present values are refreshed by
//! [`PaymentSchedule::revalue`]. Days from start are kept current whenever
//! the schedule knows its lease start date.

pub mod validation;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LeaseNpvError;
use crate::time_value;
use crate::types::{Money, Percent};
use crate::LeaseNpvResult;

pub use validation::{validate_schedule, ScheduleDraft, SchedulePolicy, ScheduleValidation};

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An installment as entered: a date and a share of the deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentInput {
    pub id: String,
    pub payment_date: NaiveDate,
    /// Share of the deal value in percent
    pub percentage: Percent,
}

/// A priced installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: String,
    pub payment_date: NaiveDate,
    pub percentage_of_deal: Percent,
    pub amount_due: Money,
    /// Days from lease start to payment (negative if paid before start)
    pub days_from_start: i64,
    /// Amount due discounted back to the lease start date
    pub present_value: Money,
}

/// Priced installments and their combined present value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleAllocation {
    pub installments: Vec<Installment>,
    pub total_npv: Money,
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Price each installment against `deal_value` and discount it to
/// `lease_start` at `discount_rate` percent per year.
pub fn allocate_schedule(
    deal_value: Money,
    lease_start: NaiveDate,
    discount_rate: Percent,
    installments: &[InstallmentInput],
) -> LeaseNpvResult<ScheduleAllocation> {
    if deal_value <= Decimal::ZERO {
        return Err(LeaseNpvError::InvalidInput {
            field: "deal_value".into(),
            reason: "Deal value must be positive".into(),
        });
    }

    let mut priced = Vec::with_capacity(installments.len());
    let mut total_npv = Decimal::ZERO;

    for inst in installments {
        let amount_due = share_of_deal(inst.percentage, deal_value)?;
        let present_value =
            time_value::present_value(amount_due, discount_rate, lease_start, inst.payment_date)?;
        total_npv = total_npv
            .checked_add(present_value)
            .ok_or_else(|| LeaseNpvError::Overflow {
                context: format!("schedule NPV at installment {}", inst.id),
            })?;

        priced.push(Installment {
            id: inst.id.clone(),
            payment_date: inst.payment_date,
            percentage_of_deal: inst.percentage,
            amount_due,
            days_from_start: (inst.payment_date - lease_start).num_days(),
            present_value,
        });
    }

    Ok(ScheduleAllocation {
        installments: priced,
        total_npv,
    })
}

/// `percentage` percent of `deal_value`.
fn share_of_deal(percentage: Percent, deal_value: Money) -> LeaseNpvResult<Money> {
    (percentage / HUNDRED)
        .checked_mul(deal_value)
        .ok_or_else(|| LeaseNpvError::Overflow {
            context: format!("{percentage}% of a {deal_value} deal"),
        })
}

/// Equal shares on each date, summing to exactly 100%. The last share
/// absorbs the rounding remainder.
pub fn distribute_evenly(dates: &[NaiveDate]) -> Vec<InstallmentInput> {
    if dates.is_empty() {
        return Vec::new();
    }
    let n = Decimal::from(dates.len() as u64);
    let share = (HUNDRED / n).round_dp(2);
    let last = HUNDRED - share * (n - Decimal::ONE);

    dates
        .iter()
        .enumerate()
        .map(|(i, date)| InstallmentInput {
            id: format!("installment-{}", i + 1),
            payment_date: *date,
            percentage: if i + 1 == dates.len() { last } else { share },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Editable schedule
// ---------------------------------------------------------------------------

/// An editable schedule with caller-refreshed aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub deal_value: Money,
    /// Set by [`revalue`](Self::revalue) or [`with_lease_start`](Self::with_lease_start)
    #[serde(default)]
    pub lease_start: Option<NaiveDate>,
    pub installments: Vec<Installment>,
    pub total_percentage: Percent,
    pub total_amount: Money,
    /// Deal value not yet assigned to an installment
    pub remaining_amount: Money,
}

impl PaymentSchedule {
    pub fn new(deal_value: Money) -> Self {
        Self {
            deal_value,
            lease_start: None,
            installments: Vec::new(),
            total_percentage: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            remaining_amount: deal_value,
        }
    }

    pub fn with_lease_start(mut self, lease_start: NaiveDate) -> Self {
        self.lease_start = Some(lease_start);
        for inst in &mut self.installments {
            inst.days_from_start = (inst.payment_date - lease_start).num_days();
        }
        self
    }

    pub fn from_allocation(deal_value: Money, allocation: ScheduleAllocation) -> Self {
        let mut schedule = Self {
            installments: allocation.installments,
            ..Self::new(deal_value)
        };
        schedule.recalculate_totals();
        schedule
    }

    /// Refresh `total_percentage`, `total_amount` and `remaining_amount`.
    /// Totals saturate at the `Decimal` bounds.
    pub fn recalculate_totals(&mut self) {
        self.total_percentage = self
            .installments
            .iter()
            .fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.percentage_of_deal));
        self.total_amount = self
            .installments
            .iter()
            .fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.amount_due));
        self.remaining_amount = self.deal_value.saturating_sub(self.total_amount);
    }

    fn days_from_start(&self, payment_date: NaiveDate) -> i64 {
        self.lease_start
            .map(|start| (payment_date - start).num_days())
            .unwrap_or(0)
    }

    /// Append an installment; its present value stays at face value until
    /// the next [`revalue`](Self::revalue). Days from start are 0 while the
    /// lease start is unknown.
    pub fn add_installment(
        &mut self,
        id: impl Into<String>,
        payment_date: NaiveDate,
        percentage: Percent,
    ) -> LeaseNpvResult<()> {
        let id = id.into();
        if self.installments.iter().any(|i| i.id == id) {
            return Err(LeaseNpvError::InvalidInput {
                field: "id".into(),
                reason: format!("Installment '{id}' already exists"),
            });
        }
        let amount_due = share_of_deal(percentage, self.deal_value)?;
        let days_from_start = self.days_from_start(payment_date);
        self.installments.push(Installment {
            id,
            payment_date,
            percentage_of_deal: percentage,
            amount_due,
            days_from_start,
            present_value: amount_due,
        });
        self.recalculate_totals();
        Ok(())
    }

    pub fn remove_installment(&mut self, id: &str) -> Option<Installment> {
        let pos = self.installments.iter().position(|i| i.id == id)?;
        let removed = self.installments.remove(pos);
        self.recalculate_totals();
        Some(removed)
    }

    /// Edit the share of the deal; the amount due follows.
    pub fn set_percentage(&mut self, id: &str, percentage: Percent) -> LeaseNpvResult<()> {
        let amount_due = share_of_deal(percentage, self.deal_value)?;
        let inst = self.find_mut(id)?;
        inst.percentage_of_deal = percentage;
        inst.amount_due = amount_due;
        self.recalculate_totals();
        Ok(())
    }

    /// Edit the amount due; the share of the deal follows.
    pub fn set_amount(&mut self, id: &str, amount: Money) -> LeaseNpvResult<()> {
        if self.deal_value.is_zero() {
            return Err(LeaseNpvError::DivisionByZero {
                context: "percentage of a zero deal value".into(),
            });
        }
        let percentage = (amount / self.deal_value)
            .checked_mul(HUNDRED)
            .ok_or_else(|| LeaseNpvError::Overflow {
                context: format!("share of {amount} in a {} deal", self.deal_value),
            })?;
        let inst = self.find_mut(id)?;
        inst.amount_due = amount;
        inst.percentage_of_deal = percentage;
        self.recalculate_totals();
        Ok(())
    }

    /// Move an installment; its present value is stale until the next
    /// [`revalue`](Self::revalue).
    pub fn set_payment_date(&mut self, id: &str, payment_date: NaiveDate) -> LeaseNpvResult<()> {
        let days_from_start = self.days_from_start(payment_date);
        let inst = self.find_mut(id)?;
        inst.payment_date = payment_date;
        inst.days_from_start = days_from_start;
        Ok(())
    }

    /// Recompute days from start and present values; returns the total NPV.
    pub fn revalue(&mut self, lease_start: NaiveDate, discount_rate: Percent) -> LeaseNpvResult<Money> {
        self.lease_start = Some(lease_start);
        let mut total = Decimal::ZERO;
        for inst in &mut self.installments {
            inst.days_from_start = (inst.payment_date - lease_start).num_days();
            inst.present_value = time_value::present_value(
                inst.amount_due,
                discount_rate,
                lease_start,
                inst.payment_date,
            )?;
            total = total
                .checked_add(inst.present_value)
                .ok_or_else(|| LeaseNpvError::Overflow {
                    context: "schedule NPV".into(),
                })?;
        }
        Ok(total)
    }

    /// The schedule in entry form, for re-allocation or validation.
    pub fn inputs(&self) -> Vec<InstallmentInput> {
        self.installments
            .iter()
            .map(|i| InstallmentInput {
                id: i.id.clone(),
                payment_date: i.payment_date,
                percentage: i.percentage_of_deal,
            })
            .collect()
    }

    fn find_mut(&mut self, id: &str) -> LeaseNpvResult<&mut Installment> {
        self.installments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| LeaseNpvError::InvalidInput {
                field: "id".into(),
                reason: format!("No installment with id '{id}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inst(id: &str, payment_date: NaiveDate, percentage: Decimal) -> InstallmentInput {
        InstallmentInput {
            id: id.into(),
            payment_date,
            percentage,
        }
    }

    #[test]
    fn test_allocate_amounts_and_days() {
        let start = date(2024, 1, 1);
        let result = allocate_schedule(
            dec!(1000000),
            start,
            dec!(10),
            &[
                inst("a", start, dec!(30)),
                inst("b", date(2024, 6, 29), dec!(30)),
                inst("c", date(2024, 12, 31), dec!(40)),
            ],
        )
        .unwrap();

        let amounts: Vec<Decimal> = result.installments.iter().map(|i| i.amount_due).collect();
        assert_eq!(amounts, vec![dec!(300000), dec!(300000), dec!(400000)]);
        let days: Vec<i64> = result.installments.iter().map(|i| i.days_from_start).collect();
        assert_eq!(days, vec![0, 180, 365]);

        // day-zero installment is not discounted
        assert_eq!(result.installments[0].present_value, dec!(300000));
        assert!(result.installments[1].present_value < dec!(300000));

        let sum: Decimal = result.installments.iter().map(|i| i.present_value).sum();
        assert_eq!(result.total_npv, sum);
    }

    #[test]
    fn test_allocate_rejects_non_positive_deal() {
        let start = date(2024, 1, 1);
        let err = allocate_schedule(dec!(0), start, dec!(5), &[inst("a", start, dec!(100))]);
        assert!(err.is_err());
    }

    #[test]
    fn test_distribute_evenly_sums_to_hundred() {
        let dates = [date(2024, 1, 1), date(2024, 5, 1), date(2024, 9, 1)];
        let inputs = distribute_evenly(&dates);
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].percentage, dec!(33.33));
        assert_eq!(inputs[2].percentage, dec!(33.34));
        let total: Decimal = inputs.iter().map(|i| i.percentage).sum();
        assert_eq!(total, dec!(100));
        assert!(distribute_evenly(&[]).is_empty());
    }

    #[test]
    fn test_schedule_editing_keeps_amount_and_percentage_consistent() {
        let mut schedule = PaymentSchedule::new(dec!(200000));
        schedule.add_installment("a", date(2024, 1, 1), dec!(25)).unwrap();
        schedule.add_installment("b", date(2025, 1, 1), dec!(25)).unwrap();
        assert_eq!(schedule.total_amount, dec!(100000));
        assert_eq!(schedule.remaining_amount, dec!(100000));

        schedule.set_amount("b", dec!(150000)).unwrap();
        assert_eq!(schedule.installments[1].percentage_of_deal, dec!(75));
        assert_eq!(schedule.total_percentage, dec!(100));
        assert_eq!(schedule.remaining_amount, Decimal::ZERO);

        schedule.set_percentage("a", dec!(10)).unwrap();
        assert_eq!(schedule.installments[0].amount_due, dec!(20000));
        assert_eq!(schedule.total_percentage, dec!(85));
    }

    #[test]
    fn test_schedule_duplicate_and_missing_ids() {
        let mut schedule = PaymentSchedule::new(dec!(1000));
        schedule.add_installment("a", date(2024, 1, 1), dec!(50)).unwrap();
        assert!(schedule.add_installment("a", date(2024, 2, 1), dec!(50)).is_err());
        assert!(schedule.set_percentage("zzz", dec!(10)).is_err());
        assert!(schedule.remove_installment("zzz").is_none());
        assert!(schedule.remove_installment("a").is_some());
        assert_eq!(schedule.total_percentage, Decimal::ZERO);
        assert_eq!(schedule.remaining_amount, dec!(1000));
    }

    #[test]
    fn test_revalue_matches_allocation() {
        let start = date(2024, 3, 1);
        let inputs = vec![inst("a", date(2024, 9, 1), dec!(60)), inst("b", date(2025, 3, 1), dec!(40))];
        let allocation = allocate_schedule(dec!(50000), start, dec!(6), &inputs).unwrap();
        let expected = allocation.total_npv;

        let mut schedule = PaymentSchedule::from_allocation(dec!(50000), allocation);
        assert_eq!(schedule.inputs(), inputs);
        schedule.set_payment_date("a", date(2024, 9, 1)).unwrap();
        let total = schedule.revalue(start, dec!(6)).unwrap();
        assert_eq!(total, expected);
        assert_eq!(schedule.lease_start, Some(start));
    }

    #[test]
    fn test_days_from_start_follow_edits() {
        let start = date(2024, 1, 1);
        let mut schedule = PaymentSchedule::new(dec!(1000)).with_lease_start(start);
        schedule.add_installment("a", date(2024, 1, 31), dec!(50)).unwrap();
        assert_eq!(schedule.installments[0].days_from_start, 30);

        schedule.set_payment_date("a", date(2024, 3, 1)).unwrap();
        assert_eq!(schedule.installments[0].days_from_start, 60);

        let mut unanchored = PaymentSchedule::new(dec!(1000));
        unanchored.add_installment("a", date(2024, 3, 1), dec!(50)).unwrap();
        assert_eq!(unanchored.installments[0].days_from_start, 0);
        unanchored.revalue(start, dec!(5)).unwrap();
        assert_eq!(unanchored.installments[0].days_from_start, 60);
    }

    #[test]
    fn test_allocate_overflow_is_an_error() {
        let start = date(2024, 1, 1);
        let huge = dec!(50000000000000000000000000000);
        let err = allocate_schedule(dec!(1000000), start, dec!(5), &[inst("a", start, huge)]).unwrap_err();
        assert!(matches!(err, LeaseNpvError::Overflow { .. }));

        let mut schedule = PaymentSchedule::new(dec!(1000000));
        assert!(schedule.add_installment("a", start, huge).is_err());
        assert!(schedule.installments.is_empty());
    }
}
