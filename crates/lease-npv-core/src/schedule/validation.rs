//! Well-formedness checks for a custom installment schedule.
//!
//! Problems are collected as readable messages rather than errors: a
//! schedule with messages is simply not ready to submit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{allocate_schedule, InstallmentInput, ScheduleAllocation};
use crate::types::{Money, Percent};

/// Tolerances applied when reconciling a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePolicy {
    /// Allowed distance of the percentage total from 100, in percentage points
    pub percentage_sum_tolerance: Decimal,
    /// Allowed |NPV - deal value| as a fraction of the deal value
    pub npv_relative_tolerance: Decimal,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            percentage_sum_tolerance: dec!(0.01),
            npv_relative_tolerance: dec!(0.0001),
        }
    }
}

/// A schedule as entered, possibly incomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDraft {
    #[serde(default)]
    pub lease_start_date: Option<NaiveDate>,
    pub deal_value: Money,
    pub discount_rate: Percent,
    #[serde(default)]
    pub installments: Vec<InstallmentInput>,
}

/// Outcome of validating a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleValidation {
    pub errors: Vec<String>,
    pub total_percentage: Percent,
    /// Priced schedule, when start date, deal value and rate allow pricing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<ScheduleAllocation>,
    pub is_ready: bool,
}

impl ScheduleValidation {
    pub fn total_npv(&self) -> Option<Money> {
        self.allocation.as_ref().map(|a| a.total_npv)
    }
}

/// Check a draft against every schedule rule and price it when possible.
pub fn validate_schedule(draft: &ScheduleDraft, policy: &SchedulePolicy) -> ScheduleValidation {
    let mut errors: Vec<String> = Vec::new();

    if draft.lease_start_date.is_none() {
        errors.push("Lease start date is required".into());
    }
    let deal_ok = draft.deal_value > Decimal::ZERO;
    if !deal_ok {
        errors.push("Deal value must be greater than zero".into());
    }
    let rate_ok = draft.discount_rate >= Decimal::ZERO;
    if !rate_ok {
        errors.push("Discount rate cannot be negative".into());
    }
    if draft.installments.is_empty() {
        errors.push("Add at least one installment".into());
    }

    let summed = draft
        .installments
        .iter()
        .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.percentage));
    let total_percentage: Percent = summed.unwrap_or(Decimal::MAX);
    let sum_ok = summed
        .and_then(|total| total.checked_sub(dec!(100)))
        .is_some_and(|gap| gap.abs() <= policy.percentage_sum_tolerance);
    if !draft.installments.is_empty() && !sum_ok {
        errors.push(match summed {
            Some(total) => format!(
                "Installment percentages must total 100% (currently {}%)",
                total.round_dp(2)
            ),
            None => "Installment percentages must total 100% (currently out of range)".to_string(),
        });
    }

    if let Some(start) = draft.lease_start_date {
        for inst in draft.installments.iter().filter(|i| i.payment_date < start) {
            errors.push(format!(
                "Installment {} is due on {}, before the lease start date {}",
                inst.id, inst.payment_date, start
            ));
        }
    }

    for inst in &draft.installments {
        if inst.percentage <= Decimal::ZERO || inst.percentage > dec!(100) {
            errors.push(format!(
                "Installment {} percentage must be greater than 0% and at most 100% (got {}%)",
                inst.id, inst.percentage
            ));
        }
    }

    let allocation = match draft.lease_start_date {
        Some(start) if deal_ok && rate_ok && !draft.installments.is_empty() => {
            match allocate_schedule(draft.deal_value, start, draft.discount_rate, &draft.installments) {
                Ok(allocation) => Some(allocation),
                Err(e) => {
                    errors.push(format!("Schedule could not be priced: {e}"));
                    None
                }
            }
        }
        _ => None,
    };

    if let (Some(alloc), true) = (&allocation, sum_ok) {
        let tolerance = draft.deal_value.saturating_mul(policy.npv_relative_tolerance);
        let gap = (alloc.total_npv - draft.deal_value).abs();
        if gap > tolerance {
            errors.push(format!(
                "Present value of installments ({}) does not reconcile to the deal value ({}) within {}",
                alloc.total_npv.round_dp(2),
                draft.deal_value.round_dp(2),
                tolerance.round_dp(2)
            ));
        }
    }

    debug!(
        installments = draft.installments.len(),
        errors = errors.len(),
        total_percentage = %total_percentage,
        "schedule validated"
    );

    let is_ready = errors.is_empty();
    ScheduleValidation {
        errors,
        total_percentage,
        allocation,
        is_ready,
    }
}
