//! Discounting primitives shared by the lease projection and the
//! custom installment schedule.
//!
//! Two clocks are supported: integer lease years (with a payment-timing
//! offset) and calendar dates measured in 365.25-day years.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LeaseNpvError;
use crate::types::{CashFlow, Money, PaymentTiming, Percent, Years};
use crate::LeaseNpvResult;

/// Average calendar year length used for date-based discounting.
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

const HUNDRED: Decimal = dec!(100);

fn validate_rate(rate: Percent) -> LeaseNpvResult<()> {
    if rate < Decimal::ZERO {
        return Err(LeaseNpvError::InvalidInput {
            field: "discount_rate".into(),
            reason: format!("Discount rate must be zero or positive, got {rate}%"),
        });
    }
    Ok(())
}

/// `(1 + rate/100)^years`, for a non-negative annual rate in percent.
pub fn growth_factor(rate: Percent, years: Years) -> LeaseNpvResult<Decimal> {
    validate_rate(rate)?;
    if years.is_zero() || rate.is_zero() {
        return Ok(Decimal::ONE);
    }

    let base = Decimal::ONE + rate / HUNDRED;
    let magnitude = years.abs();
    let raised = if magnitude.fract().is_zero() {
        magnitude.to_i64().and_then(|n| base.checked_powi(n))
    } else {
        base.checked_powd(magnitude)
    }
    .ok_or_else(|| LeaseNpvError::Overflow {
        context: format!("growth factor at {rate}% over {years} years"),
    })?;

    if years.is_sign_negative() {
        if raised.is_zero() {
            return Err(LeaseNpvError::DivisionByZero {
                context: "negative-period growth factor".into(),
            });
        }
        return Ok(Decimal::ONE / raised);
    }
    Ok(raised)
}

/// `1 / (1 + rate/100)^years`
pub fn discount_factor(rate: Percent, years: Years) -> LeaseNpvResult<Decimal> {
    let growth = growth_factor(rate, years)?;
    if growth.is_zero() {
        return Err(LeaseNpvError::DivisionByZero {
            context: format!("discount factor at {rate}% over {years} years"),
        });
    }
    Ok(Decimal::ONE / growth)
}

/// Elapsed time between two dates in 365.25-day years. Negative when
/// `end` precedes `start`.
pub fn years_between(start: NaiveDate, end: NaiveDate) -> Years {
    Decimal::from((end - start).num_days()) / DAYS_PER_YEAR
}

/// Net present value of year-indexed cash flows.
///
/// Each flow is discounted over `year - timing.exponent_offset()` years.
pub fn npv(
    cash_flows: &[CashFlow],
    discount_rate: Percent,
    timing: PaymentTiming,
) -> LeaseNpvResult<Money> {
    validate_rate(discount_rate)?;
    let offset = timing.exponent_offset();

    let mut total = Decimal::ZERO;
    for cf in cash_flows {
        let periods = Decimal::from(cf.year) - offset;
        let pv = cf.amount * discount_factor(discount_rate, periods)?;
        total = total.checked_add(pv).ok_or_else(|| LeaseNpvError::Overflow {
            context: format!("NPV through year {}", cf.year),
        })?;
    }
    Ok(total)
}

/// Present value of `future` paid on `payment_date`, seen from `start_date`.
///
/// Payments on or before the start date are worth their face value.
pub fn present_value(
    future: Money,
    discount_rate: Percent,
    start_date: NaiveDate,
    payment_date: NaiveDate,
) -> LeaseNpvResult<Money> {
    validate_rate(discount_rate)?;
    if payment_date <= start_date {
        return Ok(future);
    }
    let years = years_between(start_date, payment_date);
    Ok(future * discount_factor(discount_rate, years)?)
}

/// Inverse of [`present_value`]: the amount due on `payment_date` whose
/// present value at `start_date` is `present`.
pub fn future_value(
    present: Money,
    discount_rate: Percent,
    start_date: NaiveDate,
    payment_date: NaiveDate,
) -> LeaseNpvResult<Money> {
    validate_rate(discount_rate)?;
    if payment_date <= start_date {
        return Ok(present);
    }
    let years = years_between(start_date, payment_date);
    present
        .checked_mul(growth_factor(discount_rate, years)?)
        .ok_or_else(|| LeaseNpvError::Overflow {
            context: format!("future value of {present} on {payment_date}"),
        })
}
