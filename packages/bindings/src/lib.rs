use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lease_npv_core::currency::ExchangeRateTable;
use lease_npv_core::schedule::{InstallmentInput, ScheduleDraft, SchedulePolicy};
use lease_npv_core::Currency;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_cash_flows(input_json: String) -> NapiResult<String> {
    let input: lease_npv_core::cash_flows::EscalationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease_npv_core::cash_flows::generate_cash_flows(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_lease_npv(input_json: String) -> NapiResult<String> {
    let input: lease_npv_core::lease_npv::LeaseNpvInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        lease_npv_core::lease_npv::calculate_lease_npv(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Date-based discounting
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DateValueInput {
    amount: Decimal,
    discount_rate: Decimal,
    lease_start_date: NaiveDate,
    payment_date: NaiveDate,
}

#[derive(Serialize)]
struct DateValueOutput {
    value: Decimal,
    years: Decimal,
}

fn date_value(
    input_json: &str,
    f: fn(Decimal, Decimal, NaiveDate, NaiveDate) -> lease_npv_core::LeaseNpvResult<Decimal>,
) -> NapiResult<String> {
    let input: DateValueInput = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let value = f(
        input.amount,
        input.discount_rate,
        input.lease_start_date,
        input.payment_date,
    )
    .map_err(to_napi_error)?;
    let years = lease_npv_core::time_value::years_between(input.lease_start_date, input.payment_date);
    serde_json::to_string(&DateValueOutput { value, years }).map_err(to_napi_error)
}

#[napi]
pub fn present_value(input_json: String) -> NapiResult<String> {
    date_value(&input_json, lease_npv_core::time_value::present_value)
}

#[napi]
pub fn future_value(input_json: String) -> NapiResult<String> {
    date_value(&input_json, lease_npv_core::time_value::future_value)
}

// ---------------------------------------------------------------------------
// Installment schedules
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AllocateInput {
    deal_value: Decimal,
    lease_start_date: NaiveDate,
    discount_rate: Decimal,
    installments: Vec<InstallmentInput>,
}

#[napi]
pub fn allocate_schedule(input_json: String) -> NapiResult<String> {
    let input: AllocateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease_npv_core::schedule::allocate_schedule(
        input.deal_value,
        input.lease_start_date,
        input.discount_rate,
        &input.installments,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn distribute_evenly(dates_json: String) -> NapiResult<String> {
    let dates: Vec<NaiveDate> = serde_json::from_str(&dates_json).map_err(to_napi_error)?;
    let output = lease_npv_core::schedule::distribute_evenly(&dates);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ValidateInput {
    #[serde(flatten)]
    draft: ScheduleDraft,
    #[serde(default)]
    policy: SchedulePolicy,
}

#[napi]
pub fn validate_schedule(input_json: String) -> NapiResult<String> {
    let input: ValidateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease_npv_core::schedule::validate_schedule(&input.draft, &input.policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ConvertInput {
    amount: Decimal,
    from: String,
    to: String,
    rates: ExchangeRateTable,
}

#[napi]
pub fn convert_currency(input_json: String) -> NapiResult<String> {
    let input: ConvertInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let from: Currency = input.from.parse().map_err(to_napi_error)?;
    let to: Currency = input.to.parse().map_err(to_napi_error)?;
    let converted = input
        .rates
        .convert(input.amount, &from, &to)
        .map_err(to_napi_error)?;
    serde_json::to_string(&converted).map_err(to_napi_error)
}
