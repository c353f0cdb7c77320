use chrono::{Days, NaiveDate};
use lease_npv_core::schedule::{
    allocate_schedule, distribute_evenly, validate_schedule, InstallmentInput, PaymentSchedule,
    ScheduleDraft, SchedulePolicy,
};
use lease_npv_core::time_value;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn after(days: u64) -> NaiveDate {
    start().checked_add_days(Days::new(days)).unwrap()
}

fn inst(id: &str, days: u64, percentage: Decimal) -> InstallmentInput {
    InstallmentInput {
        id: id.into(),
        payment_date: after(days),
        percentage,
    }
}

// ===========================================================================
// Date-based discounting
// ===========================================================================

#[test]
fn test_present_value_round_trip() {
    for (rate, days) in [(dec!(0), 400u64), (dec!(4.5), 90), (dec!(18), 3650)] {
        let pv = time_value::present_value(dec!(765432.10), rate, start(), after(days)).unwrap();
        let fv = time_value::future_value(pv, rate, start(), after(days)).unwrap();
        assert!((fv - dec!(765432.10)).abs() < dec!(0.01), "rate {rate}, days {days}: {fv}");
    }
}

#[test]
fn test_zero_elapsed_time_is_face_value() {
    for rate in [dec!(0), dec!(3), dec!(50)] {
        assert_eq!(
            time_value::present_value(dec!(42), rate, start(), start()).unwrap(),
            dec!(42)
        );
    }
}

// ===========================================================================
// Allocation and reconciliation
// ===========================================================================

#[test]
fn test_nominal_split_does_not_reconcile_at_ten_percent() {
    let draft = ScheduleDraft {
        lease_start_date: Some(start()),
        deal_value: dec!(1000000),
        discount_rate: dec!(10),
        installments: vec![
            inst("first", 0, dec!(30)),
            inst("second", 180, dec!(30)),
            inst("third", 365, dec!(40)),
        ],
    };

    let v = validate_schedule(&draft, &SchedulePolicy::default());
    let npv = v.total_npv().unwrap();
    assert!(npv < dec!(999900), "NPV {npv} should fall short of the deal value");
    assert!(!v.is_ready);
    assert_eq!(v.errors.len(), 1);
    assert!(v.errors[0].contains("does not reconcile"));
}

#[test]
fn test_schedule_grossed_up_for_discounting_reconciles() {
    // Each installment's share is its target present value grossed up to the
    // payment date, so the schedule's NPV lands on the deal value.
    let deal = dec!(1000000);
    let targets = [(0u64, dec!(300000)), (180, dec!(300000)), (365, dec!(400000))];

    let mut installments = Vec::new();
    for (i, (days, pv_target)) in targets.iter().enumerate() {
        let due = time_value::future_value(*pv_target, dec!(10), start(), after(*days)).unwrap();
        installments.push(inst(&format!("i{i}"), *days, due / deal * dec!(100)));
    }

    let alloc = allocate_schedule(deal, start(), dec!(10), &installments).unwrap();
    assert!((alloc.total_npv - deal).abs() <= deal * dec!(0.0001));

    // Shares exceed 100% nominally, so the percentage rule still flags it.
    let v = validate_schedule(
        &ScheduleDraft {
            lease_start_date: Some(start()),
            deal_value: deal,
            discount_rate: dec!(10),
            installments,
        },
        &SchedulePolicy::default(),
    );
    assert!(v.errors.iter().any(|e| e.contains("must total 100%")));
}

#[test]
fn test_zero_rate_even_split_is_ready() {
    let dates = [after(0), after(30), after(60), after(90)];
    let draft = ScheduleDraft {
        lease_start_date: Some(start()),
        deal_value: dec!(250000),
        discount_rate: Decimal::ZERO,
        installments: distribute_evenly(&dates),
    };
    let v = validate_schedule(&draft, &SchedulePolicy::default());
    assert!(v.is_ready, "{:?}", v.errors);
    assert_eq!(v.total_percentage, dec!(100));
    assert_eq!(v.total_npv(), Some(dec!(250000)));
}

#[test]
fn test_payment_schedule_tracks_remaining_amount() {
    let alloc = allocate_schedule(
        dec!(90000),
        start(),
        dec!(6),
        &[inst("a", 0, dec!(50)), inst("b", 200, dec!(20))],
    )
    .unwrap();
    let mut schedule = PaymentSchedule::from_allocation(dec!(90000), alloc);
    assert_eq!(schedule.total_percentage, dec!(70));
    assert_eq!(schedule.remaining_amount, dec!(27000));

    schedule.add_installment("c", after(400), dec!(30)).unwrap();
    assert_eq!(schedule.remaining_amount, Decimal::ZERO);

    let npv = schedule.revalue(start(), dec!(6)).unwrap();
    assert!(npv < dec!(90000));
    assert_eq!(schedule.installments[2].days_from_start, 400);
}
