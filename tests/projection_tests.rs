use std::collections::HashMap;

use chrono::NaiveDate;
use forecast_core::ledger::{
    project, OperationKind, ProjectionTotals, Series, Split, SplitSet,
};
use forecast_core::schedule::{
    resolve_many, Frequency, ModificationSet, RecurrencePattern,
};
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn one_time_expense(account: Uuid, day: NaiveDate, amount: f64) -> Series {
    Series::new(
        "expense",
        RecurrencePattern::one_time(day),
        OperationKind::Expense,
        SplitSet::expense(vec![Split::new(account, amount)]),
    )
}

#[test]
fn test_single_expense_row() {
    let account = Uuid::new_v4();
    let series = one_time_expense(account, date(2024, 3, 1), 75.0);
    let occurrences = resolve_many(&[series], &ModificationSet::new(), date(2024, 12, 31));

    let balances = HashMap::from([(account, 500.0)]);
    let rows = project(&occurrences, &balances);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].account_id, account);
    assert_eq!(rows[0].previous_balance, 500.0);
    assert_eq!(rows[0].new_balance, 425.0);
    assert_eq!(rows[0].date, date(2024, 3, 1));
}

#[test]
fn test_transfer_emits_two_rows() {
    let checking = Uuid::new_v4();
    let savings = Uuid::new_v4();
    let transfer = Series::new(
        "monthly savings",
        RecurrencePattern::one_time(date(2024, 3, 1)),
        OperationKind::Transfer,
        SplitSet::transfer(
            vec![Split::new(checking, 200.0)],
            vec![Split::new(savings, 200.0)],
        ),
    );
    let occurrences = resolve_many(&[transfer], &ModificationSet::new(), date(2024, 12, 31));

    let balances = HashMap::from([(checking, 1000.0), (savings, 50.0)]);
    let rows = project(&occurrences, &balances);

    assert_eq!(rows.len(), 2);
    let origin = rows.iter().find(|row| row.account_id == checking).unwrap();
    assert_eq!(origin.previous_balance, 1000.0);
    assert_eq!(origin.new_balance, 800.0);
    let destination = rows.iter().find(|row| row.account_id == savings).unwrap();
    assert_eq!(destination.previous_balance, 50.0);
    assert_eq!(destination.new_balance, 250.0);
}

#[test]
fn test_balances_accumulate_chronologically() {
    let account = Uuid::new_v4();
    let rent = Series::new(
        "rent",
        RecurrencePattern::infinite(date(2024, 1, 1), Frequency::parse("1mo").unwrap()),
        OperationKind::Expense,
        SplitSet::expense(vec![Split::new(account, 100.0)]),
    );
    let occurrences = resolve_many(&[rent], &ModificationSet::new(), date(2024, 3, 1));

    let balances = HashMap::from([(account, 1000.0)]);
    let rows = project(&occurrences, &balances);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].previous_balance, 1000.0);
    assert_eq!(rows[0].new_balance, 900.0);
    assert_eq!(rows[1].previous_balance, 900.0);
    assert_eq!(rows[1].new_balance, 800.0);
    assert_eq!(rows[2].previous_balance, 800.0);
    assert_eq!(rows[2].new_balance, 700.0);
}

#[test]
fn test_income_credits_destination() {
    let account = Uuid::new_v4();
    let salary = Series::new(
        "salary",
        RecurrencePattern::one_time(date(2024, 1, 31)),
        OperationKind::Income,
        SplitSet::income(vec![Split::new(account, 2500.0)]),
    );
    let occurrences = resolve_many(&[salary], &ModificationSet::new(), date(2024, 12, 31));

    let rows = project(&occurrences, &HashMap::from([(account, 10.0)]));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].new_balance, 2510.0);
}

#[test]
fn test_missing_account_is_omitted_not_fatal() {
    let known = Uuid::new_v4();
    let unknown = Uuid::new_v4();
    let tracked = one_time_expense(known, date(2024, 1, 10), 40.0);
    let orphan = one_time_expense(unknown, date(2024, 1, 5), 99.0);

    let occurrences = resolve_many(
        &[tracked, orphan],
        &ModificationSet::new(),
        date(2024, 12, 31),
    );
    let balances = HashMap::from([(known, 100.0)]);
    let rows = project(&occurrences, &balances);

    // Only the tracked account's occurrence survives, unaffected by the
    // omitted one.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].account_id, known);
    assert_eq!(rows[0].previous_balance, 100.0);
    assert_eq!(rows[0].new_balance, 60.0);
}

#[test]
fn test_empty_input_yields_empty_output() {
    let rows = project(&[], &HashMap::new());
    assert!(rows.is_empty());
}

#[test]
fn test_projection_is_deterministic() {
    let checking = Uuid::new_v4();
    let savings = Uuid::new_v4();
    let rent = Series::new(
        "rent",
        RecurrencePattern::infinite(date(2024, 1, 1), Frequency::parse("1mo").unwrap()),
        OperationKind::Expense,
        SplitSet::expense(vec![Split::new(checking, 800.0)]),
    );
    let stash = Series::new(
        "stash",
        RecurrencePattern::infinite(date(2024, 1, 1), Frequency::parse("2w").unwrap()),
        OperationKind::Transfer,
        SplitSet::transfer(
            vec![Split::new(checking, 150.0)],
            vec![Split::new(savings, 150.0)],
        ),
    );
    let occurrences = resolve_many(
        &[rent, stash],
        &ModificationSet::new(),
        date(2024, 6, 30),
    );
    let balances = HashMap::from([(checking, 5000.0), (savings, 0.0)]);

    let first = project(&occurrences, &balances);
    let second = project(&occurrences, &balances);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_projection_totals_ignore_transfers() {
    let checking = Uuid::new_v4();
    let savings = Uuid::new_v4();
    let series = vec![
        one_time_expense(checking, date(2024, 1, 1), 120.0),
        Series::new(
            "salary",
            RecurrencePattern::one_time(date(2024, 1, 2)),
            OperationKind::Income,
            SplitSet::income(vec![Split::new(checking, 2000.0)]),
        ),
        Series::new(
            "stash",
            RecurrencePattern::one_time(date(2024, 1, 3)),
            OperationKind::Transfer,
            SplitSet::transfer(
                vec![Split::new(checking, 500.0)],
                vec![Split::new(savings, 500.0)],
            ),
        ),
    ];
    let occurrences = resolve_many(&series, &ModificationSet::new(), date(2024, 12, 31));

    let totals = ProjectionTotals::from_occurrences(&occurrences);
    assert_eq!(totals.occurrences, 3);
    assert_eq!(totals.projected_outflow, 120.0);
    assert_eq!(totals.projected_inflow, 2000.0);
    assert_eq!(totals.net, 1880.0);
}

#[test]
fn test_budgeted_monthly_uses_per_month_rate() {
    let account = Uuid::new_v4();
    let rent = Series::new(
        "rent",
        RecurrencePattern::infinite(date(2024, 1, 1), Frequency::parse("1mo").unwrap()),
        OperationKind::Expense,
        SplitSet::expense(vec![Split::new(account, 900.0)]),
    );
    assert!((rent.budgeted_monthly().unwrap() - 900.0).abs() < 1e-9);

    let one_off = one_time_expense(account, date(2024, 1, 1), 900.0);
    assert!(one_off.budgeted_monthly().is_none());
}
