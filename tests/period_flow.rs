use budget_period::{
    auto_split_limit, category_stats, split_by_days, validate_split, CategoryLimit,
    DistributionType, FinancialMonth, PeriodAllocation, Settings, Transaction,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

const TRANSACTIONS: &str = r#"[
    { "id": "1", "type": "expense", "amount": 150, "currency": "UAH", "categoryId": "food",
      "date": "2024-03-06", "description": "", "status": "done" },
    { "id": "2", "type": "expense", "amount": 90.5, "currency": "UAH", "categoryId": "food",
      "date": "2024-03-18", "description": "", "status": "planned" },
    { "id": "3", "type": "expense", "amount": 200, "currency": "UAH", "categoryId": "fun",
      "date": "2024-03-18", "description": "", "status": "done" },
    { "id": "4", "type": "expense", "amount": 40, "currency": "UAH", "categoryId": "food",
      "date": "2024-04-04", "description": "", "status": "done" },
    { "id": "5", "type": "expense", "amount": 75, "currency": "UAH", "categoryId": "food",
      "date": "2024-04-05", "description": "", "status": "done" }
]"#;

#[test]
fn financial_month_scenario() {
    init();

    let range = FinancialMonth::new(3, 2024, 5).unwrap().range();
    assert_eq!(range.start(), ymd(2024, 3, 5));
    assert_eq!(range.end(), ymd(2024, 4, 4));
    assert_eq!(range.days(), 31);

    let month = FinancialMonth::new(3, 2024, 5).unwrap();
    assert_eq!(month.period(99), None);
}

#[test]
fn uniform_split_scenario() {
    init();

    let split = auto_split_limit(dec!(100), 3, None).unwrap();
    let amounts: Vec<Decimal> = split.iter().map(|a| a.amount).collect();
    assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
}

#[test]
fn split_month_and_track_spending() {
    init();

    let mut settings = Settings::default();
    settings.set_financial_month_start(5);
    let month = settings.financial_month(3, 2024).unwrap();

    let periods = month.all_periods();
    let split = split_by_days(dec!(1000), &periods).unwrap();
    let amounts: Vec<Decimal> = split.iter().map(|a| a.amount).collect();
    assert_eq!(
        amounts,
        vec![dec!(161.29), dec!(225.80), dec!(225.80), dec!(225.80), dec!(161.31)]
    );
    assert_eq!(amounts.iter().sum::<Decimal>(), dec!(1000));

    let limit = CategoryLimit::split_by_days(dec!(1000), &month).unwrap();
    assert_eq!(limit.limits_by_period(), Some(&split[..]));

    let transactions: Vec<Transaction> = serde_json::from_str(TRANSACTIONS).unwrap();
    let stats = category_stats("food", &limit, &transactions, &month);

    assert_eq!(stats.spent, dec!(280.5));
    let spent: Vec<Decimal> = stats.periods.iter().map(|p| p.spent).collect();
    assert_eq!(
        spent,
        vec![dec!(150), Decimal::ZERO, dec!(90.5), Decimal::ZERO, dec!(40)]
    );
    assert!(stats.periods[0].status().is_near_limit);
    assert!(!stats.periods[0].status().is_over_limit);

    let today = ymd(2024, 3, 20);
    let current = month.current_period_index(today).unwrap();
    assert_eq!(current, 3);
    assert!(periods[current as usize - 1].contains(today));
}

#[test]
fn hand_edited_split_survives_storage() {
    init();

    let month = FinancialMonth::new(3, 2024, 5).unwrap();
    let limit = CategoryLimit::split_by_days(dec!(500), &month).unwrap();

    let edited = limit
        .with_allocations(
            vec![
                PeriodAllocation::new(1, dec!(50)),
                PeriodAllocation::new(2, dec!(100)),
                PeriodAllocation::new(3, dec!(100)),
                PeriodAllocation::new(4, dec!(100)),
                PeriodAllocation::new(5, dec!(150)),
            ],
            DistributionType::Weighted,
        )
        .unwrap();
    assert!(validate_split(
        edited.monthly_limit(),
        edited.limits_by_period().unwrap()
    ));

    let blob = serde_json::to_string(&edited).unwrap();
    let restored: CategoryLimit = serde_json::from_str(&blob).unwrap();
    assert_eq!(restored, edited);
    assert!(restored.is_valid());

    // A broken edit is refused and the stored split is untouched
    let broken = restored.with_allocations(
        vec![PeriodAllocation::new(1, dec!(499))],
        DistributionType::Uniform,
    );
    assert!(broken.is_err());
    assert_eq!(restored.period_limit(5), Some(dec!(150)));
}

#[test]
fn changing_start_day_reinterprets_periods() {
    init();

    let mut settings = Settings::default();
    let before = settings.financial_month(3, 2024).unwrap().all_periods();

    settings.set_financial_month_start(1);
    let after = settings.financial_month(3, 2024).unwrap().all_periods();

    assert_ne!(before, after);
    assert_eq!(after.first().unwrap().start(), ymd(2024, 3, 1));
    assert_eq!(after.last().unwrap().end(), ymd(2024, 3, 31));
}
