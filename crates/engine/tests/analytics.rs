use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use engine::{
    Currency, Engine, EngineError, Expense, Member, MemberId, Period, Snapshot, SplitDetails,
    category_breakdown, daily_trend, member_stats, resolve_shares,
};

fn expense(id: &str, amount: Decimal, (y, m, d): (i32, u32, u32), category: &str) -> Expense {
    Expense::new(
        id,
        id,
        amount,
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
        Some("alice".into()),
        SplitDetails::equal(["alice", "bob"]),
    )
    .with_category(category)
}

fn members() -> Vec<Member> {
    vec![Member::new("alice", "Alice"), Member::new("bob", "Bob")]
}

#[test]
fn category_totals_are_sorted_by_amount() {
    let expenses = vec![
        expense("e1", dec!(50), (2024, 1, 1), "Food"),
        expense("e2", dec!(30), (2024, 1, 2), "Food"),
        expense("e3", dec!(20), (2024, 1, 3), "Transport"),
    ];

    let breakdown: Vec<(String, Decimal)> = category_breakdown(&expenses)
        .into_iter()
        .map(|c| (c.category, c.total))
        .collect();

    assert_eq!(
        breakdown,
        vec![
            ("Food".to_string(), dec!(80)),
            ("Transport".to_string(), dec!(20)),
        ]
    );
}

#[test]
fn trend_is_ascending_without_gap_filling() {
    let expenses = vec![
        expense("e1", dec!(5), (2024, 1, 10), "Food"),
        expense("e2", dec!(5), (2024, 1, 3), "Food"),
        expense("e3", dec!(2.5), (2024, 1, 10), "Fun"),
    ];

    let trend = daily_trend(&expenses);
    let dates: Vec<NaiveDate> = trend.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        ]
    );
    assert_eq!(trend[1].total, dec!(7.50));
}

#[test]
fn member_shares_match_the_resolver() {
    let members = vec![
        Member::new("alice", "Alice"),
        Member::new("bob", "Bob"),
        Member::new("carol", "Carol"),
    ];
    let expenses = vec![
        Expense::new(
            "e1",
            "rent",
            dec!(1000),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Some("bob".into()),
            SplitDetails::percentage([("alice", dec!(50)), ("bob", dec!(30)), ("carol", dec!(20))]),
        ),
        Expense::new(
            "e2",
            "internet",
            dec!(45),
            Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap(),
            Some("carol".into()),
            SplitDetails::equal(["alice", "bob", "carol"]),
        ),
    ];

    let stats = member_stats(&expenses, &members);

    let order: Vec<&str> = stats.iter().map(|s| s.member_id.as_str()).collect();
    assert_eq!(order, vec!["bob", "carol", "alice"]);

    let expected_alice: Decimal = expenses
        .iter()
        .filter_map(|e| resolve_shares(e).get(&MemberId::from("alice")).copied())
        .sum();
    let alice = stats.iter().find(|s| s.member_id.as_str() == "alice").unwrap();
    assert_eq!(alice.share, expected_alice);
    assert_eq!(alice.paid, dec!(0));

    let bob = &stats[0];
    assert_eq!(bob.display_name, "Bob");
    assert_eq!(bob.paid, dec!(1000));
    assert_eq!(bob.share, dec!(315));
}

#[test]
fn engine_analytics_filters_by_month() {
    let snapshot = Snapshot::new(
        members(),
        vec![
            expense("e1", dec!(10), (2023, 12, 31), "Food"),
            expense("e2", dec!(20), (2024, 1, 1), "Food"),
            expense("e3", dec!(30), (2024, 1, 31), ""),
            expense("e4", dec!(40), (2024, 2, 1), "Food"),
        ],
    );

    let engine = Engine::builder()
        .default_category("Misc")
        .build()
        .unwrap();
    let report = engine
        .analytics(&snapshot, "2024-01".parse().unwrap())
        .unwrap();

    assert_eq!(report.summary.expense_count, 2);
    assert_eq!(report.summary.total_spent, dec!(50));
    assert_eq!(report.categories[0].category, "Misc");
    assert_eq!(report.categories[1].category, "Food");
    assert_eq!(report.trend.len(), 2);
    assert_eq!(report.members[0].paid, dec!(50));
    assert_eq!(report.members[1].share, dec!(25));
    assert_eq!(report.summary.average_daily, dec!(25));
    assert_eq!(report.summary.top_spender, Some(MemberId::from("alice")));
}

#[test]
fn engine_analytics_survives_totals_beyond_decimal_range() {
    let big = Decimal::MAX / dec!(2) + dec!(1);
    let snapshot = Snapshot::new(
        members(),
        vec![
            expense("e1", big, (2024, 6, 1), "Rent"),
            expense("e2", big, (2024, 6, 2), "Rent"),
            expense("e3", dec!(12), (2024, 6, 2), "Food"),
        ],
    );

    let report = Engine::builder()
        .build()
        .unwrap()
        .analytics(&snapshot, Period::All)
        .unwrap();

    assert_eq!(report.summary.expense_count, 2);
    assert_eq!(report.trend.len(), 2);
    assert_eq!(report.categories[1].category, "Food");
}

#[test]
fn empty_period_has_zero_kpis() {
    let snapshot = Snapshot::new(members(), vec![expense("e1", dec!(10), (2024, 1, 5), "Food")]);
    let engine = Engine::builder().build().unwrap();
    let report = engine.analytics(&snapshot, "2023".parse().unwrap()).unwrap();

    assert_eq!(report.summary.expense_count, 0);
    assert_eq!(report.summary.average_daily, dec!(0));
    assert_eq!(report.summary.top_spender, None);
    assert!(report.trend.is_empty());
    assert!(report.members.iter().all(|m| m.paid == dec!(0)));
}

#[test]
fn engine_analytics_rejects_impossible_month() {
    let engine = Engine::builder().build().unwrap();
    let result = engine.analytics(&Snapshot::default(), Period::Month { year: 2024, month: 13 });
    assert!(matches!(result, Err(EngineError::InvalidPeriod(_))));
}

#[test]
fn totals_round_to_currency_units() {
    let snapshot = Snapshot::new(
        members(),
        vec![
            expense("e1", dec!(100.4), (2024, 5, 1), "Food"),
            expense("e2", dec!(0.2), (2024, 5, 1), "Food"),
        ],
    );
    let engine = Engine::builder().currency(Currency::Jpy).build().unwrap();
    let report = engine.analytics(&snapshot, Period::All).unwrap();

    assert_eq!(report.summary.total_spent, dec!(101));
    assert_eq!(report.members[0].share, dec!(50));
}

#[test]
fn blank_default_category_is_rejected() {
    assert!(matches!(
        Engine::builder().default_category("   ").build(),
        Err(EngineError::InvalidSetting(_))
    ));
}
