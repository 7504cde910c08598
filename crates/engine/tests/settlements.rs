use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use engine::{
    Currency, Debt, Engine, Expense, Member, MemberId, Snapshot, SplitDetails, build_ledger,
    member_balances, net_all, resolve_shares, settlements,
};

fn on(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

fn trio() -> Vec<Member> {
    vec![
        Member::new("alice", "Alice"),
        Member::new("bob", "Bob"),
        Member::new("carol", "Carol"),
    ]
}

fn paid(id: &str, amount: Decimal, day: u32, payer: &str, split: SplitDetails) -> Expense {
    Expense::new(id, format!("expense {id}"), amount, on(day), Some(payer.into()), split)
}

fn summary(debts: &[Debt]) -> Vec<(&str, &str, Decimal)> {
    debts
        .iter()
        .map(|d| (d.from.as_str(), d.to.as_str(), d.amount))
        .collect()
}

#[test]
fn two_expenses_net_between_alice_and_bob() {
    let expenses = vec![
        paid("e1", dec!(300), 1, "alice", SplitDetails::equal(["alice", "bob", "carol"])),
        paid("e2", dec!(90), 2, "bob", SplitDetails::equal(["alice", "bob"])),
    ];

    let debts = settlements(&expenses, &trio());

    assert_eq!(
        summary(&debts),
        vec![("carol", "alice", dec!(100)), ("bob", "alice", dec!(55))]
    );

    let bob = &debts[1];
    assert_eq!(bob.history.len(), 2);
    assert_eq!(bob.history[0].expense_id.as_str(), "e2");
    assert_eq!(bob.history[0].amount, dec!(-45));
    assert!(bob.history[0].is_offset);
    assert_eq!(bob.history[1].amount, dec!(100));
    assert!(!bob.history[1].is_offset);
}

#[test]
fn percentage_split_records_only_the_borrower_share() {
    let members = vec![Member::new("a", "A"), Member::new("b", "B")];
    let expense = paid(
        "e1",
        dec!(100),
        1,
        "a",
        SplitDetails::percentage([("a", dec!(60)), ("b", dec!(40))]),
    );

    let shares = resolve_shares(&expense);
    assert_eq!(shares[&MemberId::from("a")], dec!(60));
    assert_eq!(shares[&MemberId::from("b")], dec!(40));

    let ledger = build_ledger(&[expense], &members);
    assert_eq!(ledger.gross(&"b".into(), &"a".into()), dec!(40));
    assert_eq!(ledger.gross(&"a".into(), &"b".into()), dec!(0));
}

#[test]
fn mutual_debts_produce_no_settlement() {
    let members = vec![Member::new("a", "A"), Member::new("b", "B")];
    let expenses = vec![
        paid("e1", dec!(25), 1, "a", SplitDetails::exact([("b", dec!(25))])),
        paid("e2", dec!(50), 2, "b", SplitDetails::equal(["a", "b"])),
    ];

    let ledger = build_ledger(&expenses, &members);
    assert_eq!(
        ledger.gross(&"a".into(), &"b".into()),
        ledger.gross(&"b".into(), &"a".into())
    );
    assert!(net_all(&ledger, Currency::Eur).is_empty());
}

#[test]
fn no_members_or_no_usable_expenses_settle_to_nothing() {
    let expenses = vec![paid("e1", dec!(10), 1, "alice", SplitDetails::equal(["alice", "bob"]))];
    assert!(settlements(&expenses, &[]).is_empty());
    assert!(settlements(&expenses, &[Member::new("alice", "Alice")]).is_empty());

    let unpaid = vec![Expense::new(
        "e1",
        "orphan",
        dec!(10),
        on(1),
        None,
        SplitDetails::equal(["alice", "bob"]),
    )];
    assert!(settlements(&unpaid, &trio()).is_empty());
}

#[test]
fn netting_is_deterministic() {
    let expenses = vec![
        paid("e1", dec!(10), 1, "carol", SplitDetails::equal(["alice", "bob", "carol"])),
        paid("e2", dec!(10), 1, "bob", SplitDetails::equal(["alice", "bob", "carol"])),
        paid("e3", dec!(33.33), 2, "alice", SplitDetails::exact([("bob", dec!(11.11)), ("carol", dec!(22.22))])),
        paid("e4", dec!(7), 3, "carol", SplitDetails::percentage([("alice", dec!(50)), ("bob", dec!(50))])),
    ];

    let first = settlements(&expenses, &trio());
    let second = settlements(&expenses, &trio());
    assert_eq!(first, second);

    let mut reversed_members = trio();
    reversed_members.reverse();
    let mut reversed_expenses = expenses.clone();
    reversed_expenses.reverse();
    let reordered = settlements(&reversed_expenses, &reversed_members);
    assert_eq!(summary(&first), summary(&reordered));
}

#[test]
fn net_positions_are_conserved() {
    let members = trio();
    let expenses = vec![
        paid("e1", dec!(100), 1, "alice", SplitDetails::equal(["alice", "bob", "carol"])),
        paid("e2", dec!(19.99), 2, "bob", SplitDetails::equal(["alice", "carol"])),
        paid("e3", dec!(40), 3, "carol", SplitDetails::percentage([("alice", dec!(12.5)), ("bob", dec!(87.5))])),
    ];

    let debts = settlements(&expenses, &members);
    let total: Decimal = member_balances(&members, &debts).iter().map(|b| b.net).sum();
    let tolerance = Decimal::from(members.len()) * dec!(0.01);
    assert!(total.abs() <= tolerance);
}

#[test]
fn amounts_are_rounded_only_on_output() {
    let members = vec![Member::new("a", "A"), Member::new("b", "B"), Member::new("c", "C")];
    // Each third is 3.333...; rounding per expense would give 3 x 3.33 = 9.99.
    let expenses: Vec<Expense> = (1..=3)
        .map(|i| paid(&format!("e{i}"), dec!(10), i, "a", SplitDetails::equal(["a", "b", "c"])))
        .collect();

    let debts = settlements(&expenses, &members);
    assert!(debts.iter().all(|d| d.amount == dec!(10.00)));
}

#[test]
fn engine_reports_dropped_references() {
    let snapshot = Snapshot::new(
        trio(),
        vec![
            paid("e1", dec!(30), 1, "alice", SplitDetails::equal(["alice", "bob", "mallory"])),
            paid("e2", dec!(30), 1, "mallory", SplitDetails::equal(["alice", "bob"])),
            paid("e3", dec!(30), 1, "alice", SplitDetails::Unrecognized),
        ],
    );

    let settlement = Engine::builder().build().unwrap().settle(&snapshot);

    assert_eq!(summary(&settlement.debts), vec![("bob", "alice", dec!(10))]);
    assert_eq!(settlement.diagnostics.unknown_borrowers, 1);
    assert_eq!(settlement.diagnostics.unknown_payers, 1);
    assert_eq!(settlement.diagnostics.malformed_splits, 1);
    assert_eq!(settlement.diagnostics.dropped_references(), 2);

    let alice = settlement
        .balances
        .iter()
        .find(|b| b.member_id.as_str() == "alice")
        .unwrap();
    assert_eq!(alice.net, dec!(10));
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = Engine::builder().currency(Currency::Usd).build().unwrap();
    let snapshot = Snapshot::new(
        trio(),
        vec![paid("e1", dec!(60), 1, "bob", SplitDetails::equal(["alice", "bob", "carol"]))],
    );

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.settle(&snapshot)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(results[0].debts.len(), 2);
}

#[test]
fn snapshot_from_stored_json_settles() {
    let raw = r#"{
        "members": [
            {"id": "m-alice", "displayName": "Alice"},
            {"id": "m-bob", "displayName": "Bob"}
        ],
        "expenses": [
            {
                "id": "x1",
                "description": "Groceries",
                "amount": "64.20",
                "date": "2024-04-02",
                "category": "Food",
                "paid_by_member_id": "m-alice",
                "split_details": {"type": "equal", "members": ["m-alice", "m-bob"]}
            },
            {
                "id": "x2",
                "description": "Legacy row",
                "amount": 12,
                "date": "2024-04-03T10:00:00",
                "paid_by_member_id": "m-bob",
                "split_details": {"type": "weights", "weights": {"m-alice": 1}}
            }
        ]
    }"#;

    let snapshot = Snapshot::from_json(raw).unwrap();
    let settlement = Engine::builder().build().unwrap().settle(&snapshot);

    assert_eq!(summary(&settlement.debts), vec![("m-bob", "m-alice", dec!(32.10))]);
    assert_eq!(settlement.diagnostics.malformed_splits, 1);
}

#[test]
fn oversized_amount_is_skipped_not_fatal() {
    let raw = r#"{
        "members": [{"id": "a", "display_name": "A"}, {"id": "b", "display_name": "B"}],
        "expenses": [
            {
                "id": "typo",
                "amount": "79228162514264337593543950335",
                "date": "2024-04-01",
                "paid_by": "a",
                "split": {"type": "percentage", "allocations": {"b": 60}}
            },
            {
                "id": "lunch",
                "amount": "24",
                "date": "2024-04-02",
                "paid_by": "a",
                "split": {"type": "equal", "members": ["a", "b"]}
            }
        ]
    }"#;

    let snapshot = Snapshot::from_json(raw).unwrap();
    let settlement = Engine::builder().build().unwrap().settle(&snapshot);

    assert_eq!(summary(&settlement.debts), vec![("b", "a", dec!(12))]);
    assert_eq!(settlement.diagnostics.overflowed_amounts, 1);
    assert_eq!(settlement.diagnostics.skipped_expenses(), 1);
}
