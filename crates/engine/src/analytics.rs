//! Reporting projections over an expense snapshot.
//!
//! These views are independent of the netting: they only read expenses (and
//! the split resolver for member shares). Totals are summed unrounded and
//! rounded once on output.

use std::{collections::BTreeMap, collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Currency, EngineError, Expense, Member, MemberId, ResultEngine, Shares, money, split, util,
};

/// Label used for expenses without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Total spent in one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Total spent on one calendar day (UTC).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// What a member paid versus what they are responsible for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStat {
    pub member_id: MemberId,
    pub display_name: String,
    pub paid: Decimal,
    pub share: Decimal,
}

/// Headline figures for a set of expenses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_spent: Decimal,
    pub expense_count: usize,
    /// Total spent divided by the number of days with expenses.
    pub average_daily: Decimal,
    /// Member who paid the most, if anyone paid anything.
    pub top_spender: Option<MemberId>,
}

/// All projections for one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    pub period: Period,
    pub summary: Summary,
    pub categories: Vec<CategoryTotal>,
    pub trend: Vec<DailyTotal>,
    pub members: Vec<MemberStat>,
}

/// Reporting window.
///
/// Parses from `all`, `YYYY` or `YYYY-MM`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    #[default]
    All,
    Year { year: i32 },
    Month { year: i32, month: u32 },
}

impl Period {
    /// Half-open `[start, end)` date range; `None` for [`Period::All`].
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Period::All => None,
            Period::Year { year } => Some((
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?,
            )),
            Period::Month { year, month } => {
                let (next_year, next_month) = if month == 12 {
                    (year.checked_add(1)?, 1)
                } else {
                    (year, month + 1)
                };
                Some((
                    NaiveDate::from_ymd_opt(year, month, 1)?,
                    NaiveDate::from_ymd_opt(next_year, next_month, 1)?,
                ))
            }
        }
    }

    /// Whether `date` falls inside the period. A period without valid
    /// bounds contains nothing.
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        if *self == Period::All {
            return true;
        }
        self.bounds().is_some_and(|(start, end)| {
            let day = date.date_naive();
            start <= day && day < end
        })
    }

    /// Expenses falling inside the period, in their original order.
    pub fn filter(&self, expenses: &[Expense]) -> Vec<Expense> {
        expenses
            .iter()
            .filter(|expense| self.contains(expense.date))
            .cloned()
            .collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => f.write_str("all"),
            Period::Year { year } => write!(f, "{year:04}"),
            Period::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod(format!("expected all, YYYY or YYYY-MM, got '{s}'"));

        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Period::All);
        }

        let mut parts = trimmed.split('-');
        let year: i32 = parts
            .next()
            .filter(|p| p.len() == 4)
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let period = match parts.next() {
            None => Period::Year { year },
            Some(raw_month) => {
                let month: u32 = raw_month.parse().map_err(|_| invalid())?;
                if !(1..=12).contains(&month) {
                    return Err(EngineError::InvalidPeriod(format!(
                        "month must be 1-12, got {month}"
                    )));
                }
                Period::Month { year, month }
            }
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(period)
    }
}

/// An expense the projections count, with its resolved shares.
struct Counted<'a> {
    expense: &'a Expense,
    shares: Shares,
}

/// Expenses with a positive amount whose shares resolve and whose amount
/// keeps the running total inside [`Decimal`], in their original order.
/// Every per-category, per-day and per-payer sum is bounded by that total.
fn counted(expenses: &[Expense]) -> Vec<Counted<'_>> {
    let mut total = Decimal::ZERO;
    let mut selected = Vec::with_capacity(expenses.len());
    for expense in expenses {
        if expense.amount <= Decimal::ZERO {
            continue;
        }
        let Some(shares) = split::checked_shares(expense) else {
            continue;
        };
        let Some(next) = total.checked_add(expense.amount) else {
            tracing::debug!(expense = %expense.id, amount = %expense.amount, "expense overflows report totals");
            continue;
        };
        total = next;
        selected.push(Counted { expense, shares });
    }
    selected
}

/// Sums amounts per category, largest first.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    category_breakdown_with(&counted(expenses), UNCATEGORIZED, Currency::default())
}

fn category_breakdown_with(
    selected: &[Counted<'_>],
    default_label: &str,
    currency: Currency,
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for Counted { expense, .. } in selected {
        let label = util::normalize_label(expense.category.as_deref())
            .unwrap_or_else(|| default_label.to_string());
        let total = totals.entry(label).or_insert(Decimal::ZERO);
        *total = total.saturating_add(expense.amount);
    }

    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total: money::round_amount(total, currency),
        })
        .collect();
    breakdown.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    breakdown
}

/// Sums amounts per calendar day, oldest first. Days without expenses are
/// absent.
pub fn daily_trend(expenses: &[Expense]) -> Vec<DailyTotal> {
    daily_trend_with(&counted(expenses), Currency::default())
}

fn daily_totals(selected: &[Counted<'_>]) -> BTreeMap<NaiveDate, Decimal> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for Counted { expense, .. } in selected {
        let total = days.entry(expense.date.date_naive()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(expense.amount);
    }
    days
}

fn daily_trend_with(selected: &[Counted<'_>], currency: Currency) -> Vec<DailyTotal> {
    daily_totals(selected)
        .into_iter()
        .map(|(date, total)| DailyTotal {
            date,
            total: money::round_amount(total, currency),
        })
        .collect()
}

/// Paid and share totals per member, biggest payer first.
///
/// Shares come from the same resolver the ledger uses. Ids that are not
/// members are ignored.
pub fn member_stats(expenses: &[Expense], members: &[Member]) -> Vec<MemberStat> {
    member_stats_with(&counted(expenses), members, Currency::default())
}

fn member_stats_with(
    selected: &[Counted<'_>],
    members: &[Member],
    currency: Currency,
) -> Vec<MemberStat> {
    let mut stats: Vec<MemberStat> = Vec::with_capacity(members.len());
    let mut positions: HashMap<&MemberId, usize> = HashMap::with_capacity(members.len());
    for member in members {
        if positions.contains_key(&member.id) {
            continue;
        }
        positions.insert(&member.id, stats.len());
        stats.push(MemberStat {
            member_id: member.id.clone(),
            display_name: member.display_name.clone(),
            paid: Decimal::ZERO,
            share: Decimal::ZERO,
        });
    }

    for Counted { expense, shares } in selected {
        if let Some(&payer) = expense.paid_by.as_ref().and_then(|id| positions.get(id)) {
            stats[payer].paid = stats[payer].paid.saturating_add(expense.amount);
        }

        // Exact allocations are unbounded, so shares are applied all or nothing.
        let mut updated = Vec::with_capacity(shares.len());
        for (id, share) in shares {
            match positions.get(id) {
                Some(&position) => match stats[position].share.checked_add(*share) {
                    Some(total) => updated.push((position, total)),
                    None => {
                        tracing::debug!(expense = %expense.id, "shares overflow member totals");
                        updated.clear();
                        break;
                    }
                },
                None => tracing::debug!(expense = %expense.id, member = %id, "share of unknown member ignored"),
            }
        }
        for (position, total) in updated {
            stats[position].share = total;
        }
    }

    for stat in &mut stats {
        stat.paid = money::round_amount(stat.paid, currency);
        stat.share = money::round_amount(stat.share, currency);
    }
    stats.sort_by(|a, b| b.paid.cmp(&a.paid));
    stats
}

/// Total spent, number of counted expenses, average per active day and the
/// biggest payer among `members`.
pub fn summary(expenses: &[Expense], members: &[Member]) -> Summary {
    let selected = counted(expenses);
    let stats = member_stats_with(&selected, members, Currency::default());
    summary_with(&selected, &stats, Currency::default())
}

fn summary_with(selected: &[Counted<'_>], stats: &[MemberStat], currency: Currency) -> Summary {
    let total = selected
        .iter()
        .fold(Decimal::ZERO, |total, c| total.saturating_add(c.expense.amount));
    let days = daily_totals(selected).len();
    let average = if days == 0 {
        Decimal::ZERO
    } else {
        total.checked_div(Decimal::from(days)).unwrap_or_default()
    };

    Summary {
        total_spent: money::round_amount(total, currency),
        expense_count: selected.len(),
        average_daily: money::round_amount(average, currency),
        top_spender: stats
            .iter()
            .find(|stat| stat.paid > Decimal::ZERO)
            .map(|stat| stat.member_id.clone()),
    }
}

/// Distinct years with at least one counted expense, newest first.
pub fn available_years(expenses: &[Expense]) -> Vec<i32> {
    let mut years: Vec<i32> = counted(expenses)
        .iter()
        .map(|c| c.expense.date.year())
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

pub(crate) fn analytics_with(
    expenses: &[Expense],
    members: &[Member],
    period: Period,
    default_label: &str,
    currency: Currency,
) -> ResultEngine<Analytics> {
    if period.bounds().is_none() && period != Period::All {
        return Err(EngineError::InvalidPeriod(period.to_string()));
    }
    let in_period = period.filter(expenses);
    let selected = counted(&in_period);
    let members = member_stats_with(&selected, members, currency);
    Ok(Analytics {
        period,
        summary: summary_with(&selected, &members, currency),
        categories: category_breakdown_with(&selected, default_label, currency),
        trend: daily_trend_with(&selected, currency),
        members,
    })
}
