use engine::{
    Analytics, Currency, Debt, Engine, LedgerDiagnostics, MemberBalance, Period, Snapshot,
    available_years,
};
use serde::Serialize;

/// Everything the binary prints for one snapshot.
#[derive(Debug, Serialize)]
pub struct Report {
    pub currency: Currency,
    pub debts: Vec<Debt>,
    pub balances: Vec<MemberBalance>,
    pub diagnostics: LedgerDiagnostics,
    pub available_years: Vec<i32>,
    pub analytics: Analytics,
}

impl Report {
    pub fn build(engine: &Engine, snapshot: &Snapshot, period: Period) -> engine::ResultEngine<Self> {
        let settlement = engine.settle(snapshot);
        let analytics = engine.analytics(snapshot, period)?;

        Ok(Self {
            currency: engine.currency(),
            debts: settlement.debts,
            balances: settlement.balances,
            diagnostics: settlement.diagnostics,
            available_years: available_years(&snapshot.expenses),
            analytics,
        })
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
