//! Deterministic financial scoring core.
//!
//! Every function in this module tree is a pure transformation over its inputs and the
//! static rule/action catalogs, so it can be called from any number of request handlers
//! without synchronization.

pub mod alerts;
pub mod chi;
pub mod loan;
pub mod simulator;

pub use alerts::{
    alert_counts, evaluate_alerts, evaluate_alerts_at, AlertCounts, FinancialProfileSnapshot,
    Severity, TriggeredAlert,
};
pub use chi::{
    calculate_chi, chi_breakdown, risk_level, ChiBreakdown, ChiComponent, ChiInputs, ChiResult,
    RiskLevel,
};
pub use loan::{
    calculate_emi, calculate_emi_to_income_ratio, calculate_total_interest, compare_tenures,
    format_inr, loan_recommendation, LoanQuote, LoanTerms, TenureOption,
};
pub use simulator::{
    simulate_action, simulation_action, simulation_actions, Direction, SimulationAction,
    SimulationError, SimulationResult,
};

/// Rounds to `places` decimals, breaking exact ties toward the even neighbour.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
