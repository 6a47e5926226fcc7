use serde::{Deserialize, Serialize};

use super::round_to;

const CREDIT_SCORE_CEILING: f64 = 900.0;
const LOAN_COUNT_CEILING: f64 = 10.0;
const MISSED_PAYMENT_CEILING: f64 = 5.0;

const CREDIT_SCORE_WEIGHT: u8 = 40;
const EMI_RATIO_WEIGHT: u8 = 30;
const ACTIVE_LOANS_WEIGHT: u8 = 15;
const PAYMENT_HISTORY_WEIGHT: u8 = 15;

const LOW_RISK_FLOOR: u32 = 70;
const MEDIUM_RISK_FLOOR: u32 = 40;

/// Three-tier classification of a Credit Health Index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Classifies a CHI: 70 and above is low risk, 40..70 medium, anything lower high.
pub fn risk_level(chi: u32) -> RiskLevel {
    if chi >= LOW_RISK_FLOOR {
        RiskLevel::Low
    } else if chi >= MEDIUM_RISK_FLOOR {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

// The credit component is not clamped; scores outside 300..=900 are the caller's problem.
fn credit_component(credit_score: u32) -> f64 {
    f64::from(credit_score) / CREDIT_SCORE_CEILING * f64::from(CREDIT_SCORE_WEIGHT)
}

fn emi_component(emi_to_income_ratio: f64) -> f64 {
    ((1.0 - emi_to_income_ratio / 100.0) * f64::from(EMI_RATIO_WEIGHT)).max(0.0)
}

fn loan_component(active_loans: u32) -> f64 {
    ((1.0 - f64::from(active_loans) / LOAN_COUNT_CEILING) * f64::from(ACTIVE_LOANS_WEIGHT))
        .max(0.0)
}

fn payment_component(missed_payments: u32) -> f64 {
    ((1.0 - f64::from(missed_payments) / MISSED_PAYMENT_CEILING)
        * f64::from(PAYMENT_HISTORY_WEIGHT))
    .max(0.0)
}

/// Weighted composite of the four components, rounded half to even.
///
/// `chi(900, 0.0, 1, 0)` sums to exactly 98.5 and therefore yields 98.
pub fn calculate_chi(
    credit_score: u32,
    emi_to_income_ratio: f64,
    active_loans: u32,
    missed_payments: u32,
) -> u32 {
    let total = credit_component(credit_score)
        + emi_component(emi_to_income_ratio)
        + loan_component(active_loans)
        + payment_component(missed_payments);

    total.round_ties_even().max(0.0) as u32
}

/// Per-component view of the CHI with one-decimal scores for display.
pub fn chi_breakdown(
    credit_score: u32,
    emi_to_income_ratio: f64,
    active_loans: u32,
    missed_payments: u32,
) -> ChiBreakdown {
    ChiBreakdown {
        credit_score: ChiComponent::new(
            credit_score,
            credit_component(credit_score),
            CREDIT_SCORE_WEIGHT,
        ),
        emi_ratio: ChiComponent::new(
            emi_to_income_ratio,
            emi_component(emi_to_income_ratio),
            EMI_RATIO_WEIGHT,
        ),
        active_loans: ChiComponent::new(
            active_loans,
            loan_component(active_loans),
            ACTIVE_LOANS_WEIGHT,
        ),
        missed_payments: ChiComponent::new(
            missed_payments,
            payment_component(missed_payments),
            PAYMENT_HISTORY_WEIGHT,
        ),
    }
}

/// A single weighted contribution to the CHI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiComponent<T> {
    pub value: T,
    pub component_score: f64,
    pub max_score: u8,
    pub weight: String,
}

impl<T> ChiComponent<T> {
    fn new(value: T, raw_score: f64, max_score: u8) -> Self {
        Self {
            value,
            component_score: round_to(raw_score, 1),
            max_score,
            weight: format!("{max_score}%"),
        }
    }
}

/// Per-component contributions behind a CHI score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiBreakdown {
    pub credit_score: ChiComponent<u32>,
    pub emi_ratio: ChiComponent<f64>,
    pub active_loans: ChiComponent<u32>,
    pub missed_payments: ChiComponent<u32>,
}

impl ChiBreakdown {
    pub fn component_total(&self) -> f64 {
        self.credit_score.component_score
            + self.emi_ratio.component_score
            + self.active_loans.component_score
            + self.missed_payments.component_score
    }
}

/// Scalar inputs to the composite scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiInputs {
    pub credit_score: u32,
    pub emi_to_income_ratio: f64,
    pub active_loans: u32,
    #[serde(default)]
    pub missed_payments: u32,
}

impl ChiInputs {
    pub fn score(&self) -> u32 {
        calculate_chi(
            self.credit_score,
            self.emi_to_income_ratio,
            self.active_loans,
            self.missed_payments,
        )
    }

    pub fn evaluate(&self) -> ChiResult {
        let chi_score = self.score();
        ChiResult {
            chi_score,
            risk_level: risk_level(chi_score),
            breakdown: chi_breakdown(
                self.credit_score,
                self.emi_to_income_ratio,
                self.active_loans,
                self.missed_payments,
            ),
        }
    }
}

/// Composite score, its risk tier, and the per-component breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiResult {
    pub chi_score: u32,
    pub risk_level: RiskLevel,
    pub breakdown: ChiBreakdown,
}
