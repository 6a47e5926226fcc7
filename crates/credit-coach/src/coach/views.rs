use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{CreditScoreRecord, EmploymentType, FinancialProfile, UserAccount, UserId};
use crate::scoring::{AlertCounts, RiskLevel, TenureOption, TriggeredAlert};

/// Loan playground result: repayment figures plus the before/after health index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaygroundOutcome {
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
    pub new_total_emi: f64,
    pub new_emi_ratio: f64,
    pub current_chi: u32,
    pub new_chi: u32,
    pub chi_change: i32,
    pub risk_level: RiskLevel,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanComparison {
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub options: Vec<TenureOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAlertsView {
    pub alerts: Vec<TriggeredAlert>,
    pub counts: AlertCounts,
}

impl RiskAlertsView {
    pub fn empty() -> Self {
        Self {
            alerts: Vec::new(),
            counts: AlertCounts::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreTrendPoint {
    pub month: String,
    pub year: i32,
    pub score: u32,
}

impl From<&CreditScoreRecord> for ScoreTrendPoint {
    fn from(record: &CreditScoreRecord) -> Self {
        Self {
            month: record.month.clone(),
            year: record.year,
            score: record.score,
        }
    }
}

/// Recent score trend (oldest first) and the newest score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreHistoryView {
    pub trend: Vec<ScoreTrendPoint>,
    pub current_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentScoreView {
    pub score: u32,
}

/// Profile as exposed to the owner, including derived affordability figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub user_id: UserId,
    pub email: String,
    pub is_onboarded: bool,
    pub name: Option<String>,
    pub avatar: String,
    pub age: Option<u8>,
    pub employment_type: Option<EmploymentType>,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub existing_emis: f64,
    pub credit_utilization: u32,
    pub active_loans: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    pub emi_to_income_ratio: f64,
    pub disposable_income: f64,
    pub joined_at: DateTime<Utc>,
}

impl ProfileView {
    pub(crate) fn new(
        user: &UserAccount,
        profile: FinancialProfile,
        credit_score: Option<u32>,
        emi_to_income_ratio: f64,
        disposable_income: f64,
    ) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            email: user.email.clone(),
            is_onboarded: user.is_onboarded,
            name: profile.name,
            avatar: profile.avatar,
            age: profile.age,
            employment_type: profile.employment_type,
            monthly_income: profile.monthly_income,
            monthly_expenses: profile.monthly_expenses,
            existing_emis: profile.existing_emis,
            credit_utilization: profile.credit_utilization,
            active_loans: profile.active_loans,
            credit_score,
            emi_to_income_ratio,
            disposable_income,
            joined_at: user.created_at,
        }
    }
}
