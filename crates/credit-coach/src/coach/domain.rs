use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ChiInputs;

/// Subject identifier carried by a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub is_active: bool,
    pub is_onboarded: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    Salaried,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    #[serde(rename = "Business Owner")]
    BusinessOwner,
    Freelancer,
    Student,
}

/// Stored financial profile; ratios are always recomputed from these amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub id: String,
    pub user_id: UserId,
    pub name: Option<String>,
    pub avatar: String,
    pub age: Option<u8>,
    pub employment_type: Option<EmploymentType>,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub existing_emis: f64,
    pub credit_utilization: u32,
    pub active_loans: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialProfile {
    pub const DEFAULT_UTILIZATION: u32 = 30;

    /// Blank profile created on first access.
    pub fn empty(id: String, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            name: None,
            avatar: String::new(),
            age: None,
            employment_type: None,
            monthly_income: 0.0,
            monthly_expenses: 0.0,
            existing_emis: 0.0,
            credit_utilization: Self::DEFAULT_UTILIZATION,
            active_loans: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScoreRecord {
    pub id: String,
    pub user_id: UserId,
    pub score: u32,
    pub month: String,
    pub year: i32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Closed,
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: String,
    pub user_id: UserId,
    pub loan_type: String,
    pub principal_amount: f64,
    pub interest_rate: f64,
    pub tenure_months: u32,
    pub emi_amount: f64,
    pub start_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

/// Rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn ensure_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be between {min} and {max}"),
        ))
    }
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, "must be greater than or equal to 0"))
    }
}

pub(crate) fn validate_chi_inputs(inputs: &ChiInputs) -> Result<(), ValidationError> {
    ensure_range("credit_score", f64::from(inputs.credit_score), 300.0, 900.0)?;
    ensure_range("emi_to_income_ratio", inputs.emi_to_income_ratio, 0.0, 100.0)
}

/// Loan playground input with optional overrides of the stored profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaygroundRequest {
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure_months: u32,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub monthly_expenses: Option<f64>,
    #[serde(default)]
    pub existing_emis: Option<f64>,
    #[serde(default)]
    pub credit_score: Option<u32>,
    #[serde(default)]
    pub active_loans: Option<u32>,
}

impl PlaygroundRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.loan_amount.is_finite() && self.loan_amount >= 10_000.0) {
            return Err(ValidationError::new(
                "loan_amount",
                "must be greater than or equal to 10000",
            ));
        }
        ensure_range("interest_rate", self.interest_rate, 1.0, 30.0)?;
        ensure_range("tenure_months", f64::from(self.tenure_months), 6.0, 360.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonQuery {
    pub loan_amount: f64,
    pub interest_rate: f64,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub existing_emis: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub action_id: String,
    #[serde(default)]
    pub current_score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScoreSubmission {
    pub score: u32,
    pub month: String,
    pub year: i32,
}

impl CreditScoreSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_range("score", f64::from(self.score), 300.0, 900.0)?;
        if self.month.trim().is_empty() {
            return Err(ValidationError::new("month", "must not be empty"));
        }
        Ok(())
    }
}

/// Profile details captured when a user completes onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub age: u8,
    pub employment_type: EmploymentType,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    #[serde(default)]
    pub existing_emis: Option<f64>,
    #[serde(default)]
    pub credit_utilization: Option<u32>,
    #[serde(default)]
    pub active_loans: Option<u32>,
}

impl OnboardingRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_range("age", f64::from(self.age), 18.0, 100.0)?;
        ensure_non_negative("monthly_income", self.monthly_income)?;
        ensure_non_negative("monthly_expenses", self.monthly_expenses)?;
        if let Some(emis) = self.existing_emis {
            ensure_non_negative("existing_emis", emis)?;
        }
        if let Some(utilization) = self.credit_utilization {
            ensure_range("credit_utilization", f64::from(utilization), 0.0, 100.0)?;
        }
        Ok(())
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub monthly_expenses: Option<f64>,
    #[serde(default)]
    pub existing_emis: Option<f64>,
    #[serde(default)]
    pub credit_utilization: Option<u32>,
    #[serde(default)]
    pub active_loans: Option<u32>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(age) = self.age {
            ensure_range("age", f64::from(age), 18.0, 100.0)?;
        }
        for (field, amount) in [
            ("monthly_income", self.monthly_income),
            ("monthly_expenses", self.monthly_expenses),
            ("existing_emis", self.existing_emis),
        ] {
            if let Some(amount) = amount {
                ensure_non_negative(field, amount)?;
            }
        }
        if let Some(utilization) = self.credit_utilization {
            ensure_range("credit_utilization", f64::from(utilization), 0.0, 100.0)?;
        }
        Ok(())
    }

    pub(crate) fn apply(self, profile: &mut FinancialProfile) {
        if let Some(name) = self.name {
            profile.name = Some(name);
        }
        if let Some(avatar) = self.avatar {
            profile.avatar = avatar;
        }
        if let Some(age) = self.age {
            profile.age = Some(age);
        }
        if let Some(employment_type) = self.employment_type {
            profile.employment_type = Some(employment_type);
        }
        if let Some(income) = self.monthly_income {
            profile.monthly_income = income;
        }
        if let Some(expenses) = self.monthly_expenses {
            profile.monthly_expenses = expenses;
        }
        if let Some(emis) = self.existing_emis {
            profile.existing_emis = emis;
        }
        if let Some(utilization) = self.credit_utilization {
            profile.credit_utilization = utilization;
        }
        if let Some(loans) = self.active_loans {
            profile.active_loans = loans;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSubmission {
    pub loan_type: String,
    pub principal_amount: f64,
    pub interest_rate: f64,
    pub tenure_months: u32,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

impl LoanSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.loan_type.trim().is_empty() {
            return Err(ValidationError::new("loan_type", "must not be empty"));
        }
        ensure_non_negative("principal_amount", self.principal_amount)?;
        ensure_range("interest_rate", self.interest_rate, 0.0, 50.0)?;
        if self.tenure_months == 0 {
            return Err(ValidationError::new(
                "tenure_months",
                "must be greater than or equal to 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanStatusUpdate {
    pub status: LoanStatus,
}
