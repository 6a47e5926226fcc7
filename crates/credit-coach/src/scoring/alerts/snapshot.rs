use serde::{Deserialize, Serialize};

use super::rules::RuleError;
use super::template::{TemplateContext, TemplateValue};

/// Raw financial inputs gathered for a single rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfileSnapshot {
    pub credit_score: u32,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub existing_emis: f64,
    pub credit_utilization: u32,
    pub active_loans: u32,
    #[serde(default)]
    pub missed_payments: u32,
    #[serde(default)]
    pub score_trend: i32,
}

impl FinancialProfileSnapshot {
    /// EMI obligations as a percentage of income; 100 when there is no income.
    pub fn emi_ratio(&self) -> f64 {
        if self.monthly_income > 0.0 {
            self.existing_emis / self.monthly_income * 100.0
        } else {
            100.0
        }
    }

    /// Income left after expenses and EMIs, as a percentage; 0 when there is no income.
    pub fn disposable_pct(&self) -> f64 {
        if self.monthly_income <= 0.0 {
            return 0.0;
        }
        let disposable = self.monthly_income - self.monthly_expenses - self.existing_emis;
        disposable / self.monthly_income * 100.0
    }

    /// Freezes the raw fields together with the ratios computed from them.
    pub fn derive(&self) -> DerivedSnapshot {
        DerivedSnapshot {
            raw: *self,
            emi_ratio: self.emi_ratio(),
            disposable_pct: self.disposable_pct(),
        }
    }
}

/// Fields a declarative rule can compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotField {
    CreditScore,
    MonthlyIncome,
    MonthlyExpenses,
    ExistingEmis,
    CreditUtilization,
    ActiveLoans,
    MissedPayments,
    ScoreTrend,
    EmiRatio,
    DisposablePct,
}

impl SnapshotField {
    pub fn key(&self) -> &'static str {
        match self {
            SnapshotField::CreditScore => "credit_score",
            SnapshotField::MonthlyIncome => "monthly_income",
            SnapshotField::MonthlyExpenses => "monthly_expenses",
            SnapshotField::ExistingEmis => "existing_emis",
            SnapshotField::CreditUtilization => "credit_utilization",
            SnapshotField::ActiveLoans => "active_loans",
            SnapshotField::MissedPayments => "missed_payments",
            SnapshotField::ScoreTrend => "score_trend",
            SnapshotField::EmiRatio => "emi_ratio",
            SnapshotField::DisposablePct => "disposable_pct",
        }
    }
}

/// Snapshot with ratios computed once per evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedSnapshot {
    raw: FinancialProfileSnapshot,
    emi_ratio: f64,
    disposable_pct: f64,
}

impl DerivedSnapshot {
    pub fn raw(&self) -> &FinancialProfileSnapshot {
        &self.raw
    }

    pub fn emi_ratio(&self) -> f64 {
        self.emi_ratio
    }

    pub fn disposable_pct(&self) -> f64 {
        self.disposable_pct
    }

    fn field(&self, field: SnapshotField) -> f64 {
        match field {
            SnapshotField::CreditScore => f64::from(self.raw.credit_score),
            SnapshotField::MonthlyIncome => self.raw.monthly_income,
            SnapshotField::MonthlyExpenses => self.raw.monthly_expenses,
            SnapshotField::ExistingEmis => self.raw.existing_emis,
            SnapshotField::CreditUtilization => f64::from(self.raw.credit_utilization),
            SnapshotField::ActiveLoans => f64::from(self.raw.active_loans),
            SnapshotField::MissedPayments => f64::from(self.raw.missed_payments),
            SnapshotField::ScoreTrend => f64::from(self.raw.score_trend),
            SnapshotField::EmiRatio => self.emi_ratio,
            SnapshotField::DisposablePct => self.disposable_pct,
        }
    }

    /// Reads a field for comparison, refusing values that cannot be ordered.
    pub fn value(&self, field: SnapshotField) -> Result<f64, RuleError> {
        let value = self.field(field);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(RuleError::NonFinite { field: field.key() })
        }
    }

    /// Named values available to alert description templates.
    pub fn template_context(&self) -> TemplateContext {
        let mut context = TemplateContext::new();
        context.insert("ratio", TemplateValue::Decimal(self.emi_ratio));
        context.insert(
            "utilization",
            TemplateValue::Integer(i64::from(self.raw.credit_utilization)),
        );
        context.insert("score", TemplateValue::Integer(i64::from(self.raw.credit_score)));
        context.insert("loans", TemplateValue::Integer(i64::from(self.raw.active_loans)));
        context.insert("disposable_pct", TemplateValue::Decimal(self.disposable_pct));
        context.insert("trend", TemplateValue::Integer(i64::from(self.raw.score_trend)));
        context
    }
}
