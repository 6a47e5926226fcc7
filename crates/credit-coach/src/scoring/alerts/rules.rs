use super::snapshot::{DerivedSnapshot, SnapshotField};
use super::Severity;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("snapshot field '{field}' is not a finite number")]
    NonFinite { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    GreaterThan,
    LessThan,
}

impl Comparator {
    fn holds(&self, value: f64, limit: f64) -> bool {
        match self {
            Comparator::GreaterThan => value > limit,
            Comparator::LessThan => value < limit,
        }
    }
}

/// Compound condition that cannot be expressed as a single threshold.
#[derive(Debug, Clone, Copy)]
pub struct NamedPredicate {
    pub name: &'static str,
    pub check: fn(&DerivedSnapshot) -> Result<bool, RuleError>,
}

#[derive(Debug, Clone, Copy)]
pub enum RuleCondition {
    Threshold {
        field: SnapshotField,
        comparator: Comparator,
        limit: f64,
    },
    /// Inclusive on both ends.
    Within {
        field: SnapshotField,
        low: f64,
        high: f64,
    },
    Predicate(NamedPredicate),
}

impl RuleCondition {
    pub fn evaluate(&self, snapshot: &DerivedSnapshot) -> Result<bool, RuleError> {
        match self {
            RuleCondition::Threshold {
                field,
                comparator,
                limit,
            } => Ok(comparator.holds(snapshot.value(*field)?, *limit)),
            RuleCondition::Within { field, low, high } => {
                let value = snapshot.value(*field)?;
                Ok(*low <= value && value <= *high)
            }
            RuleCondition::Predicate(predicate) => (predicate.check)(snapshot),
        }
    }
}

/// Immutable catalog entry describing when an alert fires and how it reads.
#[derive(Debug, Clone, Copy)]
pub struct RiskRule {
    pub id: &'static str,
    pub title: &'static str,
    pub rule: &'static str,
    pub severity: Severity,
    pub condition: RuleCondition,
    pub template: &'static str,
}

fn healthy_finances(snapshot: &DerivedSnapshot) -> Result<bool, RuleError> {
    let emi_ratio = snapshot.value(SnapshotField::EmiRatio)?;
    let credit_score = snapshot.value(SnapshotField::CreditScore)?;
    Ok(emi_ratio < 30.0 && credit_score > 750.0)
}

pub static RISK_RULES: [RiskRule; 10] = [
    RiskRule {
        id: "high_emi_burden",
        title: "High EMI Burden",
        rule: "EMI > 40% of income",
        severity: Severity::High,
        condition: RuleCondition::Threshold {
            field: SnapshotField::EmiRatio,
            comparator: Comparator::GreaterThan,
            limit: 40.0,
        },
        template: "Your EMI consumes {ratio:.0}% of your income. This may reduce future loan eligibility.",
    },
    RiskRule {
        id: "very_high_emi",
        title: "Critical EMI Level",
        rule: "EMI > 60% of income",
        severity: Severity::High,
        condition: RuleCondition::Threshold {
            field: SnapshotField::EmiRatio,
            comparator: Comparator::GreaterThan,
            limit: 60.0,
        },
        template: "Your EMI is at {ratio:.0}% of income - critically high. Consider debt consolidation.",
    },
    RiskRule {
        id: "high_credit_utilization",
        title: "Credit Utilization Rising",
        rule: "Credit utilization > 60%",
        severity: Severity::Medium,
        condition: RuleCondition::Threshold {
            field: SnapshotField::CreditUtilization,
            comparator: Comparator::GreaterThan,
            limit: 60.0,
        },
        template: "Your credit utilization is at {utilization}%. Consider paying down balances.",
    },
    RiskRule {
        id: "very_high_utilization",
        title: "Credit Utilization Critical",
        rule: "Credit utilization > 80%",
        severity: Severity::High,
        condition: RuleCondition::Threshold {
            field: SnapshotField::CreditUtilization,
            comparator: Comparator::GreaterThan,
            limit: 80.0,
        },
        template: "Credit utilization at {utilization}% is critically high. This severely impacts your score.",
    },
    RiskRule {
        id: "low_credit_score",
        title: "Low Credit Score",
        rule: "Credit score < 600",
        severity: Severity::High,
        condition: RuleCondition::Threshold {
            field: SnapshotField::CreditScore,
            comparator: Comparator::LessThan,
            limit: 600.0,
        },
        template: "Your credit score of {score} is below average. Focus on timely payments and reducing debt.",
    },
    RiskRule {
        id: "multiple_active_loans",
        title: "Multiple Active Loans",
        rule: "Active loans > 3",
        severity: Severity::Medium,
        condition: RuleCondition::Threshold {
            field: SnapshotField::ActiveLoans,
            comparator: Comparator::GreaterThan,
            limit: 3.0,
        },
        template: "You have {loans} active loans. Consider consolidating to simplify management.",
    },
    RiskRule {
        id: "low_disposable_income",
        title: "Low Disposable Income",
        rule: "Disposable income < 20% of income",
        severity: Severity::Medium,
        condition: RuleCondition::Threshold {
            field: SnapshotField::DisposablePct,
            comparator: Comparator::LessThan,
            limit: 20.0,
        },
        template: "Your disposable income is only {disposable_pct:.0}% of your earnings. Build an emergency fund.",
    },
    RiskRule {
        id: "score_improvement",
        title: "Score Improvement",
        rule: "Positive trend detected",
        severity: Severity::Low,
        condition: RuleCondition::Threshold {
            field: SnapshotField::ScoreTrend,
            comparator: Comparator::GreaterThan,
            limit: 30.0,
        },
        template: "Your credit score has improved by {trend} points in the last 6 months. Keep it up!",
    },
    RiskRule {
        id: "healthy_finances",
        title: "Healthy Financial Status",
        rule: "EMI < 30% and score > 750",
        severity: Severity::Low,
        condition: RuleCondition::Predicate(NamedPredicate {
            name: "healthy_finances",
            check: healthy_finances,
        }),
        template: "Your finances are in excellent shape with low EMI burden and high credit score.",
    },
    RiskRule {
        id: "optimal_utilization",
        title: "Optimal Credit Utilization",
        rule: "Credit utilization between 10-30%",
        severity: Severity::Low,
        condition: RuleCondition::Within {
            field: SnapshotField::CreditUtilization,
            low: 10.0,
            high: 30.0,
        },
        template: "Your credit utilization of {utilization}% is in the optimal range. Well done!",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::alerts::FinancialProfileSnapshot;
    use std::collections::HashSet;

    fn snapshot(credit_score: u32, emis: f64, utilization: u32) -> DerivedSnapshot {
        FinancialProfileSnapshot {
            credit_score,
            monthly_income: 100_000.0,
            monthly_expenses: 20_000.0,
            existing_emis: emis,
            credit_utilization: utilization,
            active_loans: 1,
            missed_payments: 0,
            score_trend: 0,
        }
        .derive()
    }

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<&str> = RISK_RULES.iter().map(|rule| rule.id).collect();
        assert_eq!(ids.len(), RISK_RULES.len());
    }

    #[test]
    fn thresholds_are_strict() {
        let rule = &RISK_RULES[0];
        assert!(!rule
            .condition
            .evaluate(&snapshot(700, 40_000.0, 50))
            .expect("evaluates"));
        assert!(rule
            .condition
            .evaluate(&snapshot(700, 40_001.0, 50))
            .expect("evaluates"));
    }

    #[test]
    fn optimal_utilization_is_inclusive() {
        let rule = RISK_RULES
            .iter()
            .find(|rule| rule.id == "optimal_utilization")
            .expect("rule exists");
        for (utilization, expected) in [(9, false), (10, true), (30, true), (31, false)] {
            assert_eq!(
                rule.condition
                    .evaluate(&snapshot(700, 10_000.0, utilization))
                    .expect("evaluates"),
                expected,
                "utilization {utilization}"
            );
        }
    }

    #[test]
    fn healthy_finances_requires_both_conditions() {
        let healthy = snapshot(751, 29_000.0, 20);
        let low_score = snapshot(750, 29_000.0, 20);
        let heavy_emi = snapshot(800, 35_000.0, 20);

        assert_eq!(healthy_finances(&healthy), Ok(true));
        assert_eq!(healthy_finances(&low_score), Ok(false));
        assert_eq!(healthy_finances(&heavy_emi), Ok(false));
    }
}
